//! sfnt container assembly.
//!
//! Collects tables, lays them out behind a sorted table directory with
//! 4-byte padding and per-table checksums, then patches the `head`
//! `checkSumAdjustment` over the finished file.

use byteorder::{BigEndian, ByteOrder};

/// sfnt version for `glyf` outlines.
pub const SFNT_VERSION_TRUETYPE: u32 = 0x0001_0000;
/// sfnt version for CFF outlines (`OTTO`).
pub const SFNT_VERSION_CFF: u32 = 0x4F54_544F;

const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;

/// Builder for an sfnt font file.
#[derive(Debug, Clone)]
pub struct SfntWriter {
    version: u32,
    tables: Vec<([u8; 4], Vec<u8>)>,
}

impl Default for SfntWriter {
    fn default() -> Self {
        Self::new(SFNT_VERSION_TRUETYPE)
    }
}

impl SfntWriter {
    pub fn new(version: u32) -> Self {
        Self {
            version,
            tables: Vec::new(),
        }
    }

    /// Add or replace a table.
    pub fn add_table(&mut self, tag: &[u8; 4], data: Vec<u8>) -> &mut Self {
        if let Some(slot) = self.tables.iter_mut().find(|(t, _)| t == tag) {
            slot.1 = data;
        } else {
            self.tables.push((*tag, data));
        }
        self
    }

    pub fn has_table(&self, tag: &[u8; 4]) -> bool {
        self.tables.iter().any(|(t, _)| t == tag)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Serialize the font.
    pub fn finish(mut self) -> Vec<u8> {
        self.tables.sort_by_key(|(tag, _)| *tag);
        let num_tables = self.tables.len() as u16;
        let (search_range, entry_selector, range_shift) = search_params(num_tables, 16);

        let mut output = Vec::new();
        output.extend_from_slice(&self.version.to_be_bytes());
        output.extend_from_slice(&num_tables.to_be_bytes());
        output.extend_from_slice(&search_range.to_be_bytes());
        output.extend_from_slice(&entry_selector.to_be_bytes());
        output.extend_from_slice(&range_shift.to_be_bytes());

        let mut offset = 12 + self.tables.len() * 16;
        let mut head_offset = None;
        for (tag, data) in &self.tables {
            if tag == b"head" {
                head_offset = Some(offset);
            }
            output.extend_from_slice(tag);
            output.extend_from_slice(&table_checksum(data).to_be_bytes());
            output.extend_from_slice(&(offset as u32).to_be_bytes());
            output.extend_from_slice(&(data.len() as u32).to_be_bytes());
            offset += padded_len(data.len());
        }

        for (_, data) in &self.tables {
            output.extend_from_slice(data);
            output.resize(padded_len(output.len()), 0);
        }

        if let Some(head) = head_offset {
            // the adjustment field must be zero while the file sum is taken
            if head + 12 <= output.len() {
                BigEndian::write_u32(&mut output[head + 8..head + 12], 0);
                let adjustment = CHECKSUM_MAGIC.wrapping_sub(table_checksum(&output));
                BigEndian::write_u32(&mut output[head + 8..head + 12], adjustment);
            }
        }

        output
    }
}

/// `(searchRange, entrySelector, rangeShift)` for `count` entries of
/// `unit` bytes.
pub(crate) fn search_params(count: u16, unit: u16) -> (u16, u16, u16) {
    if count == 0 {
        return (0, 0, 0);
    }
    let entry_selector = 15 - count.leading_zeros() as u16;
    let search_range = (1u16 << entry_selector) * unit;
    let range_shift = (count * unit).saturating_sub(search_range);
    (search_range, entry_selector, range_shift)
}

fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

/// Sum of big-endian u32 words, the last one zero padded.
pub fn table_checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}
