//! TrueType (`glyf`) subsetting.
//!
//! Rebuilds a TrueType font holding the requested glyphs in slot order,
//! followed by any composite components they reference. Glyph `k` of the
//! output is reachable as byte `k` through a (1,0) format 0 cmap and as
//! `U+F000 + k` through a (3,0) symbol cmap.
//!
//! ## Tables
//!
//! `glyf`, `loca`, `hmtx`, `hhea`, `maxp`, `head`, `post` and `cmap` are
//! rebuilt; `name`, `OS/2`, `cvt `, `fpgm` and `prep` are copied verbatim.

use std::collections::HashMap;

use byteorder::{BigEndian, ByteOrder};

use super::sfnt_writer::{search_params, SfntWriter, SFNT_VERSION_TRUETYPE};
use super::truetype_parser::{read_i16, read_u16, read_u32, tags, SfntFace};
use crate::error::{Error, Result};

// composite glyph flags
const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;

/// Offset of each component glyph id inside a composite glyph record.
fn component_offsets(glyph: &[u8]) -> Vec<usize> {
    let mut offsets = Vec::new();
    if read_i16(glyph, 0).unwrap_or(0) >= 0 {
        return offsets;
    }

    let mut pos = 10;
    while let (Some(flags), Some(_)) = (read_u16(glyph, pos), read_u16(glyph, pos + 2)) {
        offsets.push(pos + 2);
        pos += 4;
        pos += if flags & ARG_1_AND_2_ARE_WORDS != 0 { 4 } else { 2 };
        if flags & WE_HAVE_A_SCALE != 0 {
            pos += 2;
        } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
            pos += 4;
        } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
            pos += 8;
        }
        if flags & MORE_COMPONENTS == 0 {
            break;
        }
    }
    offsets
}

/// Source tables of a TrueType face.
#[derive(Debug)]
pub struct GlyfSource<'a> {
    glyf: &'a [u8],
    loca: Vec<u32>,
    head: &'a [u8],
    hhea: &'a [u8],
    hmtx: &'a [u8],
    maxp: &'a [u8],
    post: Option<&'a [u8]>,
    copied: Vec<(&'static [u8; 4], &'a [u8])>,
    num_glyphs: u16,
    num_h_metrics: usize,
}

impl<'a> GlyfSource<'a> {
    pub fn new(face: &SfntFace<'a>) -> Result<Self> {
        let require = |tag: &[u8; 4]| {
            face.table(tag)
                .ok_or_else(|| Error::MissingTable(String::from_utf8_lossy(tag).into_owned()))
        };

        let glyf = require(tags::GLYF)?;
        let head = require(tags::HEAD)?;
        let hhea = require(tags::HHEA)?;
        let hmtx = require(tags::HMTX)?;
        let maxp = require(tags::MAXP)?;
        let raw_loca = require(tags::LOCA)?;

        if head.len() < 54 || hhea.len() < 36 || maxp.len() < 6 {
            return Err(Error::FontParse("truncated head, hhea or maxp".to_string()));
        }

        let num_glyphs = face.glyph_count();
        let long_offsets = read_i16(head, 50).unwrap_or(0) != 0;
        let loca = parse_loca(raw_loca, long_offsets, num_glyphs)?;
        let num_h_metrics = (read_u16(hhea, 34).unwrap_or(0) as usize).max(1);

        let copied = [tags::NAME, tags::OS2, tags::CVT, tags::FPGM, tags::PREP]
            .into_iter()
            .filter_map(|tag| face.table(tag).map(|data| (tag, data)))
            .collect();

        Ok(Self {
            glyf,
            loca,
            head,
            hhea,
            hmtx,
            maxp,
            post: face.table(tags::POST),
            copied,
            num_glyphs,
            num_h_metrics,
        })
    }

    fn glyph_data(&self, glyph: u16) -> &'a [u8] {
        let idx = glyph as usize;
        match (self.loca.get(idx), self.loca.get(idx + 1)) {
            (Some(&start), Some(&end)) if start < end => {
                self.glyf.get(start as usize..end as usize).unwrap_or_default()
            },
            _ => &[],
        }
    }

    /// `(advanceWidth, lsb)` bytes of a glyph.
    fn metric(&self, glyph: u16) -> [u8; 4] {
        let idx = glyph as usize;
        let mut out = [0u8; 4];
        if idx < self.num_h_metrics {
            if let Some(bytes) = self.hmtx.get(idx * 4..idx * 4 + 4) {
                out.copy_from_slice(bytes);
            }
        } else {
            let last = (self.num_h_metrics - 1) * 4;
            let lsb = self.num_h_metrics * 4 + (idx - self.num_h_metrics) * 2;
            if let Some(advance) = self.hmtx.get(last..last + 2) {
                out[..2].copy_from_slice(advance);
            }
            if let Some(lsb) = self.hmtx.get(lsb..lsb + 2) {
                out[2..].copy_from_slice(lsb);
            }
        }
        out
    }

    /// Build a TrueType font whose glyph `k` is source glyph `glyphs[k]`.
    pub fn subset(&self, glyphs: &[u16]) -> Result<Vec<u8>> {
        if glyphs.is_empty() || glyphs.len() > 256 {
            return Err(Error::invalid(format!("TrueType subset of {} glyphs", glyphs.len())));
        }
        if let Some(&bad) = glyphs.iter().find(|&&g| g >= self.num_glyphs) {
            return Err(Error::invalid(format!("glyph {} not in font", bad)));
        }

        // slot glyphs first, then composite components in discovery order
        let mut order: Vec<u16> = glyphs.to_vec();
        let mut remap: HashMap<u16, u16> = HashMap::new();
        for (new, &old) in glyphs.iter().enumerate() {
            remap.entry(old).or_insert(new as u16);
        }
        let mut cursor = 0;
        while cursor < order.len() {
            let data = self.glyph_data(order[cursor]);
            for at in component_offsets(data) {
                let component = read_u16(data, at).unwrap_or(0);
                if component >= self.num_glyphs || remap.contains_key(&component) {
                    continue;
                }
                if order.len() >= u16::MAX as usize {
                    return Err(Error::FontParse("composite glyph graph too large".to_string()));
                }
                remap.insert(component, order.len() as u16);
                order.push(component);
            }
            cursor += 1;
        }

        let mut glyf = Vec::new();
        let mut offsets = Vec::with_capacity(order.len() + 1);
        for &old in &order {
            offsets.push(glyf.len() as u32);
            let data = self.glyph_data(old);
            let start = glyf.len();
            glyf.extend_from_slice(data);
            for at in component_offsets(data) {
                let component = read_u16(data, at).unwrap_or(0);
                let new = remap.get(&component).copied().unwrap_or(0);
                BigEndian::write_u16(&mut glyf[start + at..start + at + 2], new);
            }
            glyf.resize((glyf.len() + 3) & !3, 0);
        }
        offsets.push(glyf.len() as u32);

        let long_loca = glyf.len() > 0x1FFFE;
        let mut loca = Vec::new();
        for &offset in &offsets {
            if long_loca {
                loca.extend_from_slice(&offset.to_be_bytes());
            } else {
                loca.extend_from_slice(&((offset / 2) as u16).to_be_bytes());
            }
        }

        let count = order.len() as u16;

        let mut hmtx = Vec::with_capacity(order.len() * 4);
        for &old in &order {
            hmtx.extend_from_slice(&self.metric(old));
        }

        let mut hhea = self.hhea.to_vec();
        BigEndian::write_u16(&mut hhea[34..36], count);

        let mut maxp = self.maxp.to_vec();
        BigEndian::write_u16(&mut maxp[4..6], count);

        let mut head = self.head.to_vec();
        BigEndian::write_u32(&mut head[8..12], 0);
        BigEndian::write_i16(&mut head[50..52], long_loca as i16);

        let mut writer = SfntWriter::new(SFNT_VERSION_TRUETYPE);
        writer
            .add_table(tags::GLYF, glyf)
            .add_table(tags::LOCA, loca)
            .add_table(tags::HMTX, hmtx)
            .add_table(tags::HHEA, hhea)
            .add_table(tags::MAXP, maxp)
            .add_table(tags::HEAD, head)
            .add_table(tags::POST, post_format3(self.post))
            .add_table(tags::CMAP, slot_cmap(glyphs.len() as u16));
        for (tag, data) in &self.copied {
            writer.add_table(tag, data.to_vec());
        }

        log::debug!(
            "TrueType subset: {} slots, {} glyphs with components",
            glyphs.len(),
            order.len()
        );

        Ok(writer.finish())
    }
}

fn parse_loca(data: &[u8], long_offsets: bool, num_glyphs: u16) -> Result<Vec<u32>> {
    let entries = num_glyphs as usize + 1;
    let offsets: Option<Vec<u32>> = (0..entries)
        .map(|i| {
            if long_offsets {
                read_u32(data, i * 4)
            } else {
                read_u16(data, i * 2).map(|v| v as u32 * 2)
            }
        })
        .collect();
    offsets.ok_or_else(|| Error::FontParse("loca table shorter than glyph count".to_string()))
}

/// `post` format 3: the source header with the glyph names dropped.
fn post_format3(source: Option<&[u8]>) -> Vec<u8> {
    let mut post = vec![0u8; 32];
    if let Some(header) = source.and_then(|s| s.get(..32)) {
        post.copy_from_slice(header);
    }
    BigEndian::write_u32(&mut post[0..4], 0x0003_0000);
    post
}

/// cmap for `count` slots: (1,0) format 0 byte -> glyph and (3,0) format 4
/// `U+F000 + byte` -> glyph.
fn slot_cmap(count: u16) -> Vec<u8> {
    let mut format0 = Vec::with_capacity(262);
    format0.extend_from_slice(&0u16.to_be_bytes());
    format0.extend_from_slice(&262u16.to_be_bytes());
    format0.extend_from_slice(&0u16.to_be_bytes());
    format0.extend((0..256u16).map(|b| if b < count { b as u8 } else { 0 }));

    let seg_count = 2u16;
    let (search_range, entry_selector, range_shift) = search_params(seg_count, 2);
    let mut format4 = Vec::new();
    format4.extend_from_slice(&4u16.to_be_bytes());
    format4.extend_from_slice(&(16 + seg_count * 8).to_be_bytes());
    format4.extend_from_slice(&0u16.to_be_bytes());
    format4.extend_from_slice(&(seg_count * 2).to_be_bytes());
    format4.extend_from_slice(&search_range.to_be_bytes());
    format4.extend_from_slice(&entry_selector.to_be_bytes());
    format4.extend_from_slice(&range_shift.to_be_bytes());
    // endCode
    format4.extend_from_slice(&(0xF000 + count - 1).to_be_bytes());
    format4.extend_from_slice(&0xFFFFu16.to_be_bytes());
    format4.extend_from_slice(&0u16.to_be_bytes());
    // startCode
    format4.extend_from_slice(&0xF000u16.to_be_bytes());
    format4.extend_from_slice(&0xFFFFu16.to_be_bytes());
    // idDelta: 0xF000 + k + 0x1000 wraps to k
    format4.extend_from_slice(&0x1000u16.to_be_bytes());
    format4.extend_from_slice(&1u16.to_be_bytes());
    // idRangeOffset
    format4.extend_from_slice(&0u32.to_be_bytes());

    let mut cmap = Vec::new();
    cmap.extend_from_slice(&0u16.to_be_bytes());
    cmap.extend_from_slice(&2u16.to_be_bytes());
    cmap.extend_from_slice(&1u16.to_be_bytes());
    cmap.extend_from_slice(&0u16.to_be_bytes());
    cmap.extend_from_slice(&20u32.to_be_bytes());
    cmap.extend_from_slice(&3u16.to_be_bytes());
    cmap.extend_from_slice(&0u16.to_be_bytes());
    cmap.extend_from_slice(&(20 + format0.len() as u32).to_be_bytes());
    cmap.extend(format0);
    cmap.extend(format4);
    cmap
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_offsets_simple_glyph() {
        let simple = [0u8, 1, 0, 0, 0, 0, 0, 10, 0, 10];
        assert!(component_offsets(&simple).is_empty());
        assert!(component_offsets(&[]).is_empty());
    }

    #[test]
    fn test_component_offsets_two_components() {
        let mut glyph = vec![0xFF, 0xFF, 0, 0, 0, 0, 0, 0, 0, 0];
        // word args, more components, glyph 4
        glyph.extend_from_slice(&(ARG_1_AND_2_ARE_WORDS | MORE_COMPONENTS).to_be_bytes());
        glyph.extend_from_slice(&4u16.to_be_bytes());
        glyph.extend_from_slice(&[0, 0, 0, 0]);
        // byte args with a scale, glyph 7
        glyph.extend_from_slice(&WE_HAVE_A_SCALE.to_be_bytes());
        glyph.extend_from_slice(&7u16.to_be_bytes());
        glyph.extend_from_slice(&[0, 0, 0x40, 0]);

        let offsets = component_offsets(&glyph);
        assert_eq!(offsets, vec![12, 20]);
        assert_eq!(read_u16(&glyph, 12), Some(4));
        assert_eq!(read_u16(&glyph, 20), Some(7));
    }

    #[test]
    fn test_parse_loca_short_and_long() {
        let short = [0, 0, 0, 5, 0, 9];
        assert_eq!(parse_loca(&short, false, 2).unwrap(), vec![0, 10, 18]);
        let long = [0, 0, 0, 0, 0, 0, 0, 12];
        assert_eq!(parse_loca(&long, true, 1).unwrap(), vec![0, 12]);
        assert!(parse_loca(&short, false, 5).is_err());
    }

    #[test]
    fn test_post_format3_keeps_header() {
        let mut source = vec![0u8; 40];
        source[0..4].copy_from_slice(&0x0002_0000u32.to_be_bytes());
        source[4..8].copy_from_slice(&(-12i32 << 16).to_be_bytes());
        let post = post_format3(Some(&source));
        assert_eq!(post.len(), 32);
        assert_eq!(read_u32(&post, 0), Some(0x0003_0000));
        assert_eq!(&post[4..8], &source[4..8]);
        assert_eq!(read_u32(&post_format3(None), 0), Some(0x0003_0000));
    }

    #[test]
    fn test_slot_cmap_maps_bytes_and_symbol_range() {
        let cmap = slot_cmap(3);
        let table = ttf_parser::cmap::Table::parse(&cmap).unwrap();
        let mut mac = None;
        let mut symbol = None;
        for subtable in table.subtables {
            match (subtable.platform_id, subtable.encoding_id) {
                (ttf_parser::PlatformId::Macintosh, 0) => mac = Some(subtable),
                (ttf_parser::PlatformId::Windows, 0) => symbol = Some(subtable),
                _ => {},
            }
        }
        let mac = mac.unwrap();
        let symbol = symbol.unwrap();
        assert_eq!(mac.glyph_index(2).map(|g| g.0), Some(2));
        assert_eq!(mac.glyph_index(3).map(|g| g.0).unwrap_or(0), 0);
        assert_eq!(symbol.glyph_index(0xF001).map(|g| g.0), Some(1));
        assert_eq!(symbol.glyph_index(0xF002).map(|g| g.0), Some(2));
        assert_eq!(symbol.glyph_index(0xF003).map(|g| g.0).unwrap_or(0), 0);
    }
}
