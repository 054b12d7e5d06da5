//! Character map (`cmap` table) lookup.
//!
//! Collapses the Unicode and symbol subtables of a font into one ordered
//! code point to glyph map that can be walked in code point order.

use std::collections::BTreeMap;

use ttf_parser::PlatformId;

/// Code point to glyph id mapping of one face.
///
/// Only code points mapped to a glyph other than `.notdef` are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharMap {
    map: BTreeMap<u32, u16>,
}

/// Preference of a subtable; lower wins when several map the same code point.
fn subtable_rank(platform_id: PlatformId, encoding_id: u16) -> Option<u8> {
    match (platform_id, encoding_id) {
        (PlatformId::Windows, 10) => Some(0),
        (PlatformId::Unicode, 4 | 6) => Some(1),
        (PlatformId::Windows, 1) => Some(2),
        (PlatformId::Unicode, 0..=3) => Some(3),
        (PlatformId::Windows, 0) => Some(4),
        _ => None,
    }
}

impl CharMap {
    /// Parse a raw `cmap` table. Returns `None` if the table is malformed or
    /// has no Unicode or symbol subtable.
    pub fn from_cmap_table(data: &[u8]) -> Option<Self> {
        let table = ttf_parser::cmap::Table::parse(data)?;

        let mut subtables: Vec<_> = table
            .subtables
            .into_iter()
            .filter_map(|s| subtable_rank(s.platform_id, s.encoding_id).map(|rank| (rank, s)))
            .collect();
        if subtables.is_empty() {
            return None;
        }
        subtables.sort_by_key(|(rank, _)| *rank);

        let mut map = BTreeMap::new();
        for (_, subtable) in &subtables {
            subtable.codepoints(|code_point| {
                if let Some(glyph) = subtable.glyph_index(code_point) {
                    if glyph.0 != 0 {
                        map.entry(code_point).or_insert(glyph.0);
                    }
                }
            });
        }

        Some(Self { map })
    }

    /// Build from explicit pairs.
    pub fn from_pairs<I: IntoIterator<Item = (u32, u16)>>(pairs: I) -> Self {
        Self {
            map: pairs.into_iter().filter(|&(_, glyph)| glyph != 0).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// First mapped code point.
    pub fn first_char(&self) -> Option<u32> {
        self.map.keys().next().copied()
    }

    /// Smallest mapped code point greater than `c`, or `c` itself when there
    /// is none.
    pub fn next_char_after(&self, c: u32) -> u32 {
        self.map
            .range(c.saturating_add(1)..)
            .next()
            .map(|(&next, _)| next)
            .unwrap_or(c)
    }

    /// Glyph for a code point, 0 (`.notdef`) when unmapped.
    pub fn glyph_index(&self, c: u32) -> u16 {
        self.map.get(&c).copied().unwrap_or(0)
    }
}
