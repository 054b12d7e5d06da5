//! sfnt font parser.
//!
//! This module wraps the `ttf-parser` crate to expose the narrow surface the
//! font manager and the subsetter need: table lookup by tag, name records,
//! global metrics, glyph count and advance widths.
//!
//! # Units
//!
//! Metrics and advances are reported in thousandths of an em (the PDF glyph
//! space), computed as `value * 1000 / unitsPerEm` with truncation.

use byteorder::{BigEndian, ByteOrder};
use ttf_parser::{Face, GlyphId, Tag};

use super::cmap::CharMap;
use super::name_records::NameRecord;
use crate::error::{Error, Result};

/// Table tags used across the crate.
pub mod tags {
    pub const CFF: &[u8; 4] = b"CFF ";
    pub const CFF2: &[u8; 4] = b"CFF2";
    pub const CMAP: &[u8; 4] = b"cmap";
    pub const CVT: &[u8; 4] = b"cvt ";
    pub const FPGM: &[u8; 4] = b"fpgm";
    pub const GLYF: &[u8; 4] = b"glyf";
    pub const HEAD: &[u8; 4] = b"head";
    pub const HHEA: &[u8; 4] = b"hhea";
    pub const HMTX: &[u8; 4] = b"hmtx";
    pub const LOCA: &[u8; 4] = b"loca";
    pub const MAXP: &[u8; 4] = b"maxp";
    pub const NAME: &[u8; 4] = b"name";
    pub const OS2: &[u8; 4] = b"OS/2";
    pub const POST: &[u8; 4] = b"post";
    pub const PREP: &[u8; 4] = b"prep";
}

/// Outline technology of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineKind {
    /// `glyf`/`loca` quadratic outlines
    TrueType,
    /// PostScript outlines in a `CFF ` table
    Cff,
    /// Neither (bitmap-only, CFF2, ...)
    Unsupported,
}

/// Font-wide values gathered from `head`, `hhea`, `OS/2`, `post` and `cmap`.
///
/// Vertical metrics and the bounding box are in thousandths of an em.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalFontInfo {
    pub units_per_em: u16,
    pub ascender: i32,
    pub descender: i32,
    pub line_gap: i32,
    pub typo_ascender: i32,
    pub typo_descender: i32,
    pub typo_line_gap: i32,
    pub win_ascent: i32,
    pub win_descent: i32,
    pub weight_class: u16,
    pub width_class: u16,
    pub is_fixed_pitch: u32,
    pub italic_angle: f32,
    pub mac_style: u16,
    pub symbol_encoded: bool,
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

/// Scale a design-unit value to thousandths of an em.
pub(crate) fn to_thousandths(value: i32, units_per_em: u16) -> i32 {
    if units_per_em == 0 {
        return value;
    }
    value * 1000 / units_per_em as i32
}

pub(crate) fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    data.get(offset..offset + 2).map(BigEndian::read_u16)
}

pub(crate) fn read_i16(data: &[u8], offset: usize) -> Option<i16> {
    data.get(offset..offset + 2).map(BigEndian::read_i16)
}

pub(crate) fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset + 4).map(BigEndian::read_u32)
}

pub(crate) fn read_i32(data: &[u8], offset: usize) -> Option<i32> {
    data.get(offset..offset + 4).map(BigEndian::read_i32)
}

/// Number of faces in a collection file, or `None` for a single-face file.
pub fn count_faces_in_collection(data: &[u8]) -> Option<u32> {
    ttf_parser::fonts_in_collection(data)
}

/// A parsed sfnt face borrowing the file bytes.
pub struct SfntFace<'a> {
    face: Face<'a>,
    data: &'a [u8],
    index: u32,
}

impl std::fmt::Debug for SfntFace<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SfntFace")
            .field("index", &self.index)
            .field("len", &self.data.len())
            .field("glyphs", &self.face.number_of_glyphs())
            .finish()
    }
}

impl<'a> SfntFace<'a> {
    /// Parse face `index` from a font or collection file.
    pub fn parse(data: &'a [u8], index: u32) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::FontParse("font file is empty".to_string()));
        }

        let face = Face::parse(data, index).map_err(|e| Error::FontParse(e.to_string()))?;

        Ok(Self { face, data, index })
    }

    /// Raw bytes of a table, if present.
    pub fn table(&self, tag: &[u8; 4]) -> Option<&'a [u8]> {
        self.face.raw_face().table(Tag::from_bytes(tag))
    }

    pub fn has_table(&self, tag: &[u8; 4]) -> bool {
        self.table(tag).is_some()
    }

    /// Number of glyphs declared by `maxp`.
    pub fn glyph_count(&self) -> u16 {
        self.face.number_of_glyphs()
    }

    pub fn units_per_em(&self) -> u16 {
        self.face.units_per_em()
    }

    pub fn outline_kind(&self) -> OutlineKind {
        if self.has_table(tags::CFF) {
            OutlineKind::Cff
        } else if self.has_table(tags::GLYF) && self.has_table(tags::LOCA) {
            OutlineKind::TrueType
        } else {
            OutlineKind::Unsupported
        }
    }

    /// All records of the `name` table.
    pub fn name_records(&self) -> Vec<NameRecord<'a>> {
        self.face
            .names()
            .into_iter()
            .map(|name| NameRecord {
                platform_id: name.platform_id as u16,
                encoding_id: name.encoding_id,
                language_id: name.language_id,
                name_id: name.name_id,
                bytes: name.name,
            })
            .collect()
    }

    /// Gather font-wide metrics and style fields.
    pub fn global_info(&self) -> GlobalFontInfo {
        let upem = self.units_per_em();
        let scale = |v: i32| to_thousandths(v, upem);
        let mut info = GlobalFontInfo {
            units_per_em: upem,
            ..GlobalFontInfo::default()
        };

        if let Some(head) = self.table(tags::HEAD) {
            info.x_min = scale(read_i16(head, 36).unwrap_or(0) as i32);
            info.y_min = scale(read_i16(head, 38).unwrap_or(0) as i32);
            info.x_max = scale(read_i16(head, 40).unwrap_or(0) as i32);
            info.y_max = scale(read_i16(head, 42).unwrap_or(0) as i32);
            info.mac_style = read_u16(head, 44).unwrap_or(0);
        }

        if let Some(hhea) = self.table(tags::HHEA) {
            info.ascender = scale(read_i16(hhea, 4).unwrap_or(0) as i32);
            info.descender = scale(read_i16(hhea, 6).unwrap_or(0) as i32);
            info.line_gap = scale(read_i16(hhea, 8).unwrap_or(0) as i32);
        }

        if let Some(os2) = self.table(tags::OS2) {
            info.weight_class = read_u16(os2, 4).unwrap_or(0);
            info.width_class = read_u16(os2, 6).unwrap_or(0);
            // version 0 tables may stop before the typo/win fields
            info.typo_ascender = scale(read_i16(os2, 68).unwrap_or(0) as i32);
            info.typo_descender = scale(read_i16(os2, 70).unwrap_or(0) as i32);
            info.typo_line_gap = scale(read_i16(os2, 72).unwrap_or(0) as i32);
            info.win_ascent = scale(read_u16(os2, 74).unwrap_or(0) as i32);
            info.win_descent = scale(read_u16(os2, 76).unwrap_or(0) as i32);
        }

        if let Some(post) = self.table(tags::POST) {
            info.italic_angle = read_i32(post, 4).unwrap_or(0) as f32 / 65536.0;
            info.is_fixed_pitch = read_u32(post, 12).unwrap_or(0);
        }

        info.symbol_encoded = self.table(tags::CMAP).map(has_symbol_subtable).unwrap_or(false);

        info
    }

    /// Advance widths for `glyph_ids`, in thousandths of an em.
    ///
    /// Returns `None` if any glyph id is outside the font or the font has no
    /// horizontal metrics. Vertical advances fall back to one em when the
    /// font carries no `vmtx`.
    pub fn simple_glyph_metrics(&self, glyph_ids: &[u16], vertical: bool) -> Option<Vec<i32>> {
        let upem = self.units_per_em();
        let glyph_count = self.glyph_count();

        glyph_ids
            .iter()
            .map(|&gid| {
                if gid >= glyph_count {
                    return None;
                }
                let advance = if vertical {
                    self.face.glyph_ver_advance(GlyphId(gid)).unwrap_or(upem)
                } else {
                    self.face.glyph_hor_advance(GlyphId(gid))?
                };
                Some(to_thousandths(advance as i32, upem))
            })
            .collect()
    }

    /// Parsed character map of this face, if it has a usable `cmap`.
    pub fn char_map(&self) -> Option<CharMap> {
        self.table(tags::CMAP).and_then(CharMap::from_cmap_table)
    }
}

/// Whether a `cmap` table carries a Windows symbol (3,0) subtable.
fn has_symbol_subtable(cmap: &[u8]) -> bool {
    let count = read_u16(cmap, 2).unwrap_or(0) as usize;
    (0..count).any(|i| {
        let record = 4 + i * 8;
        read_u16(cmap, record) == Some(3) && read_u16(cmap, record + 2) == Some(0)
    })
}
