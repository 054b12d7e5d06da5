//! Font subsetting for PDF embedding.
//!
//! A subset request names up to 256 source glyphs together with the output
//! encoding byte each one should occupy. The request is validated and
//! reshuffled into byte order (slot `b` holds the glyph for byte `b`, slot 0
//! is always `.notdef`), then handed to the outline-specific builder that
//! was chosen when the font was opened.
//!
//! # Example
//!
//! ```ignore
//! let request = SubsetRequest::new(vec![0, 36, 68], vec![0, 1, 2]);
//! let (bytes, info) = manager.build_font_subset(id, &request)?;
//! ```

use serde::Serialize;

use super::cff_subset::CffFont;
use super::glyf_subset::GlyfSource;
use super::truetype_parser::{tags, OutlineKind, SfntFace};
use crate::error::{Error, Result};

/// Largest number of glyphs in a single-byte encoded subset.
pub const MAX_SUBSET_GLYPHS: usize = 256;

/// Glyphs to keep and the encoding byte for each of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsetRequest {
    /// Source glyph ids, in caller order
    pub glyph_ids: Vec<u16>,
    /// Output encoding byte per glyph; 0 is reserved for `.notdef`
    pub encoding: Vec<u8>,
    /// Report vertical instead of horizontal advances
    pub vertical: bool,
}

impl SubsetRequest {
    pub fn new(glyph_ids: Vec<u16>, encoding: Vec<u8>) -> Self {
        Self {
            glyph_ids,
            encoding,
            vertical: false,
        }
    }

    /// Use vertical advances for the reported widths.
    pub fn with_vertical(mut self, vertical: bool) -> Self {
        self.vertical = vertical;
        self
    }
}

/// The request reordered by encoding byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPlan {
    /// Source glyph of each slot; slot 0 is `.notdef`
    pub glyphs: Vec<u16>,
    /// Caller index that requested each slot (`None` for a synthesized `.notdef`)
    pub caller_index: Vec<Option<usize>>,
}

impl SlotPlan {
    /// Validate a request and reshuffle it into byte slots.
    ///
    /// The slot count is the number of non-zero bytes plus one; every
    /// non-zero byte must be unique and below that count, so the slots are
    /// dense. Without a caller entry for byte 0, glyph 0 is used there.
    pub fn from_request(request: &SubsetRequest, num_glyphs: u16) -> Result<Self> {
        let n = request.glyph_ids.len();
        if n > MAX_SUBSET_GLYPHS {
            return Err(Error::invalid(format!(
                "{} glyphs requested, at most {} fit a subset",
                n, MAX_SUBSET_GLYPHS
            )));
        }
        if request.encoding.len() != n {
            return Err(Error::invalid(format!(
                "{} glyph ids but {} encoding bytes",
                n,
                request.encoding.len()
            )));
        }
        if let Some(&bad) = request.glyph_ids.iter().find(|&&g| g >= num_glyphs) {
            return Err(Error::invalid(format!(
                "glyph {} not in font of {} glyphs",
                bad, num_glyphs
            )));
        }

        let zero_entries = request.encoding.iter().filter(|&&b| b == 0).count();
        if zero_entries > 1 {
            return Err(Error::invalid("more than one glyph mapped to byte 0"));
        }
        let slot_count = n - zero_entries + 1;
        if slot_count > MAX_SUBSET_GLYPHS {
            return Err(Error::invalid("256 glyphs requested without a .notdef entry"));
        }

        let mut glyphs = vec![0u16; slot_count];
        let mut caller_index = vec![None; slot_count];
        let pairs = request.glyph_ids.iter().zip(&request.encoding);
        for (index, (&glyph, &byte)) in pairs.enumerate() {
            let slot = byte as usize;
            if slot >= slot_count {
                return Err(Error::invalid(format!(
                    "encoding byte {} outside dense range 0..{}",
                    byte, slot_count
                )));
            }
            if caller_index[slot].is_some() {
                return Err(Error::invalid(format!("encoding byte {} used twice", byte)));
            }
            glyphs[slot] = glyph;
            caller_index[slot] = Some(index);
        }

        Ok(Self { glyphs, caller_index })
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Scatter per-slot values back into caller order.
    pub fn to_caller_order<T: Copy + Default>(&self, per_slot: &[T], caller_len: usize) -> Vec<T> {
        let mut out = vec![T::default(); caller_len];
        for (slot, index) in self.caller_index.iter().enumerate() {
            if let (Some(index), Some(value)) = (index, per_slot.get(slot)) {
                out[*index] = *value;
            }
        }
        out
    }
}

/// Outline format of a subset font program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubsetFontType {
    /// sfnt with `glyf` outlines (embed as TrueType / Type42)
    TrueType,
    /// bare CFF program (embed as Type1C)
    Cff,
}

/// Global font bounding box in thousandths of an em.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

/// Metadata for the caller's font dictionary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontSubsetInfo {
    pub font_type: SubsetFontType,
    pub ps_name: String,
    pub ascent: i32,
    /// depth below the baseline, positive
    pub descent: i32,
    pub bbox: BoundingBox,
    pub cap_height: i32,
    /// advance per requested glyph, in caller order
    pub widths: Vec<i32>,
}

/// A face that can emit subsets of itself.
pub trait SubsetOutlines {
    fn font_type(&self) -> SubsetFontType;

    /// Font program whose glyph `k` is source glyph `glyphs[k]`.
    fn build_subset(&self, glyphs: &[u16]) -> Result<Vec<u8>>;
}

impl SubsetOutlines for GlyfSource<'_> {
    fn font_type(&self) -> SubsetFontType {
        SubsetFontType::TrueType
    }

    fn build_subset(&self, glyphs: &[u16]) -> Result<Vec<u8>> {
        self.subset(glyphs)
    }
}

impl SubsetOutlines for CffFont<'_> {
    fn font_type(&self) -> SubsetFontType {
        SubsetFontType::Cff
    }

    fn build_subset(&self, glyphs: &[u16]) -> Result<Vec<u8>> {
        self.subset(glyphs)
    }
}

/// Pick the subset builder for a face by its outline tables.
pub fn open_subsettable<'a>(face: &SfntFace<'a>) -> Result<Box<dyn SubsetOutlines + 'a>> {
    match face.outline_kind() {
        OutlineKind::Cff => {
            let cff = face
                .table(tags::CFF)
                .ok_or_else(|| Error::MissingTable("CFF ".to_string()))?;
            Ok(Box::new(CffFont::parse(cff)?))
        },
        OutlineKind::TrueType => Ok(Box::new(GlyfSource::new(face)?)),
        OutlineKind::Unsupported => {
            let what = if face.has_table(tags::CFF2) {
                "CFF2 outlines"
            } else {
                "no glyf or CFF outlines"
            };
            Err(Error::UnsupportedFormat(what.to_string()))
        },
    }
}
