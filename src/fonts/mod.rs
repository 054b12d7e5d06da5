//! Font file reading and subsetting.
//!
//! This module provides the sfnt table facade, name and cmap decoding,
//! style classification, and the TrueType and CFF subset builders.

pub mod cff_subset;
pub mod cmap;
pub mod family;
pub mod font_subsetter;
pub mod glyf_subset;
pub mod name_records;
pub mod sfnt_writer;
pub mod style;
pub mod truetype_parser;

pub use cmap::CharMap;
pub use family::match_family_name;
pub use font_subsetter::{
    BoundingBox, FontSubsetInfo, SlotPlan, SubsetFontType, SubsetRequest, MAX_SUBSET_GLYPHS,
};
pub use sfnt_writer::{SfntWriter, SFNT_VERSION_CFF, SFNT_VERSION_TRUETYPE};
pub use style::{FontFamily, FontItalic, FontPitch, FontWeight, FontWidth, TextEncoding};
pub use truetype_parser::{GlobalFontInfo, OutlineKind, SfntFace};
