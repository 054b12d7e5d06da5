//! Catalog records and the views handed out to callers.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use super::directory::DirectoryId;
use crate::fonts::{
    BoundingBox, FontFamily, FontItalic, FontPitch, FontWeight, FontWidth, TextEncoding,
};

/// Catalog handle for one registered face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FontId(pub u32);

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Container format forced by the caller instead of the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormatHint {
    /// Decide by extension
    #[default]
    Unknown,
    TrueType,
    Cff,
}

impl FileFormatHint {
    /// Parse a format name as reported by a directory walker.
    pub fn from_name(name: &str) -> Self {
        match name {
            "TrueType" => FileFormatHint::TrueType,
            "CFF" => FileFormatHint::Cff,
            _ => FileFormatHint::Unknown,
        }
    }

    pub(crate) fn is_sfnt(self) -> bool {
        !matches!(self, FileFormatHint::Unknown)
    }
}

/// A face announced by an external directory walker.
///
/// Registered without opening the file; metrics are filled in the first
/// time a caller needs them.
#[derive(Debug, Clone, Default)]
pub struct FontStub {
    pub path: PathBuf,
    pub collection_entry: i32,
    pub variation_entry: i32,
    pub family_name: String,
    pub style_name: String,
}

impl FontStub {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_face(mut self, collection_entry: i32, variation_entry: i32) -> Self {
        self.collection_entry = collection_entry;
        self.variation_entry = variation_entry;
        self
    }

    pub fn with_names(mut self, family: impl Into<String>, style: impl Into<String>) -> Self {
        self.family_name = family.into();
        self.style_name = style.into();
        self
    }
}

/// Everything the catalog knows about one face.
///
/// Metric fields are in thousandths of an em and only meaningful once
/// `analyzed` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintFont {
    pub directory: DirectoryId,
    pub file_name: String,
    pub collection_entry: i32,
    pub variation_entry: i32,

    pub family_name: String,
    pub style_name: String,
    pub ps_name: String,
    pub aliases: BTreeSet<String>,

    pub family: FontFamily,
    pub italic: FontItalic,
    pub width: FontWidth,
    pub weight: FontWeight,
    pub pitch: FontPitch,
    pub encoding: TextEncoding,

    pub ascend: i32,
    /// positive depth below the baseline
    pub descend: i32,
    pub leading: i32,
    pub bbox: BoundingBox,

    /// Set once the file has been parsed for this record, successfully or not
    pub analyzed: bool,
}

impl PrintFont {
    pub(crate) fn new(directory: DirectoryId, file_name: impl Into<String>) -> Self {
        Self {
            directory,
            file_name: file_name.into(),
            collection_entry: 0,
            variation_entry: 0,
            family_name: String::new(),
            style_name: String::new(),
            ps_name: String::new(),
            aliases: BTreeSet::new(),
            family: FontFamily::Unknown,
            italic: FontItalic::default(),
            width: FontWidth::default(),
            weight: FontWeight::default(),
            pitch: FontPitch::default(),
            encoding: TextEncoding::default(),
            ascend: 0,
            descend: 0,
            leading: 0,
            bbox: BoundingBox::default(),
            analyzed: false,
        }
    }

    /// Face index inside a collection, never negative.
    pub fn face_number(&self) -> u32 {
        self.collection_entry.max(0) as u32
    }

    /// Named-instance index of a variable font, never negative.
    pub fn face_variation(&self) -> u32 {
        self.variation_entry.max(0) as u32
    }

    pub(crate) fn fast_info(&self, id: FontId) -> FastFontInfo {
        FastFontInfo {
            id,
            family_name: self.family_name.clone(),
            style_name: self.style_name.clone(),
            family: self.family,
            italic: self.italic,
            width: self.width,
            weight: self.weight,
            pitch: self.pitch,
            encoding: self.encoding,
            aliases: self.aliases.iter().cloned().collect(),
        }
    }
}

/// Metadata available without touching the font file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FastFontInfo {
    pub id: FontId,
    pub family_name: String,
    pub style_name: String,
    pub family: FontFamily,
    pub italic: FontItalic,
    pub width: FontWidth,
    pub weight: FontWeight,
    pub pitch: FontPitch,
    pub encoding: TextEncoding,
    pub aliases: Vec<String>,
}

/// Full metadata, including vertical metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontInfo {
    #[serde(flatten)]
    pub fast: FastFontInfo,
    pub ps_name: String,
    pub ascend: i32,
    pub descend: i32,
    pub leading: i32,
    pub bbox: BoundingBox,
}
