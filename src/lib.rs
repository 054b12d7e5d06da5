// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::manual_find)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # printfont
//!
//! Font discovery, analysis and glyph subsetting for print and PDF export.
//!
//! ## Core Features
//!
//! - **Font Catalog**: register TrueType, OpenType and collection files, one
//!   id per face, with idempotent rescans
//! - **Analysis**: localized family names with aliases, style attributes from
//!   `OS/2`/`post`/`head`, vertical metrics with hhea/typo/win/bbox fallback
//! - **Family Classification**: coarse Roman/Swiss/Modern/Script buckets
//!   from the family name alone
//! - **Subsetting**: up to 256 glyphs re-encoded to single bytes, emitted as
//!   a TrueType sfnt or a bare CFF program, with per-glyph widths
//! - **Width Extraction**: advances for every glyph plus the Unicode map
//!
//! ## Quick Start
//!
//! ```ignore
//! use printfont::{CatalogConfig, FontManager, SubsetRequest};
//!
//! # fn main() -> printfont::Result<()> {
//! let mut manager = FontManager::new(CatalogConfig::new());
//! let ids = manager.add_font_file("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf");
//!
//! // glyphs 0, 36 and 68 become encoding bytes 0, 1 and 2
//! let request = SubsetRequest::new(vec![0, 36, 68], vec![0, 1, 2]);
//! let info = manager.create_font_subset(ids[0], "subset.ttf", &request)?;
//! println!("{} widths: {:?}", info.ps_name, info.widths);
//! # Ok(())
//! # }
//! ```

// Error handling
pub mod error;

// Configuration
pub mod config;

// Font file reading and subsetting
pub mod fonts;

// Font catalog
pub mod manager;

pub use config::{CatalogConfig, LanguageId};
pub use error::{Error, Result};
pub use fonts::{
    BoundingBox, FontFamily, FontItalic, FontPitch, FontSubsetInfo, FontWeight, FontWidth,
    SubsetFontType, SubsetRequest, TextEncoding,
};
pub use manager::{
    DirectoryId, FastFontInfo, FileFormatHint, FontId, FontInfo, FontManager, FontStub,
    GlyphWidths,
};
