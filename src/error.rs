//! Error types for font analysis and subsetting.
//!
//! Catalog population treats unreadable or unsupported files as routine and
//! never surfaces them through this type; it is returned by the operations
//! that have a caller waiting on a concrete result (subsetting, width
//! extraction, direct file analysis).

use crate::manager::FontId;

/// Result type alias for font operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading or subsetting fonts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The font container could not be parsed
    #[error("Failed to parse font: {0}")]
    FontParse(String),

    /// The file is not a recognized sfnt variant
    #[error("Unsupported font format: {0}")]
    UnsupportedFormat(String),

    /// A table required for the requested operation is absent
    #[error("Required font table is missing: {0}")]
    MissingTable(String),

    /// No font with this id is registered
    #[error("Unknown font id: {0}")]
    UnknownFont(FontId),

    /// Malformed request (subset limits, encoding collisions, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// CFF program could not be parsed or rebuilt
    #[error("CFF error: {0}")]
    Cff(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
