//! Configuration for font discovery and analysis.

use std::path::PathBuf;

/// Minimum plausible size of a single face inside a collection file.
///
/// The smallest valid sfnt face is a little over half a kilobyte, so a
/// collection header claiming more faces than `file_size / 528` is lying.
pub const DEFAULT_MIN_BYTES_PER_FACE: u64 = 528;

/// Language used to rank localized name records.
///
/// Windows records carry an LCID, Macintosh records a Mac language code;
/// both are kept so either platform can score an exact match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageId {
    /// Windows locale id (e.g. 0x0409 for en-US)
    pub windows_lcid: u16,
    /// Macintosh language code (e.g. 0 for English)
    pub mac_language: u16,
}

impl LanguageId {
    /// US English, the default system language.
    pub const ENGLISH_US: LanguageId = LanguageId {
        windows_lcid: 0x0409,
        mac_language: 0,
    };

    /// Map a BCP-47 style tag ("de", "pt-BR", "zh_TW") to platform ids.
    ///
    /// Returns `None` for languages outside the built-in table.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let normalized = tag.replace('_', "-").to_ascii_lowercase();
        let mut parts = normalized.split('-');
        let primary = parts.next().unwrap_or_default();
        let region = parts.next().unwrap_or_default();

        let (windows_lcid, mac_language) = match (primary, region) {
            ("en", "gb") => (0x0809, 0),
            ("en", _) => (0x0409, 0),
            ("fr", _) => (0x040C, 1),
            ("de", _) => (0x0407, 2),
            ("it", _) => (0x0410, 3),
            ("nl", _) => (0x0413, 4),
            ("sv", _) => (0x041D, 5),
            ("es", _) => (0x0C0A, 6),
            ("da", _) => (0x0406, 7),
            ("pt", "br") => (0x0416, 8),
            ("pt", _) => (0x0816, 8),
            ("nb" | "no" | "nn", _) => (0x0414, 9),
            ("he", _) => (0x040D, 10),
            ("ja", _) => (0x0411, 11),
            ("ar", _) => (0x0401, 12),
            ("fi", _) => (0x040B, 13),
            ("el", _) => (0x0408, 14),
            ("tr", _) => (0x041F, 17),
            ("zh", "tw" | "hk" | "hant") => (0x0404, 19),
            ("zh", _) => (0x0804, 33),
            ("ko", _) => (0x0412, 23),
            ("pl", _) => (0x0415, 25),
            ("hu", _) => (0x040E, 26),
            ("ru", _) => (0x0419, 32),
            ("cs", _) => (0x0405, 38),
            _ => return None,
        };

        Some(LanguageId {
            windows_lcid,
            mac_language,
        })
    }
}

impl Default for LanguageId {
    fn default() -> Self {
        Self::ENGLISH_US
    }
}

/// Font catalog configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Language used to pick among localized family names.
    pub language: LanguageId,

    /// Directories scanned by `FontManager::initialize`.
    pub font_paths: Vec<PathBuf>,

    /// File extensions accepted for analysis (lower case, without dot).
    pub extensions: Vec<String>,

    /// Face-count sanity bound for collection files.
    pub min_bytes_per_face: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            language: LanguageId::default(),
            font_paths: Vec::new(),
            extensions: ["ttf", "ttc", "tte", "otf"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_bytes_per_face: DEFAULT_MIN_BYTES_PER_FACE,
        }
    }

    /// Set the system language used for name ranking.
    pub fn with_language(mut self, language: LanguageId) -> Self {
        self.language = language;
        self
    }

    /// Add a directory to scan on `initialize`.
    pub fn with_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_paths.push(path.into());
        self
    }

    /// Replace the accepted extension list.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Override the collection face-count bound.
    pub fn with_min_bytes_per_face(mut self, bytes: u64) -> Self {
        self.min_bytes_per_face = bytes.max(1);
        self
    }

    /// Whether a file name carries one of the accepted extensions.
    pub fn accepts_file_name(&self, file_name: &str) -> bool {
        match file_name.rsplit_once('.') {
            Some((_, ext)) => self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}
