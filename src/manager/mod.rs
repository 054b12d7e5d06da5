//! Font catalog.
//!
//! `FontManager` owns every discovered face, keyed by a `FontId` handed out
//! from a counter starting at 1. Faces found by [`FontManager::add_font_file`]
//! are analyzed on registration; faces announced through
//! [`FontManager::add_font_stub`] are analyzed the first time a query needs
//! their metrics.
//!
//! Catalog population never fails loudly: unreadable, unsupported or
//! corrupt files simply produce no fonts. Subsetting and width extraction
//! return a [`Result`](crate::error::Result) so callers can see why they
//! got nothing.
//!
//! # Example
//!
//! ```ignore
//! use printfont::{CatalogConfig, FontManager, SubsetRequest};
//!
//! let config = CatalogConfig::new().with_font_path("/usr/share/fonts/truetype");
//! let mut manager = FontManager::new(config);
//! manager.initialize();
//! let id = manager.font_list()[0];
//! let request = SubsetRequest::new(vec![0, 36], vec![0, 1]);
//! let info = manager.create_font_subset(id, "subset.ttf", &request)?;
//! ```

mod analyze;
mod directory;
mod print_font;

pub use directory::{DirectoryId, DirectoryTable};
pub use print_font::{FastFontInfo, FileFormatHint, FontId, FontInfo, FontStub, PrintFont};

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::NamedTempFile;

use crate::config::CatalogConfig;
use crate::error::{Error, Result};
use crate::fonts::font_subsetter::open_subsettable;
use crate::fonts::truetype_parser::count_faces_in_collection;
use crate::fonts::{
    match_family_name, BoundingBox, FontSubsetInfo, SfntFace, SlotPlan, SubsetRequest,
};

/// Advance widths of every glyph plus the Unicode coverage of a face.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphWidths {
    /// Advance per glyph id, in thousandths of an em
    pub widths: Vec<i32>,
    /// Every code point the cmap maps, with its glyph
    pub unicode: BTreeMap<char, u16>,
}

/// Number of faces worth trying in a collection of `file_len` bytes.
pub(crate) fn clamp_face_count(claimed: u32, file_len: u64, min_bytes_per_face: u64) -> u32 {
    let limit = file_len / min_bytes_per_face.max(1);
    u64::from(claimed).min(limit) as u32
}

/// Catalog of font faces found on disk.
#[derive(Debug)]
pub struct FontManager {
    config: CatalogConfig,
    next_font_id: u32,
    fonts: BTreeMap<FontId, PrintFont>,
    directories: DirectoryTable,
    /// file name -> ids of every face with that name, in any directory
    file_index: HashMap<String, BTreeSet<FontId>>,
}

impl Default for FontManager {
    fn default() -> Self {
        Self::new(CatalogConfig::default())
    }
}

impl FontManager {
    /// Create an empty catalog.
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            config,
            next_font_id: 1,
            fonts: BTreeMap::new(),
            directories: DirectoryTable::new(),
            file_index: HashMap::new(),
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Scan every configured font directory (not recursively).
    ///
    /// Safe to call again after the directories change: files seen before
    /// keep their ids. Returns the catalog size afterwards.
    pub fn initialize(&mut self) -> usize {
        for dir in self.config.font_paths.clone() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    debug!("Skipping font directory {}: {}", dir.display(), e);
                    continue;
                },
            };

            let mut files: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.is_file())
                .collect();
            files.sort();

            for file in files {
                self.add_font_file(&file);
            }
        }

        info!("Font catalog holds {} fonts", self.fonts.len());
        self.fonts.len()
    }

    /// Register every face of a font file, deciding the format by extension.
    ///
    /// Returns the ids of all faces of the file, whether they were registered
    /// now or by an earlier call. Files that cannot be read or parsed yield
    /// an empty list.
    pub fn add_font_file(&mut self, path: impl AsRef<Path>) -> Vec<FontId> {
        self.add_font_file_with_format(path, FileFormatHint::Unknown)
    }

    /// Like [`add_font_file`](Self::add_font_file), trusting `hint` over the
    /// file extension.
    pub fn add_font_file_with_format(
        &mut self,
        path: impl AsRef<Path>,
        hint: FileFormatHint,
    ) -> Vec<FontId> {
        let path = path.as_ref();
        let Some((dir, file_name)) = split_font_path(path) else {
            debug!("Not a font file path: {}", path.display());
            return Vec::new();
        };

        let directory = self.directories.intern(&dir);
        let existing = self.find_font_file_ids(directory, &file_name);
        if !existing.is_empty() {
            return existing;
        }

        if !hint.is_sfnt() && !self.config.accepts_file_name(&file_name) {
            debug!("Ignoring {}: not an sfnt font extension", path.display());
            return Vec::new();
        }

        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                debug!("Cannot read font file {}: {}", path.display(), e);
                return Vec::new();
            },
        };

        let faces = self.analyze_font_file(directory, &file_name, &data);
        if faces.is_empty() {
            warn!("No usable fonts in {}", path.display());
        }
        faces.into_iter().map(|font| self.register(font)).collect()
    }

    /// Register a face described by a directory walker without reading it.
    ///
    /// A face already known under the same file, collection entry and
    /// variation keeps its id.
    pub fn add_font_stub(&mut self, stub: FontStub) -> Option<FontId> {
        let (dir, file_name) = split_font_path(&stub.path)?;
        let directory = self.directories.intern(&dir);
        if let Some(id) = self.find_font_file_id(
            directory,
            &file_name,
            stub.collection_entry,
            stub.variation_entry,
        ) {
            return Some(id);
        }

        let mut font = PrintFont::new(directory, file_name);
        font.collection_entry = stub.collection_entry;
        font.variation_entry = stub.variation_entry;
        font.family = match_family_name(&stub.family_name);
        font.family_name = stub.family_name;
        font.style_name = stub.style_name;
        Some(self.register(font))
    }

    /// Parse every face of a file into fresh, unregistered records.
    fn analyze_font_file(
        &self,
        directory: DirectoryId,
        file_name: &str,
        data: &[u8],
    ) -> Vec<PrintFont> {
        let face_count = match count_faces_in_collection(data) {
            Some(claimed) => {
                let count =
                    clamp_face_count(claimed, data.len() as u64, self.config.min_bytes_per_face);
                if count < claimed {
                    warn!(
                        "{} claims {} faces but {} bytes hold at most {}",
                        file_name,
                        claimed,
                        data.len(),
                        count
                    );
                }
                debug!("{} is a collection of {} faces", file_name, count);
                count
            },
            None => 1,
        };

        (0..face_count)
            .filter_map(|index| {
                let face = match SfntFace::parse(data, index) {
                    Ok(face) => face,
                    Err(e) => {
                        debug!("Could not open face {} of {}: {}", index, file_name, e);
                        return None;
                    },
                };
                let mut font = PrintFont::new(directory, file_name);
                font.collection_entry = index as i32;
                analyze::analyze_face(&mut font, &face, self.config.language);
                Some(font)
            })
            .collect()
    }

    fn register(&mut self, font: PrintFont) -> FontId {
        let id = FontId(self.next_font_id);
        self.next_font_id += 1;
        self.file_index
            .entry(font.file_name.clone())
            .or_default()
            .insert(id);
        debug!("Registered font {} as {} ({})", id, font.family_name, font.file_name);
        self.fonts.insert(id, font);
        id
    }

    /// Ids of all faces of `file_name` in `directory`. Never reads the file.
    pub fn find_font_file_ids(&self, directory: DirectoryId, file_name: &str) -> Vec<FontId> {
        let Some(ids) = self.file_index.get(file_name) else {
            return Vec::new();
        };
        ids.iter()
            .copied()
            .filter(|id| self.fonts.get(id).is_some_and(|font| font.directory == directory))
            .collect()
    }

    /// Id of one specific face, if registered.
    pub fn find_font_file_id(
        &self,
        directory: DirectoryId,
        file_name: &str,
        collection_entry: i32,
        variation_entry: i32,
    ) -> Option<FontId> {
        self.find_font_file_ids(directory, file_name)
            .into_iter()
            .find(|id| {
                self.fonts.get(id).is_some_and(|font| {
                    font.collection_entry == collection_entry
                        && font.variation_entry == variation_entry
                })
            })
    }

    /// All registered ids in ascending order.
    pub fn font_list(&self) -> Vec<FontId> {
        self.fonts.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// The record of a font as it currently stands, without analysis.
    pub fn font(&self, id: FontId) -> Option<&PrintFont> {
        self.fonts.get(&id)
    }

    pub fn directory(&self, atom: DirectoryId) -> Option<&Path> {
        self.directories.get(atom)
    }

    /// Atom of an already interned directory.
    pub fn directory_atom(&self, dir: impl AsRef<Path>) -> Option<DirectoryId> {
        self.directories.find(&normalize_dir(dir.as_ref()))
    }

    /// Full path of the file holding a font.
    pub fn font_file_path(&self, id: FontId) -> Option<PathBuf> {
        let font = self.fonts.get(&id)?;
        let dir = self.directories.get(font.directory)?;
        Some(dir.join(&font.file_name))
    }

    pub fn font_aliases(&self, id: FontId) -> Option<Vec<String>> {
        self.fonts
            .get(&id)
            .map(|font| font.aliases.iter().cloned().collect())
    }

    /// Cached metadata; never touches the file.
    pub fn fast_info(&self, id: FontId) -> Option<FastFontInfo> {
        self.fonts.get(&id).map(|font| font.fast_info(id))
    }

    /// Full metadata, analyzing the file first if needed.
    pub fn font_info(&mut self, id: FontId) -> Option<FontInfo> {
        let font = self.analyzed_font(id)?;
        Some(FontInfo {
            fast: font.fast_info(id),
            ps_name: font.ps_name.clone(),
            ascend: font.ascend,
            descend: font.descend,
            leading: font.leading,
            bbox: font.bbox,
        })
    }

    pub fn font_bounding_box(&mut self, id: FontId) -> Option<BoundingBox> {
        self.analyzed_font(id).map(|font| font.bbox)
    }

    pub fn ps_name(&mut self, id: FontId) -> Option<String> {
        self.analyzed_font(id).map(|font| font.ps_name.clone())
    }

    pub fn font_ascend(&mut self, id: FontId) -> Option<i32> {
        self.analyzed_font(id).map(|font| font.ascend)
    }

    /// Depth below the baseline, positive.
    pub fn font_descend(&mut self, id: FontId) -> Option<i32> {
        self.analyzed_font(id).map(|font| font.descend)
    }

    pub fn font_face_number(&self, id: FontId) -> Option<u32> {
        self.fonts.get(&id).map(PrintFont::face_number)
    }

    pub fn font_face_variation(&self, id: FontId) -> Option<u32> {
        self.fonts.get(&id).map(PrintFont::face_variation)
    }

    /// The record for `id`, analyzed at most once over its lifetime.
    fn analyzed_font(&mut self, id: FontId) -> Option<&PrintFont> {
        let path = self.font_file_path(id)?;
        let language = self.config.language;
        let font = self.fonts.get_mut(&id)?;

        if !font.analyzed {
            let result = fs::read(&path).map_err(Error::from).and_then(|data| {
                let face = SfntFace::parse(&data, font.face_number())?;
                analyze::analyze_face(font, &face, language);
                Ok(())
            });
            if let Err(e) = result {
                warn!("Could not analyze {}: {}", path.display(), e);
            }
            font.analyzed = true;
        }

        Some(&*font)
    }

    /// Build a subset font in memory.
    ///
    /// Returns the font program (an sfnt for `glyf` sources, a bare CFF
    /// program for CFF sources) and the metadata a PDF font dictionary
    /// needs. Widths are in the caller's request order.
    pub fn build_font_subset(
        &mut self,
        id: FontId,
        request: &SubsetRequest,
    ) -> Result<(Vec<u8>, FontSubsetInfo)> {
        let path = self.font_file_path(id).ok_or(Error::UnknownFont(id))?;
        let face_number = self.font_face_number(id).unwrap_or(0);

        let data = fs::read(&path)?;
        let face = SfntFace::parse(&data, face_number)?;
        let plan = SlotPlan::from_request(request, face.glyph_count())?;

        let slot_widths = face
            .simple_glyph_metrics(&plan.glyphs, request.vertical)
            .ok_or_else(|| Error::MissingTable("hmtx".to_string()))?;
        let widths = plan.to_caller_order(&slot_widths, request.glyph_ids.len());

        let outlines = open_subsettable(&face)?;
        let program = outlines.build_subset(&plan.glyphs)?;

        let font = self.analyzed_font(id).ok_or(Error::UnknownFont(id))?;
        let info = FontSubsetInfo {
            font_type: outlines.font_type(),
            ps_name: font.ps_name.clone(),
            ascent: font.ascend,
            descent: font.descend,
            bbox: font.bbox,
            cap_height: font.bbox.y_max,
            widths,
        };

        debug!(
            "Subset of {} with {} glyphs: {:?}, {} bytes",
            path.display(),
            plan.len(),
            info.font_type,
            program.len()
        );
        Ok((program, info))
    }

    /// Build a subset and write it to `out_path`.
    ///
    /// The file is written next to its destination and renamed into place,
    /// so a failure leaves no partial font behind.
    pub fn create_font_subset(
        &mut self,
        id: FontId,
        out_path: impl AsRef<Path>,
        request: &SubsetRequest,
    ) -> Result<FontSubsetInfo> {
        let (program, info) = self.build_font_subset(id, request)?;

        let out_path = out_path.as_ref();
        let parent = match out_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(parent)?;
        file.write_all(&program)?;
        file.persist(out_path).map_err(|e| e.error)?;

        Ok(info)
    }

    /// Advance width of every glyph and the Unicode map of a font.
    pub fn glyph_widths(&self, id: FontId, vertical: bool) -> Result<GlyphWidths> {
        let path = self.font_file_path(id).ok_or(Error::UnknownFont(id))?;
        let face_number = self.font_face_number(id).unwrap_or(0);
        let data = fs::read(&path)?;
        let face = SfntFace::parse(&data, face_number)?;

        let glyph_ids: Vec<u16> = (0..face.glyph_count()).collect();
        let widths = face
            .simple_glyph_metrics(&glyph_ids, vertical)
            .unwrap_or_else(|| {
                warn!("No glyph metrics in {}", path.display());
                vec![0; glyph_ids.len()]
            });

        let mut unicode = BTreeMap::new();
        if let Some(char_map) = face.char_map() {
            let mut next = char_map.first_char();
            while let Some(code) = next {
                if let Some(c) = char::from_u32(code) {
                    unicode.insert(c, char_map.glyph_index(code));
                }
                let after = char_map.next_char_after(code);
                next = (after != code).then_some(after);
            }
        }

        Ok(GlyphWidths { widths, unicode })
    }
}

/// Canonical form of a font directory, so `a/../fonts` and `fonts` share
/// an atom.
fn normalize_dir(dir: &Path) -> PathBuf {
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf())
}

/// `(directory, file name)` of a font path.
fn split_font_path(path: &Path) -> Option<(PathBuf, String)> {
    let file_name = path.file_name()?.to_str()?.to_string();
    let dir = normalize_dir(path.parent().unwrap_or(Path::new(".")));
    Some((dir, file_name))
}
