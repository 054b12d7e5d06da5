//! Directory interning.
//!
//! Fonts record the directory they live in as a small integer atom. The
//! table is append-only, so an atom stays valid for the life of the catalog.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use serde::Serialize;

/// Atom for an interned font directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DirectoryId(pub u32);

impl fmt::Display for DirectoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Append-only set of font directories indexed by atom.
#[derive(Debug, Clone, Default)]
pub struct DirectoryTable {
    dirs: IndexSet<PathBuf>,
}

impl DirectoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atom for `dir`, adding it on first sight.
    pub fn intern(&mut self, dir: &Path) -> DirectoryId {
        let (index, _) = self.dirs.insert_full(dir.to_path_buf());
        DirectoryId(index as u32)
    }

    /// Atom for `dir` if it was interned before.
    pub fn find(&self, dir: &Path) -> Option<DirectoryId> {
        self.dirs.get_index_of(dir).map(|index| DirectoryId(index as u32))
    }

    pub fn get(&self, id: DirectoryId) -> Option<&Path> {
        self.dirs.get_index(id.0 as usize).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}
