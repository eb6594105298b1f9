//! The virtual, read-only asset namespace.
//!
//! The walker is mechanism; an [`AssetSource`] is the namespace it walks.
//! Node kind is reported explicitly rather than inferred from an empty
//! listing, so a genuinely empty directory is distinguishable from a
//! missing path or a zero-length file.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Directory,
    File,
}

/// A position-addressable, read-only tree of assets. Paths are
/// `/`-separated and relative to the source root; the empty string
/// addresses the root itself.
pub trait AssetSource: Send + Sync {
    fn kind(&self, path: &str) -> Result<AssetKind>;
    fn list(&self, path: &str) -> Result<Vec<String>>;
    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>>;
}

/// An [`AssetSource`] backed by a real directory.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }
}

impl AssetSource for DirSource {
    fn kind(&self, path: &str) -> Result<AssetKind> {
        let real = self.resolve(path);
        let meta = fs::metadata(&real).map_err(|_| Error::NotFound {
            path: path.to_string(),
        })?;
        if meta.is_dir() {
            Ok(AssetKind::Directory)
        } else {
            Ok(AssetKind::File)
        }
    }

    fn list(&self, path: &str) -> Result<Vec<String>> {
        let real = self.resolve(path);
        let entries = fs::read_dir(&real).map_err(|source| Error::ReadFailed {
            path: path.to_string(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| Error::ReadFailed {
                path: path.to_string(),
                source,
            })?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        let real = self.resolve(path);
        let file = fs::File::open(&real).map_err(|source| Error::ReadFailed {
            path: path.to_string(),
            source,
        })?;
        Ok(Box::new(file))
    }
}

/// Join a virtual asset path with a child name.
pub(crate) fn join_virtual(path: &str, child: &str) -> String {
    if path.is_empty() {
        child.to_string()
    } else {
        format!("{path}/{child}")
    }
}
