//! Atomic filesystem primitives for prefix-tree materialization.
//!
//! Everything here is built for re-entrancy: a previous install attempt
//! may have crashed mid-write, so each primitive must leave the tree in
//! a state a retry can build on. Writes go through a temp sibling plus
//! rename, symlinks are delete-then-recreate, and directory creation
//! tolerates pre-existing directories.

mod error;

pub use error::{Error, Result};

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

const DEFAULT_PERMISSIONS: u32 = 0o644;

#[derive(Clone, Copy, Debug)]
pub struct AtomicWriteOptions {
    permissions: u32,
    prefix: &'static str,
    suffix: &'static str,
}

impl Default for AtomicWriteOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomicWriteOptions {
    pub fn new() -> Self {
        Self {
            permissions: DEFAULT_PERMISSIONS,
            prefix: ".",
            suffix: ".tmp",
        }
    }

    pub fn permissions(mut self, permissions: u32) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn prefix(mut self, prefix: &'static str) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn suffix(mut self, suffix: &'static str) -> Self {
        self.suffix = suffix;
        self
    }
}

/// Write `content` to `path` so that a concurrent reader observes either
/// the complete previous content or the complete new content.
///
/// The content lands in a temp sibling first (same directory, so the
/// rename stays on one filesystem), gets its permissions set, and is then
/// renamed over the destination.
pub fn atomic_write(
    path: impl AsRef<Path>,
    content: &[u8],
    options: AtomicWriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or(Path::new(""));

    let file_name = path.file_name().unwrap_or_default().to_string_lossy();
    let tmp_name = format!("{}{}{}", options.prefix, file_name, options.suffix);
    let tmp_path = parent.join(tmp_name);

    fs::write(&tmp_path, content).map_err(|source| Error::Write {
        path: tmp_path.clone(),
        source,
    })?;
    fs::set_permissions(&tmp_path, fs::Permissions::from_mode(options.permissions)).map_err(
        |source| Error::Write {
            path: tmp_path.clone(),
            source,
        },
    )?;
    fs::rename(&tmp_path, path).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Create a symlink at `link` pointing at `target`, replacing whatever
/// currently occupies `link` (file, link, or directory).
///
/// Removing first and recreating makes the operation idempotent: a stale
/// link from an earlier run never shadows the new target.
pub fn replace_symlink(target: impl AsRef<Path>, link: impl AsRef<Path>) -> Result<()> {
    let target = target.as_ref();
    let link = link.as_ref();

    remove_existing(link)?;
    if let Some(parent) = link.parent() {
        ensure_dir(parent)?;
    }
    std::os::unix::fs::symlink(target, link).map_err(|source| Error::Symlink {
        target: target.to_path_buf(),
        link: link.to_path_buf(),
        source,
    })
}

/// Create `path` and all missing ancestors. A pre-existing directory is
/// not an error.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        fs::create_dir_all(path).map_err(|source| Error::CreateDir {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Recursively delete `path`. Missing paths are not an error, so a wipe
/// retried after a partial wipe still succeeds.
pub fn remove_tree(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => Err(err),
    }
    .map_err(|source| Error::Remove {
        path: path.to_path_buf(),
        source,
    })
}

/// Set unix permission bits on `path`.
pub fn set_mode(path: impl AsRef<Path>, mode: u32) -> Result<()> {
    let path = path.as_ref();
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn remove_existing(path: &Path) -> Result<()> {
    // symlink_metadata so a dangling link is still seen and removed
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => Err(err),
    }
    .map_err(|source| Error::Remove {
        path: path.to_path_buf(),
        source,
    })
}
