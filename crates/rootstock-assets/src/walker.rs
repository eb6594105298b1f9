use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::source::{AssetKind, AssetSource, join_virtual};

/// Leaves whose name carries this suffix encode a symlink instead of
/// file content.
pub const SYMLINK_SUFFIX: &str = ".symlink";

const SYMLINK_LINE_PREFIX: &str = "SYMLINK:";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorReport {
    /// Regular files materialized.
    pub copied: usize,
    /// Symlinks created from indicator files.
    pub links: usize,
    /// Leaves skipped because a non-empty file already existed.
    pub skipped: usize,
}

/// Recursively mirror the asset subtree at `asset_root` into
/// `target_root`.
///
/// Re-running is safe: regular files are only written where no
/// non-empty file exists, and indicator links are delete-then-recreate.
pub fn mirror(
    source: &dyn AssetSource,
    asset_root: &str,
    target_root: &Path,
) -> Result<MirrorReport> {
    let mut report = MirrorReport::default();
    visit(source, asset_root, target_root, &mut report)?;
    Ok(report)
}

fn visit(
    source: &dyn AssetSource,
    path: &str,
    target: &Path,
    report: &mut MirrorReport,
) -> Result<()> {
    match source.kind(path)? {
        AssetKind::Directory => {
            rootstock_fs::ensure_dir(target)?;
            for child in source.list(path)? {
                visit(source, &join_virtual(path, &child), &target.join(&child), report)?;
            }
            Ok(())
        }
        AssetKind::File => materialize_leaf(source, path, target, report),
    }
}

fn materialize_leaf(
    source: &dyn AssetSource,
    path: &str,
    target: &Path,
    report: &mut MirrorReport,
) -> Result<()> {
    if path.ends_with(SYMLINK_SUFFIX) {
        return materialize_indicator(source, path, target, report);
    }

    // Idempotent skip: never re-stamp a file a previous run (or a
    // package extraction) already produced.
    if fs::metadata(target).is_ok_and(|meta| meta.len() > 0) {
        report.skipped += 1;
        return Ok(());
    }

    if let Some(parent) = target.parent() {
        rootstock_fs::ensure_dir(parent)?;
    }

    let mut reader = source.open(path)?;
    let mut file = fs::File::create(target).map_err(|source| Error::WriteFailed {
        path: target.to_path_buf(),
        source,
    })?;
    std::io::copy(&mut reader, &mut file).map_err(|source| Error::WriteFailed {
        path: target.to_path_buf(),
        source,
    })?;
    drop(file);

    let mode = if target.to_string_lossy().contains("/bin/") {
        0o755
    } else {
        0o644
    };
    rootstock_fs::set_mode(target, mode)?;

    debug!(asset = path, target = %target.display(), "materialized asset");
    report.copied += 1;
    Ok(())
}

/// An indicator's sole content is one line `SYMLINK:<target-path>`; the
/// real link lands at the de-suffixed path and the indicator itself is
/// never materialized.
fn materialize_indicator(
    source: &dyn AssetSource,
    path: &str,
    target: &Path,
    report: &mut MirrorReport,
) -> Result<()> {
    let reader = BufReader::new(source.open(path)?);
    let first_line = reader
        .lines()
        .next()
        .transpose()
        .map_err(|source| Error::ReadFailed {
            path: path.to_string(),
            source,
        })?
        .unwrap_or_default();

    let Some(link_target) = first_line.strip_prefix(SYMLINK_LINE_PREFIX) else {
        return Err(Error::MalformedIndicator {
            path: path.to_string(),
        });
    };

    let link_name = target
        .to_string_lossy()
        .strip_suffix(SYMLINK_SUFFIX)
        .map(String::from)
        .ok_or_else(|| Error::MalformedIndicator {
            path: path.to_string(),
        })?;

    rootstock_fs::replace_symlink(link_target, Path::new(&link_name))?;
    debug!(link = %link_name, target = link_target, "created indicator symlink");
    report.links += 1;
    Ok(())
}
