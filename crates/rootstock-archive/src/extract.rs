use std::fs;
use std::io::Read;
use std::os::unix::fs::PermissionsExt;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::{Error, Result};

/// Extraction results.
#[derive(Debug, Clone, Copy, Default)]
pub struct Extracted {
    pub entry_count: usize,
    pub total_bytes: u64,
}

/// Decompress a gzip-framed tar stream and extract every entry under
/// `target_dir`.
///
/// Directory entries become directories (ancestors included); file
/// entries truncate whatever was there before. An entry is marked
/// executable (0755) when its name starts with `bin/` or its recorded
/// mode carries the owner-execute bit; everything else gets 0644.
pub fn extract_tar_gz<R: Read>(reader: R, target_dir: &Path) -> Result<Extracted> {
    let decoder = GzDecoder::new(reader);
    let mut archive = tar::Archive::new(decoder);

    let mut extracted = Extracted::default();

    for entry in archive.entries().map_err(|_| Error::Corrupted)? {
        let mut entry = entry.map_err(|_| Error::Corrupted)?;
        let raw_path = entry.path().map_err(|_| Error::InvalidPath)?.into_owned();
        let entry_path = sanitize_entry_path(&raw_path)?;

        let header = entry.header();
        let size = header.size().unwrap_or(0);
        let mode = header.mode().ok();

        let target = target_dir.join(&entry_path);
        if header.entry_type().is_dir() {
            ensure_directory(&target)?;
        } else {
            write_file(&mut entry, &target)?;
            set_file_mode(&target, entry_mode(&entry_path, mode))?;
            extracted.total_bytes += size;
        }
        extracted.entry_count += 1;
    }

    Ok(extracted)
}

/// Entry names come from untrusted archive bytes; only plain relative
/// components may reach the filesystem. Absolute paths, `..`, and empty
/// names are rejected so no entry can land outside `target_dir`.
fn sanitize_entry_path(raw: &Path) -> Result<PathBuf> {
    let mut clean = PathBuf::new();
    for component in raw.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return Err(Error::InvalidPath),
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(Error::InvalidPath);
    }
    Ok(clean)
}

fn entry_mode(entry_path: &Path, mode: Option<u32>) -> u32 {
    let owner_exec = mode.is_some_and(|m| m & 0o100 != 0);
    if entry_path.starts_with("bin") || owner_exec {
        0o755
    } else {
        0o644
    }
}

fn write_file(reader: &mut impl Read, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        ensure_directory(parent)?;
    }
    let mut file = fs::File::create(target).map_err(|source| Error::ExtractionFailed {
        path: target.to_path_buf(),
        source,
    })?;
    std::io::copy(reader, &mut file).map_err(|source| Error::ExtractionFailed {
        path: target.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|source| Error::DirectoryCreationFailed {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn set_file_mode(path: &Path, mode: u32) -> Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|source| {
        Error::ExtractionFailed {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    fn fixture(entries: &[(&str, &[u8], u32)]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for (name, data, mode) in entries {
            let mut header = tar::Header::new_gnu();
            if name.ends_with('/') {
                header.set_entry_type(tar::EntryType::Directory);
                header.set_size(0);
                header.set_mode(0o755);
                header.set_cksum();
                builder.append_data(&mut header, *name, &b""[..]).unwrap();
            } else {
                header.set_size(data.len() as u64);
                header.set_mode(*mode);
                header.set_cksum();
                builder.append_data(&mut header, *name, *data).unwrap();
            }
        }

        builder.into_inner().unwrap().finish().unwrap()
    }

    fn mode_of(path: &Path) -> u32 {
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[test]
    fn test_extracts_files_and_directories_in_order() {
        let archive = fixture(&[
            ("share/", b"", 0o755),
            ("share/doc.txt", b"docs", 0o644),
            ("bin/tool", b"#!/bin/sh\n", 0o644),
        ]);
        let dir = tempfile::tempdir().unwrap();

        let report = extract_tar_gz(&archive[..], dir.path()).unwrap();

        assert_eq!(report.entry_count, 3);
        assert_eq!(report.total_bytes, 14);
        assert_eq!(fs::read(dir.path().join("share/doc.txt")).unwrap(), b"docs");
        assert!(dir.path().join("bin/tool").is_file());
    }

    #[test]
    fn test_bin_prefix_forces_executable() {
        let archive = fixture(&[("bin/run", b"x", 0o644)]);
        let dir = tempfile::tempdir().unwrap();

        extract_tar_gz(&archive[..], dir.path()).unwrap();

        assert_eq!(mode_of(&dir.path().join("bin/run")), 0o755);
    }

    #[test]
    fn test_owner_exec_mode_bit_forces_executable() {
        let archive = fixture(&[("libexec/helper", b"x", 0o744)]);
        let dir = tempfile::tempdir().unwrap();

        extract_tar_gz(&archive[..], dir.path()).unwrap();

        assert_eq!(mode_of(&dir.path().join("libexec/helper")), 0o755);
    }

    #[test]
    fn test_plain_file_gets_readonly_mode() {
        let archive = fixture(&[("etc/conf", b"k=v", 0o600)]);
        let dir = tempfile::tempdir().unwrap();

        extract_tar_gz(&archive[..], dir.path()).unwrap();

        assert_eq!(mode_of(&dir.path().join("etc/conf")), 0o644);
    }

    #[test]
    fn test_missing_parent_directories_are_created() {
        // no explicit directory entry for deep/nested/
        let archive = fixture(&[("deep/nested/file", b"v", 0o644)]);
        let dir = tempfile::tempdir().unwrap();

        extract_tar_gz(&archive[..], dir.path()).unwrap();

        assert_eq!(fs::read(dir.path().join("deep/nested/file")).unwrap(), b"v");
    }

    #[test]
    fn test_reextraction_truncates_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("etc")).unwrap();
        fs::write(dir.path().join("etc/conf"), b"a much longer previous value").unwrap();

        let archive = fixture(&[("etc/conf", b"v2", 0o644)]);
        extract_tar_gz(&archive[..], dir.path()).unwrap();

        assert_eq!(fs::read(dir.path().join("etc/conf")).unwrap(), b"v2");
    }

    // Bypasses tar::Builder's own name validation so hostile entry
    // names reach the extractor.
    fn raw_name_fixture(name: &[u8], data: &[u8]) -> Vec<u8> {
        let mut header = tar::Header::new_gnu();
        header.as_gnu_mut().unwrap().name[..name.len()].copy_from_slice(name);
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();

        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder.append(&header, data).unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_parent_traversal_entry_is_rejected() {
        let archive = raw_name_fixture(b"../escaped.txt", b"x");
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target");
        fs::create_dir(&target).unwrap();

        let err = extract_tar_gz(&archive[..], &target).unwrap_err();
        assert!(matches!(err, Error::InvalidPath));
        assert!(!dir.path().join("escaped.txt").exists());
    }

    #[test]
    fn test_nested_traversal_entry_is_rejected() {
        let archive = raw_name_fixture(b"opt/../../escaped.txt", b"x");
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target");
        fs::create_dir(&target).unwrap();

        let err = extract_tar_gz(&archive[..], &target).unwrap_err();
        assert!(matches!(err, Error::InvalidPath));
        assert!(!dir.path().join("escaped.txt").exists());
    }

    #[test]
    fn test_absolute_entry_is_rejected() {
        let archive = raw_name_fixture(b"/etc/shadow", b"x");
        let dir = tempfile::tempdir().unwrap();

        let err = extract_tar_gz(&archive[..], dir.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidPath));
    }

    #[test]
    fn test_curdir_components_are_dropped() {
        let archive = raw_name_fixture(b"./etc/./conf", b"k=v");
        let dir = tempfile::tempdir().unwrap();

        extract_tar_gz(&archive[..], dir.path()).unwrap();
        assert_eq!(fs::read(dir.path().join("etc/conf")).unwrap(), b"k=v");
    }

    #[test]
    fn test_garbage_stream_is_corrupted() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_tar_gz(&[0xde, 0xad, 0xbe, 0xef][..], dir.path()).unwrap_err();
        assert!(matches!(err, Error::Corrupted));
    }

    #[test]
    fn test_truncated_archive_is_corrupted() {
        let archive = fixture(&[("etc/conf", b"value", 0o644)]);
        let cut = &archive[..archive.len() / 2];
        let dir = tempfile::tempdir().unwrap();

        let result = extract_tar_gz(cut, dir.path());
        assert!(result.is_err());
    }
}
