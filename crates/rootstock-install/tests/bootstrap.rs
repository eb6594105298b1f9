//! End-to-end install runs against temp directories.

use std::fs;
use std::io::{self, Read};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use flate2::Compression;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};

use rootstock_assets::{AssetKind, AssetSource, DirSource};
use rootstock_install::{
    CrashReporter, FailurePrompt, InstallError, Installer, Outcome, PackageIndex, PrefixLayout,
    Recovery,
};
use rootstock_links::LinkTables;

fn targz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn write_executable(path: &Path, content: &[u8]) {
    fs::write(path, content).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

fn tables() -> LinkTables {
    LinkTables {
        executables: vec![
            ("codex.so".to_string(), "codex".to_string()),
            ("busybox".to_string(), "sh".to_string()),
        ],
        base_libraries: vec!["libnative.so".to_string()],
        version_aliases: vec![
            ("libnative.so".to_string(), "libnative.so.1".to_string()),
            ("libgone.so".to_string(), "libgone.so.1".to_string()),
        ],
    }
}

/// Standard fixture: a payload dir, an asset dir with a mirrored
/// subtree under `fs/` and archives under `packages/`, and an index
/// with one required package.
struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
    payload: PathBuf,
    assets: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();

        let payload = root.join("payload");
        fs::create_dir(&payload).unwrap();
        write_executable(&payload.join("codex.so"), b"#!binary");
        fs::write(payload.join("libnative.so"), b"\x7fELF").unwrap();

        let assets = root.join("assets");
        fs::create_dir_all(assets.join("fs/etc")).unwrap();
        fs::create_dir_all(assets.join("fs/var/empty")).unwrap();
        fs::create_dir_all(assets.join("fs/home")).unwrap();
        fs::create_dir_all(assets.join("packages")).unwrap();
        fs::write(assets.join("fs/etc/motd"), b"welcome\n").unwrap();
        fs::write(assets.join("fs/home/.aliases.symlink"), b"SYMLINK:.profile\n").unwrap();

        let archive = targz(&[("run", b"#!/bin/sh\n" as &[u8])]);
        fs::write(assets.join("packages/tool.tar.gz"), &archive).unwrap();

        Self {
            _dir: dir,
            root,
            payload,
            assets,
        }
    }

    fn prefix(&self) -> PathBuf {
        self.root.join("prefix")
    }

    fn tool_digest(&self) -> String {
        sha256_hex(&fs::read(self.assets.join("packages/tool.tar.gz")).unwrap())
    }

    fn index(&self) -> PackageIndex {
        PackageIndex::parse(&format!(
            r#"{{"packages": {{"tool": {{
                "asset_path": "packages/tool.tar.gz",
                "checksum": "sha256:{}",
                "required": true
            }}}}}}"#,
            self.tool_digest()
        ))
        .unwrap()
    }

    fn installer(&self) -> Installer {
        Installer::new(
            PrefixLayout::new(self.prefix()),
            &self.payload,
            Box::new(DirSource::new(&self.assets)),
        )
        .with_asset_root("fs")
        .with_index(self.index())
        .with_tables(tables())
        .with_marker("codex")
    }
}

#[test]
fn test_fresh_install_materializes_full_tree() {
    let fx = Fixture::new();
    let installer = fx.installer();

    assert!(!installer.is_installed());
    assert_eq!(installer.install_or_repair().unwrap(), Outcome::Completed);
    assert!(installer.is_installed());

    let prefix = fx.prefix();

    // Executable alias into the payload.
    assert_eq!(
        fs::read_link(prefix.join("bin/codex")).unwrap(),
        fx.payload.join("codex.so")
    );
    // Absent payload file means no alias.
    assert!(fs::symlink_metadata(prefix.join("bin/sh")).is_err());

    // Base alias targets the payload; version alias targets the base
    // alias, never the payload.
    assert_eq!(
        fs::read_link(prefix.join("lib/libnative.so")).unwrap(),
        fx.payload.join("libnative.so")
    );
    assert_eq!(
        fs::read_link(prefix.join("lib/libnative.so.1")).unwrap(),
        prefix.join("lib/libnative.so")
    );
    assert!(fs::symlink_metadata(prefix.join("lib/libgone.so.1")).is_err());

    // Mirrored assets, including the empty directory and the resolved
    // indicator.
    assert_eq!(fs::read_to_string(prefix.join("etc/motd")).unwrap(), "welcome\n");
    assert!(prefix.join("var/empty").is_dir());
    assert_eq!(
        fs::read_link(prefix.join("home/.aliases")).unwrap(),
        Path::new(".profile")
    );

    // The required package landed under opt/.
    assert_eq!(
        fs::read_to_string(prefix.join("opt/tool/run")).unwrap(),
        "#!/bin/sh\n"
    );

    let env = fs::read_to_string(prefix.join("etc/environment")).unwrap();
    assert!(env.contains(&format!("PREFIX={}\n", prefix.display())));
    assert!(env.contains(&format!("PATH={}:/system/bin\n", prefix.join("bin").display())));
    assert!(env.contains(&format!("TMPDIR={}\n", prefix.join("tmp").display())));
    assert!(prefix.join("home/.profile").is_file());
}

#[test]
fn test_rerun_over_complete_tree_is_idempotent() {
    let fx = Fixture::new();
    let installer = Installer::new(
        PrefixLayout::new(fx.prefix()),
        &fx.payload,
        Box::new(DirSource::new(&fx.assets)),
    )
    .with_asset_root("fs")
    .with_index(fx.index())
    .with_tables(tables());

    assert_eq!(installer.install_or_repair().unwrap(), Outcome::Completed);

    // A locally edited, non-empty file survives the second run.
    fs::write(fx.prefix().join("etc/motd"), b"customized\n").unwrap();

    assert_eq!(installer.install_or_repair().unwrap(), Outcome::Completed);
    assert_eq!(
        fs::read_to_string(fx.prefix().join("etc/motd")).unwrap(),
        "customized\n"
    );
    assert_eq!(
        fs::read_link(fx.prefix().join("bin/codex")).unwrap(),
        fx.payload.join("codex.so")
    );
}

#[test]
fn test_marker_short_circuits_install() {
    let fx = Fixture::new();
    let layout = PrefixLayout::new(fx.prefix());
    fs::create_dir_all(layout.bin_dir()).unwrap();
    write_executable(&layout.marker_binary("codex"), b"#!binary");

    let installer = fx.installer();
    assert_eq!(
        installer.install_or_repair().unwrap(),
        Outcome::AlreadyInstalled
    );
    // Nothing else was materialized.
    assert!(!fx.prefix().join("etc/environment").exists());
}

#[test]
fn test_optional_package_failures_are_skipped() {
    let fx = Fixture::new();
    let index = PackageIndex::parse(&format!(
        r#"{{"packages": {{
            "corrupt": {{
                "asset_path": "packages/tool.tar.gz",
                "checksum": "sha256:{}"
            }},
            "missing": {{
                "asset_path": "packages/nonexistent.tar.gz"
            }},
            "tool": {{
                "asset_path": "packages/tool.tar.gz",
                "checksum": "sha256:{}",
                "required": true
            }}
        }}}}"#,
        "0".repeat(64),
        fx.tool_digest()
    ))
    .unwrap();

    let installer = Installer::new(
        PrefixLayout::new(fx.prefix()),
        &fx.payload,
        Box::new(DirSource::new(&fx.assets)),
    )
    .with_asset_root("fs")
    .with_index(index)
    .with_tables(tables());

    assert_eq!(installer.install_or_repair().unwrap(), Outcome::Completed);
    assert!(!fx.prefix().join("opt/corrupt").join("run").exists());
    assert!(!fx.prefix().join("opt/missing").exists());
    assert!(fx.prefix().join("opt/tool/run").is_file());
}

#[test]
fn test_required_package_digest_mismatch_fails() {
    let fx = Fixture::new();
    let index = PackageIndex::parse(&format!(
        r#"{{"packages": {{"tool": {{
            "asset_path": "packages/tool.tar.gz",
            "checksum": "sha256:{}",
            "required": true
        }}}}}}"#,
        "f".repeat(64)
    ))
    .unwrap();

    let installer = Installer::new(
        PrefixLayout::new(fx.prefix()),
        &fx.payload,
        Box::new(DirSource::new(&fx.assets)),
    )
    .with_asset_root("fs")
    .with_index(index)
    .with_tables(tables());

    let err = installer.install_or_repair().unwrap_err();
    assert!(matches!(err, InstallError::DigestMismatch { .. }));
    assert!(err.is_recoverable());
}

/// Fails the first open of one path, then behaves normally.
struct FlakySource {
    inner: DirSource,
    fail_path: String,
    tripped: AtomicBool,
}

impl AssetSource for FlakySource {
    fn kind(&self, path: &str) -> rootstock_assets::Result<AssetKind> {
        self.inner.kind(path)
    }

    fn list(&self, path: &str) -> rootstock_assets::Result<Vec<String>> {
        self.inner.list(path)
    }

    fn open(&self, path: &str) -> rootstock_assets::Result<Box<dyn Read + '_>> {
        if path == self.fail_path && !self.tripped.swap(true, Ordering::SeqCst) {
            return Err(rootstock_assets::Error::ReadFailed {
                path: path.to_string(),
                source: io::Error::other("transient read failure"),
            });
        }
        self.inner.open(path)
    }
}

struct RetryOnce(AtomicBool);

impl FailurePrompt for RetryOnce {
    fn choose(&self, _error: &InstallError) -> Recovery {
        if self.0.swap(true, Ordering::SeqCst) {
            Recovery::Abort
        } else {
            Recovery::Retry
        }
    }
}

#[derive(Default)]
struct RecordingReporter(Mutex<Vec<String>>);

impl CrashReporter for RecordingReporter {
    fn report(&self, error: &InstallError) {
        self.0.lock().unwrap().push(error.to_string());
    }
}

#[test]
fn test_retry_wipes_prefix_and_matches_fresh_install() {
    let fx = Fixture::new();

    // Leftovers from a previous broken run.
    fs::create_dir_all(fx.prefix()).unwrap();
    fs::write(fx.prefix().join("junk"), b"stale").unwrap();

    let source = FlakySource {
        inner: DirSource::new(&fx.assets),
        fail_path: "packages/tool.tar.gz".to_string(),
        tripped: AtomicBool::new(false),
    };
    let installer = Installer::new(PrefixLayout::new(fx.prefix()), &fx.payload, Box::new(source))
        .with_asset_root("fs")
        .with_index(fx.index())
        .with_tables(tables());

    let reporter = RecordingReporter::default();
    let outcome = installer.run_with_recovery(&RetryOnce(AtomicBool::new(false)), &reporter);

    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(reporter.0.lock().unwrap().len(), 1);
    // The wipe removed everything the broken run left behind.
    assert!(!fx.prefix().join("junk").exists());
    assert!(fx.prefix().join("opt/tool/run").is_file());
    assert_eq!(
        fs::read_to_string(fx.prefix().join("etc/motd")).unwrap(),
        "welcome\n"
    );
}

#[test]
fn test_abort_after_recoverable_failure() {
    let fx = Fixture::new();
    let index = PackageIndex::parse(
        r#"{"packages": {"tool": {"asset_path": "packages/nonexistent.tar.gz", "required": true}}}"#,
    )
    .unwrap();

    let installer = Installer::new(
        PrefixLayout::new(fx.prefix()),
        &fx.payload,
        Box::new(DirSource::new(&fx.assets)),
    )
    .with_asset_root("fs")
    .with_index(index)
    .with_tables(tables());

    let reporter = RecordingReporter::default();
    let outcome = installer.run_with_recovery(&rootstock_install::AbortPrompt, &reporter);
    assert_eq!(outcome, Outcome::Aborted);
    assert_eq!(reporter.0.lock().unwrap().len(), 1);
}

struct UnreachablePrompt;

impl FailurePrompt for UnreachablePrompt {
    fn choose(&self, _error: &InstallError) -> Recovery {
        panic!("preflight failures must not offer a retry");
    }
}

#[test]
fn test_preflight_failure_is_not_retried() {
    let fx = Fixture::new();
    let installer = fx.installer().with_primary_user(false);

    let reporter = RecordingReporter::default();
    let outcome = installer.run_with_recovery(&UnreachablePrompt, &reporter);

    assert!(matches!(outcome, Outcome::PreflightFailed(_)));
    assert_eq!(reporter.0.lock().unwrap().len(), 1);
}

#[test]
fn test_host_env_written_before_engine_keys() {
    let fx = Fixture::new();
    let installer = Installer::new(
        PrefixLayout::new(fx.prefix()),
        &fx.payload,
        Box::new(DirSource::new(&fx.assets)),
    )
    .with_asset_root("fs")
    .with_tables(tables())
    .with_host_env(vec![
        ("COLORTERM".to_string(), "truecolor".to_string()),
        ("PREFIX".to_string(), "/wrong".to_string()),
    ]);

    assert_eq!(installer.install_or_repair().unwrap(), Outcome::Completed);
    let env = fs::read_to_string(fx.prefix().join("etc/environment")).unwrap();
    assert!(env.starts_with("COLORTERM=truecolor\n"));
    // Engine-managed keys win over host-provided duplicates.
    assert!(env.contains(&format!("PREFIX={}\n", fx.prefix().display())));
    assert!(!env.contains("PREFIX=/wrong"));
}
