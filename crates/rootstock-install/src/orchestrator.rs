//! The install sequence and its retry-by-wipe recovery loop.
//!
//! # Architecture
//!
//! `install_or_repair` runs the strictly sequential pipeline: marker
//! check, preflight, skeleton, packages, asset mirror, link topology,
//! environment files. Every stage is idempotent, so a re-run over a
//! partial tree repairs it in place. `run_with_recovery` wraps the
//! pipeline in the operator-facing recovery policy: report the failure,
//! then either wipe the whole prefix and start over or abort.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use rootstock_assets::AssetSource;
use rootstock_env::{EnvMap, ShellProfile};
use rootstock_links::LinkTables;

use crate::error::{InstallError, Result};
use crate::index::{PackageDescriptor, PackageIndex};
use crate::layout::PrefixLayout;
use crate::ports::{CrashReporter, FailurePrompt, Recovery};

/// Appended to `PATH` after the prefix `bin` directory so host tools
/// stay reachable.
const SYSTEM_BIN: &str = "/system/bin";

/// Terminal result of an install run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The marker binary was already present and executable.
    AlreadyInstalled,
    /// Preflight rejected the environment; retrying cannot help.
    PreflightFailed(String),
    /// The operator declined a retry after a recoverable failure.
    Aborted,
}

pub struct Installer {
    layout: PrefixLayout,
    payload_dir: PathBuf,
    assets: Box<dyn AssetSource>,
    asset_root: String,
    index: PackageIndex,
    tables: LinkTables,
    marker: Option<String>,
    primary_user: bool,
    profile_override: Option<PathBuf>,
    host_env: Vec<(String, String)>,
}

impl Installer {
    pub fn new(
        layout: PrefixLayout,
        payload_dir: impl Into<PathBuf>,
        assets: Box<dyn AssetSource>,
    ) -> Self {
        Self {
            layout,
            payload_dir: payload_dir.into(),
            assets,
            asset_root: String::new(),
            index: PackageIndex::default(),
            tables: LinkTables::builtin().clone(),
            marker: None,
            primary_user: true,
            profile_override: None,
            host_env: Vec::new(),
        }
    }

    /// Mirror only the asset subtree at `root` instead of the whole
    /// namespace.
    pub fn with_asset_root(mut self, root: impl Into<String>) -> Self {
        self.asset_root = root.into();
        self
    }

    pub fn with_index(mut self, index: PackageIndex) -> Self {
        self.index = index;
        self
    }

    pub fn with_tables(mut self, tables: LinkTables) -> Self {
        self.tables = tables;
        self
    }

    /// Short-circuit the whole run when `bin/<name>` already exists and
    /// is executable.
    pub fn with_marker(mut self, name: impl Into<String>) -> Self {
        self.marker = Some(name.into());
        self
    }

    pub fn with_primary_user(mut self, primary: bool) -> Self {
        self.primary_user = primary;
        self
    }

    pub fn with_profile_override(mut self, path: impl Into<PathBuf>) -> Self {
        self.profile_override = Some(path.into());
        self
    }

    /// Host-provided variables written ahead of the engine-managed ones.
    /// Engine keys win on collision.
    pub fn with_host_env(mut self, vars: Vec<(String, String)>) -> Self {
        self.host_env = vars;
        self
    }

    pub fn layout(&self) -> &PrefixLayout {
        &self.layout
    }

    /// Whether the marker binary reports a completed install.
    pub fn is_installed(&self) -> bool {
        let Some(marker) = &self.marker else {
            return false;
        };
        let path = self.layout.marker_binary(marker);
        fs::metadata(&path)
            .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
    }

    /// Run the full sequence once. Safe to call over a partial tree
    /// left by an interrupted run.
    pub fn install_or_repair(&self) -> Result<Outcome> {
        if self.is_installed() {
            info!(prefix = %self.layout.prefix().display(), "marker present, nothing to do");
            return Ok(Outcome::AlreadyInstalled);
        }

        self.preflight()?;
        self.create_skeleton()?;
        self.install_packages()?;
        self.mirror_assets()?;
        self.build_links()?;
        self.write_environment()?;

        info!(prefix = %self.layout.prefix().display(), "install complete");
        Ok(Outcome::Completed)
    }

    /// Run the sequence under the recovery policy: on a recoverable
    /// failure ask `prompt`, and on [`Recovery::Retry`] wipe the whole
    /// prefix tree so the next attempt starts from nothing.
    pub fn run_with_recovery(
        &self,
        prompt: &dyn FailurePrompt,
        reporter: &dyn CrashReporter,
    ) -> Outcome {
        loop {
            let err = match self.install_or_repair() {
                Ok(outcome) => return outcome,
                Err(err) => err,
            };

            error!(%err, "install failed");
            reporter.report(&err);

            if !err.is_recoverable() {
                return Outcome::PreflightFailed(err.to_string());
            }

            match prompt.choose(&err) {
                Recovery::Retry => {
                    info!(prefix = %self.layout.prefix().display(), "wiping prefix before retry");
                    if let Err(wipe_err) = rootstock_fs::remove_tree(self.layout.prefix()) {
                        error!(%wipe_err, "failed to wipe prefix, giving up");
                        reporter.report(&InstallError::Fs(wipe_err));
                        return Outcome::Aborted;
                    }
                }
                Recovery::Abort => return Outcome::Aborted,
            }
        }
    }

    fn preflight(&self) -> Result<()> {
        if !self.primary_user {
            return Err(InstallError::Preflight(
                "install requires the primary user account".to_string(),
            ));
        }

        let parent = self.layout.prefix().parent().unwrap_or(Path::new("/"));
        rootstock_fs::ensure_dir(parent).map_err(|err| {
            InstallError::Preflight(format!(
                "files directory {} is not accessible: {err}",
                parent.display()
            ))
        })?;
        Ok(())
    }

    fn create_skeleton(&self) -> Result<()> {
        for dir in self.layout.skeleton() {
            rootstock_fs::ensure_dir(&dir)?;
        }
        Ok(())
    }

    fn install_packages(&self) -> Result<()> {
        for pkg in self.index.packages() {
            self.install_package(pkg)?;
        }
        Ok(())
    }

    fn install_package(&self, pkg: &PackageDescriptor) -> Result<()> {
        info!(package = %pkg.id, asset = %pkg.asset_path, "installing package");

        if let Some(expected) = &pkg.expected_digest {
            let Some(reader) = self.open_package(pkg)? else {
                return Ok(());
            };
            let actual = rootstock_verify::digest_stream(reader).map_err(|err| {
                InstallError::PackageRead {
                    id: pkg.id.clone(),
                    source: io::Error::other(err),
                }
            })?;
            if actual != *expected {
                if pkg.required {
                    return Err(InstallError::DigestMismatch {
                        id: pkg.id.clone(),
                        expected: expected.clone(),
                        actual,
                    });
                }
                warn!(package = %pkg.id, %expected, %actual, "digest mismatch, skipping optional package");
                return Ok(());
            }
        }

        // Asset streams are not seekable; a verified package is opened a
        // second time for extraction.
        let Some(reader) = self.open_package(pkg)? else {
            return Ok(());
        };
        let dest = match &pkg.install_dir {
            Some(dir) => self.layout.prefix().join(dir),
            None => self.layout.package_dir(&pkg.id),
        };
        rootstock_fs::ensure_dir(&dest)?;
        let extracted = rootstock_archive::extract_tar_gz(reader, &dest)?;
        info!(
            package = %pkg.id,
            entries = extracted.entry_count,
            bytes = extracted.total_bytes,
            "package extracted"
        );
        Ok(())
    }

    /// `Ok(None)` means an optional package's asset is unavailable and
    /// the package is skipped.
    fn open_package(&self, pkg: &PackageDescriptor) -> Result<Option<Box<dyn io::Read + '_>>> {
        match self.assets.open(&pkg.asset_path) {
            Ok(reader) => Ok(Some(reader)),
            Err(err) if !pkg.required => {
                warn!(package = %pkg.id, %err, "asset unavailable, skipping optional package");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn mirror_assets(&self) -> Result<()> {
        let report =
            rootstock_assets::mirror(self.assets.as_ref(), &self.asset_root, self.layout.prefix())?;
        info!(
            copied = report.copied,
            links = report.links,
            skipped = report.skipped,
            "asset tree mirrored"
        );
        Ok(())
    }

    fn build_links(&self) -> Result<()> {
        let plan = rootstock_links::plan(
            &self.tables,
            &self.payload_dir,
            &self.layout.bin_dir(),
            &self.layout.lib_dir(),
        );
        let report = rootstock_links::apply(&plan);
        info!(
            created = report.created,
            skipped = report.skipped,
            failed = report.failed,
            "link topology applied"
        );
        Ok(())
    }

    fn write_environment(&self) -> Result<()> {
        let home = self.layout.home_dir();
        let bin_dir = self.layout.bin_dir();
        let lib_dir = self.layout.lib_dir();

        let mut map = EnvMap::new();
        for (key, value) in &self.host_env {
            map.set(key.clone(), value.clone());
        }
        map.set("HOME", home.display().to_string());
        map.set("PREFIX", self.layout.prefix().display().to_string());
        map.set("PATH", format!("{}:{SYSTEM_BIN}", bin_dir.display()));
        map.set(
            "LD_LIBRARY_PATH",
            format!("{}:{}", self.payload_dir.display(), lib_dir.display()),
        );
        map.set("TMPDIR", self.layout.tmp_dir().display().to_string());
        rootstock_env::write_dotenv(&map, &self.layout.env_file())?;

        let profile = ShellProfile {
            home,
            prefix: self.layout.prefix().to_path_buf(),
            bin_dir,
            lib_dir,
            payload_dir: self.payload_dir.clone(),
            override_file: self.profile_override.clone(),
        };
        rootstock_env::write_profile(&profile, &self.layout.profile_file())?;
        Ok(())
    }
}
