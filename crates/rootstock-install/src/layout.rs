use std::path::{Path, PathBuf};

/// Directory skeleton rooted at the install prefix.
///
/// Every path the installer touches is derived here, so tests can point
/// the whole engine at a temp directory by swapping a single root.
#[derive(Debug, Clone)]
pub struct PrefixLayout {
    prefix: PathBuf,
}

impl PrefixLayout {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.prefix.join("bin")
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.prefix.join("lib")
    }

    pub fn etc_dir(&self) -> PathBuf {
        self.prefix.join("etc")
    }

    pub fn opt_dir(&self) -> PathBuf {
        self.prefix.join("opt")
    }

    pub fn home_dir(&self) -> PathBuf {
        self.prefix.join("home")
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.prefix.join("tmp")
    }

    /// The dotenv file spawned processes read their environment from.
    pub fn env_file(&self) -> PathBuf {
        self.etc_dir().join("environment")
    }

    pub fn profile_file(&self) -> PathBuf {
        self.home_dir().join(".profile")
    }

    /// Extraction root for an indexed package.
    pub fn package_dir(&self, id: &str) -> PathBuf {
        self.opt_dir().join(id)
    }

    /// The executable whose presence marks a completed install.
    pub fn marker_binary(&self, name: &str) -> PathBuf {
        self.bin_dir().join(name)
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.home_dir().join("storage")
    }

    /// The directories created up front, before any payload lands.
    pub fn skeleton(&self) -> [PathBuf; 6] {
        [
            self.bin_dir(),
            self.lib_dir(),
            self.etc_dir(),
            self.opt_dir(),
            self.home_dir(),
            self.tmp_dir(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_derive_from_prefix() {
        let layout = PrefixLayout::new("/data/prefix");
        assert_eq!(layout.env_file(), Path::new("/data/prefix/etc/environment"));
        assert_eq!(layout.profile_file(), Path::new("/data/prefix/home/.profile"));
        assert_eq!(layout.package_dir("node"), Path::new("/data/prefix/opt/node"));
        assert_eq!(layout.marker_binary("codex"), Path::new("/data/prefix/bin/codex"));
        assert_eq!(layout.storage_dir(), Path::new("/data/prefix/home/storage"));
    }

    #[test]
    fn test_skeleton_lives_under_prefix() {
        let layout = PrefixLayout::new("/data/prefix");
        for dir in layout.skeleton() {
            assert!(dir.starts_with("/data/prefix"));
        }
    }
}
