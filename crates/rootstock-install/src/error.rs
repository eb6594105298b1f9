use std::io;

#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// The environment is unusable (files directory inaccessible, or
    /// not the primary user account). Unrecoverable without external
    /// remediation, so no retry is offered.
    #[error("preflight failed: {0}")]
    Preflight(String),

    #[error("digest mismatch for package '{id}': expected {expected}, got {actual}")]
    DigestMismatch {
        id: String,
        expected: String,
        actual: String,
    },

    #[error("failed to read package '{id}': {source}")]
    PackageRead { id: String, source: io::Error },

    #[error("invalid package index: {0}")]
    Index(#[from] serde_json::Error),

    #[error(transparent)]
    Archive(#[from] rootstock_archive::Error),

    #[error(transparent)]
    Assets(#[from] rootstock_assets::Error),

    #[error(transparent)]
    Env(#[from] rootstock_env::Error),

    #[error(transparent)]
    Fs(#[from] rootstock_fs::Error),
}

impl InstallError {
    /// Whether wiping the prefix tree and reinstalling can help.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, InstallError::Preflight(_))
    }
}

pub type Result<T> = std::result::Result<T, InstallError>;
