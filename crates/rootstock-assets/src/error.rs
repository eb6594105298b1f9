use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("asset '{path}' not found")]
    NotFound { path: String },

    #[error("symlink indicator '{path}' is malformed: first line must start with 'SYMLINK:'")]
    MalformedIndicator { path: String },

    #[error("failed to read asset '{path}': {source}")]
    ReadFailed { path: String, source: io::Error },

    #[error("failed to materialize '{path}': {source}")]
    WriteFailed { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Fs(#[from] rootstock_fs::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
