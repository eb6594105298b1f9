use std::io;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The stream hashed cleanly but the digest does not match. Kept
    /// distinct from [`VerifyError::Io`] so callers can apply a
    /// fatal-vs-warn policy per package.
    #[error("digest mismatch: expected {expected}, got {actual}")]
    Mismatch { expected: String, actual: String },

    #[error("failed to read stream: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
