#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid link table document: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
