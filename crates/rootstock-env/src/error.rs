#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] rootstock_fs::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
