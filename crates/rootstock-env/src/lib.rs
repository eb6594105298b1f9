//! Environment materialization: the dotenv file shells and spawned
//! processes read, and the generated `.profile`.
//!
//! Both artifacts are written through a temp sibling plus rename so a
//! process starting mid-write sees the old file or the new file, never
//! a truncated one.

mod error;
mod map;
mod profile;

pub use error::{Error, Result};
pub use map::EnvMap;
pub use profile::ShellProfile;

use std::path::Path;

use rootstock_fs::AtomicWriteOptions;

const FILE_MODE: u32 = 0o644;

/// Serialize `map` and move it into place at `path` atomically.
pub fn write_dotenv(map: &EnvMap, path: &Path) -> Result<()> {
    rootstock_fs::atomic_write(
        path,
        map.to_dotenv().as_bytes(),
        AtomicWriteOptions::new().permissions(FILE_MODE),
    )?;
    Ok(())
}

/// Render `profile` and move it into place at `path` atomically.
pub fn write_profile(profile: &ShellProfile, path: &Path) -> Result<()> {
    rootstock_fs::atomic_write(
        path,
        profile.render().as_bytes(),
        AtomicWriteOptions::new().permissions(FILE_MODE),
    )?;
    Ok(())
}
