//! Extraction of gzip-framed tar packages into a target directory.
//!
//! Entries are processed strictly in stream order with no re-ordering or
//! two-pass resolution; archives are assumed well-formed, with
//! directories preceding their children. A decode failure aborts the
//! extraction and may leave the target partially populated; deciding
//! whether to wipe and retry is the orchestrator's job, not ours.

mod error;
mod extract;

pub use error::{Error, Result};
pub use extract::{Extracted, extract_tar_gz};
