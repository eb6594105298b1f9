//! Mirroring of a virtual, read-only asset namespace into the real
//! file system.
//!
//! # Architecture
//!
//! - `source.rs` - the [`AssetSource`] namespace contract and a
//!   directory-backed implementation
//! - `walker.rs` - recursive mirroring with symlink-indicator
//!   resolution and the skip-if-already-materialized rule

mod error;
mod source;
mod walker;

pub use error::{Error, Result};
pub use source::{AssetKind, AssetSource, DirSource};
pub use walker::{MirrorReport, SYMLINK_SUFFIX, mirror};
