//! Bootstrap orchestration: drives package verification and extraction,
//! asset mirroring, link topology, and environment materialization into
//! a single idempotent sequence with retry-by-wipe recovery.
//!
//! # Architecture
//!
//! [`Installer`] owns the policy and sequencing; the mechanism lives in
//! the sibling crates it composes. Host integration points (crash
//! reporting, the retry prompt, shared storage locations) enter through
//! small traits, so the whole engine runs against a temp directory in
//! tests.

mod error;
mod index;
mod layout;
mod orchestrator;
mod ports;
mod storage;
mod worker;

pub use error::{InstallError, Result};
pub use index::{PackageDescriptor, PackageIndex};
pub use layout::PrefixLayout;
pub use orchestrator::{Installer, Outcome};
pub use ports::{AbortPrompt, CrashReporter, FailurePrompt, NullReporter, Recovery, StorageLocations};
pub use storage::setup_storage_links;
pub use worker::spawn;
