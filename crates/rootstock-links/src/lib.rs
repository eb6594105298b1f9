//! Symlink topology for the materialized prefix tree.
//!
//! # Architecture
//!
//! - `tables.rs` - immutable declarative alias tables (builtin set or
//!   external JSON)
//! - `builder.rs` - pure planning against the payload directory state,
//!   then idempotent application

mod builder;
mod error;
mod tables;

pub use builder::{LinkAction, LinkClass, LinkPlan, LinkReport, apply, plan};
pub use error::{Error, Result};
pub use tables::LinkTables;
