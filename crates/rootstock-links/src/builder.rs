//! Three-phase resolution of the declared alias graph into symlinks.
//!
//! Phase order is a load-bearing invariant: version aliases resolve
//! against the base-library aliases phase 2 creates inside `lib/`,
//! never against the payload directory, so a version alias is only
//! planned when its base alias will exist.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::tables::LinkTables;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkClass {
    Executable,
    BaseLibrary,
    VersionAlias,
}

/// One symlink to create: `link -> target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAction {
    pub target: PathBuf,
    pub link: PathBuf,
    pub class: LinkClass,
}

/// The resolved plan: a pure function of (tables, payload dir state).
#[derive(Debug, Default)]
pub struct LinkPlan {
    pub actions: Vec<LinkAction>,
    /// Table entries dropped because their payload file (or base
    /// alias) is absent on this device. Not an error.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkReport {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Resolve the tables against the current payload directory state.
/// Reads the payload directory but writes nothing.
pub fn plan(
    tables: &LinkTables,
    payload_dir: &Path,
    bin_dir: &Path,
    lib_dir: &Path,
) -> LinkPlan {
    let mut plan = LinkPlan::default();

    // Phase 1: executable aliases against the payload.
    for (source, alias) in &tables.executables {
        let target = payload_dir.join(source);
        if target.is_file() {
            plan.actions.push(LinkAction {
                target,
                link: bin_dir.join(alias),
                class: LinkClass::Executable,
            });
        } else {
            plan.skipped += 1;
        }
    }

    // Phase 2: base-library aliases against the payload. These are the
    // canonical on-disk libraries.
    let mut planned_bases = HashSet::new();
    for name in &tables.base_libraries {
        let target = payload_dir.join(name);
        if target.is_file() {
            planned_bases.insert(name.as_str());
            plan.actions.push(LinkAction {
                target,
                link: lib_dir.join(name),
                class: LinkClass::BaseLibrary,
            });
        } else {
            plan.skipped += 1;
        }
    }

    // Phase 3: version aliases against the phase-2 aliases. A missing
    // base means no alias at all, never a dangling link.
    for (base, alias) in &tables.version_aliases {
        if planned_bases.contains(base.as_str()) {
            plan.actions.push(LinkAction {
                target: lib_dir.join(base),
                link: lib_dir.join(alias),
                class: LinkClass::VersionAlias,
            });
        } else {
            plan.skipped += 1;
        }
    }

    plan
}

/// Execute a plan. Every action is delete-then-recreate, so re-applying
/// a plan produces a byte-identical link graph regardless of prior
/// state.
///
/// A failing symlink syscall (unsupported file system, say) is logged
/// and counted, not escalated: one missing alias should not block an
/// otherwise usable tree.
pub fn apply(plan: &LinkPlan) -> LinkReport {
    let mut report = LinkReport {
        skipped: plan.skipped,
        ..LinkReport::default()
    };

    for action in &plan.actions {
        match rootstock_fs::replace_symlink(&action.target, &action.link) {
            Ok(()) => {
                debug!(link = %action.link.display(), target = %action.target.display(), "created alias");
                report.created += 1;
            }
            Err(err) => {
                warn!(link = %action.link.display(), %err, "failed to create alias, skipping");
                report.failed += 1;
            }
        }
    }

    report
}
