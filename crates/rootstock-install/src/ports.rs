use std::path::PathBuf;

use crate::error::InstallError;

/// What to do after a recoverable install failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Wipe the prefix tree and run the install again from scratch.
    Retry,
    Abort,
}

/// Receives install failures for out-of-band reporting.
pub trait CrashReporter: Send + Sync {
    fn report(&self, error: &InstallError);
}

/// Asks the operator how to proceed after a recoverable failure.
pub trait FailurePrompt: Send + Sync {
    fn choose(&self, error: &InstallError) -> Recovery;
}

/// Enumerates shared locations to mirror under `home/storage`.
pub trait StorageLocations: Send + Sync {
    /// `(link name, absolute target)` pairs.
    fn locations(&self) -> Vec<(String, PathBuf)>;
}

/// Reporter that drops everything. Failures still reach the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl CrashReporter for NullReporter {
    fn report(&self, _error: &InstallError) {}
}

/// Prompt that always aborts, for unattended runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbortPrompt;

impl FailurePrompt for AbortPrompt {
    fn choose(&self, _error: &InstallError) -> Recovery {
        Recovery::Abort
    }
}
