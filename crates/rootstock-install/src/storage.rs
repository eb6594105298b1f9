//! Symlinks from `home/storage` to shared host locations.

use tracing::warn;

use crate::error::InstallError;
use crate::layout::PrefixLayout;
use crate::ports::{CrashReporter, StorageLocations};

/// Rebuild `home/storage` from scratch: the directory is cleared and
/// one symlink is created per provided location.
///
/// Storage links are a convenience, so nothing here is fatal: every
/// failure is logged and handed to `reporter`, and the remaining
/// locations are still attempted. Returns the number of links created.
pub fn setup_storage_links(
    layout: &PrefixLayout,
    provider: &dyn StorageLocations,
    reporter: &dyn CrashReporter,
) -> usize {
    let storage = layout.storage_dir();
    let cleared = rootstock_fs::remove_tree(&storage).and_then(|()| rootstock_fs::ensure_dir(&storage));
    if let Err(err) = cleared {
        warn!(path = %storage.display(), %err, "cannot rebuild storage directory");
        reporter.report(&InstallError::Fs(err));
        return 0;
    }

    let mut created = 0;
    for (name, target) in provider.locations() {
        match rootstock_fs::replace_symlink(&target, &storage.join(&name)) {
            Ok(()) => created += 1,
            Err(err) => {
                warn!(link = %name, target = %target.display(), %err, "failed to link storage location");
                reporter.report(&InstallError::Fs(err));
            }
        }
    }
    created
}
