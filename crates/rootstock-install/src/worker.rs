//! Background execution of the install sequence.
//!
//! The sequence blocks on file I/O throughout, so it runs on a
//! dedicated thread. There is no cancellation: once started, a run
//! either reaches an [`Outcome`] or the process exits with it.

use std::io;
use std::thread::{self, JoinHandle};

use crate::orchestrator::{Installer, Outcome};
use crate::ports::{CrashReporter, FailurePrompt};

/// Run `installer.run_with_recovery` on a new thread and hand the
/// outcome to `on_done` from that thread.
pub fn spawn<F>(
    installer: Installer,
    prompt: Box<dyn FailurePrompt>,
    reporter: Box<dyn CrashReporter>,
    on_done: F,
) -> io::Result<JoinHandle<()>>
where
    F: FnOnce(Outcome) + Send + 'static,
{
    thread::Builder::new()
        .name("rootstock-install".to_string())
        .spawn(move || {
            let outcome = installer.run_with_recovery(prompt.as_ref(), reporter.as_ref());
            on_done(outcome);
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    use rootstock_assets::DirSource;

    use crate::layout::PrefixLayout;
    use crate::ports::{AbortPrompt, NullReporter};

    #[test]
    fn test_outcome_delivered_to_callback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();

        let installer = Installer::new(
            PrefixLayout::new(dir.path().join("prefix")),
            dir.path().join("payload"),
            Box::new(DirSource::new(dir.path().join("assets"))),
        );

        let (tx, rx) = mpsc::channel();
        let handle = spawn(
            installer,
            Box::new(AbortPrompt),
            Box::new(NullReporter),
            move |outcome| {
                tx.send(outcome).unwrap();
            },
        )
        .unwrap();

        assert_eq!(rx.recv().unwrap(), Outcome::Completed);
        handle.join().unwrap();
    }
}
