//! Process signal wiring for the stop and cancel tokens.

use tracing::warn;

use crate::application::signals::Signals;

/// Exit status used when a second Ctrl-C aborts the process.
pub const INTERRUPTED_EXIT_CODE: u8 = 130;

/// Build [`Signals`] driven by the process's signals.
///
/// Ctrl-C fires cancel; a second Ctrl-C exits at once. SIGTERM fires stop.
/// Must be called inside a tokio runtime.
#[must_use]
pub fn process_signals() -> Signals {
    let signals = Signals::default();

    let cancel = signals.cancel_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("interrupt received; canceling the run if it has not started applying");
        cancel.cancel();
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted twice; exiting without waiting for the remote run.");
            std::process::exit(i32::from(INTERRUPTED_EXIT_CODE));
        }
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let stop = signals.stop_token().clone();
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::spawn(async move {
                    if term.recv().await.is_some() {
                        warn!("terminate received; leaving the remote run alone");
                        stop.cancel();
                    }
                });
            }
            Err(e) => warn!(error = %e, "cannot install SIGTERM handler"),
        }
    }

    signals
}
