//! The two cancellation signals threaded through every blocking step.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::domain::error::Interrupt;

/// Stop and cancel tokens for one apply invocation.
///
/// `stop` unblocks local waits and leaves remote execution alone. `cancel`
/// additionally asks for the remote run to be canceled.
#[derive(Debug, Clone, Default)]
pub struct Signals {
    stop: CancellationToken,
    cancel: CancellationToken,
}

impl Signals {
    #[must_use]
    pub fn new(stop: CancellationToken, cancel: CancellationToken) -> Self {
        Self { stop, cancel }
    }

    #[must_use]
    pub fn stop_token(&self) -> &CancellationToken {
        &self.stop
    }

    #[must_use]
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// The signal that has fired, if any. Cancel wins over stop.
    #[must_use]
    pub fn interrupt(&self) -> Option<Interrupt> {
        if self.cancel.is_cancelled() {
            Some(Interrupt::Canceled)
        } else if self.stop.is_cancelled() {
            Some(Interrupt::Stopped)
        } else {
            None
        }
    }

    /// Run `fut` until it completes or either signal fires.
    ///
    /// A signal that already fired short-circuits without polling `fut`.
    ///
    /// # Errors
    ///
    /// Returns the interrupt that ended the wait.
    pub async fn guard<F: Future>(&self, fut: F) -> Result<F::Output, Interrupt> {
        if let Some(interrupt) = self.interrupt() {
            return Err(interrupt);
        }
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Interrupt::Canceled),
            () = self.stop.cancelled() => Err(Interrupt::Stopped),
            out = fut => Ok(out),
        }
    }
}
