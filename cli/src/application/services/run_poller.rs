//! Application service — wait for the run to finish.

use cloud_apply_types::Run;
use tracing::{info, warn};

use crate::application::ports::{RunService, RunWaiter};
use crate::application::services::guarded_call;
use crate::application::signals::Signals;
use crate::domain::error::ApplyError;

/// Block until the run is terminal and return the final snapshot.
///
/// # Errors
///
/// Returns a wrapped error if waiting fails, or the interrupt.
pub async fn poll_to_terminal(
    waiter: &impl RunWaiter,
    run: &Run,
    signals: &Signals,
) -> Result<Run, ApplyError> {
    let run = guarded_call(signals, "Failed to wait for the run", waiter.wait_for_run(run, signals))
        .await?;
    info!(run_id = %run.id, status = %run.status, "run finished");
    Ok(run)
}

/// Cancel the remote run after a hard cancel, if it has not started applying.
///
/// Reads the run again first; the decision never rests on the snapshot held
/// before the wait. Failures are logged, not returned.
pub async fn cancel_if_pending(runs: &impl RunService, run_id: &str) {
    let run = match runs.read_run(run_id, false).await {
        Ok(run) => run,
        Err(e) => {
            warn!(run_id, error = %e, "cannot read run before canceling");
            return;
        }
    };
    if !run.actions.is_cancelable {
        info!(run_id, status = %run.status, "run is no longer cancelable");
        return;
    }
    match runs.cancel_run(run_id).await {
        Ok(()) => info!(run_id, "remote run canceled"),
        Err(e) => warn!(run_id, error = %e, "failed to cancel remote run"),
    }
}
