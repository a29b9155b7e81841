//! Application service — issue the apply approval.

use cloud_apply_types::Run;
use tracing::{debug, info};

use crate::application::ports::RunService;
use crate::application::services::guarded_call;
use crate::application::signals::Signals;
use crate::domain::confirmation::Confirmation;
use crate::domain::error::ApplyError;
use crate::domain::operation::Operation;

/// Approve the apply unless the service already will.
///
/// Auto-approved runs apply on their own, and an out-of-band approval has
/// already been recorded; a second approval call is never issued.
/// Returns whether the approval call was made.
///
/// # Errors
///
/// Returns a wrapped error if the approval call fails.
pub async fn approve(
    runs: &impl RunService,
    op: &Operation,
    run: &Run,
    confirmation: Confirmation,
    signals: &Signals,
) -> Result<bool, ApplyError> {
    if op.auto_approve || confirmation == Confirmation::AlreadyApproved {
        debug!(run_id = %run.id, auto_approve = op.auto_approve, "skipping apply approval");
        return Ok(false);
    }
    guarded_call(
        signals,
        "Failed to approve the apply command",
        runs.apply_run(&run.id),
    )
    .await?;
    info!(run_id = %run.id, "apply approved");
    Ok(true)
}
