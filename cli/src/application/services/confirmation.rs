//! Application service — decide if and how to ask for apply approval.

use cloud_apply_types::Run;
use tracing::debug;

use crate::application::ports::Confirmer;
use crate::application::services::apply::ApplyContext;
use crate::application::services::guarded_call;
use crate::application::signals::Signals;
use crate::domain::confirmation::{ConfirmPrompt, Confirmation};
use crate::domain::error::ApplyError;
use crate::domain::operation::Operation;

/// Ask for approval when `must_confirm` is set.
///
/// Without a required prompt the gate passes as [`Confirmation::Confirmed`]
/// and prints a blank separator line instead.
///
/// # Errors
///
/// Returns [`ApplyError::NeedsUiConfirmation`] when a prompt is required but
/// input is disabled, or a wrapped error when the prompt itself fails.
pub async fn gate(
    confirmer: &impl Confirmer,
    ctx: &ApplyContext<'_>,
    op: &Operation,
    run: &Run,
    must_confirm: bool,
    signals: &Signals,
) -> Result<Confirmation, ApplyError> {
    if !must_confirm {
        if let Some(out) = ctx.output {
            out.line("");
        }
        return Ok(Confirmation::Confirmed);
    }
    if !ctx.input {
        return Err(ApplyError::NeedsUiConfirmation);
    }

    let prompt = ConfirmPrompt::for_operation(op);
    let answer = guarded_call(
        signals,
        "Failed to read apply confirmation",
        confirmer.confirm(&prompt, run, signals),
    )
    .await?;
    debug!(run_id = %run.id, ?answer, "confirmation answered");
    Ok(answer)
}
