//! Application service — wait on pre-apply task gates.

use cloud_apply_types::{Run, Stage};
use tracing::info;

use crate::application::ports::TaskStageService;
use crate::application::services::guarded_call;
use crate::application::signals::Signals;
use crate::domain::error::ApplyError;

/// Fetch the run's task stages once and wait on the pre-apply stage if any.
///
/// Stages are computed once per run by the service, so a single read serves
/// every gate check of the operation.
///
/// # Errors
///
/// Returns a wrapped error if fetching or waiting fails, or the interrupt.
pub async fn wait_pre_apply(
    stages: &impl TaskStageService,
    run: &Run,
    signals: &Signals,
) -> Result<(), ApplyError> {
    let task_stages = guarded_call(
        signals,
        "Failed to retrieve task stages",
        stages.task_stages(&run.id),
    )
    .await?;

    if let Some(stage) = task_stages.get(&Stage::PreApply) {
        info!(run_id = %run.id, stage_id = %stage.id, "waiting on pre-apply tasks");
        guarded_call(
            signals,
            "Failed waiting on pre-apply tasks",
            stages.wait_task_stage(&stage.id, signals),
        )
        .await?;
    }
    Ok(())
}
