//! Application service — remote apply use-case.
//!
//! Imports only from `crate::domain` and `crate::application`.
//! All I/O is routed through injected port traits.
//!
//! Stages run strictly in order: preflight, plan resolution, confirmation,
//! approval, pre-apply task stages, run polling, log streaming. Any stage
//! may end the operation early; the most recent run snapshot is always
//! handed back with the result.

use cloud_apply_types::{Run, RunStatus, Workspace};
use tracing::{info, warn};

use crate::application::ports::{Confirmer, LogRenderer, OutputSink, RemoteBackend, RunService};
use crate::application::services::plan_source::{self, Resolution};
use crate::application::services::{apply_logs, apply_trigger, confirmation, run_poller, task_stages};
use crate::application::signals::Signals;
use crate::domain::config::BackendConfig;
use crate::domain::confirmation::Confirmation;
use crate::domain::error::{ApplyError, Interrupt};
use crate::domain::operation::Operation;
use crate::domain::preflight::check_preflight;

/// Settings and optional presentation capabilities for one apply.
pub struct ApplyContext<'a> {
    /// Backend identity used for bookmark checks and run URLs.
    pub config: &'a BackendConfig,
    /// Interactive input is enabled.
    pub input: bool,
    /// Requested parallelism; anything but the default is rejected.
    pub parallelism: u32,
    /// Interactive output, absent in non-interactive mode.
    pub output: Option<&'a dyn OutputSink>,
    /// Structured log renderer. Structured log lines are dropped without one.
    pub renderer: Option<&'a dyn LogRenderer>,
}

/// How an apply operation ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The run reached a terminal status after the apply stage.
    Finished(RunStatus),
    /// The plan found nothing to change.
    NoChanges,
    /// The plan was canceled or errored.
    PlanEnded(RunStatus),
    /// The run cannot be confirmed, for example because a mandatory policy
    /// failed.
    NotConfirmable,
    /// The user declined the apply.
    Declined,
    /// The run was discarded, canceled or errored elsewhere while awaiting
    /// confirmation.
    EndedElsewhere(RunStatus),
}

/// Result of an apply, together with the latest run snapshot.
#[derive(Debug)]
pub struct ApplyReport {
    /// Latest snapshot obtained, if any run was read or created.
    pub run: Option<Run>,
    pub result: Result<ApplyOutcome, ApplyError>,
}

/// Drive one remote apply from preflight to streamed logs.
///
/// At most one apply-approval call is issued.
pub async fn apply(
    remote: &impl RemoteBackend,
    confirmer: &impl Confirmer,
    ctx: &ApplyContext<'_>,
    op: &Operation,
    ws: &Workspace,
    signals: &Signals,
) -> ApplyReport {
    info!(workspace = %ws.name, "starting apply operation");

    let mut latest = None;
    let result = drive(remote, confirmer, ctx, op, ws, &mut latest, signals).await;

    if let (Err(ApplyError::Interrupted(Interrupt::Canceled)), Some(run)) = (&result, &latest) {
        run_poller::cancel_if_pending(remote, &run.id).await;
    }

    ApplyReport {
        run: latest,
        result,
    }
}

async fn drive(
    remote: &impl RemoteBackend,
    confirmer: &impl Confirmer,
    ctx: &ApplyContext<'_>,
    op: &Operation,
    ws: &Workspace,
    latest: &mut Option<Run>,
    signals: &Signals,
) -> Result<ApplyOutcome, ApplyError> {
    let warnings = check_preflight(op, ws, ctx.parallelism)?;
    for diag in &warnings {
        warn!(summary = %diag.summary, "{}", diag.detail);
    }

    let (run, must_confirm) = match plan_source::resolve(remote, ctx, op, ws, latest, signals).await? {
        Resolution::Finished { run, outcome } => {
            *latest = Some(run);
            return Ok(outcome);
        }
        Resolution::Proceed { run, must_confirm } => (run, must_confirm),
    };

    let answer = confirmation::gate(confirmer, ctx, op, &run, must_confirm, signals).await?;
    match answer {
        Confirmation::Declined => {
            discard_declined(remote, &run).await;
            return Ok(ApplyOutcome::Declined);
        }
        Confirmation::Ended(status) => {
            info!(run_id = %run.id, %status, "run ended before it was approved");
            return Ok(ApplyOutcome::EndedElsewhere(status));
        }
        Confirmation::Confirmed | Confirmation::AlreadyApproved => {}
    }

    apply_trigger::approve(remote, op, &run, answer, signals).await?;
    task_stages::wait_pre_apply(remote, &run, signals).await?;

    let run = run_poller::poll_to_terminal(remote, &run, signals).await?;
    *latest = Some(run.clone());

    apply_logs::render_apply_logs(remote, ctx, &run, signals).await?;
    Ok(ApplyOutcome::Finished(run.status))
}

/// Discard a declined run so it does not block the workspace queue.
async fn discard_declined(runs: &impl RunService, run: &Run) {
    if !run.actions.is_discardable {
        return;
    }
    match runs.discard_run(&run.id).await {
        Ok(()) => info!(run_id = %run.id, "declined run discarded"),
        Err(e) => warn!(run_id = %run.id, error = %e, "failed to discard declined run"),
    }
}
