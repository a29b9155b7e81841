//! Application service — decide between resuming a saved plan and planning
//! afresh.
//!
//! Imports only from `crate::domain` and `crate::application`.

use cloud_apply_types::{Run, RunStatus, Workspace};
use tracing::{debug, trace};

use crate::application::ports::{RemoteBackend, RunService};
use crate::application::services::apply::{ApplyContext, ApplyOutcome};
use crate::application::services::guarded_call;
use crate::application::signals::Signals;
use crate::domain::diagnostics::Diagnostics;
use crate::domain::error::ApplyError;
use crate::domain::operation::{Operation, SavedPlanBookmark};
use crate::domain::saved_plan::{hostname_mismatch, run_url, unusable_saved_plan, workspace_mismatch};

pub const APPLY_DEFAULT_HEADER: &str = "\
Running apply in the remote backend. Output will stream here. Pressing Ctrl-C
will cancel the remote apply if it's still pending. If the apply started it
will stop streaming the logs, but will not stop the apply running remotely.

Preparing the remote apply...";

pub const APPLY_SAVED_HEADER: &str = "\
Running apply in the remote backend. Output will stream here. Pressing Ctrl-C
will stop streaming the logs, but will not stop the apply running remotely.

Preparing the remote apply...";

/// Header line pointing at the run in a browser.
#[must_use]
pub fn run_header(url: &str) -> String {
    format!("To view this run in a browser, visit:\n{url}")
}

/// Where the run to apply comes from, and whether to keep going.
#[derive(Debug)]
pub enum Resolution {
    /// Continue to confirmation and approval. `run` is a fresh read.
    Proceed { run: Run, must_confirm: bool },
    /// The operation is complete without an apply.
    Finished { run: Run, outcome: ApplyOutcome },
}

/// Run snapshot returned by the plan trigger.
///
/// Only fields the plan phase settles are exposed. Anything that decides
/// approval must come from [`PlannedRun::refresh`].
#[derive(Debug)]
pub struct PlannedRun(Run);

impl PlannedRun {
    #[must_use]
    pub fn new(run: Run) -> Self {
        Self(run)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.0.id
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.0.has_changes
    }

    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.0.status
    }

    /// Read the run again to get its current status and actions.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or a signal fires.
    pub async fn refresh(
        self,
        runs: &impl RunService,
        signals: &Signals,
    ) -> Result<Run, ApplyError> {
        guarded_call(signals, "Failed to retrieve run", runs.read_run(&self.0.id, false)).await
    }
}

/// Resolve the run to apply.
///
/// `latest` always holds the most recent snapshot obtained, so callers can
/// inspect it even when resolution fails.
///
/// # Errors
///
/// Returns diagnostics for unusable saved plans, or wrapped remote failures.
pub async fn resolve(
    remote: &impl RemoteBackend,
    ctx: &ApplyContext<'_>,
    op: &Operation,
    ws: &Workspace,
    latest: &mut Option<Run>,
    signals: &Signals,
) -> Result<Resolution, ApplyError> {
    match op.plan_file.cloud() {
        Some(bookmark) => resume_saved(remote, ctx, op, ws, bookmark, latest, signals).await,
        None => plan_fresh(remote, ctx, op, ws, latest, signals).await,
    }
}

async fn resume_saved(
    remote: &impl RemoteBackend,
    ctx: &ApplyContext<'_>,
    op: &Operation,
    ws: &Workspace,
    bookmark: &SavedPlanBookmark,
    latest: &mut Option<Run>,
    signals: &Signals,
) -> Result<Resolution, ApplyError> {
    trace!(run_id = %bookmark.run_id, "loading saved cloud plan for apply");

    // Checked before any request for a more actionable error than a 404.
    if bookmark.hostname != ctx.config.hostname {
        return Err(Diagnostics::from(hostname_mismatch(
            &bookmark.hostname,
            &ctx.config.hostname,
        ))
        .into());
    }

    let run = guarded_call(
        signals,
        "Failed to retrieve saved plan run",
        remote.read_run(&bookmark.run_id, true),
    )
    .await?;
    *latest = Some(run.clone());

    let Some(run_ws) = run.workspace.as_ref() else {
        return Err(ApplyError::remote(
            "Failed to retrieve saved plan run",
            anyhow::anyhow!("run {} was returned without its workspace", run.id),
        ));
    };

    if run_ws.id != ws.id {
        let url = run_url(&ctx.config.hostname, &run_ws.organization, &run_ws.name, &run.id);
        return Err(Diagnostics::from(workspace_mismatch(ws, run_ws, &url)).into());
    }

    if !run.actions.is_confirmable {
        let url = run_url(
            &ctx.config.hostname,
            &ctx.config.organization,
            &op.workspace,
            &run.id,
        );
        return Err(Diagnostics::from(unusable_saved_plan(run.status, &url)).into());
    }

    if let Some(out) = ctx.output {
        out.header(APPLY_SAVED_HEADER);
        out.header(&run_header(&run_url(
            &ctx.config.hostname,
            &ctx.config.organization,
            &run_ws.name,
            &run.id,
        )));
    }

    Ok(Resolution::Proceed {
        run,
        must_confirm: false,
    })
}

async fn plan_fresh(
    remote: &impl RemoteBackend,
    ctx: &ApplyContext<'_>,
    op: &Operation,
    ws: &Workspace,
    latest: &mut Option<Run>,
    signals: &Signals,
) -> Result<Resolution, ApplyError> {
    trace!(workspace = %ws.name, "running new cloud plan for apply");

    if let Some(out) = ctx.output {
        out.header(APPLY_DEFAULT_HEADER);
    }

    let created =
        guarded_call(signals, "Failed to create the plan", remote.create_run(op, ws)).await?;
    // Set before the wait; a cancel during the plan must reach this run.
    *latest = Some(created.clone());
    if let Some(out) = ctx.output {
        out.header(&run_header(&run_url(
            &ctx.config.hostname,
            &ctx.config.organization,
            &ws.name,
            &created.id,
        )));
    }

    let planned = PlannedRun::new(
        guarded_call(
            signals,
            "Failed to wait for the plan",
            remote.wait_for_plan(&created, signals),
        )
        .await?,
    );
    *latest = Some(planned.0.clone());

    // Failed plans also carry `has_changes = false`.
    if matches!(
        planned.status(),
        RunStatus::Canceled | RunStatus::ForceCanceled | RunStatus::Errored
    ) {
        debug!(run_id = planned.id(), status = %planned.status(), "plan did not complete");
        let status = planned.status();
        return Ok(Resolution::Finished {
            run: planned.0,
            outcome: ApplyOutcome::PlanEnded(status),
        });
    }
    if !planned.has_changes() {
        debug!(run_id = planned.id(), "plan has no changes");
        return Ok(Resolution::Finished {
            run: planned.0,
            outcome: ApplyOutcome::NoChanges,
        });
    }

    let run = planned.refresh(remote, signals).await?;
    *latest = Some(run.clone());

    if !op.auto_approve && !run.actions.is_confirmable {
        debug!(run_id = %run.id, status = %run.status, "run is not confirmable");
        return Ok(Resolution::Finished {
            run,
            outcome: ApplyOutcome::NotConfirmable,
        });
    }

    let must_confirm = op.ui_attached && !op.auto_approve;
    Ok(Resolution::Proceed { run, must_confirm })
}
