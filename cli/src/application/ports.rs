//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and the shared types crate —
//! never from `crate::infra`, `crate::commands`, or `crate::output`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::pin::Pin;

use anyhow::Result;
use cloud_apply_types::{JsonLog, Run, Stage, TaskStage, Workspace};
use tokio::io::AsyncRead;

use crate::application::signals::Signals;
use crate::domain::config::BackendConfig;
use crate::domain::confirmation::{ConfirmPrompt, Confirmation};
use crate::domain::operation::Operation;

// ── Value Types ───────────────────────────────────────────────────────────────

/// Byte stream of a remote log.
pub type LogStream = Pin<Box<dyn AsyncRead + Send>>;

// ── Remote Run Ports ──────────────────────────────────────────────────────────

/// Reads and mutates individual runs.
#[allow(async_fn_in_trait)]
pub trait RunService {
    /// Read a run, optionally with its workspace embedded.
    async fn read_run(&self, run_id: &str, include_workspace: bool) -> Result<Run>;
    /// Approve the apply phase of a confirmable run.
    async fn apply_run(&self, run_id: &str) -> Result<()>;
    /// Discard a run that is waiting for confirmation.
    async fn discard_run(&self, run_id: &str) -> Result<()>;
    /// Cancel a run that has not started applying.
    async fn cancel_run(&self, run_id: &str) -> Result<()>;
}

/// Starts a new plan for a workspace.
///
/// Creating the run and waiting on it are separate calls so the caller
/// knows the run id while the plan is still in progress.
#[allow(async_fn_in_trait)]
pub trait PlanTrigger {
    /// Create a run for `op` and return as soon as the service accepts it.
    async fn create_run(&self, op: &Operation, ws: &Workspace) -> Result<Run>;
    /// Poll until [`Run::is_plan_settled`] holds.
    ///
    /// The returned snapshot reflects the plan phase only; confirmability
    /// must be read again afterwards.
    async fn wait_for_plan(&self, run: &Run, signals: &Signals) -> Result<Run>;
}

/// Task-stage gates evaluated around run phases.
#[allow(async_fn_in_trait)]
pub trait TaskStageService {
    /// All task stages of a run in one round trip.
    async fn task_stages(&self, run_id: &str) -> Result<HashMap<Stage, TaskStage>>;
    /// Block until the stage passes, failing if it does not.
    async fn wait_task_stage(&self, stage_id: &str, signals: &Signals) -> Result<()>;
}

/// Waits for runs to finish.
#[allow(async_fn_in_trait)]
pub trait RunWaiter {
    /// Poll until the run is terminal and return the final snapshot.
    ///
    /// Implementations own the poll interval and report every status change.
    async fn wait_for_run(&self, run: &Run, signals: &Signals) -> Result<Run>;
}

/// Opens apply logs.
#[allow(async_fn_in_trait)]
pub trait ApplyLogSource {
    /// Newline-delimited log of an apply.
    async fn apply_logs(&self, apply_id: &str) -> Result<LogStream>;
}

/// Composite trait — any type implementing all remote ports is a `RemoteBackend`.
pub trait RemoteBackend:
    RunService + PlanTrigger + TaskStageService + RunWaiter + ApplyLogSource
{
}

/// Blanket implementation: any type implementing all remote ports is a `RemoteBackend`.
impl<T> RemoteBackend for T where
    T: RunService + PlanTrigger + TaskStageService + RunWaiter + ApplyLogSource
{
}

// ── Interaction Ports ─────────────────────────────────────────────────────────

/// Asks the user to approve an apply.
#[allow(async_fn_in_trait)]
pub trait Confirmer {
    /// Show `prompt` and wait for an answer.
    ///
    /// `run` lets implementations notice out-of-band approval and report
    /// [`Confirmation::AlreadyApproved`].
    async fn confirm(
        &self,
        prompt: &ConfirmPrompt,
        run: &Run,
        signals: &Signals,
    ) -> Result<Confirmation>;
}

/// Renders structured log records. Sync trait — no async needed.
pub trait LogRenderer {
    /// Render one record.
    fn render_log(&self, log: &JsonLog) -> Result<()>;
}

/// Interactive text output. Sync trait — no async needed.
pub trait OutputSink {
    /// Print a line verbatim.
    fn line(&self, text: &str);
    /// Print an emphasized, possibly multi-line, header.
    fn header(&self, text: &str);
}

// ── Configuration Port ────────────────────────────────────────────────────────

/// Abstracts backend configuration persistence.
pub trait ConfigStore {
    /// Load the configuration, returning defaults if none is stored.
    fn load(&self) -> Result<BackendConfig>;
    /// Persist the configuration.
    fn save(&self, config: &BackendConfig) -> Result<()>;
    /// Location of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}
