use serde::{Deserialize, Serialize};

use crate::workspace::WorkspaceRef;

/// Lifecycle status of a remote run, as reported by the service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Fetching,
    FetchingCompleted,
    PrePlanRunning,
    PrePlanCompleted,
    Queuing,
    PlanQueued,
    Planning,
    Planned,
    CostEstimating,
    CostEstimated,
    PolicyChecking,
    PolicyOverride,
    PolicySoftFailed,
    PolicyChecked,
    Confirmed,
    PostPlanRunning,
    PostPlanCompleted,
    PlannedAndFinished,
    PlannedAndSaved,
    PreApplyRunning,
    PreApplyCompleted,
    ApplyQueued,
    Applying,
    Applied,
    Discarded,
    Errored,
    Canceled,
    ForceCanceled,
    /// Any status this client does not know about yet.
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// The run will not change status again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Applied
                | Self::Errored
                | Self::Canceled
                | Self::ForceCanceled
                | Self::Discarded
                | Self::PlannedAndFinished
        )
    }

    /// Held on a policy result that needs a person to override or accept it.
    #[must_use]
    pub fn is_policy_hold(self) -> bool {
        matches!(self, Self::PolicyOverride | Self::PolicySoftFailed)
    }

    /// The apply phase was confirmed and is queued or running.
    #[must_use]
    pub fn is_past_confirmation(self) -> bool {
        matches!(
            self,
            Self::Confirmed
                | Self::PreApplyRunning
                | Self::PreApplyCompleted
                | Self::ApplyQueued
                | Self::Applying
        )
    }

    /// Wire name of the status, e.g. `"apply_queued"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::FetchingCompleted => "fetching_completed",
            Self::PrePlanRunning => "pre_plan_running",
            Self::PrePlanCompleted => "pre_plan_completed",
            Self::Queuing => "queuing",
            Self::PlanQueued => "plan_queued",
            Self::Planning => "planning",
            Self::Planned => "planned",
            Self::CostEstimating => "cost_estimating",
            Self::CostEstimated => "cost_estimated",
            Self::PolicyChecking => "policy_checking",
            Self::PolicyOverride => "policy_override",
            Self::PolicySoftFailed => "policy_soft_failed",
            Self::PolicyChecked => "policy_checked",
            Self::Confirmed => "confirmed",
            Self::PostPlanRunning => "post_plan_running",
            Self::PostPlanCompleted => "post_plan_completed",
            Self::PlannedAndFinished => "planned_and_finished",
            Self::PlannedAndSaved => "planned_and_saved",
            Self::PreApplyRunning => "pre_apply_running",
            Self::PreApplyCompleted => "pre_apply_completed",
            Self::ApplyQueued => "apply_queued",
            Self::Applying => "applying",
            Self::Applied => "applied",
            Self::Discarded => "discarded",
            Self::Errored => "errored",
            Self::Canceled => "canceled",
            Self::ForceCanceled => "force_canceled",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions the caller's credentials may currently perform on a run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunActions {
    #[serde(default)]
    pub is_confirmable: bool,
    #[serde(default)]
    pub is_cancelable: bool,
    #[serde(default)]
    pub is_discardable: bool,
}

/// Reference to the apply sub-resource of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplyRef {
    pub id: String,
}

/// Snapshot of a remote run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub has_changes: bool,
    #[serde(default)]
    pub is_destroy: bool,
    #[serde(default)]
    pub actions: RunActions,
    /// Present when the run was read with its workspace included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<WorkspaceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply: Option<ApplyRef>,
}

impl Run {
    /// A bare snapshot with no changes, actions, workspace, or apply.
    #[must_use]
    pub fn new(id: impl Into<String>, status: RunStatus) -> Self {
        Self {
            id: id.into(),
            status,
            has_changes: false,
            is_destroy: false,
            actions: RunActions::default(),
            workspace: None,
            apply: None,
        }
    }

    /// Nothing more happens in the plan phase without a decision.
    ///
    /// `planned` and `cost_estimated` are passed through on the way to later
    /// checks, so a run in those states only counts once it is confirmable.
    #[must_use]
    pub fn is_plan_settled(&self) -> bool {
        self.actions.is_confirmable
            || self.status.is_terminal()
            || self.status.is_policy_hold()
            || self.status.is_past_confirmation()
            || self.status == RunStatus::PlannedAndSaved
    }
}

/// Kind of a task stage gate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    PrePlan,
    PostPlan,
    PreApply,
    PostApply,
    #[serde(other)]
    Unknown,
}

/// Status of a task stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStageStatus {
    Pending,
    Running,
    Passed,
    Failed,
    AwaitingOverride,
    Canceled,
    Errored,
    Unreachable,
    Overridden,
    #[serde(other)]
    Unknown,
}

impl TaskStageStatus {
    #[must_use]
    pub fn is_settled(self) -> bool {
        !matches!(
            self,
            Self::Pending | Self::Running | Self::AwaitingOverride | Self::Unknown
        )
    }
}

/// A gate the service evaluates around a run phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskStage {
    pub id: String,
    pub stage: Stage,
    pub status: TaskStageStatus,
}
