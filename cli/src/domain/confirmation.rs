//! Apply confirmation prompt and its outcome.

use cloud_apply_types::{Run, RunStatus};

use crate::domain::operation::{Operation, PlanMode};

/// The only answer that approves an apply.
pub const REQUIRED_ANSWER: &str = "yes";

/// Outcome of asking for apply approval.
///
/// Failures travel on the `Err` side of the confirmer's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
    /// The run was approved elsewhere (for example a policy override in the
    /// UI) while the prompt was open. No approval call must follow.
    AlreadyApproved,
    /// The run reached a final status elsewhere (discarded or canceled from
    /// the UI, for example) while the prompt was open. Nothing is applied.
    Ended(RunStatus),
}

impl Confirmation {
    /// Interpret typed input; only the exact required word confirms.
    #[must_use]
    pub fn from_answer(answer: &str, required: &str) -> Self {
        if answer.trim() == required {
            Self::Confirmed
        } else {
            Self::Declined
        }
    }
}

/// Whether `run` has moved past confirmation without this client approving.
#[must_use]
pub fn approved_elsewhere(run: &Run) -> bool {
    !run.actions.is_confirmable
        && (run.status.is_past_confirmation() || run.status == RunStatus::Applied)
}

/// The final status of a run that ended without being applied, if it has.
#[must_use]
pub fn ended_elsewhere(run: &Run) -> Option<RunStatus> {
    matches!(
        run.status,
        RunStatus::Discarded | RunStatus::Canceled | RunStatus::ForceCanceled | RunStatus::Errored
    )
    .then_some(run.status)
}

/// Text shown when asking for approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub query: String,
    pub description: String,
    pub required: &'static str,
}

impl ConfirmPrompt {
    /// Build the mode-specific prompt for `op`.
    #[must_use]
    pub fn for_operation(op: &Operation) -> Self {
        let ws = &op.workspace;
        let (query, description) = match op.plan_mode {
            PlanMode::Destroy => (
                format!("\nDo you really want to destroy all resources in workspace \"{ws}\"?"),
                "All managed infrastructure shown above will be destroyed.\n\
                 There is no undo. Only 'yes' will be accepted to confirm."
                    .to_string(),
            ),
            PlanMode::Normal => (
                format!("\nDo you want to perform these actions in workspace \"{ws}\"?"),
                "The actions described above will be performed.\n\
                 Only 'yes' will be accepted to approve."
                    .to_string(),
            ),
        };
        Self {
            query,
            description,
            required: REQUIRED_ANSWER,
        }
    }
}
