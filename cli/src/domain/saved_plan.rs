//! Diagnostics for saved plans that cannot be applied here.

use cloud_apply_types::{RunStatus, Workspace, WorkspaceRef};

use crate::domain::diagnostics::Diagnostic;

/// Browser URL of a run.
#[must_use]
pub fn run_url(hostname: &str, organization: &str, workspace: &str, run_id: &str) -> String {
    format!("https://{hostname}/app/{organization}/{workspace}/runs/{run_id}")
}

/// The bookmark was created against another service instance.
#[must_use]
pub fn hostname_mismatch(bookmark_host: &str, configured_host: &str) -> Diagnostic {
    Diagnostic::error(
        "Saved plan is for a different hostname",
        format!(
            "The given saved plan refers to a run on {bookmark_host}, but the currently \
             configured remote backend instance is {configured_host}."
        ),
    )
}

/// The bookmarked run belongs to another workspace.
#[must_use]
pub fn workspace_mismatch(target: &Workspace, run_ws: &WorkspaceRef, url: &str) -> Diagnostic {
    Diagnostic::error(
        "Saved plan is for a different workspace",
        format!(
            "The given saved plan does not refer to a run in the current workspace ({}/{}), \
             so it cannot currently be applied. For more details, view this run in a browser at:\n{url}",
            target.organization, target.name
        ),
    )
}

/// Explain why a saved plan in `status` cannot be confirmed.
#[must_use]
pub fn unusable_saved_plan(status: RunStatus, url: &str) -> Diagnostic {
    let (summary, reason) = match status {
        RunStatus::Applied => (
            "Saved plan is already applied",
            "The given plan file was already successfully applied, and cannot be applied again.",
        ),
        RunStatus::Applying | RunStatus::ApplyQueued | RunStatus::Confirmed => (
            "Saved plan is already confirmed",
            "The given plan file is already being applied, and cannot be applied again.",
        ),
        RunStatus::Canceled => (
            "Saved plan is canceled",
            "The given plan file can no longer be applied because the run was canceled via \
             the remote backend UI or API.",
        ),
        RunStatus::Discarded => (
            "Saved plan is discarded",
            "The given plan file can no longer be applied; either another run was applied \
             first, or a user discarded it via the remote backend UI or API.",
        ),
        RunStatus::Errored => (
            "Saved plan is errored",
            "The given plan file refers to a plan that had errors and did not complete \
             successfully. It cannot be applied.",
        ),
        // A saved plan is never plan-only, so this always means no changes.
        RunStatus::PlannedAndFinished => (
            "Saved plan has no changes",
            "The given plan file contains no changes, so it cannot be applied.",
        ),
        RunStatus::PolicyOverride => (
            "Saved plan requires policy override",
            "The given plan file has soft policy failures, and cannot be applied until a user \
             with appropriate permissions overrides the policy check.",
        ),
        _ => (
            "Saved plan cannot be applied",
            "The remote backend cannot apply the given plan file. This may mean the plan and \
             checks have not yet completed, or may indicate another problem.",
        ),
    };

    Diagnostic::error(
        summary,
        format!("{reason} For more details, view this run in a browser at:\n{url}"),
    )
}
