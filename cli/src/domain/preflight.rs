//! Static preconditions checked before any remote call.

use cloud_apply_types::Workspace;

use crate::domain::diagnostics::{Diagnostic, Diagnostics};
use crate::domain::operation::Operation;

/// Parallelism the remote service always runs with.
pub const DEFAULT_PARALLELISM: u32 = 10;

/// Check every precondition of a remote apply.
///
/// All checks run; findings accumulate in one aggregate. Permission and VCS
/// failures are reported alongside the rest rather than short-circuiting.
///
/// # Errors
///
/// Returns the aggregate when it contains at least one error.
pub fn check_preflight(
    op: &Operation,
    ws: &Workspace,
    parallelism: u32,
) -> Result<Diagnostics, Diagnostics> {
    let mut diags = Diagnostics::new();

    if !ws.permissions.can_apply() {
        diags.push(Diagnostic::error(
            "Insufficient rights to apply changes",
            "The provided credentials have insufficient rights to apply changes. In order \
             to apply changes at least write permissions on the workspace are required.",
        ));
    }

    if ws.vcs_repo.is_some() {
        diags.push(Diagnostic::error(
            "Apply not allowed for workspaces with a VCS connection",
            "A workspace that is connected to a VCS requires the VCS-driven workflow \
             to ensure that the VCS remains the single source of truth.",
        ));
    }

    if parallelism != DEFAULT_PARALLELISM {
        diags.push(Diagnostic::error(
            "Custom parallelism values are currently not supported",
            "The remote backend does not support setting a custom parallelism value at this time.",
        ));
    }

    if op.plan_file.is_local() {
        diags.push(Diagnostic::error(
            "Applying a saved local plan is not supported",
            "The remote backend can apply a saved cloud plan, or create a new plan when \
             configuration is present. It cannot apply a saved local plan.",
        ));
    }

    if !op.has_config && !op.is_destroy() {
        diags.push(Diagnostic::error(
            "No configuration files found",
            "Apply requires configuration to be present. Applying without a configuration \
             would mark everything for destruction, which is normally not what is desired. \
             If you would like to destroy everything, run 'cloud-apply apply --destroy' which \
             does not require any configuration files.",
        ));
    }

    if !op.excludes.is_empty() {
        diags.push(Diagnostic::error(
            "-exclude option is not supported",
            "The -exclude option is not currently supported for remote plans.",
        ));
    }

    diags.into_result()
}
