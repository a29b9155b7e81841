//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! `ApplyError` is the terminal error of one apply operation; the others
//! convert to `anyhow::Error` via the `?` operator.

use std::fmt;

use thiserror::Error;

use crate::domain::diagnostics::Diagnostics;

// ── Interrupts ────────────────────────────────────────────────────────────────

/// Which cancellation signal ended a blocking wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// Local waiting stopped; remote execution continues.
    Stopped,
    /// The remote run itself was asked to cancel.
    Canceled,
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => f.write_str("stopped waiting on the remote run"),
            Self::Canceled => f.write_str("canceled"),
        }
    }
}

// ── Apply errors ──────────────────────────────────────────────────────────────

/// Terminal failure of an apply operation.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// Precondition or saved-plan resolution failure.
    #[error("{0}")]
    Diagnostics(Diagnostics),

    /// Confirmation is required but interactive input is disabled.
    #[error(
        "Apply not confirmed: confirmation is required but input is disabled. \
         Re-run with interactive input or pass --auto-approve."
    )]
    NeedsUiConfirmation,

    /// A call to the remote service failed.
    #[error("{context}: {cause:#}")]
    Remote {
        context: &'static str,
        cause: anyhow::Error,
    },

    /// The structured log renderer rejected a record.
    #[error("Failed to render apply logs: {0:#}")]
    Render(anyhow::Error),

    /// A cancellation signal fired while waiting.
    #[error("Operation interrupted: {0}")]
    Interrupted(Interrupt),
}

impl ApplyError {
    /// Wrap a collaborator failure with a short human-readable prefix.
    #[must_use]
    pub fn remote(context: &'static str, cause: anyhow::Error) -> Self {
        Self::Remote { context, cause }
    }

    /// The diagnostics carried by this error, if any.
    #[must_use]
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Self::Diagnostics(diags) => Some(diags),
            _ => None,
        }
    }

    /// The interrupt that ended the operation, if any.
    #[must_use]
    pub fn interrupt(&self) -> Option<Interrupt> {
        match self {
            Self::Interrupted(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<Diagnostics> for ApplyError {
    fn from(diags: Diagnostics) -> Self {
        Self::Diagnostics(diags)
    }
}

impl From<Interrupt> for ApplyError {
    fn from(interrupt: Interrupt) -> Self {
        Self::Interrupted(interrupt)
    }
}

// ── Plan file errors ──────────────────────────────────────────────────────────

/// Errors reading a saved plan reference.
#[derive(Debug, Error)]
pub enum PlanFileError {
    #[error("Saved plan bookmark uses unsupported format version {0}; upgrade cloud-apply.")]
    UnsupportedFormat(u64),

    #[error("Saved plan bookmark is missing its {0}.")]
    MissingField(&'static str),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to backend configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No {0} configured. Set it in the config file or pass --{0}.")]
    Missing(&'static str),

    #[error("Invalid hostname '{0}': expected a bare host name such as app.example.com")]
    InvalidHostname(String),

    #[error("Invalid organization '{0}': only letters, digits, '-' and '_' are allowed")]
    InvalidOrganization(String),

    #[error("poll_interval_secs must be at least 1")]
    InvalidPollInterval,
}
