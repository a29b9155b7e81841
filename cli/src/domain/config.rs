//! Domain types and validators for backend configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;

#[allow(clippy::expect_used)] // Patterns are compile-time constants
static HOSTNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?)*(:[0-9]{1,5})?$")
        .expect("valid hostname pattern")
});

#[allow(clippy::expect_used)]
static ORGANIZATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid organization pattern"));

// ── Config schema ────────────────────────────────────────────────────────────

/// Backend configuration stored in `~/.cloud-apply/config.yaml`.
///
/// Injected into the apply core once; never read from ambient state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BackendConfig {
    /// Host name of the remote service, e.g. `app.example.com`.
    pub hostname: String,
    /// Organization that owns the target workspaces.
    pub organization: String,
    /// Seconds between run status reads while waiting.
    pub poll_interval_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            organization: String::new(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl BackendConfig {
    /// Apply command-line overrides on top of file values.
    #[must_use]
    pub fn with_overrides(mut self, hostname: Option<String>, organization: Option<String>) -> Self {
        if let Some(h) = hostname {
            self.hostname = h;
        }
        if let Some(o) = organization {
            self.organization = o;
        }
        self
    }

    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns the first invalid or missing field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_hostname(&self.hostname)?;
        validate_organization(&self.organization)?;
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a bare host name, optionally with a port.
///
/// # Errors
///
/// Returns an error if the host is empty or carries a scheme or path.
pub fn validate_hostname(hostname: &str) -> Result<(), ConfigError> {
    if hostname.is_empty() {
        return Err(ConfigError::Missing("hostname"));
    }
    if !HOSTNAME_RE.is_match(hostname) {
        return Err(ConfigError::InvalidHostname(hostname.to_string()));
    }
    Ok(())
}

/// Validates an organization name.
///
/// # Errors
///
/// Returns an error if the name is empty or contains disallowed characters.
pub fn validate_organization(organization: &str) -> Result<(), ConfigError> {
    if organization.is_empty() {
        return Err(ConfigError::Missing("organization"));
    }
    if !ORGANIZATION_RE.is_match(organization) {
        return Err(ConfigError::InvalidOrganization(organization.to_string()));
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
