//! Application service — configuration use-cases.

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::{BackendConfig, validate_hostname, validate_organization};
use crate::domain::error::ConfigError;

/// Settings accepted by `config set`.
pub const VALID_CONFIG_KEYS: &[&str] = &["hostname", "organization", "poll_interval_secs"];

/// Load configuration, apply command-line overrides, and validate the result.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a value is invalid.
pub fn load_config(
    store: &impl ConfigStore,
    hostname: Option<String>,
    organization: Option<String>,
) -> Result<BackendConfig> {
    let config = store.load()?.with_overrides(hostname, organization);
    config.validate()?;
    Ok(config)
}

/// Validate and persist a single setting.
///
/// # Errors
///
/// Returns an error for unknown keys, invalid values, or storage failures.
pub fn set_config_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<BackendConfig> {
    let mut config = store.load()?;
    match key {
        "hostname" => {
            validate_hostname(value)?;
            value.clone_into(&mut config.hostname);
        }
        "organization" => {
            validate_organization(value)?;
            value.clone_into(&mut config.organization);
        }
        "poll_interval_secs" => {
            let secs: u64 = value
                .parse()
                .with_context(|| format!("invalid number of seconds: {value}"))?;
            if secs == 0 {
                return Err(ConfigError::InvalidPollInterval.into());
            }
            config.poll_interval_secs = secs;
        }
        _ => anyhow::bail!(
            "Unknown setting: {key}\n\nValid settings: {}",
            VALID_CONFIG_KEYS.join(", ")
        ),
    }
    store.save(&config)?;
    Ok(config)
}
