//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod confirmation;
pub mod diagnostics;
pub mod error;
pub mod log_line;
pub mod operation;
pub mod preflight;
pub mod saved_plan;

pub use config::BackendConfig;
pub use confirmation::{ConfirmPrompt, Confirmation};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{ApplyError, ConfigError, Interrupt, PlanFileError};
pub use log_line::{APPLY_LOG_BANNER_LINES, ApplyLogFilter, LogLine};
pub use operation::{Operation, PlanFile, PlanMode, SavedPlanBookmark};
pub use preflight::{DEFAULT_PARALLELISM, check_preflight};
