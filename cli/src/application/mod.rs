//! Application layer — port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain` — never on `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod ports;
pub mod services;
pub mod signals;

pub use ports::{
    ApplyLogSource, ConfigStore, Confirmer, LogRenderer, LogStream, OutputSink, PlanTrigger,
    RemoteBackend, RunService, RunWaiter, TaskStageService,
};
pub use signals::Signals;
