//! Application services — use-case orchestration.
//!
//! Each service module implements one stage of the remote apply by composing
//! domain logic with port trait calls. Services import only from
//! `crate::domain` and `crate::application` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod apply;
pub mod apply_logs;
pub mod apply_trigger;
pub mod config_service;
pub mod confirmation;
pub mod plan_source;
pub mod run_poller;
pub mod task_stages;

use std::future::Future;

use crate::application::signals::Signals;
use crate::domain::error::ApplyError;

/// Await a collaborator call under both signals, prefixing failures with
/// `context`.
pub(crate) async fn guarded_call<T>(
    signals: &Signals,
    context: &'static str,
    fut: impl Future<Output = anyhow::Result<T>>,
) -> Result<T, ApplyError> {
    signals
        .guard(fut)
        .await?
        .map_err(|e| ApplyError::remote(context, e))
}
