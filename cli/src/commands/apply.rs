//! `cloud-apply apply` — apply a workspace through the remote service.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use cloud_apply_types::{Run, RunStatus};

use crate::app::AppContext;
use crate::application::ports::{LogRenderer, OutputSink};
use crate::application::services::apply::{self, ApplyContext, ApplyOutcome};
use crate::application::services::config_service;
use crate::domain::config::BackendConfig;
use crate::domain::error::{ApplyError, Interrupt};
use crate::domain::operation::{Operation, PlanFile, PlanMode};
use crate::domain::preflight::DEFAULT_PARALLELISM;
use crate::domain::saved_plan::run_url;
use crate::infra::confirm::TerminalConfirmer;
use crate::infra::fs;
use crate::infra::remote::HttpRemote;
use crate::infra::signals::{INTERRUPTED_EXIT_CODE, process_signals};
use crate::output::HumanLogRenderer;

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "CLOUD_APPLY_TOKEN";

/// Arguments for the apply command.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Workspace to apply
    #[arg(short, long, env = "CLOUD_APPLY_WORKSPACE")]
    pub workspace: String,

    /// Apply a plan saved earlier instead of planning again
    #[arg(long, value_name = "PATH")]
    pub plan_file: Option<PathBuf>,

    /// Destroy all managed resources
    #[arg(long)]
    pub destroy: bool,

    /// Leave a resource address out of the run (repeatable)
    #[arg(long = "exclude", value_name = "ADDRESS")]
    pub excludes: Vec<String>,

    /// Skip interactive approval
    #[arg(long)]
    pub auto_approve: bool,

    /// Ask for input when needed
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
    pub input: bool,

    /// Concurrent operations; only the default is supported remotely
    #[arg(long, default_value_t = DEFAULT_PARALLELISM)]
    pub parallelism: u32,

    /// Remote service host, overriding the config file
    #[arg(long)]
    pub hostname: Option<String>,

    /// Organization, overriding the config file
    #[arg(long)]
    pub organization: Option<String>,
}

/// Run the apply command.
///
/// # Errors
///
/// Returns an error if setup fails before the apply starts, or if the apply
/// fails for a reason other than diagnostics or an interrupt.
pub async fn run(app: &AppContext, args: ApplyArgs) -> Result<ExitCode> {
    let config = config_service::load_config(
        &app.config_store,
        args.hostname.clone(),
        args.organization.clone(),
    )?;
    let token = std::env::var(TOKEN_ENV)
        .with_context(|| format!("missing API token; set {TOKEN_ENV}"))?;

    let op = build_operation(app, &args)?;
    let remote = HttpRemote::new(&config, token)?;
    let ws = remote
        .read_workspace(&config.organization, &op.workspace)
        .await?;

    let renderer = HumanLogRenderer::new(app.output.styles.clone());
    let output = app.ui_attached.then_some(&app.output as &dyn OutputSink);
    let ctx = ApplyContext {
        config: &config,
        input: args.input && app.ui_attached,
        parallelism: args.parallelism,
        output,
        renderer: Some(&renderer as &dyn LogRenderer),
    };
    let confirmer =
        TerminalConfirmer::new(&remote, Duration::from_secs(config.poll_interval_secs));
    let signals = process_signals();

    let report = apply::apply(&remote, &confirmer, &ctx, &op, &ws, &signals).await;
    report_outcome(app, &config, &op, report.run.as_ref(), report.result)
}

fn build_operation(app: &AppContext, args: &ApplyArgs) -> Result<Operation> {
    let plan_file = match &args.plan_file {
        Some(path) => fs::read_plan_file(path)?,
        None => PlanFile::None,
    };
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    Ok(Operation {
        workspace: args.workspace.clone(),
        plan_file,
        plan_mode: if args.destroy {
            PlanMode::Destroy
        } else {
            PlanMode::Normal
        },
        excludes: args.excludes.clone(),
        auto_approve: args.auto_approve,
        has_config: fs::has_config(&cwd)?,
        ui_attached: app.ui_attached,
    })
}

fn report_outcome(
    app: &AppContext,
    config: &BackendConfig,
    op: &Operation,
    run: Option<&Run>,
    result: Result<ApplyOutcome, ApplyError>,
) -> Result<ExitCode> {
    let out = &app.output;
    match result {
        Ok(ApplyOutcome::Finished(RunStatus::Applied)) => Ok(ExitCode::SUCCESS),
        Ok(ApplyOutcome::Finished(status)) => {
            out.error(&format!("Run finished with status {status}."));
            Ok(ExitCode::FAILURE)
        }
        Ok(ApplyOutcome::NoChanges) => {
            out.success("No changes. Your infrastructure matches the configuration.");
            Ok(ExitCode::SUCCESS)
        }
        Ok(ApplyOutcome::PlanEnded(status)) => {
            out.error(&format!("Plan ended with status {status}; nothing was applied."));
            Ok(ExitCode::FAILURE)
        }
        Ok(ApplyOutcome::NotConfirmable) => {
            out.warn("The run cannot be applied from here; review it in the browser.");
            if let Some(run) = run {
                out.kv("Run:", &run_url(&config.hostname, &config.organization, &op.workspace, &run.id));
            }
            Ok(ExitCode::SUCCESS)
        }
        Ok(ApplyOutcome::Declined) => {
            out.error("Apply discarded.");
            Ok(ExitCode::FAILURE)
        }
        Ok(ApplyOutcome::EndedElsewhere(status)) => {
            out.error(&format!("Run was {status} elsewhere; nothing was applied."));
            Ok(ExitCode::FAILURE)
        }
        Err(ApplyError::Diagnostics(diags)) => {
            out.diagnostics(&diags);
            Ok(ExitCode::FAILURE)
        }
        Err(ApplyError::Interrupted(interrupt)) => {
            match interrupt {
                Interrupt::Canceled => out.error("Apply canceled."),
                Interrupt::Stopped => {
                    out.warn("Stopped waiting; the run continues remotely.");
                }
            }
            Ok(ExitCode::from(INTERRUPTED_EXIT_CODE))
        }
        Err(e) => Err(e.into()),
    }
}
