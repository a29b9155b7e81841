//! Tests for the apply use-case, driven through recording fakes.

#![allow(clippy::expect_used)]

use std::path::PathBuf;
use std::time::Duration;

use cloud_apply::application::ports::{LogRenderer, OutputSink};
use cloud_apply::application::services::apply::{ApplyContext, ApplyOutcome, ApplyReport, apply};
use cloud_apply::application::services::plan_source::{APPLY_DEFAULT_HEADER, APPLY_SAVED_HEADER};
use cloud_apply::application::signals::Signals;
use cloud_apply::domain::config::BackendConfig;
use cloud_apply::domain::confirmation::Confirmation;
use cloud_apply::domain::error::{ApplyError, Interrupt};
use cloud_apply::domain::operation::{Operation, PlanFile, PlanMode, SavedPlanBookmark};
use cloud_apply::domain::preflight::DEFAULT_PARALLELISM;
use cloud_apply_types::{Run, RunStatus, TaskStageStatus, VcsRepo, WorkspaceRef};

use crate::mocks::{
    FakeConfirmer, FakeRemote, HOSTNAME, RecordingOutput, RecordingRenderer, applied_run, config,
    confirmable_run, operation, workspace,
};

fn context<'a>(
    config: &'a BackendConfig,
    output: Option<&'a dyn OutputSink>,
    renderer: Option<&'a dyn LogRenderer>,
) -> ApplyContext<'a> {
    ApplyContext {
        config,
        input: true,
        parallelism: DEFAULT_PARALLELISM,
        output,
        renderer,
    }
}

async fn run_apply(
    remote: &FakeRemote,
    confirmer: &FakeConfirmer,
    ctx: &ApplyContext<'_>,
    op: &Operation,
) -> ApplyReport {
    apply(remote, confirmer, ctx, op, &workspace(), &Signals::default()).await
}

fn saved_plan_op(hostname: &str) -> Operation {
    Operation {
        plan_file: PlanFile::Cloud(SavedPlanBookmark::new("run-saved", hostname)),
        ..operation()
    }
}

// ── Fresh plan ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_confirmed_fresh_plan_applies_once_and_streams_logs() {
    let remote = FakeRemote::new()
        .with_plan(confirmable_run("run-1"))
        .with_reads([confirmable_run("run-1")])
        .with_logs("v1\nos\nblank\nApplying...\n");
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let out = RecordingOutput::default();
    let cfg = config();
    let ctx = context(&cfg, Some(&out), None);

    let report = run_apply(&remote, &confirmer, &ctx, &operation()).await;

    assert_eq!(
        report.result.expect("applies"),
        ApplyOutcome::Finished(RunStatus::Applied)
    );
    assert_eq!(report.run.expect("run").status, RunStatus::Applied);
    let calls = remote.calls();
    assert_eq!(calls.create_run, 1);
    assert_eq!(calls.wait_for_plan, 1);
    assert_eq!(calls.read_run, 1, "confirmability is read after the plan");
    assert_eq!(calls.apply_run, 1);
    assert_eq!(calls.task_stages, 1);
    assert_eq!(calls.wait_for_run, 1);
    assert_eq!(calls.apply_logs, 1);
    assert_eq!(confirmer.prompt_count(), 1);
    let headers = out.headers();
    assert_eq!(headers.len(), 2);
    assert_eq!(headers[0], APPLY_DEFAULT_HEADER);
    assert!(headers[1].ends_with("https://app.example.com/app/acme/prod/runs/run-1"));
    assert_eq!(out.lines(), vec!["Applying...".to_string()]);
}

#[tokio::test]
async fn test_plan_without_changes_never_approves() {
    let mut run = confirmable_run("run-1");
    run.has_changes = false;
    run.status = RunStatus::PlannedAndFinished;
    let remote = FakeRemote::new().with_plan(run);
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let cfg = config();

    let report = run_apply(&remote, &confirmer, &context(&cfg, None, None), &operation()).await;

    assert_eq!(report.result.expect("finishes"), ApplyOutcome::NoChanges);
    assert_eq!(report.run.expect("run").id, "run-1");
    let calls = remote.calls();
    assert_eq!(calls.apply_run, 0);
    assert_eq!(calls.read_run, 0);
    assert_eq!(confirmer.prompt_count(), 0);
}

#[tokio::test]
async fn test_errored_plan_ends_without_apply() {
    let mut run = confirmable_run("run-1");
    run.status = RunStatus::Errored;
    let remote = FakeRemote::new().with_plan(run);
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let cfg = config();

    let report = run_apply(&remote, &confirmer, &context(&cfg, None, None), &operation()).await;

    assert_eq!(
        report.result.expect("finishes"),
        ApplyOutcome::PlanEnded(RunStatus::Errored)
    );
    assert_eq!(remote.calls().apply_run, 0);
}

#[tokio::test]
async fn test_failed_plan_without_changes_is_not_reported_as_no_changes() {
    for status in [RunStatus::Errored, RunStatus::Canceled] {
        let remote = FakeRemote::new().with_plan(Run::new("run-1", status));
        let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
        let cfg = config();

        let report =
            run_apply(&remote, &confirmer, &context(&cfg, None, None), &operation()).await;

        assert_eq!(report.result.expect("finishes"), ApplyOutcome::PlanEnded(status));
        assert_eq!(remote.calls().apply_run, 0);
        assert_eq!(confirmer.prompt_count(), 0);
    }
}

#[tokio::test]
async fn test_confirmability_comes_from_fresh_read_not_plan_snapshot() {
    let mut refreshed = confirmable_run("run-1");
    refreshed.status = RunStatus::PolicyChecked;
    refreshed.actions.is_confirmable = false;
    let remote = FakeRemote::new()
        .with_plan(confirmable_run("run-1"))
        .with_reads([refreshed]);
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let cfg = config();

    let report = run_apply(&remote, &confirmer, &context(&cfg, None, None), &operation()).await;

    assert_eq!(report.result.expect("finishes"), ApplyOutcome::NotConfirmable);
    assert_eq!(report.run.expect("run").status, RunStatus::PolicyChecked);
    assert_eq!(remote.calls().apply_run, 0);
    assert_eq!(confirmer.prompt_count(), 0);
}

#[tokio::test]
async fn test_plan_failure_is_wrapped() {
    let remote = FakeRemote::new();
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let cfg = config();

    let report = run_apply(&remote, &confirmer, &context(&cfg, None, None), &operation()).await;

    let err = report.result.expect_err("plan fails");
    assert!(err.to_string().starts_with("Failed to create the plan"));
    assert!(report.run.is_none());
}

// ── Confirmation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_required_confirmation_without_input_fails() {
    let remote = FakeRemote::new()
        .with_plan(confirmable_run("run-1"))
        .with_reads([confirmable_run("run-1")]);
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let cfg = config();
    let mut ctx = context(&cfg, None, None);
    ctx.input = false;

    let report = run_apply(&remote, &confirmer, &ctx, &operation()).await;

    assert!(matches!(
        report.result,
        Err(ApplyError::NeedsUiConfirmation)
    ));
    assert_eq!(report.run.expect("run").id, "run-1");
    assert_eq!(remote.calls().apply_run, 0);
    assert_eq!(confirmer.prompt_count(), 0);
}

#[tokio::test]
async fn test_declined_run_is_discarded_and_not_applied() {
    let remote = FakeRemote::new()
        .with_plan(confirmable_run("run-1"))
        .with_reads([confirmable_run("run-1")]);
    let confirmer = FakeConfirmer::answering(Confirmation::Declined);
    let cfg = config();

    let report = run_apply(&remote, &confirmer, &context(&cfg, None, None), &operation()).await;

    assert_eq!(report.result.expect("declines"), ApplyOutcome::Declined);
    let calls = remote.calls();
    assert_eq!(calls.apply_run, 0);
    assert_eq!(calls.discard_run, 1);
    assert_eq!(calls.wait_for_run, 0);
}

#[tokio::test]
async fn test_run_ended_elsewhere_during_prompt_is_not_applied() {
    let remote = FakeRemote::new()
        .with_plan(confirmable_run("run-1"))
        .with_reads([confirmable_run("run-1")]);
    let confirmer = FakeConfirmer::answering(Confirmation::Ended(RunStatus::Discarded));
    let cfg = config();

    let report = run_apply(&remote, &confirmer, &context(&cfg, None, None), &operation()).await;

    assert_eq!(
        report.result.expect("finishes"),
        ApplyOutcome::EndedElsewhere(RunStatus::Discarded)
    );
    let calls = remote.calls();
    assert_eq!(calls.apply_run, 0);
    assert_eq!(calls.discard_run, 0);
    assert_eq!(calls.wait_for_run, 0);
}

#[tokio::test]
async fn test_already_approved_skips_approval_but_waits() {
    let remote = FakeRemote::new()
        .with_plan(confirmable_run("run-1"))
        .with_reads([confirmable_run("run-1")]);
    let confirmer = FakeConfirmer::answering(Confirmation::AlreadyApproved);
    let cfg = config();

    let report = run_apply(&remote, &confirmer, &context(&cfg, None, None), &operation()).await;

    assert_eq!(
        report.result.expect("applies"),
        ApplyOutcome::Finished(RunStatus::Applied)
    );
    let calls = remote.calls();
    assert_eq!(calls.apply_run, 0);
    assert_eq!(calls.wait_for_run, 1);
}

#[tokio::test]
async fn test_auto_approve_never_prompts_or_approves() {
    let mut refreshed = confirmable_run("run-1");
    refreshed.actions.is_confirmable = false;
    refreshed.status = RunStatus::ApplyQueued;
    let remote = FakeRemote::new()
        .with_plan(confirmable_run("run-1"))
        .with_reads([refreshed]);
    let confirmer = FakeConfirmer::answering(Confirmation::Declined);
    let cfg = config();
    let op = Operation {
        auto_approve: true,
        ..operation()
    };

    let report = run_apply(&remote, &confirmer, &context(&cfg, None, None), &op).await;

    assert_eq!(
        report.result.expect("applies"),
        ApplyOutcome::Finished(RunStatus::Applied)
    );
    assert_eq!(remote.calls().apply_run, 0);
    assert_eq!(confirmer.prompt_count(), 0);
}

#[tokio::test]
async fn test_destroy_confirmed_approves_exactly_once() {
    let remote = FakeRemote::new()
        .with_plan(confirmable_run("run-1"))
        .with_reads([confirmable_run("run-1")]);
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let cfg = config();
    let op = Operation {
        plan_mode: PlanMode::Destroy,
        has_config: false,
        ..operation()
    };

    let report = run_apply(&remote, &confirmer, &context(&cfg, None, None), &op).await;

    assert!(report.result.is_ok());
    assert_eq!(remote.calls().apply_run, 1);
    let prompts = confirmer.prompts.lock().expect("lock");
    assert!(prompts[0].query.contains("destroy all resources"));
}

#[tokio::test]
async fn test_without_ui_applies_without_prompt() {
    let remote = FakeRemote::new()
        .with_plan(confirmable_run("run-1"))
        .with_reads([confirmable_run("run-1")]);
    let confirmer = FakeConfirmer::answering(Confirmation::Declined);
    let cfg = config();
    let mut ctx = context(&cfg, None, None);
    ctx.input = false;
    let op = Operation {
        ui_attached: false,
        ..operation()
    };

    let report = run_apply(&remote, &confirmer, &ctx, &op).await;

    assert!(report.result.is_ok());
    assert_eq!(remote.calls().apply_run, 1);
    assert_eq!(confirmer.prompt_count(), 0);
}

#[tokio::test]
async fn test_approval_failure_is_wrapped_and_run_returned() {
    let remote = FakeRemote::new()
        .with_plan(confirmable_run("run-1"))
        .with_reads([confirmable_run("run-1")])
        .failing_apply();
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let cfg = config();

    let report = run_apply(&remote, &confirmer, &context(&cfg, None, None), &operation()).await;

    let err = report.result.expect_err("approval fails");
    assert!(err.to_string().starts_with("Failed to approve the apply command"));
    assert_eq!(report.run.expect("run").id, "run-1");
    assert_eq!(remote.calls().wait_for_run, 0);
}

// ── Preflight ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_configuration_aborts_before_any_remote_call() {
    let remote = FakeRemote::new().with_plan(confirmable_run("run-1"));
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let cfg = config();
    let op = Operation {
        has_config: false,
        ..operation()
    };

    let report = run_apply(&remote, &confirmer, &context(&cfg, None, None), &op).await;

    let diags = report
        .result
        .expect_err("preflight fails")
        .diagnostics()
        .cloned()
        .expect("diagnostics");
    assert!(diags.iter().any(|d| d.summary == "No configuration files found"));
    assert_eq!(remote.calls().total(), 0);
    assert!(report.run.is_none());
}

#[tokio::test]
async fn test_local_plan_and_vcs_workspace_report_together() {
    let remote = FakeRemote::new();
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let cfg = config();
    let ctx = context(&cfg, None, None);
    let op = Operation {
        plan_file: PlanFile::Local(PathBuf::from("plan.out")),
        ..operation()
    };
    let mut ws = workspace();
    ws.vcs_repo = Some(VcsRepo {
        identifier: "acme/infra".to_string(),
        branch: "main".to_string(),
    });

    let report = apply(&remote, &confirmer, &ctx, &op, &ws, &Signals::default()).await;

    let err = report.result.expect_err("preflight fails");
    assert_eq!(err.diagnostics().expect("diagnostics").len(), 2);
    assert_eq!(remote.calls().total(), 0);
}

// ── Saved plan ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_saved_plan_for_other_host_makes_no_calls() {
    let remote = FakeRemote::new();
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let cfg = config();

    let report = run_apply(
        &remote,
        &confirmer,
        &context(&cfg, None, None),
        &saved_plan_op("other.example.com"),
    )
    .await;

    let err = report.result.expect_err("hostname mismatch");
    let diags = err.diagnostics().expect("diagnostics");
    assert!(diags.iter().any(|d| d.detail.contains("other.example.com")));
    assert_eq!(remote.calls().total(), 0);
}

#[tokio::test]
async fn test_saved_plan_for_other_workspace_is_rejected() {
    let mut run = confirmable_run("run-saved");
    run.workspace = Some(WorkspaceRef {
        id: "ws-2".to_string(),
        name: "staging".to_string(),
        organization: "acme".to_string(),
    });
    let remote = FakeRemote::new().with_reads([run]);
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let cfg = config();

    let report = run_apply(
        &remote,
        &confirmer,
        &context(&cfg, None, None),
        &saved_plan_op(HOSTNAME),
    )
    .await;

    let err = report.result.expect_err("workspace mismatch");
    let diag = &err.diagnostics().expect("diagnostics").iter().next().cloned().expect("one");
    assert_eq!(diag.summary, "Saved plan is for a different workspace");
    assert!(diag.detail.contains("/app/acme/staging/runs/run-saved"));
    assert_eq!(report.run.expect("run").id, "run-saved");
    assert_eq!(remote.calls().apply_run, 0);
}

#[tokio::test]
async fn test_applied_saved_plan_cannot_be_applied_again() {
    let remote = FakeRemote::new().with_reads([applied_run("run-saved")]);
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let cfg = config();

    let report = run_apply(
        &remote,
        &confirmer,
        &context(&cfg, None, None),
        &saved_plan_op(HOSTNAME),
    )
    .await;

    let err = report.result.expect_err("already applied");
    let diags = err.diagnostics().expect("diagnostics");
    assert!(diags.iter().any(|d| d.summary == "Saved plan is already applied"));
    assert_eq!(remote.calls().apply_run, 0);
}

#[tokio::test]
async fn test_saved_plan_applies_without_prompt() {
    let remote = FakeRemote::new().with_reads([confirmable_run("run-saved")]);
    let confirmer = FakeConfirmer::answering(Confirmation::Declined);
    let out = RecordingOutput::default();
    let cfg = config();

    let report = run_apply(
        &remote,
        &confirmer,
        &context(&cfg, Some(&out), None),
        &saved_plan_op(HOSTNAME),
    )
    .await;

    assert_eq!(
        report.result.expect("applies"),
        ApplyOutcome::Finished(RunStatus::Applied)
    );
    let calls = remote.calls();
    assert_eq!(calls.create_run, 0);
    assert_eq!(calls.apply_run, 1);
    assert_eq!(confirmer.prompt_count(), 0);
    let headers = out.headers();
    assert_eq!(headers[0], APPLY_SAVED_HEADER);
    assert!(headers[1].ends_with("https://app.example.com/app/acme/prod/runs/run-saved"));
}

// ── Task stages and polling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_failed_pre_apply_stage_stops_before_polling() {
    let remote = FakeRemote::new()
        .with_plan(confirmable_run("run-1"))
        .with_reads([confirmable_run("run-1")])
        .with_pre_apply_stage(TaskStageStatus::Failed);
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let cfg = config();

    let report = run_apply(&remote, &confirmer, &context(&cfg, None, None), &operation()).await;

    let err = report.result.expect_err("stage fails");
    assert!(err.to_string().starts_with("Failed waiting on pre-apply tasks"));
    let calls = remote.calls();
    assert_eq!(calls.apply_run, 1);
    assert_eq!(calls.wait_task_stage, 1);
    assert_eq!(calls.wait_for_run, 0);
}

#[tokio::test]
async fn test_passed_pre_apply_stage_continues() {
    let remote = FakeRemote::new()
        .with_plan(confirmable_run("run-1"))
        .with_reads([confirmable_run("run-1")])
        .with_pre_apply_stage(TaskStageStatus::Passed);
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let cfg = config();

    let report = run_apply(&remote, &confirmer, &context(&cfg, None, None), &operation()).await;

    assert!(report.result.is_ok());
    assert_eq!(remote.calls().wait_task_stage, 1);
}

#[tokio::test]
async fn test_errored_apply_is_reported_as_finished_status() {
    let mut errored = applied_run("run-1");
    errored.status = RunStatus::Errored;
    let remote = FakeRemote::new()
        .with_plan(confirmable_run("run-1"))
        .with_reads([confirmable_run("run-1")])
        .with_final(errored);
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let cfg = config();

    let report = run_apply(&remote, &confirmer, &context(&cfg, None, None), &operation()).await;

    assert_eq!(
        report.result.expect("finishes"),
        ApplyOutcome::Finished(RunStatus::Errored)
    );
}

#[tokio::test]
async fn test_no_output_sink_skips_log_stream() {
    let remote = FakeRemote::new()
        .with_plan(confirmable_run("run-1"))
        .with_reads([confirmable_run("run-1")])
        .with_logs("a\nb\nc\nd\n");
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let renderer = RecordingRenderer::default();
    let cfg = config();

    let report = run_apply(
        &remote,
        &confirmer,
        &context(&cfg, None, Some(&renderer)),
        &operation(),
    )
    .await;

    assert!(report.result.is_ok());
    assert_eq!(remote.calls().apply_logs, 0);
}

// ── Signals ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_cancel_while_waiting_cancels_pending_run() {
    let remote = FakeRemote::new()
        .with_plan(confirmable_run("run-1"))
        .with_reads([confirmable_run("run-1")])
        .blocking_wait();
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let cfg = config();
    let ctx = context(&cfg, None, None);
    let signals = Signals::default();
    let cancel = signals.cancel_token().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    });

    let report = apply(&remote, &confirmer, &ctx, &operation(), &workspace(), &signals).await;

    assert_eq!(
        report.result.expect_err("interrupted").interrupt(),
        Some(Interrupt::Canceled)
    );
    let calls = remote.calls();
    assert_eq!(calls.cancel_run, 1);
    assert_eq!(calls.read_run, 2, "the run is read again before canceling");
}

#[tokio::test]
async fn test_cancel_during_plan_cancels_created_run() {
    let remote = FakeRemote::new()
        .with_plan(confirmable_run("run-1"))
        .with_reads([confirmable_run("run-1")])
        .blocking_plan();
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let cfg = config();
    let ctx = context(&cfg, None, None);
    let signals = Signals::default();
    let cancel = signals.cancel_token().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    });

    let report = apply(&remote, &confirmer, &ctx, &operation(), &workspace(), &signals).await;

    assert_eq!(
        report.result.expect_err("interrupted").interrupt(),
        Some(Interrupt::Canceled)
    );
    let calls = remote.calls();
    assert_eq!(calls.create_run, 1);
    assert_eq!(calls.cancel_run, 1);
    assert_eq!(calls.apply_run, 0);
    assert_eq!(report.run.expect("run").id, "run-1");
}

#[tokio::test]
async fn test_stop_while_waiting_leaves_run_alone() {
    let remote = FakeRemote::new()
        .with_plan(confirmable_run("run-1"))
        .with_reads([confirmable_run("run-1")])
        .blocking_wait();
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let cfg = config();
    let ctx = context(&cfg, None, None);
    let signals = Signals::default();
    let stop = signals.stop_token().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        stop.cancel();
    });

    let report = apply(&remote, &confirmer, &ctx, &operation(), &workspace(), &signals).await;

    assert_eq!(
        report.result.expect_err("interrupted").interrupt(),
        Some(Interrupt::Stopped)
    );
    assert_eq!(remote.calls().cancel_run, 0);
    assert_eq!(report.run.expect("run").id, "run-1");
}

#[tokio::test]
async fn test_cancel_skips_run_that_is_no_longer_cancelable() {
    let mut applying = confirmable_run("run-1");
    applying.status = RunStatus::Applying;
    applying.actions.is_cancelable = false;
    let remote = FakeRemote::new()
        .with_plan(confirmable_run("run-1"))
        .with_reads([confirmable_run("run-1"), applying])
        .blocking_wait();
    let confirmer = FakeConfirmer::answering(Confirmation::Confirmed);
    let cfg = config();
    let ctx = context(&cfg, None, None);
    let signals = Signals::default();
    let cancel = signals.cancel_token().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    });

    let report = apply(&remote, &confirmer, &ctx, &operation(), &workspace(), &signals).await;

    assert!(report.result.is_err());
    assert_eq!(remote.calls().cancel_run, 0);
}
