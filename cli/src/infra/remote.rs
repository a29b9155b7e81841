//! HTTP implementation of the remote run ports.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use cloud_apply_types::{Run, Stage, TaskStage, TaskStageStatus, Workspace};
use futures_util::TryStreamExt as _;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio_util::io::StreamReader;
use tracing::{debug, info};

use crate::application::ports::{
    ApplyLogSource, LogStream, PlanTrigger, RunService, RunWaiter, TaskStageService,
};
use crate::application::signals::Signals;
use crate::domain::config::BackendConfig;
use crate::domain::operation::Operation;
use crate::infra::jsonapi::{
    ApplyAttributes, Document, Resource, RunAttributes, TaskStageAttributes, WorkspaceAttributes,
    create_run_body,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_ERROR_BODY: usize = 512;

/// Client for the remote service's JSON:API.
///
/// Retries are left to the caller; every failure carries the method, path,
/// and status.
#[derive(Clone)]
pub struct HttpRemote {
    client: Client,
    base_url: String,
    token: String,
    poll_interval: Duration,
}

impl HttpRemote {
    /// Build a client for `config.hostname` authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &BackendConfig, token: String) -> Result<Self> {
        Self::with_base_url(
            format!("https://{}/api/v2", config.hostname),
            token,
            Duration::from_secs(config.poll_interval_secs),
        )
    }

    /// Build a client for an explicit API root such as `http://127.0.0.1:8080/api/v2`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_base_url(
        base_url: impl Into<String>,
        token: String,
        poll_interval: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("cloud-apply/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            token,
            poll_interval,
        })
    }

    /// Read a workspace by organization and name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the workspace does not exist.
    pub async fn read_workspace(&self, organization: &str, name: &str) -> Result<Workspace> {
        let doc: Document<Resource<WorkspaceAttributes>> = self
            .get_json(&format!("/organizations/{organization}/workspaces/{name}"))
            .await
            .with_context(|| format!("cannot read workspace {organization}/{name}"))?;
        Ok(doc.data.into_workspace(organization))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "application/vnd.api+json")
            .timeout(REQUEST_TIMEOUT)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response> {
        let mut req = self.request(method.clone(), path);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req
            .send()
            .await
            .with_context(|| format!("{method} {path} failed"))?;
        check_status(resp, &method, path).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::GET, path, None)
            .await?
            .json()
            .await
            .with_context(|| format!("cannot decode response of GET {path}"))
    }

    async fn post_action(&self, run_id: &str, action: &str) -> Result<()> {
        let path = format!("/runs/{run_id}/actions/{action}");
        self.send(Method::POST, &path, Some(json!({ "comment": "via cloud-apply" })))
            .await?;
        Ok(())
    }

    async fn read_task_stage(&self, stage_id: &str) -> Result<TaskStage> {
        let doc: Document<Resource<TaskStageAttributes>> =
            self.get_json(&format!("/task-stages/{stage_id}")).await?;
        Ok(doc.data.into())
    }

    /// Poll `run_id` until `done` holds for the snapshot, logging every
    /// status change.
    async fn poll_run(
        &self,
        run_id: &str,
        signals: &Signals,
        done: impl Fn(&Run) -> bool,
    ) -> Result<Run> {
        let mut last = None;
        loop {
            let run = self.read_run(run_id, false).await?;
            if last != Some(run.status) {
                info!(run_id, status = %run.status, "run status changed");
                last = Some(run.status);
            }
            if done(&run) {
                return Ok(run);
            }
            if let Some(interrupt) = signals.interrupt() {
                anyhow::bail!("{interrupt}");
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

async fn check_status(resp: Response, method: &Method, path: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let mut body = resp.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    match status.as_u16() {
        401 => anyhow::bail!("{method} {path}: unauthorized; check CLOUD_APPLY_TOKEN"),
        404 => anyhow::bail!("{method} {path}: not found or not visible to these credentials"),
        code => anyhow::bail!("{method} {path}: HTTP {code}: {body}"),
    }
}

impl RunService for HttpRemote {
    async fn read_run(&self, run_id: &str, include_workspace: bool) -> Result<Run> {
        let path = if include_workspace {
            format!("/runs/{run_id}?include=workspace")
        } else {
            format!("/runs/{run_id}")
        };
        let doc: Document<Resource<RunAttributes>> = self.get_json(&path).await?;
        Ok(doc.into_run())
    }

    async fn apply_run(&self, run_id: &str) -> Result<()> {
        self.post_action(run_id, "apply").await
    }

    async fn discard_run(&self, run_id: &str) -> Result<()> {
        self.post_action(run_id, "discard").await
    }

    async fn cancel_run(&self, run_id: &str) -> Result<()> {
        self.post_action(run_id, "cancel").await
    }
}

impl PlanTrigger for HttpRemote {
    async fn create_run(&self, op: &Operation, ws: &Workspace) -> Result<Run> {
        let body = create_run_body(&ws.id, op.is_destroy(), op.auto_approve);
        let doc: Document<Resource<RunAttributes>> = self
            .send(Method::POST, "/runs", Some(body))
            .await?
            .json()
            .await
            .context("cannot decode created run")?;
        let run = doc.into_run();
        info!(run_id = %run.id, workspace = %ws.name, "run created");
        Ok(run)
    }

    async fn wait_for_plan(&self, run: &Run, signals: &Signals) -> Result<Run> {
        self.poll_run(&run.id, signals, Run::is_plan_settled).await
    }
}

impl TaskStageService for HttpRemote {
    async fn task_stages(&self, run_id: &str) -> Result<HashMap<Stage, TaskStage>> {
        let doc: Document<Vec<Resource<TaskStageAttributes>>> =
            self.get_json(&format!("/runs/{run_id}/task-stages")).await?;
        Ok(doc
            .data
            .into_iter()
            .map(TaskStage::from)
            .map(|stage| (stage.stage, stage))
            .collect())
    }

    async fn wait_task_stage(&self, stage_id: &str, signals: &Signals) -> Result<()> {
        let mut last = None;
        loop {
            let stage = self.read_task_stage(stage_id).await?;
            if last != Some(stage.status) {
                info!(stage_id, status = ?stage.status, "task stage status changed");
                last = Some(stage.status);
            }
            match stage.status {
                TaskStageStatus::Passed | TaskStageStatus::Overridden => return Ok(()),
                status if status.is_settled() => {
                    anyhow::bail!("pre-apply tasks ended with status {status:?}")
                }
                _ => {}
            }
            if let Some(interrupt) = signals.interrupt() {
                anyhow::bail!("{interrupt}");
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

impl RunWaiter for HttpRemote {
    async fn wait_for_run(&self, run: &Run, signals: &Signals) -> Result<Run> {
        self.poll_run(&run.id, signals, |r| r.status.is_terminal()).await
    }
}

impl ApplyLogSource for HttpRemote {
    async fn apply_logs(&self, apply_id: &str) -> Result<LogStream> {
        let doc: Document<Resource<ApplyAttributes>> =
            self.get_json(&format!("/applies/{apply_id}")).await?;
        let url = doc.data.attributes.log_read_url;
        debug!(apply_id, "opening apply log stream");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("cannot open apply log stream")?
            .error_for_status()
            .context("apply log stream refused")?;
        let stream = resp.bytes_stream().map_err(std::io::Error::other);
        Ok(Box::pin(StreamReader::new(stream)))
    }
}
