//! The apply request and the plan-file reference it may carry.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::error::PlanFileError;

/// Bookmark format version this client understands.
pub const REMOTE_PLAN_FORMAT: u64 = 1;

/// Whether the plan keeps or destroys managed resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanMode {
    #[default]
    Normal,
    Destroy,
}

/// Reference to a plan computed earlier by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPlanBookmark {
    pub remote_plan_format: u64,
    pub run_id: String,
    pub hostname: String,
}

impl SavedPlanBookmark {
    #[must_use]
    pub fn new(run_id: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            remote_plan_format: REMOTE_PLAN_FORMAT,
            run_id: run_id.into(),
            hostname: hostname.into(),
        }
    }
}

/// Plan file supplied with the operation, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlanFile {
    #[default]
    None,
    /// A plan computed locally; not usable by a remote backend.
    Local(PathBuf),
    /// A bookmark pointing at a remote run.
    Cloud(SavedPlanBookmark),
}

#[derive(Deserialize)]
struct BookmarkFields {
    remote_plan_format: Option<u64>,
    #[serde(default)]
    run_id: String,
    #[serde(default)]
    hostname: String,
}

impl PlanFile {
    /// Classify plan-file contents read from `path`.
    ///
    /// Anything that is not a JSON bookmark is treated as a local plan.
    ///
    /// # Errors
    ///
    /// Returns an error when the content is a bookmark this client cannot use.
    pub fn from_contents(path: PathBuf, contents: &[u8]) -> Result<Self, PlanFileError> {
        let Ok(fields) = serde_json::from_slice::<BookmarkFields>(contents) else {
            return Ok(Self::Local(path));
        };
        let Some(format) = fields.remote_plan_format else {
            return Ok(Self::Local(path));
        };
        if format != REMOTE_PLAN_FORMAT {
            return Err(PlanFileError::UnsupportedFormat(format));
        }
        if fields.run_id.is_empty() {
            return Err(PlanFileError::MissingField("run_id"));
        }
        if fields.hostname.is_empty() {
            return Err(PlanFileError::MissingField("hostname"));
        }
        Ok(Self::Cloud(SavedPlanBookmark::new(fields.run_id, fields.hostname)))
    }

    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    #[must_use]
    pub fn cloud(&self) -> Option<&SavedPlanBookmark> {
        match self {
            Self::Cloud(bookmark) => Some(bookmark),
            _ => None,
        }
    }
}

/// One apply request. The core only reads it.
#[derive(Debug, Clone, Default)]
pub struct Operation {
    /// Name of the target workspace, used in prompts and URLs.
    pub workspace: String,
    pub plan_file: PlanFile,
    pub plan_mode: PlanMode,
    /// Resource addresses excluded from the run.
    pub excludes: Vec<String>,
    pub auto_approve: bool,
    /// Configuration files are present in the working directory.
    pub has_config: bool,
    /// Both interactive input and output are attached.
    pub ui_attached: bool,
}

impl Operation {
    #[must_use]
    pub fn is_destroy(&self) -> bool {
        self.plan_mode == PlanMode::Destroy
    }
}
