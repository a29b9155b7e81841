//! JSON:API documents exchanged with the remote service, and their mapping
//! onto the shared run and workspace types.

use cloud_apply_types::{
    ApplyRef, Run, RunActions, RunStatus, Stage, TaskStage, TaskStageStatus, VcsRepo, Workspace,
    WorkspacePermissions, WorkspaceRef,
};
use serde::Deserialize;
use serde_json::{Value, json};

// ── Envelope ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Document<T> {
    pub data: T,
    #[serde(default)]
    pub included: Vec<Resource<IncludedAttributes>>,
}

#[derive(Debug, Deserialize)]
pub struct Resource<A> {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub attributes: A,
    #[serde(default)]
    pub relationships: Relationships,
}

#[derive(Debug, Default, Deserialize)]
pub struct Relationships {
    pub workspace: Option<Relation>,
    pub apply: Option<Relation>,
    pub organization: Option<Relation>,
}

#[derive(Debug, Deserialize)]
pub struct Relation {
    pub data: Option<Identifier>,
}

#[derive(Debug, Deserialize)]
pub struct Identifier {
    pub id: String,
}

impl Relationships {
    fn id_of(rel: Option<&Relation>) -> Option<String> {
        rel.and_then(|r| r.data.as_ref()).map(|d| d.id.clone())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct IncludedAttributes {
    #[serde(default)]
    pub name: Option<String>,
}

// ── Attributes ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunAttributes {
    pub status: RunStatus,
    #[serde(default)]
    pub has_changes: bool,
    #[serde(default)]
    pub is_destroy: bool,
    #[serde(default)]
    pub actions: ActionAttributes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ActionAttributes {
    #[serde(default)]
    pub is_confirmable: bool,
    #[serde(default)]
    pub is_cancelable: bool,
    #[serde(default)]
    pub is_discardable: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkspaceAttributes {
    pub name: String,
    #[serde(default)]
    pub permissions: PermissionAttributes,
    #[serde(default)]
    pub vcs_repo: Option<VcsAttributes>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PermissionAttributes {
    #[serde(default)]
    pub can_update: bool,
    #[serde(default)]
    pub can_queue_apply: bool,
}

#[derive(Debug, Deserialize)]
pub struct VcsAttributes {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub branch: String,
}

#[derive(Debug, Deserialize)]
pub struct TaskStageAttributes {
    pub stage: Stage,
    pub status: TaskStageStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplyAttributes {
    pub log_read_url: String,
}

// ── Mapping ──────────────────────────────────────────────────────────────────

impl Document<Resource<RunAttributes>> {
    /// Convert to a run, resolving the workspace from `included` when present.
    #[must_use]
    pub fn into_run(self) -> Run {
        let Resource {
            id,
            attributes,
            relationships,
            ..
        } = self.data;

        let workspace = Relationships::id_of(relationships.workspace.as_ref()).and_then(|ws_id| {
            self.included
                .into_iter()
                .find(|inc| inc.kind == "workspaces" && inc.id == ws_id)
                .map(|inc| WorkspaceRef {
                    organization: Relationships::id_of(inc.relationships.organization.as_ref())
                        .unwrap_or_default(),
                    name: inc.attributes.name.unwrap_or_default(),
                    id: ws_id,
                })
        });

        Run {
            id,
            status: attributes.status,
            has_changes: attributes.has_changes,
            is_destroy: attributes.is_destroy,
            actions: RunActions {
                is_confirmable: attributes.actions.is_confirmable,
                is_cancelable: attributes.actions.is_cancelable,
                is_discardable: attributes.actions.is_discardable,
            },
            workspace,
            apply: Relationships::id_of(relationships.apply.as_ref()).map(|id| ApplyRef { id }),
        }
    }
}

impl Resource<WorkspaceAttributes> {
    /// Convert to a workspace owned by `organization`.
    #[must_use]
    pub fn into_workspace(self, organization: &str) -> Workspace {
        Workspace {
            id: self.id,
            name: self.attributes.name,
            organization: Relationships::id_of(self.relationships.organization.as_ref())
                .unwrap_or_else(|| organization.to_string()),
            permissions: WorkspacePermissions {
                can_update: self.attributes.permissions.can_update,
                can_queue_apply: self.attributes.permissions.can_queue_apply,
            },
            vcs_repo: self.attributes.vcs_repo.map(|v| VcsRepo {
                identifier: v.identifier,
                branch: v.branch,
            }),
        }
    }
}

impl From<Resource<TaskStageAttributes>> for TaskStage {
    fn from(res: Resource<TaskStageAttributes>) -> Self {
        Self {
            id: res.id,
            stage: res.attributes.stage,
            status: res.attributes.status,
        }
    }
}

// ── Request bodies ───────────────────────────────────────────────────────────

/// Body creating a run in `workspace_id`.
#[must_use]
pub fn create_run_body(workspace_id: &str, is_destroy: bool, auto_apply: bool) -> Value {
    json!({
        "data": {
            "type": "runs",
            "attributes": {
                "is-destroy": is_destroy,
                "auto-apply": auto_apply,
                "message": "Queued by cloud-apply",
            },
            "relationships": {
                "workspace": { "data": { "type": "workspaces", "id": workspace_id } },
            },
        }
    })
}
