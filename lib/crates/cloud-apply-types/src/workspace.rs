use serde::{Deserialize, Serialize};

/// Permissions the current credentials hold on a workspace.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkspacePermissions {
    #[serde(default)]
    pub can_update: bool,
    #[serde(default)]
    pub can_queue_apply: bool,
}

impl WorkspacePermissions {
    /// Either permission is enough to apply.
    #[must_use]
    pub fn can_apply(&self) -> bool {
        self.can_update || self.can_queue_apply
    }
}

/// VCS repository linked to a workspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VcsRepo {
    pub identifier: String,
    #[serde(default)]
    pub branch: String,
}

/// Remote workspace targeted by an apply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub organization: String,
    #[serde(default)]
    pub permissions: WorkspacePermissions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs_repo: Option<VcsRepo>,
}

/// Workspace identity embedded in a run read with its workspace included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkspaceRef {
    pub id: String,
    pub name: String,
    pub organization: String,
}

impl From<&Workspace> for WorkspaceRef {
    fn from(ws: &Workspace) -> Self {
        Self {
            id: ws.id.clone(),
            name: ws.name.clone(),
            organization: ws.organization.clone(),
        }
    }
}
