pub mod log;
pub mod run;
pub mod workspace;

pub use log::{JsonLog, LogDiagnostic, LogLevel, LogMessageType};
pub use run::{ApplyRef, Run, RunActions, RunStatus, Stage, TaskStage, TaskStageStatus};
pub use workspace::{VcsRepo, Workspace, WorkspacePermissions, WorkspaceRef};
