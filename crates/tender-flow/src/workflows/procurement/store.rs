use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Project, ProjectId, StageCategory};

/// Storage abstraction so the engine and service can be exercised in
/// isolation. Every mutation goes through `save` with the version observed
/// at load time; a stale version must fail with `ConcurrentModification`.
pub trait ProjectStore: Send + Sync {
    fn insert(&self, project: Project) -> Result<Project, StoreError>;
    fn load(&self, id: &ProjectId) -> Result<Project, StoreError>;
    fn save(&self, project: Project, expected_version: u64) -> Result<Project, StoreError>;
    fn list(&self) -> Result<Vec<Project>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("project already exists")]
    AlreadyExists,
    #[error("project not found")]
    NotFound,
    #[error("project was modified concurrently; reload and retry")]
    ConcurrentModification,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook for stage-change and overdue events. Delivery is
/// best-effort: a failing sink never rolls back the transition it reports.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: WorkflowNotification) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNotification {
    pub project_id: ProjectId,
    #[serde(flatten)]
    pub event: WorkflowEventKind,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEventKind {
    StageAdvanced {
        from_stage: u8,
        to_stage: u8,
        from_category: StageCategory,
        to_category: StageCategory,
    },
    ProjectCompleted,
    ProjectCancelled {
        reason: String,
    },
    ProjectHeld {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    ProjectResumed,
    DeadlineOverdue {
        days_overdue: i64,
    },
}
