use chrono::{DateTime, Utc};

use super::catalog::{StageCatalog, LAST_STAGE};
use super::domain::{HistoryRecord, Project, ProjectStatus, TransitionKind};
use super::store::{WorkflowEventKind, WorkflowNotification};

/// Transition rule violations. `TerminalState` carries the status that
/// refused the mutation, which covers on-hold projects as well as the
/// terminal ones.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("cannot move from stage {from} to stage {to}; the target must be a later stage no greater than 32")]
    InvalidTransition { from: u8, to: u8 },
    #[error("stage transitions are not accepted while the project is {}", .status.label())]
    TerminalState { status: ProjectStatus },
    #[error("completion requires stage 32; project is at stage {current_stage}")]
    PrematureCompletion { current_stage: u8 },
    #[error("stage number {0} is outside the catalog range 1..=32")]
    UnknownStage(u8),
}

/// Owns the stage catalog and every rule for moving a project through it.
/// All methods are pure over the supplied record: the engine holds no
/// mutable state of its own, and durability belongs to the caller.
pub struct WorkflowEngine {
    catalog: StageCatalog,
}

impl Default for WorkflowEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowEngine {
    pub fn new() -> Self {
        Self {
            catalog: StageCatalog::standard(),
        }
    }

    pub fn catalog(&self) -> &StageCatalog {
        &self.catalog
    }

    /// Move an active project forward. Jumps across several stages are
    /// permitted and land as a single history record spanning the skipped
    /// range; skipped stages are never marked individually completed.
    /// Reaching stage 32 does not complete the project by itself.
    pub fn advance(
        &self,
        project: &mut Project,
        target_stage: u8,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<WorkflowNotification, WorkflowError> {
        if project.status != ProjectStatus::Active {
            return Err(WorkflowError::TerminalState {
                status: project.status,
            });
        }

        let from_stage = project.current_stage;
        if target_stage <= from_stage || target_stage > LAST_STAGE {
            return Err(WorkflowError::InvalidTransition {
                from: from_stage,
                to: target_stage,
            });
        }

        let from_category = self.catalog.category_of(from_stage)?;
        let to_category = self.catalog.category_of(target_stage)?;

        project.history.push(HistoryRecord {
            kind: TransitionKind::Advanced {
                from_stage,
                to_stage: target_stage,
            },
            recorded_at: now,
            note,
        });
        project.current_stage = target_stage;

        if target_stage > from_stage + 1 {
            tracing::debug!(
                project_id = %project.id.0,
                from_stage,
                to_stage = target_stage,
                "stages skipped in a single jump"
            );
        }

        Ok(WorkflowNotification {
            project_id: project.id.clone(),
            event: WorkflowEventKind::StageAdvanced {
                from_stage,
                to_stage: target_stage,
                from_category,
                to_category,
            },
            recorded_at: now,
        })
    }

    /// Close out a project sitting at the final stage.
    pub fn complete(
        &self,
        project: &mut Project,
        now: DateTime<Utc>,
    ) -> Result<WorkflowNotification, WorkflowError> {
        if project.status != ProjectStatus::Active {
            return Err(WorkflowError::TerminalState {
                status: project.status,
            });
        }
        if project.current_stage < LAST_STAGE {
            return Err(WorkflowError::PrematureCompletion {
                current_stage: project.current_stage,
            });
        }

        project.status = ProjectStatus::Completed;
        project.history.push(HistoryRecord {
            kind: TransitionKind::Completed,
            recorded_at: now,
            note: None,
        });

        Ok(WorkflowNotification {
            project_id: project.id.clone(),
            event: WorkflowEventKind::ProjectCompleted,
            recorded_at: now,
        })
    }

    /// Terminate a project from any non-terminal status. Cancelling an
    /// already-cancelled project is a successful no-op (`Ok(None)`).
    pub fn cancel(
        &self,
        project: &mut Project,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<Option<WorkflowNotification>, WorkflowError> {
        match project.status {
            ProjectStatus::Cancelled => Ok(None),
            ProjectStatus::Completed => Err(WorkflowError::TerminalState {
                status: project.status,
            }),
            ProjectStatus::Active | ProjectStatus::OnHold => {
                project.status = ProjectStatus::Cancelled;
                project.history.push(HistoryRecord {
                    kind: TransitionKind::Cancelled,
                    recorded_at: now,
                    note: Some(reason.clone()),
                });

                Ok(Some(WorkflowNotification {
                    project_id: project.id.clone(),
                    event: WorkflowEventKind::ProjectCancelled { reason },
                    recorded_at: now,
                }))
            }
        }
    }

    /// Freeze an active project. No-op when already on hold.
    pub fn hold(
        &self,
        project: &mut Project,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<WorkflowNotification>, WorkflowError> {
        match project.status {
            ProjectStatus::OnHold => Ok(None),
            ProjectStatus::Completed | ProjectStatus::Cancelled => {
                Err(WorkflowError::TerminalState {
                    status: project.status,
                })
            }
            ProjectStatus::Active => {
                project.status = ProjectStatus::OnHold;
                project.history.push(HistoryRecord {
                    kind: TransitionKind::Held,
                    recorded_at: now,
                    note: reason.clone(),
                });

                Ok(Some(WorkflowNotification {
                    project_id: project.id.clone(),
                    event: WorkflowEventKind::ProjectHeld { reason },
                    recorded_at: now,
                }))
            }
        }
    }

    /// Return a held project to the active pipeline. No-op when already
    /// active.
    pub fn resume(
        &self,
        project: &mut Project,
        now: DateTime<Utc>,
    ) -> Result<Option<WorkflowNotification>, WorkflowError> {
        match project.status {
            ProjectStatus::Active => Ok(None),
            ProjectStatus::Completed | ProjectStatus::Cancelled => {
                Err(WorkflowError::TerminalState {
                    status: project.status,
                })
            }
            ProjectStatus::OnHold => {
                project.status = ProjectStatus::Active;
                project.history.push(HistoryRecord {
                    kind: TransitionKind::Resumed,
                    recorded_at: now,
                    note: None,
                });

                Ok(Some(WorkflowNotification {
                    project_id: project.id.clone(),
                    event: WorkflowEventKind::ProjectResumed,
                    recorded_at: now,
                }))
            }
        }
    }
}
