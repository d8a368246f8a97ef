use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Project, ProjectId};
use super::engine::{WorkflowEngine, WorkflowError};
use super::report::PortfolioReport;
use super::store::{
    NotificationSink, ProjectStore, StoreError, WorkflowEventKind, WorkflowNotification,
};

/// Tunables for the calling layer around the engine.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    /// Attempts per mutation before a concurrent-modification conflict is
    /// surfaced to the caller.
    pub retry_attempts: u32,
    /// Days without a transition before a project counts as stalled in
    /// portfolio reports.
    pub stalled_after_days: i64,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            stalled_after_days: 14,
        }
    }
}

/// Intake payload for opening a procurement case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub client: String,
    #[serde(default)]
    pub estimated_value: f64,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

static PROJECT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_project_id() -> ProjectId {
    let id = PROJECT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ProjectId(format!("prj-{id:06}"))
}

/// Service composing the engine, the durable store, and the notification
/// sink. Every mutation is a load, an engine call, and a compare-and-swap
/// save against the version observed at load time.
pub struct ProcurementService<S, N> {
    engine: WorkflowEngine,
    store: Arc<S>,
    notifications: Arc<N>,
    settings: WorkflowSettings,
}

impl<S, N> ProcurementService<S, N>
where
    S: ProjectStore + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(store: Arc<S>, notifications: Arc<N>, settings: WorkflowSettings) -> Self {
        Self {
            engine: WorkflowEngine::new(),
            store,
            notifications,
            settings,
        }
    }

    pub fn engine(&self) -> &WorkflowEngine {
        &self.engine
    }

    pub fn stalled_after_days(&self) -> i64 {
        self.settings.stalled_after_days
    }

    /// Open a new case at stage 1 with a service-assigned identifier.
    pub fn create(
        &self,
        request: NewProject,
        now: DateTime<Utc>,
    ) -> Result<Project, ServiceError> {
        if request.estimated_value < 0.0 {
            return Err(ServiceError::NegativeValue(request.estimated_value));
        }

        let project = Project::new(
            next_project_id(),
            request.name,
            request.client,
            request.estimated_value,
            request.deadline,
            now,
        );

        let stored = self.store.insert(project)?;
        Ok(stored)
    }

    /// Seed previously tracked projects, e.g. from a ledger import.
    pub fn import(&self, projects: Vec<Project>) -> Result<usize, ServiceError> {
        let mut stored = 0;
        for project in projects {
            self.store.insert(project)?;
            stored += 1;
        }
        Ok(stored)
    }

    pub fn get(&self, id: &ProjectId) -> Result<Project, ServiceError> {
        Ok(self.store.load(id)?)
    }

    pub fn projects(&self) -> Result<Vec<Project>, ServiceError> {
        Ok(self.store.list()?)
    }

    pub fn advance(
        &self,
        id: &ProjectId,
        target_stage: u8,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Project, ServiceError> {
        self.transition(id, |engine, project| {
            engine
                .advance(project, target_stage, note.clone(), now)
                .map(Some)
        })
    }

    pub fn complete(&self, id: &ProjectId, now: DateTime<Utc>) -> Result<Project, ServiceError> {
        self.transition(id, |engine, project| engine.complete(project, now).map(Some))
    }

    pub fn cancel(
        &self,
        id: &ProjectId,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<Project, ServiceError> {
        self.transition(id, |engine, project| {
            engine.cancel(project, reason.clone(), now)
        })
    }

    pub fn hold(
        &self,
        id: &ProjectId,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Project, ServiceError> {
        self.transition(id, |engine, project| {
            engine.hold(project, reason.clone(), now)
        })
    }

    pub fn resume(&self, id: &ProjectId, now: DateTime<Utc>) -> Result<Project, ServiceError> {
        self.transition(id, |engine, project| engine.resume(project, now))
    }

    pub fn portfolio_report(&self, now: DateTime<Utc>) -> Result<PortfolioReport, ServiceError> {
        let projects = self.store.list()?;
        Ok(PortfolioReport::build(
            &projects,
            now,
            self.settings.stalled_after_days,
        ))
    }

    /// Emit one `DeadlineOverdue` notification per non-terminal project whose
    /// deadline has passed. Returns the flagged project ids.
    pub fn scan_overdue(&self, now: DateTime<Utc>) -> Result<Vec<ProjectId>, ServiceError> {
        let mut flagged = Vec::new();
        for project in self.store.list()? {
            if project.status.is_terminal() {
                continue;
            }
            let Some(days_remaining) = project.days_remaining(now) else {
                continue;
            };
            if days_remaining < 0 {
                self.dispatch(WorkflowNotification {
                    project_id: project.id.clone(),
                    event: WorkflowEventKind::DeadlineOverdue {
                        days_overdue: -days_remaining,
                    },
                    recorded_at: now,
                });
                flagged.push(project.id);
            }
        }
        Ok(flagged)
    }

    fn transition<F>(&self, id: &ProjectId, mut op: F) -> Result<Project, ServiceError>
    where
        F: FnMut(&WorkflowEngine, &mut Project) -> Result<Option<WorkflowNotification>, WorkflowError>,
    {
        let attempts = self.settings.retry_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let mut project = self.store.load(id)?;
            let expected_version = project.version;
            let Some(notification) = op(&self.engine, &mut project)? else {
                // Idempotent no-op path; nothing changed, nothing to save.
                return Ok(project);
            };

            match self.store.save(project, expected_version) {
                Ok(saved) => {
                    self.dispatch(notification);
                    return Ok(saved);
                }
                Err(StoreError::ConcurrentModification) if attempt < attempts => {
                    tracing::debug!(
                        project_id = %id.0,
                        attempt,
                        "save hit a stale version; retrying against fresh state"
                    );
                }
                Err(StoreError::ConcurrentModification) => {
                    return Err(ServiceError::RetryExhausted { attempts });
                }
                Err(other) => return Err(other.into()),
            }
        }
    }

    fn dispatch(&self, notification: WorkflowNotification) {
        if let Err(err) = self.notifications.notify(notification) {
            tracing::warn!(error = %err, "dropping workflow notification");
        }
    }
}

/// Error raised by the procurement service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("estimated value must be non-negative, got {0}")]
    NegativeValue(f64),
    #[error("project was modified concurrently on each of {attempts} attempts")]
    RetryExhausted { attempts: u32 },
}
