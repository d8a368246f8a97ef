use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tender_flow::workflows::procurement::{
    NotificationSink, NotifyError, Project, ProjectId, ProjectStore, StoreError,
    WorkflowNotification,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Reference store implementation: a process-local map with the same
/// compare-and-swap discipline a durable backend must provide.
#[derive(Default, Clone)]
pub(crate) struct InMemoryProjectStore {
    records: Arc<Mutex<HashMap<ProjectId, Project>>>,
}

impl ProjectStore for InMemoryProjectStore {
    fn insert(&self, project: Project) -> Result<Project, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if guard.contains_key(&project.id) {
            return Err(StoreError::AlreadyExists);
        }
        guard.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn load(&self, id: &ProjectId) -> Result<Project, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        guard.get(id).cloned().ok_or(StoreError::NotFound)
    }

    fn save(&self, mut project: Project, expected_version: u64) -> Result<Project, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let current = guard.get(&project.id).ok_or(StoreError::NotFound)?;
        if current.version != expected_version {
            return Err(StoreError::ConcurrentModification);
        }
        project.version = expected_version + 1;
        guard.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn list(&self) -> Result<Vec<Project>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationSink {
    events: Arc<Mutex<Vec<WorkflowNotification>>>,
}

impl NotificationSink for InMemoryNotificationSink {
    fn notify(&self, notification: WorkflowNotification) -> Result<(), NotifyError> {
        let mut guard = self.events.lock().expect("sink mutex poisoned");
        guard.push(notification);
        Ok(())
    }
}

impl InMemoryNotificationSink {
    pub(crate) fn events(&self) -> Vec<WorkflowNotification> {
        self.events.lock().expect("sink mutex poisoned").clone()
    }
}

pub(crate) fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
        .ok_or_else(|| format!("failed to parse '{raw}' as YYYY-MM-DD or RFC 3339"))
}
