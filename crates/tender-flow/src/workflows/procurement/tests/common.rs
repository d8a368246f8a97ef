use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::workflows::procurement::domain::{Project, ProjectId};
use crate::workflows::procurement::service::{NewProject, ProcurementService, WorkflowSettings};
use crate::workflows::procurement::store::{
    NotificationSink, NotifyError, ProjectStore, StoreError, WorkflowNotification,
};

pub(super) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn sample_request() -> NewProject {
    NewProject {
        name: "Ras Gharib Pump Station".to_string(),
        client: "Petro Services".to_string(),
        estimated_value: 450_000.0,
        deadline: Some(fixed_now() + chrono::Duration::days(90)),
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    records: Arc<Mutex<HashMap<ProjectId, Project>>>,
}

impl ProjectStore for MemoryStore {
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
pub(super) struct MemorySink {
    events: Arc<Mutex<Vec<WorkflowNotification>>>,
}

impl MemorySink {
    pub(super) fn events(&self) -> Vec<WorkflowNotification> {
        self.events.lock().expect("sink mutex poisoned").clone()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: WorkflowNotification) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("sink mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) fn build_service() -> (
    ProcurementService<MemoryStore, MemorySink>,
    Arc<MemoryStore>,
    Arc<MemorySink>,
) {
    let store = Arc::new(MemoryStore::default());
    let sink = Arc::new(MemorySink::default());
    let service = ProcurementService::new(store.clone(), sink.clone(), WorkflowSettings::default());
    (service, store, sink)
}
