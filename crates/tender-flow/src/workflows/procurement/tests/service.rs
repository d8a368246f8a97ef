use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Duration;

use super::common::{build_service, fixed_now, sample_request, MemorySink, MemoryStore};
use crate::workflows::procurement::domain::{Project, ProjectId, ProjectStatus};
use crate::workflows::procurement::service::{ProcurementService, ServiceError, WorkflowSettings};
use crate::workflows::procurement::store::{
    ProjectStore, StoreError, WorkflowEventKind,
};

#[test]
fn create_opens_the_case_at_stage_one() {
    let (service, store, _) = build_service();

    let project = service
        .create(sample_request(), fixed_now())
        .expect("creation succeeds");

    assert!(project.id.0.starts_with("prj-"));
    assert_eq!(project.current_stage, 1);
    assert_eq!(project.status, ProjectStatus::Active);
    assert_eq!(project.version, 0);
    assert!(project.history.is_empty());

    let stored = store.load(&project.id).expect("project persisted");
    assert_eq!(stored, project);
}

#[test]
fn create_rejects_negative_estimated_value() {
    let (service, _, _) = build_service();
    let mut request = sample_request();
    request.estimated_value = -1.0;

    match service.create(request, fixed_now()) {
        Err(ServiceError::NegativeValue(value)) => assert_eq!(value, -1.0),
        other => panic!("expected negative value rejection, got {other:?}"),
    }
}

#[test]
fn advance_persists_and_notifies() {
    let (service, store, sink) = build_service();
    let project = service
        .create(sample_request(), fixed_now())
        .expect("creation succeeds");

    let advanced = service
        .advance(&project.id, 5, None, fixed_now())
        .expect("advance succeeds");

    assert_eq!(advanced.current_stage, 5);
    assert_eq!(advanced.version, 1);

    let stored = store.load(&project.id).expect("project persisted");
    assert_eq!(stored.current_stage, 5);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0].event,
        WorkflowEventKind::StageAdvanced {
            from_stage: 1,
            to_stage: 5,
            ..
        }
    ));
}

#[test]
fn repeated_cancellation_is_a_quiet_success() {
    let (service, _, sink) = build_service();
    let project = service
        .create(sample_request(), fixed_now())
        .expect("creation succeeds");

    let cancelled = service
        .cancel(&project.id, "tender withdrawn".to_string(), fixed_now())
        .expect("cancellation succeeds");
    assert_eq!(cancelled.status, ProjectStatus::Cancelled);
    assert_eq!(cancelled.version, 1);

    let again = service
        .cancel(&project.id, "tender withdrawn".to_string(), fixed_now())
        .expect("repeat cancellation succeeds");
    assert_eq!(again.status, ProjectStatus::Cancelled);
    assert_eq!(again.version, 1);

    assert_eq!(sink.events().len(), 1);
}

/// Store wrapper that reports a stale version for a configured number of
/// saves before delegating to the real store.
struct ContendedStore {
    inner: MemoryStore,
    conflicts_remaining: AtomicUsize,
}

impl ContendedStore {
    fn failing(conflicts: usize) -> Self {
        Self {
            inner: MemoryStore::default(),
            conflicts_remaining: AtomicUsize::new(conflicts),
        }
    }
}

impl ProjectStore for ContendedStore {
    fn insert(&self, project: Project) -> Result<Project, StoreError> {
        self.inner.insert(project)
    }

    fn load(&self, id: &ProjectId) -> Result<Project, StoreError> {
        self.inner.load(id)
    }

    fn save(&self, project: Project, expected_version: u64) -> Result<Project, StoreError> {
        let remaining = self.conflicts_remaining.load(Ordering::Relaxed);
        if remaining > 0 {
            self.conflicts_remaining
                .store(remaining - 1, Ordering::Relaxed);
            return Err(StoreError::ConcurrentModification);
        }
        self.inner.save(project, expected_version)
    }

    fn list(&self) -> Result<Vec<Project>, StoreError> {
        self.inner.list()
    }
}

#[test]
fn transitions_retry_past_transient_conflicts() {
    let store = Arc::new(ContendedStore::failing(1));
    let sink = Arc::new(MemorySink::default());
    let service = ProcurementService::new(store, sink.clone(), WorkflowSettings::default());

    let project = service
        .create(sample_request(), fixed_now())
        .expect("creation succeeds");
    let advanced = service
        .advance(&project.id, 3, None, fixed_now())
        .expect("advance retries past the conflict");

    assert_eq!(advanced.current_stage, 3);
    assert_eq!(sink.events().len(), 1);
}

#[test]
fn transitions_surface_exhausted_retries() {
    let store = Arc::new(ContendedStore::failing(usize::MAX));
    let sink = Arc::new(MemorySink::default());
    let service = ProcurementService::new(store, sink.clone(), WorkflowSettings::default());

    let project = service
        .create(sample_request(), fixed_now())
        .expect("creation succeeds");

    match service.advance(&project.id, 3, None, fixed_now()) {
        Err(ServiceError::RetryExhausted { attempts }) => assert_eq!(attempts, 3),
        other => panic!("expected retry exhaustion, got {other:?}"),
    }
    assert!(sink.events().is_empty());
}

#[test]
fn scan_overdue_notifies_only_past_deadline_projects() {
    let (service, _, sink) = build_service();

    let mut overdue_request = sample_request();
    overdue_request.deadline = Some(fixed_now() - Duration::days(2));
    let overdue = service
        .create(overdue_request, fixed_now())
        .expect("creation succeeds");

    let mut future_request = sample_request();
    future_request.deadline = Some(fixed_now() + Duration::days(30));
    service
        .create(future_request, fixed_now())
        .expect("creation succeeds");

    let mut undated_request = sample_request();
    undated_request.deadline = None;
    service
        .create(undated_request, fixed_now())
        .expect("creation succeeds");

    let flagged = service.scan_overdue(fixed_now()).expect("scan succeeds");
    assert_eq!(flagged, vec![overdue.id.clone()]);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].project_id, overdue.id);
    assert!(matches!(
        events[0].event,
        WorkflowEventKind::DeadlineOverdue { days_overdue: 2 }
    ));
}

#[test]
fn import_seeds_the_store() {
    let (service, store, _) = build_service();

    let seeds = vec![
        Project::new(
            ProjectId("prj-import-1".to_string()),
            "Suez Filtration".to_string(),
            "Canal Utilities".to_string(),
            30_000.0,
            None,
            fixed_now(),
        ),
        Project::new(
            ProjectId("prj-import-2".to_string()),
            "Port Said Cranes".to_string(),
            "Harbor Authority".to_string(),
            900_000.0,
            None,
            fixed_now(),
        ),
    ];

    let stored = service.import(seeds).expect("import succeeds");
    assert_eq!(stored, 2);
    assert_eq!(store.list().expect("list succeeds").len(), 2);

    let duplicate = Project::new(
        ProjectId("prj-import-1".to_string()),
        "Duplicate".to_string(),
        "Client".to_string(),
        0.0,
        None,
        fixed_now(),
    );
    match service.import(vec![duplicate]) {
        Err(ServiceError::Store(StoreError::AlreadyExists)) => {}
        other => panic!("expected duplicate rejection, got {other:?}"),
    }
}
