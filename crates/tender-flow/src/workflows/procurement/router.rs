use std::io::Cursor;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::super::ledger::LedgerImporter;
use super::domain::{Project, ProjectId, StageCategory};
use super::engine::WorkflowError;
use super::report::views::{PortfolioSummary, ProjectSnapshotView};
use super::report::PortfolioReport;
use super::service::{NewProject, ProcurementService, ServiceError};
use super::store::{NotificationSink, ProjectStore, StoreError};

/// Router builder exposing the procurement workflow over HTTP.
pub fn procurement_router<S, N>(service: Arc<ProcurementService<S, N>>) -> Router
where
    S: ProjectStore + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route("/api/v1/procurement/projects", post(create_handler::<S, N>))
        .route(
            "/api/v1/procurement/projects/:project_id",
            get(get_handler::<S, N>),
        )
        .route(
            "/api/v1/procurement/projects/:project_id/advance",
            post(advance_handler::<S, N>),
        )
        .route(
            "/api/v1/procurement/projects/:project_id/complete",
            post(complete_handler::<S, N>),
        )
        .route(
            "/api/v1/procurement/projects/:project_id/cancel",
            post(cancel_handler::<S, N>),
        )
        .route(
            "/api/v1/procurement/projects/:project_id/hold",
            post(hold_handler::<S, N>),
        )
        .route(
            "/api/v1/procurement/projects/:project_id/resume",
            post(resume_handler::<S, N>),
        )
        .route("/api/v1/procurement/stages", get(stages_handler::<S, N>))
        .route("/api/v1/procurement/report", post(report_handler::<S, N>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateProjectRequest {
    pub(crate) name: String,
    pub(crate) client: String,
    #[serde(default)]
    pub(crate) estimated_value: f64,
    #[serde(default)]
    pub(crate) deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdvanceRequest {
    pub(crate) target_stage: u8,
    #[serde(default)]
    pub(crate) note: Option<String>,
    #[serde(default)]
    pub(crate) now: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TimestampRequest {
    #[serde(default)]
    pub(crate) now: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CancelRequest {
    pub(crate) reason: String,
    #[serde(default)]
    pub(crate) now: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HoldRequest {
    #[serde(default)]
    pub(crate) reason: Option<String>,
    #[serde(default)]
    pub(crate) now: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportRequest {
    #[serde(default)]
    pub(crate) now: Option<DateTime<Utc>>,
    #[serde(default)]
    pub(crate) include_projects: bool,
    #[serde(default)]
    pub(crate) ledger_csv: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportResponse {
    pub(crate) data_source: ReportDataSource,
    #[serde(flatten)]
    pub(crate) summary: PortfolioSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) projects: Option<Vec<ProjectSnapshotView>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ReportDataSource {
    Ledger,
    Store,
}

#[derive(Debug, Serialize)]
struct StageEntry {
    number: u8,
    name: &'static str,
    category: StageCategory,
    category_label: &'static str,
    typical_duration_days: f32,
    automation_level: u8,
}

fn error_response(error: ServiceError) -> Response {
    let status = match &error {
        ServiceError::Workflow(WorkflowError::TerminalState { .. }) => StatusCode::CONFLICT,
        ServiceError::Workflow(_) | ServiceError::NegativeValue(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        ServiceError::Store(StoreError::AlreadyExists)
        | ServiceError::Store(StoreError::ConcurrentModification)
        | ServiceError::RetryExhausted { .. } => StatusCode::CONFLICT,
        ServiceError::Store(StoreError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let body = Json(json!({ "error": error.to_string() }));
    (status, body).into_response()
}

fn snapshot_response<S, N>(
    service: &ProcurementService<S, N>,
    project: &Project,
    now: DateTime<Utc>,
    status: StatusCode,
) -> Response
where
    S: ProjectStore + 'static,
    N: NotificationSink + 'static,
{
    let view = ProjectSnapshotView::from_project(project, service.engine().catalog(), now);
    (status, Json(view)).into_response()
}

pub(crate) async fn create_handler<S, N>(
    State(service): State<Arc<ProcurementService<S, N>>>,
    Json(request): Json<CreateProjectRequest>,
) -> Response
where
    S: ProjectStore + 'static,
    N: NotificationSink + 'static,
{
    let now = Utc::now();
    let new_project = NewProject {
        name: request.name,
        client: request.client,
        estimated_value: request.estimated_value,
        deadline: request.deadline,
    };

    match service.create(new_project, now) {
        Ok(project) => snapshot_response(&service, &project, now, StatusCode::CREATED),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<S, N>(
    State(service): State<Arc<ProcurementService<S, N>>>,
    Path(project_id): Path<String>,
) -> Response
where
    S: ProjectStore + 'static,
    N: NotificationSink + 'static,
{
    let now = Utc::now();
    match service.get(&ProjectId(project_id)) {
        Ok(project) => snapshot_response(&service, &project, now, StatusCode::OK),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn advance_handler<S, N>(
    State(service): State<Arc<ProcurementService<S, N>>>,
    Path(project_id): Path<String>,
    Json(request): Json<AdvanceRequest>,
) -> Response
where
    S: ProjectStore + 'static,
    N: NotificationSink + 'static,
{
    let now = request.now.unwrap_or_else(Utc::now);
    let id = ProjectId(project_id);
    match service.advance(&id, request.target_stage, request.note, now) {
        Ok(project) => snapshot_response(&service, &project, now, StatusCode::OK),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn complete_handler<S, N>(
    State(service): State<Arc<ProcurementService<S, N>>>,
    Path(project_id): Path<String>,
    Json(request): Json<TimestampRequest>,
) -> Response
where
    S: ProjectStore + 'static,
    N: NotificationSink + 'static,
{
    let now = request.now.unwrap_or_else(Utc::now);
    match service.complete(&ProjectId(project_id), now) {
        Ok(project) => snapshot_response(&service, &project, now, StatusCode::OK),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cancel_handler<S, N>(
    State(service): State<Arc<ProcurementService<S, N>>>,
    Path(project_id): Path<String>,
    Json(request): Json<CancelRequest>,
) -> Response
where
    S: ProjectStore + 'static,
    N: NotificationSink + 'static,
{
    let now = request.now.unwrap_or_else(Utc::now);
    match service.cancel(&ProjectId(project_id), request.reason, now) {
        Ok(project) => snapshot_response(&service, &project, now, StatusCode::OK),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn hold_handler<S, N>(
    State(service): State<Arc<ProcurementService<S, N>>>,
    Path(project_id): Path<String>,
    Json(request): Json<HoldRequest>,
) -> Response
where
    S: ProjectStore + 'static,
    N: NotificationSink + 'static,
{
    let now = request.now.unwrap_or_else(Utc::now);
    match service.hold(&ProjectId(project_id), request.reason, now) {
        Ok(project) => snapshot_response(&service, &project, now, StatusCode::OK),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn resume_handler<S, N>(
    State(service): State<Arc<ProcurementService<S, N>>>,
    Path(project_id): Path<String>,
    Json(request): Json<TimestampRequest>,
) -> Response
where
    S: ProjectStore + 'static,
    N: NotificationSink + 'static,
{
    let now = request.now.unwrap_or_else(Utc::now);
    match service.resume(&ProjectId(project_id), now) {
        Ok(project) => snapshot_response(&service, &project, now, StatusCode::OK),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn stages_handler<S, N>(
    State(service): State<Arc<ProcurementService<S, N>>>,
) -> Json<Vec<StageEntry>>
where
    S: ProjectStore + 'static,
    N: NotificationSink + 'static,
{
    let entries = service
        .engine()
        .catalog()
        .definitions()
        .iter()
        .map(|stage| StageEntry {
            number: stage.number,
            name: stage.name,
            category: stage.category,
            category_label: stage.category.label(),
            typical_duration_days: stage.typical_duration_days,
            automation_level: stage.automation_level,
        })
        .collect();

    Json(entries)
}

pub(crate) async fn report_handler<S, N>(
    State(service): State<Arc<ProcurementService<S, N>>>,
    Json(request): Json<ReportRequest>,
) -> Response
where
    S: ProjectStore + 'static,
    N: NotificationSink + 'static,
{
    let now = request.now.unwrap_or_else(Utc::now);

    let (projects, data_source) = if let Some(csv) = request.ledger_csv {
        let reader = Cursor::new(csv.into_bytes());
        match LedgerImporter::from_reader(reader, now) {
            Ok(projects) => (projects, ReportDataSource::Ledger),
            Err(error) => {
                let body = Json(json!({ "error": error.to_string() }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
        }
    } else {
        match service.projects() {
            Ok(projects) => (projects, ReportDataSource::Store),
            Err(error) => return error_response(error),
        }
    };

    let report = PortfolioReport::build(&projects, now, service.stalled_after_days());
    let summary = report.summary();
    let catalog = service.engine().catalog();
    let project_views = request.include_projects.then(|| {
        projects
            .iter()
            .map(|project| ProjectSnapshotView::from_project(project, catalog, now))
            .collect()
    });

    Json(ReportResponse {
        data_source,
        summary,
        projects: project_views,
    })
    .into_response()
}
