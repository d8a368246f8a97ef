use chrono::{DateTime, Utc};
use serde::Serialize;

use super::super::catalog::StageCatalog;
use super::super::domain::{Project, ProjectId, ProjectStatus, RiskLevel, StageCategory};

#[derive(Debug, Clone, Serialize)]
pub struct CategoryProgressEntry {
    pub category: StageCategory,
    pub category_label: &'static str,
    pub projects: usize,
    pub average_progress: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskBucketEntry {
    pub level: RiskLevel,
    pub level_label: &'static str,
    pub projects: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusTotals {
    pub active: usize,
    pub on_hold: usize,
    pub completed: usize,
    pub cancelled: usize,
}

/// Point-in-time rendering of one project for API responses and reports.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSnapshotView {
    pub id: ProjectId,
    pub name: String,
    pub client: String,
    pub status: ProjectStatus,
    pub status_label: &'static str,
    pub current_stage: u8,
    pub stage_name: &'static str,
    pub category: StageCategory,
    pub category_label: &'static str,
    pub progress_percent: f64,
    pub risk_level: RiskLevel,
    pub risk_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
    pub days_in_current_stage: i64,
    pub estimated_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
}

impl ProjectSnapshotView {
    pub fn from_project(project: &Project, catalog: &StageCatalog, now: DateTime<Utc>) -> Self {
        let definition = catalog.definition(project.current_stage).ok();
        let category = definition
            .map(|stage| stage.category)
            .unwrap_or(StageCategory::DocumentProcessing);
        let risk_level = project.risk_level(now);

        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            client: project.client.clone(),
            status: project.status,
            status_label: project.status.label(),
            current_stage: project.current_stage,
            stage_name: definition.map(|stage| stage.name).unwrap_or("unknown"),
            category,
            category_label: category.label(),
            progress_percent: project.progress_percent(),
            risk_level,
            risk_label: risk_level.label(),
            days_remaining: project.days_remaining(now),
            days_in_current_stage: project.elapsed_in_current_stage(now).num_days(),
            estimated_value: project.estimated_value,
            deadline: project.deadline,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub generated_at: DateTime<Utc>,
    pub totals: StatusTotals,
    pub open_pipeline_value: f64,
    pub category_progress: Vec<CategoryProgressEntry>,
    pub risk_breakdown: Vec<RiskBucketEntry>,
    pub overdue_projects: Vec<ProjectSnapshotView>,
    pub stalled_projects: Vec<ProjectSnapshotView>,
}
