use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::super::catalog::StageCatalog;
use super::super::domain::{Project, ProjectStatus, RiskLevel, StageCategory};
use super::views::{
    CategoryProgressEntry, PortfolioSummary, ProjectSnapshotView, RiskBucketEntry, StatusTotals,
};

#[derive(Debug, Default, Clone)]
pub struct CategoryProgress {
    pub projects: usize,
    pub progress_sum: f64,
}

/// Portfolio-wide rollup over every project the store knows about. Risk,
/// category, and staleness figures only count non-terminal projects.
#[derive(Debug)]
pub struct PortfolioReport {
    generated_at: DateTime<Utc>,
    totals: StatusTotals,
    open_pipeline_value: f64,
    category_progress: HashMap<StageCategory, CategoryProgress>,
    risk_counts: HashMap<RiskLevel, usize>,
    overdue: Vec<ProjectSnapshotView>,
    stalled: Vec<ProjectSnapshotView>,
}

impl PortfolioReport {
    pub fn build(projects: &[Project], now: DateTime<Utc>, stalled_after_days: i64) -> Self {
        let catalog = StageCatalog::standard();

        let mut totals = StatusTotals::default();
        let mut open_pipeline_value = 0.0;
        let mut category_progress: HashMap<StageCategory, CategoryProgress> = HashMap::new();
        let mut risk_counts: HashMap<RiskLevel, usize> = HashMap::new();
        let mut overdue = Vec::new();
        let mut stalled = Vec::new();

        for project in projects {
            match project.status {
                ProjectStatus::Active => totals.active += 1,
                ProjectStatus::OnHold => totals.on_hold += 1,
                ProjectStatus::Completed => totals.completed += 1,
                ProjectStatus::Cancelled => totals.cancelled += 1,
            }

            if project.status.is_terminal() {
                continue;
            }

            open_pipeline_value += project.estimated_value;

            if let Ok(category) = catalog.category_of(project.current_stage) {
                let entry = category_progress.entry(category).or_default();
                entry.projects += 1;
                entry.progress_sum += project.progress_percent();
            }

            *risk_counts.entry(project.risk_level(now)).or_default() += 1;

            if matches!(project.days_remaining(now), Some(days) if days < 0) {
                overdue.push(ProjectSnapshotView::from_project(project, &catalog, now));
            }

            if project.elapsed_in_current_stage(now).num_days() >= stalled_after_days {
                stalled.push(ProjectSnapshotView::from_project(project, &catalog, now));
            }
        }

        overdue.sort_by(|a, b| a.deadline.cmp(&b.deadline));
        stalled.sort_by(|a, b| b.days_in_current_stage.cmp(&a.days_in_current_stage));

        Self {
            generated_at: now,
            totals,
            open_pipeline_value,
            category_progress,
            risk_counts,
            overdue,
            stalled,
        }
    }

    pub fn summary(&self) -> PortfolioSummary {
        let category_progress = StageCategory::ordered()
            .into_iter()
            .filter_map(|category| {
                self.category_progress
                    .get(&category)
                    .map(|progress| CategoryProgressEntry {
                        category,
                        category_label: category.label(),
                        projects: progress.projects,
                        average_progress: if progress.projects == 0 {
                            0.0
                        } else {
                            (progress.progress_sum / progress.projects as f64 * 10.0).round() / 10.0
                        },
                    })
            })
            .collect();

        let risk_breakdown = RiskLevel::ordered()
            .into_iter()
            .filter_map(|level| {
                self.risk_counts.get(&level).map(|count| RiskBucketEntry {
                    level,
                    level_label: level.label(),
                    projects: *count,
                })
            })
            .collect();

        PortfolioSummary {
            generated_at: self.generated_at,
            totals: self.totals,
            open_pipeline_value: self.open_pipeline_value,
            category_progress,
            risk_breakdown,
            overdue_projects: self.overdue.clone(),
            stalled_projects: self.stalled.clone(),
        }
    }
}
