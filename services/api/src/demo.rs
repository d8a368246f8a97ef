use crate::infra::{InMemoryNotificationSink, InMemoryProjectStore};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tender_flow::error::AppError;
use tender_flow::workflows::ledger::LedgerImporter;
use tender_flow::workflows::procurement::report::views::{PortfolioSummary, ProjectSnapshotView};
use tender_flow::workflows::procurement::{
    NewProject, PortfolioReport, ProcurementService, Project, ProjectId, ProjectStatus,
    StageCatalog, WorkflowSettings,
};

#[derive(Args, Debug)]
pub(crate) struct PortfolioReportArgs {
    /// Evaluation instant for the report (YYYY-MM-DD or RFC 3339, defaults to now)
    #[arg(long, value_parser = crate::infra::parse_datetime)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Optional ledger CSV export to report over instead of the sample portfolio
    #[arg(long)]
    pub(crate) ledger_csv: Option<PathBuf>,
    /// Include a per-project listing in the output
    #[arg(long)]
    pub(crate) list_projects: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the demo clock (YYYY-MM-DD or RFC 3339, defaults to now)
    #[arg(long, value_parser = crate::infra::parse_datetime)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Optional ledger CSV export to seed the demo portfolio
    #[arg(long)]
    pub(crate) ledger_csv: Option<PathBuf>,
    /// Include a per-project listing in the report output
    #[arg(long)]
    pub(crate) list_projects: bool,
}

pub(crate) fn run_portfolio_report(args: PortfolioReportArgs) -> Result<(), AppError> {
    let PortfolioReportArgs {
        now,
        ledger_csv,
        list_projects,
    } = args;

    let now = now.unwrap_or_else(Utc::now);
    let (projects, imported) = load_projects(ledger_csv, now)?;

    let settings = WorkflowSettings::default();
    let report = PortfolioReport::build(&projects, now, settings.stalled_after_days);

    println!("Procurement portfolio report (evaluated {now})");
    if imported {
        println!("Data source: ledger CSV import");
    } else {
        println!("Data source: built-in sample portfolio");
    }

    render_portfolio(&report.summary(), &projects, now, list_projects);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        now,
        ledger_csv,
        list_projects,
    } = args;

    let now = now.unwrap_or_else(Utc::now);

    println!("Procurement workflow demo (clock {now})");

    let store = Arc::new(InMemoryProjectStore::default());
    let notifications = Arc::new(InMemoryNotificationSink::default());
    let service = Arc::new(ProcurementService::new(
        store,
        notifications.clone(),
        WorkflowSettings::default(),
    ));

    let (seeds, imported) = load_projects(ledger_csv, now)?;
    let seeded = service.import(seeds).map_err(AppError::from)?;
    if imported {
        println!("Seeded {seeded} project(s) from the ledger export");
    } else {
        println!("Seeded {seeded} sample project(s)");
    }

    println!("\nLifecycle walkthrough");
    let project = service
        .create(
            NewProject {
                name: "Ras Gharib Tender 2025".to_string(),
                client: "Petro Services".to_string(),
                estimated_value: 450_000.0,
                deadline: Some(now + Duration::days(45)),
            },
            now,
        )
        .map_err(AppError::from)?;
    println!(
        "- Opened {} at stage {} ({:.1}% progress)",
        project.id.0,
        project.current_stage,
        project.progress_percent()
    );

    let project = service
        .advance(&project.id, 5, Some("documents validated".to_string()), now)
        .map_err(AppError::from)?;
    println!(
        "- Advanced {} to stage {} ({:.1}% progress, risk {})",
        project.id.0,
        project.current_stage,
        project.progress_percent(),
        project.risk_level(now).label()
    );

    let project = service
        .advance(&project.id, 32, Some("administrative catch-up".to_string()), now)
        .map_err(AppError::from)?;
    println!(
        "- Jumped {} to stage {}; status remains {}",
        project.id.0,
        project.current_stage,
        project.status.label()
    );

    let project = service.complete(&project.id, now).map_err(AppError::from)?;
    println!("- Closed out {} as {}", project.id.0, project.status.label());

    let cancelled = service
        .create(
            NewProject {
                name: "Withdrawn Tender".to_string(),
                client: "Inland Works".to_string(),
                estimated_value: 60_000.0,
                deadline: None,
            },
            now,
        )
        .map_err(AppError::from)?;
    let cancelled = service
        .cancel(&cancelled.id, "client withdrew the tender".to_string(), now)
        .map_err(AppError::from)?;
    println!(
        "- Cancelled {} ({})",
        cancelled.id.0,
        cancelled.history.last().and_then(|record| record.note.as_deref()).unwrap_or("no reason recorded")
    );

    let overdue = service.scan_overdue(now).map_err(AppError::from)?;
    if overdue.is_empty() {
        println!("- Overdue sweep flagged no projects");
    } else {
        println!(
            "- Overdue sweep flagged: {}",
            overdue
                .iter()
                .map(|id| id.0.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let report = service.portfolio_report(now).map_err(AppError::from)?;
    let projects = service.projects().map_err(AppError::from)?;
    println!("\nPortfolio after the walkthrough");
    render_portfolio(&report.summary(), &projects, now, list_projects);

    let events = notifications.events();
    if events.is_empty() {
        println!("\nNotifications dispatched: none");
    } else {
        println!("\nNotifications dispatched");
        for event in events {
            match serde_json::to_string(&event) {
                Ok(json) => println!("- {json}"),
                Err(err) => println!("- unserializable event: {err}"),
            }
        }
    }

    Ok(())
}

fn load_projects(
    ledger_csv: Option<PathBuf>,
    now: DateTime<Utc>,
) -> Result<(Vec<Project>, bool), AppError> {
    match ledger_csv {
        Some(path) => LedgerImporter::from_path(path, now)
            .map(|projects| (projects, true))
            .map_err(AppError::from),
        None => Ok((sample_projects(now), false)),
    }
}

/// Deterministic portfolio relative to the supplied clock: one overdue,
/// one close to its deadline, one stalled, one on hold, one comfortable.
fn sample_projects(now: DateTime<Utc>) -> Vec<Project> {
    fn seeded(
        id: &str,
        name: &str,
        client: &str,
        value: f64,
        stage: u8,
        status: ProjectStatus,
        deadline: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Project {
        let mut project = Project::new(
            ProjectId(id.to_string()),
            name.to_string(),
            client.to_string(),
            value,
            deadline,
            created_at,
        );
        project.current_stage = stage;
        project.status = status;
        project
    }

    vec![
        seeded(
            "prj-sample-01",
            "Alexandria Switchgear",
            "Delta Marine",
            320_000.0,
            15,
            ProjectStatus::Active,
            Some(now - Duration::days(3)),
            now - Duration::days(40),
        ),
        seeded(
            "prj-sample-02",
            "Damietta Compressors",
            "Nile Energy",
            180_000.0,
            9,
            ProjectStatus::Active,
            Some(now + Duration::days(5)),
            now - Duration::days(10),
        ),
        seeded(
            "prj-sample-03",
            "Suez Filtration Skids",
            "Canal Utilities",
            95_000.0,
            22,
            ProjectStatus::Active,
            Some(now + Duration::days(60)),
            now - Duration::days(21),
        ),
        seeded(
            "prj-sample-04",
            "Port Said Crane Spares",
            "Harbor Authority",
            740_000.0,
            12,
            ProjectStatus::OnHold,
            Some(now + Duration::days(10)),
            now - Duration::days(8),
        ),
        seeded(
            "prj-sample-05",
            "Cairo Metro Fasteners",
            "Transit Works",
            54_000.0,
            30,
            ProjectStatus::Active,
            None,
            now - Duration::days(5),
        ),
    ]
}

fn render_portfolio(
    summary: &PortfolioSummary,
    projects: &[Project],
    now: DateTime<Utc>,
    list_projects: bool,
) {
    println!("\nStatus totals");
    println!(
        "- {} active | {} on hold | {} completed | {} cancelled",
        summary.totals.active,
        summary.totals.on_hold,
        summary.totals.completed,
        summary.totals.cancelled
    );
    println!(
        "- Open pipeline value: {:.0}",
        summary.open_pipeline_value
    );

    println!("\nCategory progress (open projects)");
    for entry in &summary.category_progress {
        println!(
            "- {}: {} project(s), {:.1}% average progress",
            entry.category_label, entry.projects, entry.average_progress
        );
    }

    println!("\nRisk breakdown");
    for entry in &summary.risk_breakdown {
        println!("- {}: {} project(s)", entry.level_label, entry.projects);
    }

    if summary.overdue_projects.is_empty() {
        println!("\nOverdue projects: none");
    } else {
        println!("\nOverdue projects");
        for view in &summary.overdue_projects {
            println!(
                "- {} ({}) at stage {} [{}], {} day(s) past deadline",
                view.name,
                view.client,
                view.current_stage,
                view.stage_name,
                view.days_remaining.map(|days| -days).unwrap_or_default()
            );
        }
    }

    if summary.stalled_projects.is_empty() {
        println!("\nStalled projects: none");
    } else {
        println!("\nStalled projects");
        for view in &summary.stalled_projects {
            println!(
                "- {} ({}) has sat at stage {} [{}] for {} day(s)",
                view.name, view.client, view.current_stage, view.stage_name, view.days_in_current_stage
            );
        }
    }

    if list_projects {
        let catalog = StageCatalog::standard();
        println!("\nProject breakdown");
        for project in projects {
            let view = ProjectSnapshotView::from_project(project, &catalog, now);
            println!(
                "- {} | {} | {} | stage {} [{}] | {:.1}% | risk {} | status {}",
                view.id.0,
                view.name,
                view.client,
                view.current_stage,
                view.stage_name,
                view.progress_percent,
                view.risk_label,
                view.status_label
            );
        }
    }
}
