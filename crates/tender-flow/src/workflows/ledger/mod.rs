//! Import of legacy tracker CSV exports into validated project records.
//!
//! The old tracker exported one row per project; this module turns those
//! rows into `Project` seeds the store and report layers can consume,
//! enforcing the same invariants the workflow engine guarantees for
//! projects it created itself.

mod parser;

use chrono::{DateTime, Utc};
use std::io::Read;
use std::path::Path;

use crate::workflows::procurement::{
    catalog::{StageCatalog, LAST_STAGE},
    domain::{Project, ProjectId, ProjectStatus},
};

use parser::LedgerRecord;

#[derive(Debug)]
pub enum LedgerImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Invalid { row: usize, reason: String },
}

impl std::fmt::Display for LedgerImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerImportError::Io(err) => write!(f, "failed to read ledger export: {}", err),
            LedgerImportError::Csv(err) => write!(f, "invalid ledger CSV data: {}", err),
            LedgerImportError::Invalid { row, reason } => {
                write!(f, "ledger row {} rejected: {}", row, reason)
            }
        }
    }
}

impl std::error::Error for LedgerImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedgerImportError::Io(err) => Some(err),
            LedgerImportError::Csv(err) => Some(err),
            LedgerImportError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for LedgerImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for LedgerImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct LedgerImporter;

impl LedgerImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        now: DateTime<Utc>,
    ) -> Result<Vec<Project>, LedgerImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, now)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        now: DateTime<Utc>,
    ) -> Result<Vec<Project>, LedgerImportError> {
        let catalog = StageCatalog::standard();
        let mut projects = Vec::new();

        for (index, record) in parser::parse_records(reader)?.into_iter().enumerate() {
            let row = index + 2;
            projects.push(project_from_record(record, row, &catalog, now)?);
        }

        Ok(projects)
    }
}

fn project_from_record(
    record: LedgerRecord,
    row: usize,
    catalog: &StageCatalog,
    now: DateTime<Utc>,
) -> Result<Project, LedgerImportError> {
    let invalid = |reason: String| LedgerImportError::Invalid { row, reason };

    let id = record
        .id
        .ok_or_else(|| invalid("missing project id".to_string()))?;

    catalog
        .definition(record.current_stage)
        .map_err(|err| invalid(err.to_string()))?;

    let status = ProjectStatus::parse(&record.status)
        .ok_or_else(|| invalid(format!("unrecognized status '{}'", record.status)))?;

    if record.estimated_value < 0.0 {
        return Err(invalid(format!(
            "estimated value must be non-negative, got {}",
            record.estimated_value
        )));
    }

    if status == ProjectStatus::Completed && record.current_stage < LAST_STAGE {
        return Err(invalid(format!(
            "completed project cannot sit at stage {}",
            record.current_stage
        )));
    }

    Ok(Project {
        id: ProjectId(id),
        name: record.name,
        client: record.client,
        current_stage: record.current_stage,
        estimated_value: record.estimated_value,
        deadline: record.deadline,
        status,
        created_at: record.created_at.unwrap_or(now),
        history: Vec::new(),
        version: 0,
    })
}
