//! The 32-stage tender-to-delivery workflow: stage catalog, transition
//! engine, store and notification contracts, service facade, portfolio
//! reporting, and the HTTP surface.

pub mod catalog;
pub mod domain;
pub mod engine;
pub mod report;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use catalog::{StageCatalog, StageDefinition, FIRST_STAGE, LAST_STAGE};
pub use domain::{
    HistoryRecord, Project, ProjectId, ProjectStatus, RiskLevel, StageCategory, TransitionKind,
};
pub use engine::{WorkflowEngine, WorkflowError};
pub use report::PortfolioReport;
pub use router::procurement_router;
pub use service::{NewProject, ProcurementService, ServiceError, WorkflowSettings};
pub use store::{
    NotificationSink, NotifyError, ProjectStore, StoreError, WorkflowEventKind,
    WorkflowNotification,
};
