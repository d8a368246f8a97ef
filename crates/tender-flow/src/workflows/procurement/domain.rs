use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::LAST_STAGE;

/// Identifier wrapper for procurement projects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageCategory {
    DocumentProcessing,
    Communication,
    Analysis,
    Approval,
    OrderProcessing,
    Monitoring,
    Customs,
    Delivery,
}

impl StageCategory {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::DocumentProcessing,
            Self::Communication,
            Self::Analysis,
            Self::Approval,
            Self::OrderProcessing,
            Self::Monitoring,
            Self::Customs,
            Self::Delivery,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::DocumentProcessing => "Document Processing",
            Self::Communication => "Supplier Communication",
            Self::Analysis => "Analysis & Quotation",
            Self::Approval => "Approval & Client Communication",
            Self::OrderProcessing => "Order Processing",
            Self::Monitoring => "Monitoring & Documentation",
            Self::Customs => "Customs & Financial",
            Self::Delivery => "Logistics & Delivery",
        }
    }

    /// Inclusive span of stage numbers belonging to this category.
    pub const fn stage_span(self) -> (u8, u8) {
        match self {
            Self::DocumentProcessing => (1, 4),
            Self::Communication => (5, 6),
            Self::Analysis => (7, 10),
            Self::Approval => (11, 14),
            Self::OrderProcessing => (15, 18),
            Self::Monitoring => (19, 20),
            Self::Customs => (21, 27),
            Self::Delivery => (28, 32),
        }
    }

    pub(crate) fn of_stage(number: u8) -> Option<Self> {
        Self::ordered().into_iter().find(|category| {
            let (first, last) = category.stage_span();
            (first..=last).contains(&number)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "on_hold" | "on hold" | "hold" => Some(Self::OnHold),
            "completed" | "complete" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Alert tier derived from deadline proximity and pipeline progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Critical,
            Self::High,
            Self::Medium,
            Self::Low,
            Self::Unknown,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionKind {
    Advanced { from_stage: u8, to_stage: u8 },
    Completed,
    Cancelled,
    Held,
    Resumed,
}

/// Append-only audit entry for a single project mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(flatten)]
    pub kind: TransitionKind,
    pub recorded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One procurement case tracked through the 32-stage pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub client: String,
    pub current_stage: u8,
    pub estimated_value: f64,
    pub deadline: Option<DateTime<Utc>>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub history: Vec<HistoryRecord>,
    pub version: u64,
}

impl Project {
    pub fn new(
        id: ProjectId,
        name: String,
        client: String,
        estimated_value: f64,
        deadline: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            client,
            current_stage: 1,
            estimated_value,
            deadline,
            status: ProjectStatus::Active,
            created_at,
            history: Vec::new(),
            version: 0,
        }
    }

    /// Pipeline completion as a percentage, rounded to one decimal place.
    pub fn progress_percent(&self) -> f64 {
        (self.current_stage as f64 / LAST_STAGE as f64 * 1000.0).round() / 10.0
    }

    /// Whole days until the deadline, floored, so a deadline twelve hours
    /// past already counts as day -1. `None` when no deadline is set.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        self.deadline
            .map(|deadline| (deadline - now).num_seconds().div_euclid(86_400))
    }

    /// Deadline risk tier. The precedence order and thresholds drive
    /// dashboard coloring and alerting and must not be reordered.
    pub fn risk_level(&self, now: DateTime<Utc>) -> RiskLevel {
        let Some(days_remaining) = self.days_remaining(now) else {
            return RiskLevel::Unknown;
        };

        if days_remaining < 0 {
            RiskLevel::Critical
        } else if days_remaining < 7 {
            RiskLevel::High
        } else if days_remaining < 14 && self.progress_percent() < 70.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Time spent since the last recorded transition (or since creation when
    /// the history is empty). Exposed for stuck-project detection.
    pub fn elapsed_in_current_stage(&self, now: DateTime<Utc>) -> Duration {
        let since = self
            .history
            .last()
            .map(|record| record.recorded_at)
            .unwrap_or(self.created_at);
        now - since
    }
}
