use serde::Serialize;

use super::domain::StageCategory;
use super::engine::WorkflowError;

pub const FIRST_STAGE: u8 = 1;
pub const LAST_STAGE: u8 = 32;

/// Static description of one pipeline stage. Duration and automation level
/// are advisory scheduling metadata, never enforced.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StageDefinition {
    pub number: u8,
    pub name: &'static str,
    pub category: StageCategory,
    pub typical_duration_days: f32,
    pub automation_level: u8,
}

#[derive(Debug)]
pub struct StageCatalog {
    stages: Vec<StageDefinition>,
}

impl StageCatalog {
    pub fn standard() -> Self {
        Self {
            stages: standard_stage_definitions(),
        }
    }

    pub fn definitions(&self) -> &[StageDefinition] {
        &self.stages
    }

    pub fn definition(&self, number: u8) -> Result<&StageDefinition, WorkflowError> {
        self.stages
            .iter()
            .find(|stage| stage.number == number)
            .ok_or(WorkflowError::UnknownStage(number))
    }

    pub fn category_of(&self, number: u8) -> Result<StageCategory, WorkflowError> {
        StageCategory::of_stage(number).ok_or(WorkflowError::UnknownStage(number))
    }

    pub fn stages_in(&self, category: StageCategory) -> Vec<&StageDefinition> {
        self.stages
            .iter()
            .filter(|stage| stage.category == category)
            .collect()
    }
}

const fn stage(
    number: u8,
    name: &'static str,
    category: StageCategory,
    typical_duration_days: f32,
    automation_level: u8,
) -> StageDefinition {
    StageDefinition {
        number,
        name,
        category,
        typical_duration_days,
        automation_level,
    }
}

fn standard_stage_definitions() -> Vec<StageDefinition> {
    use StageCategory::*;

    vec![
        stage(1, "Tender Document Intake", DocumentProcessing, 1.0, 90),
        stage(2, "Document Classification", DocumentProcessing, 1.0, 85),
        stage(3, "Technical Data Extraction", DocumentProcessing, 2.0, 80),
        stage(4, "Requirements Validation", DocumentProcessing, 1.0, 60),
        stage(5, "Supplier Shortlisting", Communication, 2.0, 70),
        stage(6, "Quotation Requests Sent", Communication, 1.0, 95),
        stage(7, "Quotation Collection", Analysis, 5.0, 50),
        stage(8, "Technical Comparison", Analysis, 3.0, 65),
        stage(9, "Commercial Evaluation", Analysis, 2.0, 60),
        stage(10, "Recommendation Draft", Analysis, 1.0, 55),
        stage(11, "Internal Approval", Approval, 3.0, 30),
        stage(12, "Client Proposal Submitted", Approval, 1.0, 75),
        stage(13, "Client Clarifications", Approval, 4.0, 40),
        stage(14, "Client Approval Received", Approval, 2.0, 20),
        stage(15, "Purchase Order Issued", OrderProcessing, 1.0, 90),
        stage(16, "Order Confirmation", OrderProcessing, 2.0, 70),
        stage(17, "Payment Terms Agreed", OrderProcessing, 3.0, 45),
        stage(18, "Production Scheduled", OrderProcessing, 2.0, 50),
        stage(19, "Production Monitoring", Monitoring, 10.0, 60),
        stage(20, "Pre-Shipment Documentation", Monitoring, 3.0, 70),
        stage(21, "Export Clearance", Customs, 3.0, 40),
        stage(22, "Freight Booking", Customs, 2.0, 65),
        stage(23, "Bill of Lading Issued", Customs, 1.0, 75),
        stage(24, "Letter of Credit Settlement", Customs, 4.0, 35),
        stage(25, "Customs Declaration Filed", Customs, 2.0, 55),
        stage(26, "Customs Inspection", Customs, 3.0, 20),
        stage(27, "Customs Release", Customs, 1.0, 45),
        stage(28, "Inland Transport", Delivery, 2.0, 60),
        stage(29, "Warehouse Receipt", Delivery, 1.0, 70),
        stage(30, "Final Quality Inspection", Delivery, 2.0, 40),
        stage(31, "Client Delivery", Delivery, 1.0, 55),
        stage(32, "Project Closeout", Delivery, 2.0, 50),
    ]
}
