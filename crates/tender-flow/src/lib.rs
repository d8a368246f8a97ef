//! Workflow engine and service layer for the 32-stage tender-to-delivery
//! procurement pipeline.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
