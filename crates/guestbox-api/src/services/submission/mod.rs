//! Submission pipeline: one guest's form data and files become a storage
//! container, a set of notifications and a ledger entry.

pub mod notice;
pub mod service;
pub mod types;

pub use service::SubmissionOrchestrator;
pub use types::{
    DeliveryOutcome, OrchestratorConfig, SubmissionError, SubmissionReport,
};
