//! Guestbox API Library
//!
//! This crate provides the HTTP intake endpoints, the submission orchestrator
//! they drive, and application setup.

pub mod constants;
pub mod error;
mod handlers;
pub mod services;
pub mod setup;
pub mod state;
mod telemetry;
mod validation;

// Re-exports
pub use error::{HttpAppError, IntakeResponse};
pub use services::submission::{
    DeliveryOutcome, OrchestratorConfig, SubmissionError, SubmissionOrchestrator,
    SubmissionReport,
};
pub use state::AppState;
