//! Data-only submission handler

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use guestbox_core::SubmissionRequest;
use std::sync::Arc;

use crate::constants::SUBMIT_OK_MESSAGE;
use crate::error::{HttpAppError, IntakeResponse, ValidatedJson};
use crate::state::AppState;
use crate::validation::validate_submission;

/// `POST /enviar`: notify the fan-out targets and record the guest.
#[tracing::instrument(skip(state, request))]
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SubmissionRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let guest = validate_submission(request)?;

    state
        .orchestrator
        .submit_contact_only(guest, Utc::now())
        .await?;

    Ok(Json(IntakeResponse::ok(SUBMIT_OK_MESSAGE)))
}
