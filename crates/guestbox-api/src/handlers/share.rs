//! Media submission handler
//!
//! Reads the multipart form field by field. Text fields fill the submission
//! request; every `arquivos` field is streamed straight into the staging area
//! so large videos never sit in memory.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use guestbox_core::{AppError, StagedFile, SubmissionRequest};
use guestbox_storage::{StagingArea, StagingError};
use std::io;
use std::sync::Arc;
use tokio_util::io::StreamReader;

use crate::constants::{FILES_FIELD, SHARE_OK_MESSAGE};
use crate::error::{HttpAppError, IntakeResponse};
use crate::state::AppState;
use crate::validation::validate_submission;

/// `POST /compartilhar`: store the guest's files in a new container, notify,
/// and record the submission.
#[tracing::instrument(skip(state, multipart))]
pub async fn share_media(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let submitted_at = Utc::now();
    let staging = state.orchestrator.staging().clone();

    let mut request = SubmissionRequest::default();
    let mut staged = Vec::new();

    if let Err(e) = read_form(
        &mut multipart,
        &staging,
        submitted_at,
        &mut request,
        &mut staged,
    )
    .await
    {
        discard_all(&staging, &staged).await;
        return Err(e.into());
    }

    let guest = match validate_submission(request) {
        Ok(guest) => guest,
        Err(e) => {
            discard_all(&staging, &staged).await;
            return Err(e.into());
        }
    };

    state
        .orchestrator
        .submit_with_media(guest, staged, submitted_at)
        .await?;

    Ok(Json(IntakeResponse::ok(SHARE_OK_MESSAGE)))
}

async fn read_form(
    multipart: &mut Multipart,
    staging: &StagingArea,
    submitted_at: DateTime<Utc>,
    request: &mut SubmissionRequest,
    staged: &mut Vec<StagedFile>,
) -> Result<(), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == FILES_FIELD {
            // Browsers send an empty part when no file was picked
            let file_name = match field.file_name() {
                Some(file_name) if !file_name.is_empty() => file_name.to_string(),
                _ => continue,
            };

            let reader = StreamReader::new(field.map_err(io::Error::other));
            let mut reader = std::pin::pin!(reader);
            let file = staging
                .stage(&file_name, submitted_at, &mut reader)
                .await
                .map_err(staging_error)?;
            staged.push(file);
            continue;
        }

        let slot = match name.as_str() {
            "nome" | "name" => &mut request.nome,
            "sobrenome" | "surname" => &mut request.sobrenome,
            "whatsapp" | "phone" => &mut request.whatsapp,
            "nascimento" | "birthDate" => &mut request.nascimento,
            _ => {
                tracing::debug!(field = %name, "Ignoring unknown form field");
                continue;
            }
        };
        *slot = field.text().await.map_err(multipart_error)?;
    }

    Ok(())
}

async fn discard_all(staging: &StagingArea, files: &[StagedFile]) {
    for file in files {
        if let Err(e) = staging.discard(file).await {
            tracing::warn!(
                file = %file.storage_name,
                error = %e,
                "Failed to discard staged file of rejected request"
            );
        }
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    body_error(&err)
}

fn body_error(err: &MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}

/// A read error from the request body is the client's fault; anything else
/// went wrong on our side.
fn staging_error(err: StagingError) -> AppError {
    match err {
        StagingError::Io(io_err) => {
            let from_body = io_err
                .get_ref()
                .and_then(|inner| inner.downcast_ref::<MultipartError>());
            match from_body {
                Some(multipart) => body_error(multipart),
                None => AppError::Staging(io_err.to_string()),
            }
        }
        StagingError::InvalidName(name) => {
            AppError::BadRequest(format!("Invalid file name: {:?}", name))
        }
        other => AppError::Staging(other.to_string()),
    }
}
