//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Any `AppError`
//! (or a type converting into it) becomes an `HttpAppError`, which renders the
//! intake response body and logs at the level the error declares.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use guestbox_core::{AppError, ErrorMetadata, LogLevel};
use serde::{de::DeserializeOwned, Serialize};

/// Response body for both intake operations
#[derive(Debug, Serialize)]
pub struct IntakeResponse {
    /// "ok" or "erro"
    pub status: &'static str,
    pub mensagem: String,
    /// Machine-readable error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    /// Pipeline stage that failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etapa: Option<String>,
    /// Internal error text; only outside production and for non-sensitive errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detalhes: Option<String>,
}

impl IntakeResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok",
            mensagem: message.into(),
            codigo: None,
            etapa: None,
            detalhes: None,
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<crate::services::submission::SubmissionError> for HttpAppError {
    fn from(err: crate::services::submission::SubmissionError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::BadRequest(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that answers malformed bodies in the intake response format.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let stage = error.stage().map(|s| s.as_str()).unwrap_or("-");
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type, stage, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type, stage, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type, stage, "Request failed");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .map(|env| {
            let env = env.to_lowercase();
            env == "production" || env == "prod"
        })
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let detalhes = if is_production_env() || app_error.is_sensitive() {
            None
        } else {
            Some(app_error.detailed_message())
        };

        let body = IntakeResponse {
            status: "erro",
            mensagem: app_error.client_message(),
            codigo: Some(app_error.error_code().to_string()),
            etapa: app_error.stage().map(|s| s.as_str().to_string()),
            detalhes,
        };

        (status, Json(body)).into_response()
    }
}
