use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::wizard::WizardError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("AI provider error: {0}")]
    Ai(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Wizard(#[from] WizardError),
}

impl AppError {
    pub fn storage(e: anyhow::Error) -> Self {
        AppError::Storage(format!("{e:#}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Ai(_) => StatusCode::BAD_GATEWAY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Wizard(WizardError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Wizard(WizardError::WrongStep(_) | WizardError::SubmissionInFlight) => {
                StatusCode::CONFLICT
            }
            AppError::Wizard(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
