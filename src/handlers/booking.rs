use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Locale, TimeSlot};
use crate::services::booking::{self, BookingSession};
use crate::services::wizard::{BookingWizard, SubmitOutcome, WizardAction, WizardSnapshot};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub locale: Locale,
    /// Minutes east of UTC on the visitor's device, e.g. 60 during BST, 540 in Seoul.
    pub utc_offset_minutes: Option<i32>,
    /// Portfolio photos the visitor marked before starting the booking.
    #[serde(default)]
    pub liked_photos: Vec<String>,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub snapshot: WizardSnapshot,
}

#[derive(Serialize)]
pub struct ConfirmResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub snapshot: WizardSnapshot,
}

fn load_session(state: &AppState, id: &Uuid) -> Result<Arc<BookingSession>, AppError> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("booking session {id}")))
}

// POST /api/booking
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let client_offset = match payload.utc_offset_minutes {
        Some(minutes) => Some(
            minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .ok_or_else(|| {
                    AppError::BadRequest(format!("invalid utc_offset_minutes: {minutes}"))
                })?,
        ),
        None => None,
    };

    let wizard = BookingWizard::new(state.wizard_context(), payload.locale, client_offset)
        .with_liked_photos(payload.liked_photos)?;
    let snapshot = wizard.snapshot()?;
    let id = state.sessions.create(wizard);

    tracing::info!(session = %id, locale = payload.locale.as_str(), "booking session started");

    Ok((StatusCode::CREATED, Json(SessionResponse { id, snapshot })))
}

// GET /api/booking/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = load_session(&state, &id)?;
    let snapshot = session.wizard().snapshot()?;
    Ok(Json(SessionResponse { id, snapshot }))
}

// GET /api/booking/:id/times
pub async fn available_times(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TimeSlot>>, AppError> {
    let session = load_session(&state, &id)?;
    let times = session.wizard().available_times()?;
    Ok(Json(times))
}

// POST /api/booking/:id/actions
pub async fn apply_action(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(action): Json<WizardAction>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = load_session(&state, &id)?;
    let mut wizard = session.wizard();

    if let Err(e) = wizard.apply(action) {
        tracing::debug!(
            session = %id,
            step = wizard.step().as_str(),
            error = %e,
            "booking action refused"
        );
        return Err(e.into());
    }
    tracing::debug!(session = %id, step = wizard.step().as_str(), "booking action applied");

    let snapshot = wizard.snapshot()?;
    Ok(Json(SessionResponse { id, snapshot }))
}

// POST /api/booking/:id/confirm
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConfirmResponse>, AppError> {
    let session = load_session(&state, &id)?;

    let outcome = booking::confirm(Arc::clone(&session), Arc::clone(&state.submitter)).await?;
    let (status, error) = match outcome {
        SubmitOutcome::Submitted { .. } => {
            tracing::info!(session = %id, "booking confirmed");
            ("submitted", None)
        }
        SubmitOutcome::Failed(e) => {
            tracing::warn!(session = %id, error = %e, "booking submission failed");
            ("failed", Some(e.to_string()))
        }
    };

    let snapshot = session.wizard().snapshot()?;
    Ok(Json(ConfirmResponse {
        status,
        error,
        snapshot,
    }))
}

// DELETE /api/booking/:id
pub async fn abandon_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(&id) {
        tracing::info!(session = %id, "booking session abandoned");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("booking session {id}")))
    }
}
