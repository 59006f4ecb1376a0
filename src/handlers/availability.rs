use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use crate::errors::AppError;
use crate::models::availability::parse_date_key;
use crate::services::availability::{day_availability, SlotAvailability};
use crate::state::AppState;

// GET /api/availability/:date
pub async fn get_day_availability(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Result<Json<Vec<SlotAvailability>>, AppError> {
    let date = parse_date_key(&date).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let slots = day_availability(state.availability.as_ref(), date, state.clock.now())
        .map_err(AppError::storage)?;
    Ok(Json(slots))
}
