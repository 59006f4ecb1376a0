use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::availability::{is_template_time, parse_date_key};
use crate::services::content;
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if expected_token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    parse_date_key(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

fn check_time(time: &str) -> Result<(), AppError> {
    if !is_template_time(time) {
        return Err(AppError::BadRequest(format!("unknown slot time: {time}")));
    }
    Ok(())
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 64
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

// GET /api/admin/content
pub async fn list_content(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<String>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let keys = state.content.keys().map_err(AppError::storage)?;
    Ok(Json(keys))
}

// PUT /api/admin/content/:key
pub async fn save_content(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(key): Path<String>,
    Json(value): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    if !is_valid_key(&key) {
        return Err(AppError::BadRequest(format!("invalid content key: {key}")));
    }
    content::validate(&key, &value).map_err(|e| AppError::BadRequest(e.to_string()))?;

    state
        .content
        .save(&key, &value.to_string())
        .map_err(AppError::storage)?;

    tracing::info!(key = %key, "content updated");
    Ok(Json(serde_json::json!({"ok": true})))
}

// POST /api/admin/availability/:date
pub async fn ensure_day(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(date): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let date = parse_date(&date)?;

    let created = state
        .availability
        .ensure_day(date)
        .map_err(AppError::storage)?;

    if created {
        tracing::info!(date = %date, "day schedule created");
    }
    Ok(Json(serde_json::json!({"created": created})))
}

// POST /api/admin/availability/:date/:time/block
pub async fn toggle_block(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((date, time)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let date = parse_date(&date)?;
    check_time(&time)?;

    let blocked = state
        .availability
        .toggle_blocked(date, &time)
        .map_err(AppError::storage)?;

    tracing::info!(date = %date, time = %time, blocked, "slot block toggled");
    Ok(Json(serde_json::json!({"time": time, "is_blocked": blocked})))
}

#[derive(Deserialize)]
pub struct BookedRequest {
    pub booked: bool,
}

// POST /api/admin/availability/:date/:time/booked
pub async fn set_booked(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((date, time)): Path<(String, String)>,
    Json(payload): Json<BookedRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let date = parse_date(&date)?;
    check_time(&time)?;

    state
        .availability
        .set_booked(date, &time, payload.booked)
        .map_err(AppError::storage)?;

    tracing::info!(date = %date, time = %time, booked = payload.booked, "slot booked flag set");
    Ok(Json(serde_json::json!({"time": time, "is_booked": payload.booked})))
}
