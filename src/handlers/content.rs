use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::content::PACKAGES_KEY;
use crate::models::{Package, PriceBreakdown};
use crate::services::pricing::{self, Conversion};
use crate::state::AppState;

#[derive(Serialize)]
pub struct PackageView {
    #[serde(flatten)]
    package: Package,
    breakdown: PriceBreakdown,
}

// GET /api/packages
pub async fn get_packages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PackageView>>, AppError> {
    let conversion = Conversion::gbp_to_krw(state.config.krw_per_gbp);
    let packages = state.content.packages().map_err(AppError::storage)?;

    let views = packages
        .into_iter()
        .map(|package| PackageView {
            breakdown: pricing::resolve_with(&package.price, Some(&conversion)),
            package,
        })
        .collect();

    Ok(Json(views))
}

// GET /api/content/:key
pub async fn get_content(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if key == PACKAGES_KEY {
        let packages = state.content.packages().map_err(AppError::storage)?;
        let value = serde_json::to_value(packages).map_err(|e| AppError::storage(e.into()))?;
        return Ok(Json(value));
    }

    let raw = state
        .content
        .load(&key)
        .map_err(AppError::storage)?
        .ok_or_else(|| AppError::NotFound(format!("content key {key}")))?;

    let value = serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw));
    Ok(Json(value))
}
