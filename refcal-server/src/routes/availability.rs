//! Availability index endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use refcal_core::{AvailabilityIndex, AvailabilityStatus};
use serde::Deserialize;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/availability/{year}", get(window))
        .route("/availability", post(toggle))
}

/// GET /availability/:year - Availability for year-1 ..= year+1
async fn window(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> Result<Json<AvailabilityIndex>, AppError> {
    Ok(Json(state.service().window(year)?))
}

/// Request body for a toggle
#[derive(Deserialize)]
pub struct ToggleRequest {
    pub user_id: String,
    pub date: String,
    pub status: AvailabilityStatus,
}

/// POST /availability - Set one user's availability for one day
async fn toggle(
    State(state): State<AppState>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<AvailabilityIndex>, AppError> {
    let window = state
        .service()
        .toggle(&req.user_id, &req.date, req.status)?;

    Ok(Json(window))
}
