//! Month view endpoint

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use refcal_core::AnnotatedDay;
use serde::Deserialize;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/calendar/{year}/{month}", get(month))
}

#[derive(Deserialize)]
pub struct MonthQuery {
    pub user_id: String,
}

/// GET /calendar/:year/:month?user_id= - 42-day grid with the user's availability
async fn month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<AnnotatedDay>>, AppError> {
    Ok(Json(state.service().month(year, month, &query.user_id)?))
}
