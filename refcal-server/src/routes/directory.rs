//! Per-sport officials directory

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use refcal_core::User;
use serde::Deserialize;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/directory/{sport}", get(directory))
}

#[derive(Deserialize)]
pub struct DirectoryQuery {
    pub date: String,
    pub level: Option<String>,
}

/// GET /directory/:sport?date=&level= - Officials available on a date
async fn directory(
    State(state): State<AppState>,
    Path(sport): Path<String>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    let officials = state
        .service()
        .directory(&sport, &query.date, query.level.as_deref())?;

    Ok(Json(officials))
}
