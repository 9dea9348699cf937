//! User profile endpoint

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use refcal_core::User;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/users/{id}", get(get_user))
}

/// GET /users/:id - One user's profile
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.service().users().get(&id)?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{app, get, post};

    #[tokio::test]
    async fn test_toggle_refreshes_updated_at() {
        let app = app();

        let (status, before) = get(&app, "/users/u1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(before["last_name"], "Young");
        assert_eq!(before["sports"][0]["level"], "Varsity");

        post(
            &app,
            "/availability",
            json!({ "user_id": "u1", "date": "2023-03-15", "status": "available" }),
        )
        .await;

        let (_, after) = get(&app, "/users/u1").await;
        assert_ne!(after["updated_at"], before["updated_at"]);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let (status, body) = get(&app(), "/users/ghost").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found: ghost");
    }
}
