use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get},
    Router,
};
use serde::Serialize;
use serde_json::json;

use super::ApiError;
use crate::auth::AdminUser;
use crate::state::AppState;

#[derive(Serialize)]
pub struct SubmissionResponse {
    id: i64,
    email: String,
    video_url: String,
    created_at: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_submissions))
        .route("/:id", delete(delete_submission))
        .with_state(state)
}

async fn list_submissions(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let submissions: Vec<SubmissionResponse> = state
        .db
        .list_submissions()?
        .into_iter()
        .map(|s| SubmissionResponse {
            id: s.id,
            email: s.email,
            video_url: s.video_url,
            created_at: s.created_at.to_rfc3339(),
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "submissions": submissions,
    })))
}

async fn delete_submission(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.db.delete_submission(id)? {
        return Err(ApiError::not_found("Submission not found"));
    }
    Ok(Json(json!({
        "success": true,
        "message": "Submission deleted successfully",
    })))
}
