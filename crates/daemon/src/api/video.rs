use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use storycatcher_engine::sanitize::word_count;

use super::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ScriptRequest {
    script: Option<String>,
}

#[derive(Deserialize)]
pub struct StoryboardRequest {
    storyboard: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/script", post(preview_script))
        .route("/generate", post(generate_video))
        .route("/generate-from-storyboard", post(generate_from_storyboard))
        .route("/status/:api_file_id", get(video_status))
        .with_state(state)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn preview_script(
    State(state): State<AppState>,
    Json(req): Json<StoryboardRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let storyboard = non_empty(req.storyboard).ok_or_else(|| ApiError::bad_request("Storyboard is required"))?;
    let script = state.videogen.script_for(&storyboard);
    Ok(Json(json!({
        "success": true,
        "word_count": word_count(&script),
        "script": script,
    })))
}

async fn generate_video(
    State(state): State<AppState>,
    Json(req): Json<ScriptRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let script = non_empty(req.script).ok_or_else(|| ApiError::bad_request("Script is required"))?;

    let api_file_id = state.videogen.submit_script(&script).await?;
    let file = state.videogen.wait_for_completion(&api_file_id).await?;
    Ok(Json(json!({
        "success": true,
        "api_file_id": api_file_id,
        "video_url": file.signed_url,
        "message": "Video generated successfully",
    })))
}

async fn generate_from_storyboard(
    State(state): State<AppState>,
    Json(req): Json<StoryboardRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let storyboard = non_empty(req.storyboard).ok_or_else(|| ApiError::bad_request("Storyboard is required"))?;

    let video_url = state.videogen.generate_from_storyboard(&storyboard).await?;
    Ok(Json(json!({
        "success": true,
        "video_url": video_url,
        "message": "Video generated successfully from storyboard",
    })))
}

async fn video_status(
    State(state): State<AppState>,
    Path(api_file_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let file = state.videogen.get_file(&api_file_id).await?;
    Ok(Json(json!({
        "success": true,
        "loading_state": file.loading_state,
        "result": file.raw,
    })))
}
