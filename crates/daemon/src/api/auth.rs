use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::ApiError;
use crate::auth::{bearer_token, AdminUser, AuthUser};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct VerifyRequest {
    token: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    email: Option<String>,
    password: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/verify", post(verify_token))
        .route("/me", get(current_user))
        .route("/user/:user_id", get(get_user))
        .route("/users", get(list_users))
        .route("/create-user", post(create_user))
        .route("/delete-user/:user_id", delete(delete_user))
        .with_state(state)
}

async fn verify_token(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = req
        .token
        .as_deref()
        .and_then(bearer_token)
        .ok_or_else(|| ApiError::bad_request("Token is required"))?;

    let user = state
        .auth
        .verify_token(token)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid token"))?;
    Ok(Json(json!({
        "success": true,
        "user": user,
    })))
}

async fn current_user(AuthUser(user): AuthUser) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "user": user,
    }))
}

async fn get_user(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state
        .auth
        .get_user(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(json!({
        "success": true,
        "user": user,
    })))
}

async fn list_users(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let users = state.auth.list_users().await?;
    Ok(Json(json!({
        "success": true,
        "users": users,
    })))
}

async fn create_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (Some(email), Some(password)) = (
        req.email.filter(|v| !v.trim().is_empty()),
        req.password.filter(|v| !v.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };

    let user = state.auth.create_user(email.trim(), &password).await?;
    info!("{} created user {}", admin.email, user.user_id);
    Ok(Json(json!({
        "success": true,
        "user": {
            "user_id": user.user_id,
            "email": user.email,
        },
    })))
}

async fn delete_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.auth.delete_user(&user_id).await?;
    info!("{} deleted user {}", admin.email, user_id);
    Ok(Json(json!({
        "success": true,
        "message": "User deleted successfully",
    })))
}
