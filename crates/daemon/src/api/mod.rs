use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tracing::error;

use crate::state::AppState;

pub mod auth;
pub mod story;
pub mod submissions;
pub mod video;

/// Handler failure rendered as `{"success": false, "error": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        error!("Request failed: {:#}", err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "success": false,
            "error": self.message,
        }));
        (self.status, body).into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "Story Catcher Backend is running",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/story", story::router(state.clone()))
        .nest("/video", video::router(state.clone()))
        .nest("/auth", auth::router(state.clone()))
        .nest("/submissions", submissions::router(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::sessions::StoryboardStatus;

    fn app() -> (Router, AppState) {
        let config = Config::from_lookup(|_| None).unwrap();
        let state = AppState::for_tests(config).unwrap();
        (Router::new().nest("/api", router(state.clone())), state)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let (status, body) = send(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_start_requires_ready_message() {
        let (app, _) = app();
        let (status, body) = send(&app, Method::POST, "/api/story/start", Some(serde_json::json!({ "message": "hello" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);

        let (_, body) = send(&app, Method::POST, "/api/story/start", Some(serde_json::json!({ "message": "I'm READY" }))).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["question_number"], 1);
        assert_eq!(body["question"]["id"], 1);
    }

    #[tokio::test]
    async fn test_full_interview_produces_storyboard_and_script() {
        let (app, state) = app();
        let (_, body) = send(&app, Method::POST, "/api/story/start", Some(serde_json::json!({ "message": "let's start" }))).await;
        let session_id = body["session_id"].as_str().unwrap().to_string();

        let answers = [
            "I fell down the stairs at work.",
            "I was rushing and looking at my phone.",
            "Someone helped me up and I felt embarrassed.",
            "Now I slow down and pay attention.",
        ];
        for (i, answer) in answers.iter().enumerate() {
            let (status, body) = send(
                &app,
                Method::POST,
                "/api/story/answer",
                Some(serde_json::json!({ "session_id": session_id, "answer": answer, "question_number": i + 1 })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            if i < 3 {
                assert_eq!(body["question_number"], i + 2);
                assert!(body["question"]["text"].as_str().unwrap().len() > 0);
            } else {
                assert_eq!(body["session_complete"], true);
                assert_eq!(body["storyboard_status"], "generating");
            }
        }

        let mut job = None;
        for _ in 0..50 {
            let current = state.sessions.storyboard(&session_id).unwrap().unwrap();
            if matches!(&current, Some(j) if j.status == StoryboardStatus::Completed) {
                job = current;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(job.unwrap().fallback);

        let uri = format!("/api/story/storyboard/{}", session_id);
        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "completed");
        let script = body["script"].as_str().unwrap();
        assert!(script.starts_with("This is my story of my turning point."));
        assert!(script.ends_with('.'));

        let uri = format!("/api/story/current-question/{}", session_id);
        let (_, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(body["session_complete"], true);
    }

    #[tokio::test]
    async fn test_failed_storyboard_reports_error() {
        let (app, state) = app();
        let session_id = state.sessions.create().unwrap().session_id;
        state.sessions.begin_storyboard(&session_id).unwrap();
        state.sessions.fail_storyboard(&session_id, "upstream down".to_string()).unwrap();

        let uri = format!("/api/story/storyboard/{}", session_id);
        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["status"], "failed");
        assert_eq!(body["error"], "upstream down");
    }

    #[tokio::test]
    async fn test_answer_validation() {
        let (app, _) = app();
        let (status, body) = send(&app, Method::POST, "/api/story/answer", Some(serde_json::json!({ "answer": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/story/answer",
            Some(serde_json::json!({ "session_id": "nope", "answer": "x", "question_number": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::GET, "/api/story/session/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_email_and_submit() {
        let (app, state) = app();
        let session_id = state.sessions.create().unwrap().session_id;

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/story/submit",
            Some(serde_json::json!({ "session_id": session_id, "video_url": "https://cdn/v.mp4" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/story/email",
            Some(serde_json::json!({ "session_id": session_id, "email": "not-an-email" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        send(
            &app,
            Method::POST,
            "/api/story/email",
            Some(serde_json::json!({ "session_id": session_id, "email": "me@example.com" })),
        )
        .await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/story/submit",
            Some(serde_json::json!({ "session_id": session_id, "video_url": "https://cdn/v.mp4" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["submission_id"].as_i64().is_some());

        let stored = state.db.list_submissions().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].email, "me@example.com");
    }

    #[tokio::test]
    async fn test_script_preview() {
        let (app, _) = app();
        let storyboard = "**Storyboard: \"The Fall\" – A Story**\n\n**Scene 1: \"Impact\"**\n• **Visual**: A person falling down stairs\n• **Mood**: shock\n";
        let (status, body) = send(&app, Method::POST, "/api/video/script", Some(serde_json::json!({ "storyboard": storyboard }))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["script"].as_str().unwrap().starts_with("This is my story of the fall."));
        assert!(body["word_count"].as_u64().unwrap() <= 160);

        let (status, _) = send(&app, Method::POST, "/api/video/script", Some(serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_protected_routes_reject_anonymous_requests() {
        let (app, _) = app();
        let (status, body) = send(&app, Method::GET, "/api/submissions", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Authorization header missing");

        let (status, _) = send(&app, Method::GET, "/api/auth/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Identity provider is not configured, so any token fails verification.
        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/api/submissions/1")
            .header(header::AUTHORIZATION, "Bearer abc")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
