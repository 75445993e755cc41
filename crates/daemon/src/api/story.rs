use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use storycatcher_engine::fallback::fallback_storyboard;
use storycatcher_engine::interview::{contextual_feedback, is_ready_message, TOTAL_QUESTIONS};
use storycatcher_engine::Storyboard;

use super::ApiError;
use crate::sessions::StoryboardStatus;
use crate::state::AppState;

const WELCOME: &str = "That's wonderful, thank you for being open and ready to share. 🌟\n\nThis process involves just four reflective questions, and I'll guide you through each one gently. Take your time with each response. Depth and emotion are welcome here.\n\nLet's begin with the first question:";
const NOT_READY: &str = "Please let me know when you're ready to start telling your story! Just say something like \"I'm ready\" or \"Let's start\".";
const INTERVIEW_DONE: &str = "Thank you for sharing your story. Your four answers hold a quiet strength.\n\nI'm now turning them into a visual storyboard with suggested scenes, visuals, mood, and transitions to bring your experience to life. This takes a moment.";

#[derive(Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
pub struct AnswerRequest {
    session_id: Option<String>,
    answer: Option<String>,
    question_number: Option<usize>,
}

#[derive(Deserialize)]
pub struct EmailRequest {
    session_id: Option<String>,
    email: Option<String>,
}

#[derive(Deserialize)]
pub struct SubmitRequest {
    session_id: Option<String>,
    video_url: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/start", post(start_session))
        .route("/answer", post(submit_answer))
        .route("/current-question/:session_id", get(current_question))
        .route("/session/:session_id", get(get_session))
        .route("/storyboard/:session_id", get(get_storyboard))
        .route("/email", post(save_email))
        .route("/submit", post(submit_story))
        .with_state(state)
}

fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !is_ready_message(&req.message) {
        return Ok(Json(json!({
            "success": false,
            "message": NOT_READY,
        })));
    }

    let session = state.sessions.create()?;
    let question = state
        .sessions
        .current_question(&session.session_id)?
        .flatten()
        .ok_or_else(|| ApiError::not_found("Session not found"))?;
    info!("Started story session {}", session.session_id);

    Ok(Json(json!({
        "success": true,
        "session_id": session.session_id,
        "message": WELCOME,
        "question": question,
        "question_number": 1,
        "total_questions": TOTAL_QUESTIONS,
        "session_complete": false,
    })))
}

async fn submit_answer(
    State(state): State<AppState>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (Some(session_id), Some(answer)) = (required(req.session_id), required(req.answer)) else {
        return Err(ApiError::bad_request("Session ID and answer are required"));
    };

    let session = state.sessions.get(&session_id)?.ok_or_else(|| ApiError::not_found("Session not found"))?;
    let question_number = req.question_number.unwrap_or(session.current_question);
    if question_number == 0 || question_number > TOTAL_QUESTIONS {
        return Err(ApiError::bad_request(format!(
            "question_number must be between 1 and {}",
            TOTAL_QUESTIONS
        )));
    }

    state
        .sessions
        .save_answer(&session_id, question_number, &answer)?
        .ok_or_else(|| ApiError::not_found("Session not found"))?;

    if question_number >= TOTAL_QUESTIONS {
        if state.sessions.begin_storyboard(&session_id)? {
            tokio::spawn(generate_storyboard(state.clone(), session_id.clone()));
        }
        return Ok(Json(json!({
            "success": true,
            "message": INTERVIEW_DONE,
            "storyboard_status": StoryboardStatus::Generating,
            "session_id": session_id,
            "session_complete": true,
            "question_number": question_number,
            "total_questions": TOTAL_QUESTIONS,
        })));
    }

    let next_question = state.sessions.current_question(&session_id)?.flatten();
    let feedback = contextual_feedback(question_number, &answer);

    Ok(Json(json!({
        "success": true,
        "message": format!("{}\n\nLet's continue with the next question:", feedback),
        "question": next_question,
        "question_number": question_number + 1,
        "total_questions": TOTAL_QUESTIONS,
        "session_complete": false,
    })))
}

/// Background task started by the final answer. Replies that do not parse
/// into scenes are replaced by the storyboard built from the answers.
async fn generate_storyboard(state: AppState, session_id: String) {
    let answers = match state.sessions.answers_for_generation(&session_id) {
        Ok(Some(answers)) => answers,
        Ok(None) => return,
        Err(e) => {
            warn!("Could not read answers for {}: {}", session_id, e);
            if let Err(e) = state.sessions.fail_storyboard(&session_id, e.to_string()) {
                warn!("Could not mark storyboard failed for {}: {}", session_id, e);
            }
            return;
        }
    };

    let generated = if state.storyboards.is_configured() {
        match state.storyboards.generate_storyboard(&answers).await {
            Ok(text) if !Storyboard::parse(&text).is_empty() => Some(text),
            Ok(_) => {
                warn!("Storyboard reply for {} had no scenes", session_id);
                None
            }
            Err(e) => {
                warn!("Storyboard generation failed for {}: {}", session_id, e);
                None
            }
        }
    } else {
        None
    };

    let fallback = generated.is_none();
    let storyboard = generated.unwrap_or_else(|| fallback_storyboard(&answers));
    info!("Storyboard ready for {} (fallback: {})", session_id, fallback);
    if let Err(e) = state.sessions.complete_storyboard(&session_id, storyboard, fallback) {
        warn!("Could not store storyboard for {}: {}", session_id, e);
    }
}

async fn current_question(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let question = state
        .sessions
        .current_question(&session_id)?
        .ok_or_else(|| ApiError::not_found("Session not found"))?;
    let session = state.sessions.get(&session_id)?.ok_or_else(|| ApiError::not_found("Session not found"))?;

    match question {
        Some(question) => Ok(Json(json!({
            "success": true,
            "question": question,
            "question_number": session.current_question,
            "total_questions": TOTAL_QUESTIONS,
            "session_complete": false,
        }))),
        None => Ok(Json(json!({
            "success": true,
            "message": "All questions have been answered",
            "session_complete": true,
            "question_number": session.answers.len() + 1,
            "total_questions": TOTAL_QUESTIONS,
        }))),
    }
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = state.sessions.get(&session_id)?.ok_or_else(|| ApiError::not_found("Session not found"))?;
    Ok(Json(json!({
        "success": true,
        "session_data": session,
    })))
}

async fn get_storyboard(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let job = state
        .sessions
        .storyboard(&session_id)?
        .ok_or_else(|| ApiError::not_found("Session not found"))?;

    let Some(job) = job else {
        return Ok(Json(json!({
            "success": true,
            "status": "not_started",
        })));
    };

    let body = match job.status {
        StoryboardStatus::Generating => json!({
            "success": true,
            "status": job.status,
            "updated_at": job.updated_at.to_rfc3339(),
        }),
        StoryboardStatus::Completed => {
            let storyboard = job.payload.unwrap_or_default();
            let script = state.videogen.script_for(&storyboard);
            json!({
                "success": true,
                "status": job.status,
                "storyboard": storyboard,
                "script": script,
                "fallback": job.fallback,
                "updated_at": job.updated_at.to_rfc3339(),
            })
        }
        StoryboardStatus::Failed => json!({
            "success": false,
            "status": job.status,
            "error": job.payload,
            "updated_at": job.updated_at.to_rfc3339(),
        }),
    };
    Ok(Json(body))
}

async fn save_email(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (Some(session_id), Some(email)) = (required(req.session_id), required(req.email)) else {
        return Err(ApiError::bad_request("Session ID and email are required"));
    };
    if !email.contains('@') {
        return Err(ApiError::bad_request("Email address is not valid"));
    }

    if !state.sessions.save_email(&session_id, &email)? {
        return Err(ApiError::not_found("Session not found"));
    }
    Ok(Json(json!({
        "success": true,
        "message": "Email saved",
    })))
}

async fn submit_story(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (Some(session_id), Some(video_url)) = (required(req.session_id), required(req.video_url)) else {
        return Err(ApiError::bad_request("Session ID and video URL are required"));
    };

    let session = state.sessions.get(&session_id)?.ok_or_else(|| ApiError::not_found("Session not found"))?;
    let email = session
        .user_email
        .ok_or_else(|| ApiError::bad_request("No email saved for this session"))?;

    let id = state.db.insert_submission(&email, &video_url, session.created_at)?;
    info!("Saved submission {} for session {}", id, session_id);
    Ok(Json(json!({
        "success": true,
        "submission_id": id,
    })))
}
