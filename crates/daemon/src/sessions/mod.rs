use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

use storycatcher_engine::interview::{contextual_question, Question, QuestionAnswer, TOTAL_QUESTIONS};

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub question_id: usize,
    pub answer_text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryboardStatus {
    Generating,
    Completed,
    Failed,
}

/// In-flight or finished storyboard generation for one session.
#[derive(Debug, Clone, Serialize)]
pub struct StoryboardJob {
    pub status: StoryboardStatus,
    pub payload: Option<String>,
    /// True when the payload came from the offline fallback.
    pub fallback: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorySession {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub answers: Vec<Answer>,
    pub current_question: usize,
    pub is_complete: bool,
    #[serde(skip)]
    questions: Vec<Question>,
    pub storyboard: Option<StoryboardJob>,
    pub user_email: Option<String>,
}

impl StorySession {
    fn new() -> Self {
        StorySession {
            session_id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            answers: Vec::new(),
            current_question: 1,
            is_complete: false,
            questions: Question::initial_set(),
            storyboard: None,
            user_email: None,
        }
    }

    fn first_answer(&self) -> Option<&str> {
        self.answers.first().map(|a| a.answer_text.as_str())
    }
}

/// Interview sessions, kept in memory for the life of the process.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, StorySession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, StorySession>>> {
        self.sessions
            .lock()
            .map_err(|_| anyhow!("session store lock poisoned"))
    }

    pub fn create(&self) -> Result<StorySession> {
        let session = StorySession::new();
        self.lock()?
            .insert(session.session_id.clone(), session.clone());
        debug!("Created story session {}", session.session_id);
        Ok(session)
    }

    pub fn get(&self, session_id: &str) -> Result<Option<StorySession>> {
        Ok(self.lock()?.get(session_id).cloned())
    }

    /// The question the session is waiting on. Follow-up texts are generated
    /// from the first answer the first time they are asked, then kept.
    /// Outer `None`: unknown session. Inner `None`: interview finished.
    pub fn current_question(&self, session_id: &str) -> Result<Option<Option<Question>>> {
        let mut sessions = self.lock()?;
        let Some(session) = sessions.get_mut(session_id) else {
            return Ok(None);
        };
        if session.current_question > TOTAL_QUESTIONS {
            return Ok(Some(None));
        }

        let index = session.current_question - 1;
        let number = session.current_question;
        if session.questions[index].text.is_empty() && number > 1 {
            let text = contextual_question(number, session.first_answer());
            session.questions[index].text = text;
        }
        Ok(Some(Some(session.questions[index].clone())))
    }

    /// Record an answer and advance past `question_number`. Returns the
    /// updated session, or `None` for an unknown session.
    pub fn save_answer(
        &self,
        session_id: &str,
        question_number: usize,
        answer_text: &str,
    ) -> Result<Option<StorySession>> {
        let mut sessions = self.lock()?;
        let Some(session) = sessions.get_mut(session_id) else {
            return Ok(None);
        };

        session.answers.push(Answer {
            question_id: question_number,
            answer_text: answer_text.to_string(),
            timestamp: Utc::now(),
        });
        session.current_question = question_number + 1;
        if session.answers.len() >= TOTAL_QUESTIONS {
            session.is_complete = true;
        }
        Ok(Some(session.clone()))
    }

    /// Answers paired with the question text each one replied to.
    pub fn answers_for_generation(&self, session_id: &str) -> Result<Option<Vec<QuestionAnswer>>> {
        let sessions = self.lock()?;
        let Some(session) = sessions.get(session_id) else {
            return Ok(None);
        };

        let formatted = session
            .answers
            .iter()
            .map(|answer| match session.questions.iter().find(|q| q.id == answer.question_id) {
                Some(question) => QuestionAnswer {
                    question: question.text.clone(),
                    answer: answer.answer_text.clone(),
                    category: question.category.as_str().to_string(),
                },
                None => QuestionAnswer {
                    question: format!("Question {}", answer.question_id),
                    answer: answer.answer_text.clone(),
                    category: "unknown".to_string(),
                },
            })
            .collect();
        Ok(Some(formatted))
    }

    /// Mark generation as started. Returns false when the session is unknown
    /// or a generation is already running.
    pub fn begin_storyboard(&self, session_id: &str) -> Result<bool> {
        let mut sessions = self.lock()?;
        let Some(session) = sessions.get_mut(session_id) else {
            return Ok(false);
        };
        if matches!(&session.storyboard, Some(job) if job.status == StoryboardStatus::Generating) {
            return Ok(false);
        }
        session.storyboard = Some(StoryboardJob {
            status: StoryboardStatus::Generating,
            payload: None,
            fallback: false,
            updated_at: Utc::now(),
        });
        Ok(true)
    }

    pub fn complete_storyboard(&self, session_id: &str, storyboard: String, fallback: bool) -> Result<bool> {
        self.set_storyboard(session_id, StoryboardStatus::Completed, Some(storyboard), fallback)
    }

    pub fn fail_storyboard(&self, session_id: &str, reason: String) -> Result<bool> {
        self.set_storyboard(session_id, StoryboardStatus::Failed, Some(reason), false)
    }

    fn set_storyboard(
        &self,
        session_id: &str,
        status: StoryboardStatus,
        payload: Option<String>,
        fallback: bool,
    ) -> Result<bool> {
        let mut sessions = self.lock()?;
        let Some(session) = sessions.get_mut(session_id) else {
            return Ok(false);
        };
        session.storyboard = Some(StoryboardJob {
            status,
            payload,
            fallback,
            updated_at: Utc::now(),
        });
        Ok(true)
    }

    pub fn storyboard(&self, session_id: &str) -> Result<Option<Option<StoryboardJob>>> {
        Ok(self.lock()?.get(session_id).map(|s| s.storyboard.clone()))
    }

    pub fn save_email(&self, session_id: &str, email: &str) -> Result<bool> {
        let mut sessions = self.lock()?;
        let Some(session) = sessions.get_mut(session_id) else {
            return Ok(false);
        };
        session.user_email = Some(email.trim().to_string());
        Ok(true)
    }
}
