// src/repositories/memory.rs

//! In-process implementation of every repository trait.
//! Backs the test suites and local runs without a database.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{ContentRepository, ResultRepository, SessionRepository, UserRepository};
use crate::{
    error::AppError,
    models::{
        attempt::{Attempt, AttemptOutcome, Certification, NewAttempt},
        content::{ContentItem, ContentKind},
        interview::{Interview, InterviewEvaluation, InterviewResult, NewInterviewResult},
        session::{ExamSession, InterviewSession},
        user::User,
    },
};

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    users: Vec<User>,
    content: Vec<ContentItem>,
    interviews: Vec<Interview>,
    exam_sessions: BTreeMap<i64, ExamSession>,
    interview_sessions: BTreeMap<i64, InterviewSession>,
    attempts: Vec<Attempt>,
    certifications: Vec<Certification>,
    interview_results: Vec<InterviewResult>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn insert_attempt(&mut self, attempt: NewAttempt) -> AttemptOutcome {
        let now = Utc::now();
        let attempt_id = self.next_id();
        let certification_id = if attempt.passed {
            let id = self.next_id();
            self.certifications.push(Certification {
                id,
                user_id: attempt.user_id,
                content_id: attempt.content_id,
                content_title: attempt.content_title.clone(),
                score: attempt.score,
                attempt_id,
                awarded_at: now,
            });
            Some(id)
        } else {
            None
        };

        self.attempts.push(Attempt {
            id: attempt_id,
            user_id: attempt.user_id,
            session_id: attempt.session_id,
            content_id: attempt.content_id,
            content_kind: attempt.content_kind,
            content_title: attempt.content_title,
            score: attempt.score,
            passed: attempt.passed,
            details: attempt.details,
            answers: attempt.answers,
            submitted_at: now,
        });

        AttemptOutcome {
            attempt_id,
            certification_id,
        }
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::InternalServerError("memory store lock poisoned".to_string()))
    }

    /// Stores a content item, assigning a fresh id. Returns the id.
    pub fn insert_content(&self, mut item: ContentItem) -> Result<i64, AppError> {
        let mut state = self.lock()?;
        item.id = state.next_id();
        let id = item.id;
        state.content.push(item);
        Ok(id)
    }

    /// Stores an interview, assigning a fresh id. Returns the id.
    pub fn insert_interview(&self, mut interview: Interview) -> Result<i64, AppError> {
        let mut state = self.lock()?;
        interview.id = state.next_id();
        let id = interview.id;
        state.interviews.push(interview);
        Ok(id)
    }

    /// Every attempt written so far, for any user.
    pub fn attempts(&self) -> Result<Vec<Attempt>, AppError> {
        Ok(self.lock()?.attempts.clone())
    }

    /// Every certification written so far, for any user.
    pub fn certifications(&self) -> Result<Vec<Certification>, AppError> {
        Ok(self.lock()?.certifications.clone())
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let mut state = self.lock()?;
        if state.users.iter().any(|u| u.username == username) {
            return Err(AppError::Conflict(format!("Username '{}' already exists", username)));
        }
        let user = User {
            id: state.next_id(),
            username: username.to_string(),
            password: password_hash.to_string(),
            role: "user".to_string(),
            created_at: Some(Utc::now()),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl ContentRepository for MemoryRepository {
    async fn list_content(&self, kind: ContentKind) -> Result<Vec<ContentItem>, AppError> {
        Ok(self
            .lock()?
            .content
            .iter()
            .filter(|c| c.kind == kind)
            .cloned()
            .collect())
    }

    async fn find_content(&self, kind: ContentKind, id: i64) -> Result<Option<ContentItem>, AppError> {
        Ok(self
            .lock()?
            .content
            .iter()
            .find(|c| c.kind == kind && c.id == id)
            .cloned())
    }

    async fn list_interviews(&self) -> Result<Vec<Interview>, AppError> {
        Ok(self.lock()?.interviews.clone())
    }

    async fn find_interview(&self, id: i64) -> Result<Option<Interview>, AppError> {
        Ok(self.lock()?.interviews.iter().find(|i| i.id == id).cloned())
    }
}

#[async_trait]
impl SessionRepository for MemoryRepository {
    async fn create_exam_session(&self, user_id: i64, exam_id: i64) -> Result<ExamSession, AppError> {
        let mut state = self.lock()?;
        let session = ExamSession {
            id: state.next_id(),
            user_id,
            exam_id,
            start_time: Utc::now(),
            end_time: None,
            answers: BTreeMap::new(),
        };
        state.exam_sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_exam_session(&self, session_id: i64, user_id: i64) -> Result<Option<ExamSession>, AppError> {
        Ok(self
            .lock()?
            .exam_sessions
            .get(&session_id)
            .filter(|s| s.user_id == user_id)
            .cloned())
    }

    async fn complete_exam_session(
        &self,
        session_id: i64,
        attempt: NewAttempt,
    ) -> Result<Option<AttemptOutcome>, AppError> {
        let mut state = self.lock()?;
        match state.exam_sessions.get_mut(&session_id) {
            Some(session) if session.end_time.is_none() && session.user_id == attempt.user_id => {
                session.end_time = Some(Utc::now());
                session.answers = attempt.answers.clone();
            }
            _ => return Ok(None),
        }
        Ok(Some(state.insert_attempt(attempt)))
    }

    async fn create_interview_session(
        &self,
        user_id: i64,
        interview_id: i64,
    ) -> Result<InterviewSession, AppError> {
        let mut state = self.lock()?;
        let session = InterviewSession {
            id: state.next_id(),
            user_id,
            interview_id,
            start_time: Utc::now(),
            end_time: None,
            current_question_index: 0,
            answers: BTreeMap::new(),
            evaluations: BTreeMap::new(),
        };
        state.interview_sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_interview_session(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> Result<Option<InterviewSession>, AppError> {
        Ok(self
            .lock()?
            .interview_sessions
            .get(&session_id)
            .filter(|s| s.user_id == user_id)
            .cloned())
    }

    async fn record_interview_evaluation(
        &self,
        session_id: i64,
        question_id: &str,
        answer: &str,
        evaluation: &InterviewEvaluation,
        next_question_index: i32,
    ) -> Result<bool, AppError> {
        let mut state = self.lock()?;
        let Some(session) = state
            .interview_sessions
            .get_mut(&session_id)
            .filter(|s| s.end_time.is_none())
        else {
            return Ok(false);
        };
        session
            .answers
            .insert(question_id.to_string(), answer.to_string());
        session
            .evaluations
            .insert(question_id.to_string(), evaluation.clone());
        session.current_question_index = session.current_question_index.max(next_question_index);
        Ok(true)
    }

    async fn complete_interview_session(
        &self,
        session_id: i64,
        answers: &BTreeMap<String, String>,
        evaluations: &BTreeMap<String, InterviewEvaluation>,
        result: NewInterviewResult,
    ) -> Result<Option<i64>, AppError> {
        let mut state = self.lock()?;
        let now = Utc::now();
        match state.interview_sessions.get_mut(&session_id) {
            Some(session) if session.end_time.is_none() && session.user_id == result.user_id => {
                session.end_time = Some(now);
                session.answers = answers.clone();
                session.evaluations = evaluations.clone();
            }
            _ => return Ok(None),
        }

        let id = state.next_id();
        state.interview_results.push(InterviewResult {
            id,
            user_id: result.user_id,
            interview_id: result.interview_id,
            interview_title: result.interview_title,
            session_id: result.session_id,
            final_score: result.final_score,
            category: result.category,
            evaluations: result.evaluations,
            answers: result.answers,
            submitted_at: now,
        });
        Ok(Some(id))
    }
}

#[async_trait]
impl ResultRepository for MemoryRepository {
    async fn record_attempt(&self, attempt: NewAttempt) -> Result<AttemptOutcome, AppError> {
        Ok(self.lock()?.insert_attempt(attempt))
    }

    async fn list_attempts(&self, user_id: i64, kind: ContentKind) -> Result<Vec<Attempt>, AppError> {
        let mut attempts: Vec<Attempt> = self
            .lock()?
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id && a.content_kind == kind)
            .cloned()
            .collect();
        attempts.reverse();
        Ok(attempts)
    }

    async fn list_certifications(&self, user_id: i64) -> Result<Vec<Certification>, AppError> {
        let mut certs: Vec<Certification> = self
            .lock()?
            .certifications
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        certs.reverse();
        Ok(certs)
    }

    async fn list_interview_results(&self, user_id: i64) -> Result<Vec<InterviewResult>, AppError> {
        let mut results: Vec<InterviewResult> = self
            .lock()?
            .interview_results
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        results.reverse();
        Ok(results)
    }
}
