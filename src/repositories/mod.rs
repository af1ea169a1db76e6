// src/repositories/mod.rs

//! Persistence seams: content lookup, the session ledger and result history.
//!
//! Closing a session and writing its result happen in one call so an
//! implementation can make them atomic: the close only succeeds while the
//! session is still open, and a caller that loses that race writes nothing.

use std::collections::BTreeMap;

use async_trait::async_trait;

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

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn list_content(&self, kind: ContentKind) -> Result<Vec<ContentItem>, AppError>;

    async fn find_content(&self, kind: ContentKind, id: i64) -> Result<Option<ContentItem>, AppError>;

    async fn list_interviews(&self) -> Result<Vec<Interview>, AppError>;

    async fn find_interview(&self, id: i64) -> Result<Option<Interview>, AppError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_exam_session(&self, user_id: i64, exam_id: i64) -> Result<ExamSession, AppError>;

    /// Only returns sessions owned by `user_id`.
    async fn find_exam_session(&self, session_id: i64, user_id: i64) -> Result<Option<ExamSession>, AppError>;

    /// Closes an open session and records its attempt (plus certification when passed).
    /// Returns `None` when the session was already closed or belongs to another user.
    async fn complete_exam_session(
        &self,
        session_id: i64,
        attempt: NewAttempt,
    ) -> Result<Option<AttemptOutcome>, AppError>;

    async fn create_interview_session(
        &self,
        user_id: i64,
        interview_id: i64,
    ) -> Result<InterviewSession, AppError>;

    /// Only returns sessions owned by `user_id`.
    async fn find_interview_session(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> Result<Option<InterviewSession>, AppError>;

    /// Stores one answer and its evaluation, replacing any earlier entry for the question.
    /// Returns `false` when the session is closed.
    async fn record_interview_evaluation(
        &self,
        session_id: i64,
        question_id: &str,
        answer: &str,
        evaluation: &InterviewEvaluation,
        next_question_index: i32,
    ) -> Result<bool, AppError>;

    /// Closes an open interview session with its final maps and writes the result.
    /// Returns `None` when the session was already closed or belongs to another user.
    async fn complete_interview_session(
        &self,
        session_id: i64,
        answers: &BTreeMap<String, String>,
        evaluations: &BTreeMap<String, InterviewEvaluation>,
        result: NewInterviewResult,
    ) -> Result<Option<i64>, AppError>;
}

#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Records a session-less attempt (tests), plus certification when passed.
    async fn record_attempt(&self, attempt: NewAttempt) -> Result<AttemptOutcome, AppError>;

    async fn list_attempts(&self, user_id: i64, kind: ContentKind) -> Result<Vec<Attempt>, AppError>;

    async fn list_certifications(&self, user_id: i64) -> Result<Vec<Certification>, AppError>;

    async fn list_interview_results(&self, user_id: i64) -> Result<Vec<InterviewResult>, AppError>;
}
