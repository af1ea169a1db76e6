// src/models/attempt.rs

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::content::ContentKind;

/// Grading outcome for one question of a submission.
///
/// Only the fields that apply to the question's type are serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDetail {
    pub question_id: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub is_correct: bool,
    /// `false` when the question could not be judged (no hidden cases, blank answer, judge failure).
    pub graded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed_cases: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cases: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QuestionDetail {
    pub fn mcq(
        question_id: &str,
        is_correct: bool,
        user_answer: Option<String>,
        correct_answer: Option<String>,
    ) -> Self {
        Self {
            question_id: question_id.to_string(),
            question_type: "mcq".to_string(),
            is_correct,
            graded: true,
            user_answer,
            correct_answer,
            passed_cases: None,
            total_cases: None,
            error: None,
        }
    }

    pub fn coding(question_id: &str, passed_cases: usize, total_cases: usize) -> Self {
        Self {
            question_id: question_id.to_string(),
            question_type: "coding".to_string(),
            is_correct: total_cases > 0 && passed_cases == total_cases,
            graded: true,
            user_answer: None,
            correct_answer: None,
            passed_cases: Some(passed_cases),
            total_cases: Some(total_cases),
            error: None,
        }
    }

    /// A question that contributes nothing and is not counted as wrong either.
    pub fn ungraded(question_id: &str, question_type: &str, reason: impl Into<String>) -> Self {
        Self {
            question_id: question_id.to_string(),
            question_type: question_type.to_string(),
            is_correct: false,
            graded: false,
            user_answer: None,
            correct_answer: None,
            passed_cases: None,
            total_cases: None,
            error: Some(reason.into()),
        }
    }
}

/// Attempt about to be written. Certification is derived from `passed`.
#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub user_id: i64,
    pub session_id: Option<i64>,
    pub content_id: i64,
    pub content_kind: ContentKind,
    pub content_title: String,
    pub score: f64,
    pub passed: bool,
    pub details: Vec<QuestionDetail>,
    pub answers: BTreeMap<String, String>,
}

/// Immutable record of one graded exam or test submission.
#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    pub id: i64,
    pub user_id: i64,
    pub session_id: Option<i64>,
    pub content_id: i64,
    pub content_kind: ContentKind,
    pub content_title: String,
    pub score: f64,
    pub passed: bool,
    pub details: Vec<QuestionDetail>,
    pub answers: BTreeMap<String, String>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Certification {
    pub id: i64,
    pub user_id: i64,
    pub content_id: i64,
    pub content_title: String,
    pub score: f64,
    pub attempt_id: i64,
    pub awarded_at: chrono::DateTime<chrono::Utc>,
}

/// Ids written by a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub attempt_id: i64,
    pub certification_id: Option<i64>,
}

/// DTO for submitting an exam inside an open session.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitExamRequest {
    #[validate(range(min = 1, message = "Invalid exam session ID."))]
    pub session_id: i64,

    /// Key: question id, value: the candidate's answer (option text or source code).
    #[serde(default)]
    pub answers: HashMap<String, String>,
}

/// DTO for submitting a test. Every submission is a new attempt.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitTestRequest {
    #[serde(default)]
    pub answers: HashMap<String, String>,
}

/// Response body shared by exam and test submissions.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: String,
    pub score: f64,
    pub passed: bool,
    pub certification_awarded: bool,
    /// Per-question outcome, in question order.
    pub details: Vec<QuestionDetail>,
}
