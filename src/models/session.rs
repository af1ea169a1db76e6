// src/models/session.rs

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::interview::InterviewEvaluation;

/// A user's attempt window on an exam. Closed once `end_time` is set.
#[derive(Debug, Clone, Serialize)]
pub struct ExamSession {
    pub id: i64,
    pub user_id: i64,
    pub exam_id: i64,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    pub answers: BTreeMap<String, String>,
}

impl ExamSession {
    pub fn is_closed(&self) -> bool {
        self.end_time.is_some()
    }
}

/// A user's interview in progress, with answers evaluated one at a time.
#[derive(Debug, Clone, Serialize)]
pub struct InterviewSession {
    pub id: i64,
    pub user_id: i64,
    pub interview_id: i64,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    pub current_question_index: i32,
    pub answers: BTreeMap<String, String>,
    pub evaluations: BTreeMap<String, InterviewEvaluation>,
}

impl InterviewSession {
    pub fn is_closed(&self) -> bool {
        self.end_time.is_some()
    }
}
