// src/models/interview.rs

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Categorical label derived from a 1.0-5.0 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Excellent,
    Good,
    Average,
    Bad,
    Worst,
}

impl Category {
    pub fn from_score(score: f64) -> Self {
        if score >= 4.5 {
            Category::Excellent
        } else if score >= 3.5 {
            Category::Good
        } else if score >= 2.5 {
            Category::Average
        } else if score >= 1.5 {
            Category::Bad
        } else {
            Category::Worst
        }
    }

    /// Parses a label as returned by the evaluation service (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "excellent" => Some(Category::Excellent),
            "good" => Some(Category::Good),
            "average" => Some(Category::Average),
            "bad" => Some(Category::Bad),
            "worst" => Some(Category::Worst),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Excellent => "excellent",
            Category::Good => "good",
            Category::Average => "average",
            Category::Bad => "bad",
            Category::Worst => "worst",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub id: String,
    pub text: String,
    /// Guideline handed to the evaluation service, never shown to the candidate.
    #[serde(default)]
    pub expected_answer: String,
    /// Seconds allowed for the answer.
    #[serde(default)]
    pub time_limit: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interview {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub duration_minutes: i32,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub questions: Vec<InterviewQuestion>,
}

impl Interview {
    /// Returns the question and its position in the interview.
    pub fn find_question(&self, question_id: &str) -> Option<(usize, &InterviewQuestion)> {
        self.questions
            .iter()
            .enumerate()
            .find(|(_, q)| q.id == question_id)
    }
}

/// Interview question without the expected answer.
#[derive(Debug, Clone, Serialize)]
pub struct PublicInterviewQuestion {
    pub id: String,
    pub text: String,
    pub time_limit: i32,
}

impl From<&InterviewQuestion> for PublicInterviewQuestion {
    fn from(q: &InterviewQuestion) -> Self {
        Self {
            id: q.id.clone(),
            text: q.text.clone(),
            time_limit: q.time_limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PublicInterview {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration_minutes: i32,
    pub difficulty: Option<String>,
    pub tags: Vec<String>,
    pub questions: Vec<PublicInterviewQuestion>,
}

impl From<&Interview> for PublicInterview {
    fn from(interview: &Interview) -> Self {
        Self {
            id: interview.id,
            title: interview.title.clone(),
            description: interview.description.clone(),
            duration_minutes: interview.duration_minutes,
            difficulty: interview.difficulty.clone(),
            tags: interview.tags.clone(),
            questions: interview
                .questions
                .iter()
                .map(PublicInterviewQuestion::from)
                .collect(),
        }
    }
}

/// Stored evaluation of one interview answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewEvaluation {
    pub overall_score: f64,
    pub technical_score: f64,
    pub feedback: String,
    pub category: Category,
    pub audio_quality: f64,
    pub video_quality: f64,
    pub presence_score: f64,
}

/// Evaluation entry as resent by the client on submit. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubmittedEvaluation {
    pub overall_score: Option<f64>,
    pub technical_score: Option<f64>,
    pub feedback: Option<String>,
    pub category: Option<String>,
}

/// Immutable record of a submitted interview session.
#[derive(Debug, Clone, Serialize)]
pub struct InterviewResult {
    pub id: i64,
    pub user_id: i64,
    pub interview_id: i64,
    pub interview_title: String,
    pub session_id: i64,
    pub final_score: f64,
    pub category: Category,
    pub evaluations: BTreeMap<String, InterviewEvaluation>,
    pub answers: BTreeMap<String, String>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInterviewResult {
    pub user_id: i64,
    pub interview_id: i64,
    pub interview_title: String,
    pub session_id: i64,
    pub final_score: f64,
    pub category: Category,
    pub evaluations: BTreeMap<String, InterviewEvaluation>,
    pub answers: BTreeMap<String, String>,
}

/// Fields of the multipart `evaluate-answer` form, once collected.
#[derive(Debug, Default, Validate)]
pub struct EvaluateAnswerForm {
    #[validate(length(min = 1, message = "question_id is required."))]
    pub question_id: String,
    #[validate(range(min = 1, message = "Invalid interview session ID."))]
    pub session_id: i64,
    #[validate(required(message = "user_answer is required."))]
    pub user_answer: Option<String>,
    pub audio_quality: Option<f64>,
    pub video_quality: Option<f64>,
    pub presence_score: Option<f64>,
}

/// DTO for closing an interview session.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitInterviewRequest {
    #[validate(range(min = 1, message = "Invalid interview session ID."))]
    pub session_id: i64,
    #[serde(default)]
    pub answers: HashMap<String, String>,
    #[serde(default)]
    pub evaluations: HashMap<String, SubmittedEvaluation>,
}
