// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A single input/output pair for a coding question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub output: String,
    /// Hidden cases are never shown to the candidate and are the only ones used for grading.
    #[serde(default)]
    pub hidden: bool,
}

/// A question as it is stored inside a content item.
///
/// The `question_type` tag is kept as a plain string so that content written by
/// other tools still loads; it is checked when the record is turned into a
/// [`Question`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    pub question_type: String,
    pub text: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub starter_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct McqQuestion {
    pub id: String,
    pub correct_answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodingQuestion {
    pub id: String,
    pub test_cases: Vec<TestCase>,
}

impl CodingQuestion {
    pub fn hidden_cases(&self) -> Vec<&TestCase> {
        self.test_cases.iter().filter(|tc| tc.hidden).collect()
    }
}

/// A gradable question.
#[derive(Debug, Clone, PartialEq)]
pub enum Question {
    Mcq(McqQuestion),
    Coding(CodingQuestion),
}

/// Raised for a stored question whose type tag is neither `mcq` nor `coding`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unsupported question type '{question_type}'")]
pub struct UnsupportedQuestionType {
    pub question_id: String,
    pub question_type: String,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = UnsupportedQuestionType;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        match record.question_type.as_str() {
            "mcq" => Ok(Question::Mcq(McqQuestion {
                id: record.id,
                correct_answer: record.correct_answer,
            })),
            "coding" => Ok(Question::Coding(CodingQuestion {
                id: record.id,
                test_cases: record.test_cases,
            })),
            _ => Err(UnsupportedQuestionType {
                question_id: record.id,
                question_type: record.question_type,
            }),
        }
    }
}

/// DTO for sending a question to the client (no answer key, no hidden cases).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    pub question_type: String,
    pub text: String,
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub test_cases: Vec<TestCase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starter_code: Option<String>,
}

impl From<&QuestionRecord> for PublicQuestion {
    fn from(record: &QuestionRecord) -> Self {
        Self {
            id: record.id.clone(),
            question_type: record.question_type.clone(),
            text: record.text.clone(),
            difficulty: record.difficulty.clone(),
            options: record.options.clone(),
            test_cases: record
                .test_cases
                .iter()
                .filter(|tc| !tc.hidden)
                .cloned()
                .collect(),
            starter_code: record.starter_code.clone(),
        }
    }
}

/// One stdin/expected pair sent to the run-code preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunCase {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub expected_output: Option<String>,
}

/// DTO for running code against candidate-supplied cases without grading.
#[derive(Debug, Deserialize, Validate)]
pub struct RunCodeRequest {
    #[validate(length(min = 1, message = "Source code must not be empty."))]
    pub source_code: String,

    /// Falls back to the configured judge language.
    #[serde(default)]
    pub language_id: Option<i32>,

    #[validate(length(min = 1, max = 20, message = "Provide between 1 and 20 test cases."))]
    pub test_cases: Vec<RunCase>,
}
