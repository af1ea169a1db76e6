// src/models/content.rs

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_PASS_CRITERIA;
use crate::models::question::{PublicQuestion, QuestionRecord};

/// Which listing a content item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Exam,
    Test,
    Practice,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Exam => "exam",
            ContentKind::Test => "test",
            ContentKind::Practice => "practice",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "exam" => Some(ContentKind::Exam),
            "test" => Some(ContentKind::Test),
            "practice" => Some(ContentKind::Practice),
            _ => None,
        }
    }
}

/// An exam, test or practice set: a titled, ordered collection of questions.
/// Content items are read-only once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: i64,
    pub kind: ContentKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub duration_minutes: i32,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Percentage needed to pass. Unset means [`DEFAULT_PASS_CRITERIA`].
    #[serde(default)]
    pub pass_criteria: Option<f64>,
    pub questions: Vec<QuestionRecord>,
}

impl ContentItem {
    pub fn pass_threshold(&self) -> f64 {
        self.pass_criteria.unwrap_or(DEFAULT_PASS_CRITERIA)
    }
}

/// DTO for sending a content item to a candidate.
#[derive(Debug, Serialize)]
pub struct PublicContentItem {
    pub id: i64,
    pub kind: ContentKind,
    pub title: String,
    pub description: String,
    pub duration_minutes: i32,
    pub language: Option<String>,
    pub difficulty: Option<String>,
    pub tags: Vec<String>,
    pub pass_criteria: f64,
    pub questions: Vec<PublicQuestion>,
}

impl From<&ContentItem> for PublicContentItem {
    fn from(item: &ContentItem) -> Self {
        Self {
            id: item.id,
            kind: item.kind,
            title: item.title.clone(),
            description: item.description.clone(),
            duration_minutes: item.duration_minutes,
            language: item.language.clone(),
            difficulty: item.difficulty.clone(),
            tags: item.tags.clone(),
            pass_criteria: item.pass_threshold(),
            questions: item.questions.iter().map(PublicQuestion::from).collect(),
        }
    }
}
