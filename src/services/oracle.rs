// src/services/oracle.rs

//! Scores free-text interview answers with a generative model.
//!
//! The oracle never fails: any problem reaching or understanding the model
//! degrades to a neutral fallback evaluation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Value, json};

use crate::config::OracleConfig;
use crate::models::interview::Category;

pub const FALLBACK_SCORE: f64 = 3.5;
pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub score: f64,
    pub feedback: String,
    pub category: Category,
}

impl Evaluation {
    /// Neutral result used whenever the model cannot be consulted or understood.
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self {
            score: FALLBACK_SCORE,
            feedback: reason.into(),
            category: Category::Average,
        }
    }

    /// Builds an evaluation from the JSON object the model produced.
    fn from_model_json(value: &Value) -> Self {
        let score = value
            .get("score")
            .and_then(score_value)
            .unwrap_or(FALLBACK_SCORE)
            .clamp(MIN_SCORE, MAX_SCORE);

        let feedback = value
            .get("feedback")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| "No feedback provided by AI".to_string());

        let category = value
            .get("category")
            .and_then(Value::as_str)
            .and_then(Category::parse)
            .unwrap_or_else(|| Category::from_score(score));

        Self {
            score,
            feedback,
            category,
        }
    }
}

fn score_value(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    score.filter(|v| v.is_finite())
}

#[async_trait]
pub trait EvaluationOracle: Send + Sync {
    async fn evaluate(&self, question: &str, expected_answer: &str, candidate_answer: &str) -> Evaluation;
}

/// Returns the first well-formed JSON object embedded in `text`.
///
/// Each `{` is tried as a start position; the JSON stream parser stops at the
/// end of the first complete value, so trailing prose is ignored.
pub fn extract_json_object(text: &str) -> Option<Value> {
    text.match_indices('{').find_map(|(start, _)| {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value)) if value.is_object() => Some(value),
            _ => None,
        }
    })
}

/// Parses raw model text into an evaluation, falling back when no JSON object is present.
pub fn parse_model_reply(text: &str) -> Evaluation {
    match extract_json_object(text) {
        Some(value) => Evaluation::from_model_json(&value),
        None => Evaluation::fallback(format!("Could not parse AI response: {}", text)),
    }
}

fn build_prompt(question: &str, expected_answer: &str, candidate_answer: &str) -> String {
    format!(
        r#"Evaluate this interview answer on a scale of 1-5 (1=worst, 5=excellent):

Question: {question}
Expected Answer Guidelines: {expected_answer}
User's Answer: {candidate_answer}

Provide evaluation in this exact JSON format only (no other text):
{{
    "score": 3.8,
    "feedback": "Detailed feedback about the answer...",
    "category": "worst|bad|average|good|excellent"
}}"#
    )
}

/// Oracle backed by the Gemini `generateContent` REST endpoint.
#[derive(Debug, Clone)]
pub struct GeminiOracle {
    client: Client,
    config: OracleConfig,
}

impl GeminiOracle {
    pub fn new(config: OracleConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    async fn generate(&self, api_key: &str, prompt: String) -> Result<String, String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| e.to_string())?;
        if !status.is_success() {
            return Err(format!("AI service returned {}: {}", status, body));
        }

        body.pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| "AI response had no text".to_string())
    }
}

#[async_trait]
impl EvaluationOracle for GeminiOracle {
    async fn evaluate(&self, question: &str, expected_answer: &str, candidate_answer: &str) -> Evaluation {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Evaluation::fallback("AI evaluation not configured. Please check your API settings.");
        };

        let prompt = build_prompt(question, expected_answer, candidate_answer);
        match self.generate(api_key, prompt).await {
            Ok(text) => parse_model_reply(&text),
            Err(e) => {
                tracing::warn!("AI evaluation failed, using fallback: {}", e);
                Evaluation::fallback(format!("Evaluation error: {}", e))
            }
        }
    }
}
