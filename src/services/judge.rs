// src/services/judge.rs

//! Client for a Judge0-compatible code-execution service.
//!
//! Cases are submitted as one batch, then the batch is fetched by token with
//! exponential backoff until no case is still queued or processing.

use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::JudgeConfig;

const MAX_POLL_DELAY: Duration = Duration::from_secs(4);

/// One program run: source, language and stdin. Plain text; the client encodes it.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeCase {
    pub source_code: String,
    pub language_id: i32,
    pub stdin: String,
    /// When present the judge compares stdout against it and reports `WrongAnswer` on mismatch.
    pub expected_output: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeStatus {
    Accepted,
    WrongAnswer,
    RuntimeError,
    CompileError,
    TimeLimitExceeded,
    InternalError,
}

impl JudgeStatus {
    /// Maps a Judge0 status id. `None` means the submission has not finished yet.
    pub fn from_judge0_id(id: i64) -> Option<Self> {
        match id {
            1 | 2 => None,
            3 => Some(JudgeStatus::Accepted),
            4 => Some(JudgeStatus::WrongAnswer),
            5 => Some(JudgeStatus::TimeLimitExceeded),
            6 => Some(JudgeStatus::CompileError),
            7..=12 => Some(JudgeStatus::RuntimeError),
            _ => Some(JudgeStatus::InternalError),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JudgeOutcome {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub status: JudgeStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    #[error("Could not connect to code execution service: {0}")]
    ServiceUnavailable(String),

    #[error("Error from code execution service ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Code execution did not finish after {0} polls")]
    Timeout(u32),

    #[error("Unexpected response from code execution service: {0}")]
    Decode(String),
}

/// Runs candidate code. Results are positionally aligned with the input cases.
#[async_trait]
pub trait CodeJudge: Send + Sync {
    async fn run_batch(&self, cases: &[JudgeCase]) -> Result<Vec<JudgeOutcome>, JudgeError>;
}

#[derive(Debug, Deserialize)]
struct TokenEntry {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BatchResults {
    submissions: Vec<SubmissionEntry>,
}

#[derive(Debug, Deserialize)]
struct SubmissionEntry {
    stdout: Option<String>,
    stderr: Option<String>,
    compile_output: Option<String>,
    status: Option<StatusEntry>,
}

#[derive(Debug, Deserialize)]
struct StatusEntry {
    id: i64,
}

#[derive(Debug, Clone)]
pub struct Judge0Client {
    client: Client,
    base_url: Option<String>,
    api_key: Option<String>,
    api_host: Option<String>,
    poll_attempts: u32,
    poll_initial_delay: Duration,
}

impl Judge0Client {
    pub fn new(config: &JudgeConfig) -> Result<Self, JudgeError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| JudgeError::ServiceUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config
                .base_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
            api_key: config.api_key.clone(),
            api_host: config.api_host.clone(),
            poll_attempts: config.poll_attempts.max(1),
            poll_initial_delay: config.poll_initial_delay,
        })
    }

    fn base_url(&self) -> Result<&str, JudgeError> {
        self.base_url
            .as_deref()
            .ok_or_else(|| JudgeError::ServiceUnavailable("judge URL not configured".to_string()))
    }

    fn with_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let mut request = request;
        if let Some(key) = &self.api_key {
            request = request.header("X-RapidAPI-Key", key);
        }
        if let Some(host) = &self.api_host {
            request = request.header("X-RapidAPI-Host", host);
        }
        request
    }

    async fn submit(&self, cases: &[JudgeCase]) -> Result<Vec<String>, JudgeError> {
        let submissions: Vec<serde_json::Value> = cases
            .iter()
            .map(|case| {
                let mut entry = json!({
                    "source_code": BASE64.encode(case.source_code.as_bytes()),
                    "language_id": case.language_id,
                    "stdin": BASE64.encode(case.stdin.as_bytes()),
                });
                if let Some(expected) = &case.expected_output {
                    entry["expected_output"] = json!(BASE64.encode(expected.as_bytes()));
                }
                entry
            })
            .collect();

        let url = format!("{}/submissions/batch?base64_encoded=true", self.base_url()?);
        let response = self
            .with_headers(self.client.post(&url))
            .json(&json!({ "submissions": submissions }))
            .send()
            .await
            .map_err(transport_error)?;

        let entries: Vec<TokenEntry> = read_json(response).await?;
        if entries.len() != cases.len() {
            return Err(JudgeError::Decode(format!(
                "expected {} tokens, got {}",
                cases.len(),
                entries.len()
            )));
        }

        entries
            .into_iter()
            .map(|entry| {
                entry
                    .token
                    .ok_or_else(|| JudgeError::Decode("submission rejected without token".to_string()))
            })
            .collect()
    }

    async fn fetch(&self, tokens: &[String]) -> Result<Vec<SubmissionEntry>, JudgeError> {
        let url = format!("{}/submissions/batch", self.base_url()?);
        let response = self
            .with_headers(self.client.get(&url))
            .query(&[
                ("tokens", tokens.join(",")),
                ("base64_encoded", "true".to_string()),
                ("fields", "stdout,stderr,compile_output,status".to_string()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let batch: BatchResults = read_json(response).await?;
        if batch.submissions.len() != tokens.len() {
            return Err(JudgeError::Decode(format!(
                "expected {} results, got {}",
                tokens.len(),
                batch.submissions.len()
            )));
        }
        Ok(batch.submissions)
    }
}

#[async_trait]
impl CodeJudge for Judge0Client {
    async fn run_batch(&self, cases: &[JudgeCase]) -> Result<Vec<JudgeOutcome>, JudgeError> {
        if cases.is_empty() {
            return Ok(Vec::new());
        }

        let tokens = self.submit(cases).await?;
        tracing::debug!(cases = cases.len(), "Submitted judge batch");

        let mut delay = self.poll_initial_delay;
        for attempt in 1..=self.poll_attempts {
            tokio::time::sleep(delay).await;

            let entries = self.fetch(&tokens).await?;
            if let Some(outcomes) = finished_outcomes(entries)? {
                return Ok(outcomes);
            }

            tracing::debug!(attempt, "Judge batch still running");
            delay = (delay * 2).min(MAX_POLL_DELAY);
        }

        Err(JudgeError::Timeout(self.poll_attempts))
    }
}

/// Converts fetched entries into outcomes, or `None` while any case is still pending.
fn finished_outcomes(entries: Vec<SubmissionEntry>) -> Result<Option<Vec<JudgeOutcome>>, JudgeError> {
    let mut outcomes = Vec::with_capacity(entries.len());
    for entry in entries {
        let status_id = entry
            .status
            .as_ref()
            .map(|s| s.id)
            .ok_or_else(|| JudgeError::Decode("result without status".to_string()))?;

        let Some(status) = JudgeStatus::from_judge0_id(status_id) else {
            return Ok(None);
        };

        let stderr = match (entry.stderr, entry.compile_output) {
            (Some(stderr), _) => Some(decode_field(&stderr)?),
            (None, Some(compile)) => Some(decode_field(&compile)?),
            (None, None) => None,
        };

        outcomes.push(JudgeOutcome {
            stdout: entry.stdout.as_deref().map(decode_field).transpose()?,
            stderr,
            status,
        });
    }
    Ok(Some(outcomes))
}

/// Judge0 wraps base64 output at 60 columns, so whitespace is stripped first.
fn decode_field(encoded: &str) -> Result<String, JudgeError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(compact)
        .map_err(|e| JudgeError::Decode(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn transport_error(err: reqwest::Error) -> JudgeError {
    JudgeError::ServiceUnavailable(err.to_string())
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, JudgeError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(JudgeError::Upstream {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| JudgeError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: i64, stdout: Option<&str>) -> SubmissionEntry {
        SubmissionEntry {
            stdout: stdout.map(|s| BASE64.encode(s)),
            stderr: None,
            compile_output: None,
            status: Some(StatusEntry { id: status }),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(JudgeStatus::from_judge0_id(1), None);
        assert_eq!(JudgeStatus::from_judge0_id(2), None);
        assert_eq!(JudgeStatus::from_judge0_id(3), Some(JudgeStatus::Accepted));
        assert_eq!(JudgeStatus::from_judge0_id(4), Some(JudgeStatus::WrongAnswer));
        assert_eq!(JudgeStatus::from_judge0_id(5), Some(JudgeStatus::TimeLimitExceeded));
        assert_eq!(JudgeStatus::from_judge0_id(6), Some(JudgeStatus::CompileError));
        assert_eq!(JudgeStatus::from_judge0_id(11), Some(JudgeStatus::RuntimeError));
        assert_eq!(JudgeStatus::from_judge0_id(13), Some(JudgeStatus::InternalError));
    }

    #[test]
    fn test_pending_entry_keeps_polling() {
        let result = finished_outcomes(vec![entry(3, Some("6\n")), entry(2, None)]).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_finished_entries_are_decoded() {
        let outcomes = finished_outcomes(vec![entry(3, Some("6\n")), entry(4, Some("5\n"))])
            .unwrap()
            .unwrap();
        assert_eq!(outcomes[0].status, JudgeStatus::Accepted);
        assert_eq!(outcomes[0].stdout.as_deref(), Some("6\n"));
        assert_eq!(outcomes[1].status, JudgeStatus::WrongAnswer);
    }

    #[test]
    fn test_decode_field_tolerates_line_wrapping() {
        let wrapped = "aGVsbG8g\nd29ybGQ=\n";
        assert_eq!(decode_field(wrapped).unwrap(), "hello world");
    }

    #[test]
    fn test_compile_output_surfaces_as_stderr() {
        let mut e = entry(6, None);
        e.compile_output = Some(BASE64.encode("SyntaxError"));
        let outcomes = finished_outcomes(vec![e]).unwrap().unwrap();
        assert_eq!(outcomes[0].status, JudgeStatus::CompileError);
        assert_eq!(outcomes[0].stderr.as_deref(), Some("SyntaxError"));
    }

    #[tokio::test]
    async fn test_unconfigured_client_is_unavailable() {
        let client = Judge0Client::new(&JudgeConfig::default()).unwrap();
        let case = JudgeCase {
            source_code: "print(1)".to_string(),
            language_id: 71,
            stdin: String::new(),
            expected_output: None,
        };
        let err = client.run_batch(&[case]).await.unwrap_err();
        assert!(matches!(err, JudgeError::ServiceUnavailable(_)));
    }
}
