// src/config.rs

use std::env;
use std::time::Duration;

use dotenvy::dotenv;

/// Language id the judge uses for candidate code (Judge0: Python 3).
pub const DEFAULT_JUDGE_LANGUAGE_ID: i32 = 71;

/// Percentage a test or exam attempt needs to earn a certification.
pub const DEFAULT_PASS_CRITERIA: f64 = 80.0;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,
    pub judge: JudgeConfig,
    pub oracle: OracleConfig,
}

/// Connection settings for the code-execution service.
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    /// Base URL of a Judge0-compatible API. `None` leaves the judge unconfigured.
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub api_host: Option<String>,
    pub language_id: i32,
    pub timeout: Duration,
    pub poll_attempts: u32,
    pub poll_initial_delay: Duration,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            api_host: None,
            language_id: DEFAULT_JUDGE_LANGUAGE_ID,
            timeout: Duration::from_secs(20),
            poll_attempts: 6,
            poll_initial_delay: Duration::from_millis(500),
        }
    }
}

/// Settings for the generative evaluation service.
/// A missing `api_key` is the unconfigured state; the oracle checks it on every call.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = parse_var("JWT_EXPIRATION", 60 * 60 * 24);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = parse_var("PORT", 3000);

        let judge_defaults = JudgeConfig::default();
        let judge = JudgeConfig {
            base_url: non_empty_var("JUDGE0_URL"),
            api_key: non_empty_var("JUDGE0_API_KEY"),
            api_host: non_empty_var("JUDGE0_API_HOST"),
            language_id: parse_var("JUDGE_LANGUAGE_ID", judge_defaults.language_id),
            timeout: Duration::from_secs(parse_var("JUDGE_TIMEOUT_SECS", 20)),
            poll_attempts: parse_var("JUDGE_POLL_ATTEMPTS", judge_defaults.poll_attempts),
            poll_initial_delay: Duration::from_millis(parse_var("JUDGE_POLL_INITIAL_DELAY_MS", 500)),
        };

        let oracle_defaults = OracleConfig::default();
        let oracle = OracleConfig {
            api_key: non_empty_var("GOOGLE_AI_API_KEY"),
            model: non_empty_var("GOOGLE_AI_MODEL").unwrap_or(oracle_defaults.model),
            base_url: non_empty_var("GOOGLE_AI_BASE_URL").unwrap_or(oracle_defaults.base_url),
            timeout: Duration::from_secs(parse_var("ORACLE_TIMEOUT_SECS", 20)),
        };

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            port,
            judge,
            oracle,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
