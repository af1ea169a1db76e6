// src/handlers/exams.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        attempt::{SubmissionResponse, SubmitExamRequest},
        content::{ContentKind, PublicContentItem},
        question::RunCodeRequest,
    },
    services::judge::{JudgeCase, JudgeError},
    state::AppState,
    utils::jwt::Claims,
};

/// Lists every exam, without answer keys or hidden cases.
pub async fn list_exams(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let exams = state.content.list_content(ContentKind::Exam).await?;
    let exams: Vec<PublicContentItem> = exams.iter().map(PublicContentItem::from).collect();
    Ok(Json(exams))
}

pub async fn get_exam(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = state
        .content
        .find_content(ContentKind::Exam, id)
        .await?
        .ok_or(AppError::NotFound("Exam not found.".to_string()))?;

    Ok(Json(PublicContentItem::from(&exam)))
}

/// Opens a new exam session for the caller.
pub async fn start_exam(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let session = state.grading().start_exam(user_id, exam_id).await?;

    Ok(Json(json!({ "session_id": session.id })))
}

/// Grades an open exam session and closes it.
pub async fn submit_exam(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;

    let outcome = state
        .grading()
        .submit_exam(user_id, payload.session_id, payload.answers)
        .await?;

    Ok(Json(SubmissionResponse {
        success: true,
        message: "Exam submitted successfully!".to_string(),
        score: outcome.report.score,
        passed: outcome.report.passed,
        certification_awarded: outcome.certification_awarded(),
        details: outcome.report.details,
    }))
}

/// Runs candidate code against the supplied cases. Nothing is graded or stored.
///
/// Judge failures surface here instead of being degraded, so the candidate
/// can tell a broken sandbox from broken code.
pub async fn run_code(
    State(state): State<AppState>,
    Json(payload): Json<RunCodeRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let language_id = payload
        .language_id
        .unwrap_or(state.config.judge.language_id);
    let source_code = payload.source_code;
    let cases: Vec<JudgeCase> = payload
        .test_cases
        .into_iter()
        .map(|case| JudgeCase {
            source_code: source_code.clone(),
            language_id,
            stdin: case.input,
            expected_output: case.expected_output,
        })
        .collect();

    let results = state.judge.run_batch(&cases).await.map_err(|e| match e {
        JudgeError::Decode(msg) => AppError::InternalServerError(msg),
        other => AppError::ServiceUnavailable(other.to_string()),
    })?;

    Ok(Json(json!({ "results": results })))
}

/// Exam attempts of the caller, newest first.
pub async fn user_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let attempts = state
        .results
        .list_attempts(user_id, ContentKind::Exam)
        .await?;
    Ok(Json(attempts))
}
