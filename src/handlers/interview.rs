// src/handlers/interview.rs

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::interview::{EvaluateAnswerForm, PublicInterview, SubmitInterviewRequest},
    services::interview::QualitySignals,
    state::AppState,
    utils::jwt::Claims,
};

/// Lists every interview, without expected answers.
pub async fn list_interviews(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let interviews = state.content.list_interviews().await?;
    let interviews: Vec<PublicInterview> = interviews.iter().map(PublicInterview::from).collect();
    Ok(Json(interviews))
}

pub async fn get_interview(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let interview = state
        .content
        .find_interview(id)
        .await?
        .ok_or(AppError::NotFound("Interview not found".to_string()))?;

    Ok(Json(PublicInterview::from(&interview)))
}

pub async fn start_interview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(interview_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let started = state.interviews().start(user_id, interview_id).await?;

    Ok(Json(json!({
        "session_id": started.session.id,
        "first_question": started.first_question,
    })))
}

/// Scores one answer. Accepts the browser's multipart form; a recorded
/// `audio` part may be present and is ignored.
pub async fn evaluate_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let form = read_evaluate_form(&mut multipart).await?;
    form.validate()?;

    let quality = QualitySignals::new(form.audio_quality, form.video_quality, form.presence_score);
    let evaluation = state
        .interviews()
        .evaluate_answer(
            user_id,
            form.session_id,
            &form.question_id,
            form.user_answer.as_deref().unwrap_or_default(),
            quality,
        )
        .await?;

    Ok(Json(json!({
        "overall_score": evaluation.overall_score,
        "technical_score": evaluation.technical_score,
        "feedback": evaluation.feedback,
        "category": evaluation.category,
    })))
}

async fn read_evaluate_form(multipart: &mut Multipart) -> Result<EvaluateAnswerForm, AppError> {
    let mut form = EvaluateAnswerForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "question_id" => form.question_id = field.text().await?,
            "session_id" => {
                let raw = field.text().await?;
                form.session_id = raw
                    .trim()
                    .parse()
                    .map_err(|_| AppError::BadRequest("Invalid interview session ID.".to_string()))?;
            }
            "user_answer" => form.user_answer = Some(field.text().await?),
            "audio_quality" => form.audio_quality = parse_score(&name, &field.text().await?)?,
            "video_quality" => form.video_quality = parse_score(&name, &field.text().await?)?,
            "presence_score" => form.presence_score = parse_score(&name, &field.text().await?)?,
            _ => {}
        }
    }

    Ok(form)
}

/// Empty optional fields count as absent.
fn parse_score(name: &str, raw: &str) -> Result<Option<f64>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("Invalid value for {}", name)))
}

/// Closes the interview session and records the final score.
pub async fn submit_interview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitInterviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;

    let summary = state
        .interviews()
        .submit(user_id, payload.session_id, payload.answers, payload.evaluations)
        .await?;

    Ok(Json(json!({
        "success": true,
        "final_score": summary.final_score,
        "category": summary.category,
    })))
}

pub async fn user_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let results = state.results.list_interview_results(user_id).await?;
    Ok(Json(results))
}
