// src/services/interview.rs

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    error::AppError,
    models::{
        interview::{
            Category, InterviewEvaluation, NewInterviewResult, PublicInterviewQuestion,
            SubmittedEvaluation,
        },
        session::InterviewSession,
    },
    repositories::{ContentRepository, SessionRepository},
    services::{
        grading::round_to,
        oracle::{EvaluationOracle, MAX_SCORE, MIN_SCORE},
    },
};

/// Quality sub-score used when no live measurement is available.
pub const DEFAULT_QUALITY_SCORE: f64 = 4.0;

/// Final score of a session submitted without any evaluation.
pub const EMPTY_SESSION_SCORE: f64 = 3.0;

const TECHNICAL_WEIGHT: f64 = 0.6;
const AUDIO_WEIGHT: f64 = 0.2;
const VIDEO_WEIGHT: f64 = 0.2;
const PRESENCE_WEIGHT: f64 = 0.1;

/// Audio/video/presence signals, each on the 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualitySignals {
    pub audio: f64,
    pub video: f64,
    pub presence: f64,
}

impl Default for QualitySignals {
    fn default() -> Self {
        Self {
            audio: DEFAULT_QUALITY_SCORE,
            video: DEFAULT_QUALITY_SCORE,
            presence: DEFAULT_QUALITY_SCORE,
        }
    }
}

impl QualitySignals {
    /// Missing signals default to 4.0; provided ones are clamped into [1, 5].
    pub fn new(audio: Option<f64>, video: Option<f64>, presence: Option<f64>) -> Self {
        let pick = |v: Option<f64>| clamp_score(v.unwrap_or(DEFAULT_QUALITY_SCORE));
        Self {
            audio: pick(audio),
            video: pick(video),
            presence: pick(presence),
        }
    }
}

fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_SCORE;
    }
    value.clamp(MIN_SCORE, MAX_SCORE)
}

/// Blends the technical score with the quality signals, rounded to one decimal and kept in [1, 5].
pub fn composite_score(technical: f64, quality: &QualitySignals) -> f64 {
    let blended = technical * TECHNICAL_WEIGHT
        + quality.audio * AUDIO_WEIGHT
        + quality.video * VIDEO_WEIGHT
        + quality.presence * PRESENCE_WEIGHT;
    clamp_score(round_to(blended, 1))
}

/// Mean composite score of a session, rounded to one decimal.
pub fn final_score<'a>(evaluations: impl IntoIterator<Item = &'a InterviewEvaluation>) -> f64 {
    let scores: Vec<f64> = evaluations.into_iter().map(|e| e.overall_score).collect();
    if scores.is_empty() {
        return EMPTY_SESSION_SCORE;
    }
    clamp_score(round_to(scores.iter().sum::<f64>() / scores.len() as f64, 1))
}

impl From<SubmittedEvaluation> for InterviewEvaluation {
    fn from(submitted: SubmittedEvaluation) -> Self {
        let overall = clamp_score(submitted.overall_score.unwrap_or(EMPTY_SESSION_SCORE));
        let technical = clamp_score(submitted.technical_score.unwrap_or(overall));
        let category = submitted
            .category
            .as_deref()
            .and_then(Category::parse)
            .unwrap_or_else(|| Category::from_score(overall));
        Self {
            overall_score: overall,
            technical_score: technical,
            feedback: submitted.feedback.unwrap_or_default(),
            category,
            audio_quality: DEFAULT_QUALITY_SCORE,
            video_quality: DEFAULT_QUALITY_SCORE,
            presence_score: DEFAULT_QUALITY_SCORE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StartedInterview {
    pub session: InterviewSession,
    pub first_question: Option<PublicInterviewQuestion>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterviewSummary {
    pub final_score: f64,
    pub category: Category,
}

pub struct InterviewService {
    content: Arc<dyn ContentRepository>,
    sessions: Arc<dyn SessionRepository>,
    oracle: Arc<dyn EvaluationOracle>,
}

impl InterviewService {
    pub fn new(
        content: Arc<dyn ContentRepository>,
        sessions: Arc<dyn SessionRepository>,
        oracle: Arc<dyn EvaluationOracle>,
    ) -> Self {
        Self {
            content,
            sessions,
            oracle,
        }
    }

    pub async fn start(&self, user_id: i64, interview_id: i64) -> Result<StartedInterview, AppError> {
        let interview = self
            .content
            .find_interview(interview_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Interview not found".to_string()))?;

        let session = self
            .sessions
            .create_interview_session(user_id, interview_id)
            .await?;
        tracing::info!(user_id, interview_id, session_id = session.id, "Interview session started");

        Ok(StartedInterview {
            session,
            first_question: interview.questions.first().map(PublicInterviewQuestion::from),
        })
    }

    async fn open_session(&self, user_id: i64, session_id: i64) -> Result<InterviewSession, AppError> {
        let session = self
            .sessions
            .find_interview_session(session_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

        if session.is_closed() {
            return Err(AppError::AlreadySubmitted("Interview already submitted.".to_string()));
        }
        Ok(session)
    }

    /// Scores one answer and stores it in the session, replacing any earlier answer to the question.
    pub async fn evaluate_answer(
        &self,
        user_id: i64,
        session_id: i64,
        question_id: &str,
        answer: &str,
        quality: QualitySignals,
    ) -> Result<InterviewEvaluation, AppError> {
        let session = self.open_session(user_id, session_id).await?;

        let interview = self
            .content
            .find_interview(session.interview_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Interview not found".to_string()))?;

        let (index, question) = interview
            .find_question(question_id)
            .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

        let verdict = self
            .oracle
            .evaluate(&question.text, &question.expected_answer, answer)
            .await;

        let evaluation = InterviewEvaluation {
            overall_score: composite_score(verdict.score, &quality),
            technical_score: verdict.score,
            feedback: verdict.feedback,
            category: verdict.category,
            audio_quality: quality.audio,
            video_quality: quality.video,
            presence_score: quality.presence,
        };

        let next_index = i32::try_from(index + 1).unwrap_or(i32::MAX);
        let stored = self
            .sessions
            .record_interview_evaluation(session_id, question_id, answer, &evaluation, next_index)
            .await?;
        if !stored {
            return Err(AppError::AlreadySubmitted("Interview already submitted.".to_string()));
        }

        tracing::info!(
            session_id,
            question_id,
            overall_score = evaluation.overall_score,
            "Interview answer evaluated"
        );
        Ok(evaluation)
    }

    /// Closes the session and records its result.
    ///
    /// Evaluations saved by [`Self::evaluate_answer`] are authoritative. Entries in
    /// the payload only fill questions the server never evaluated, and the same
    /// rule applies to answers. Payload keys that name no question of the
    /// interview are dropped.
    pub async fn submit(
        &self,
        user_id: i64,
        session_id: i64,
        answers: HashMap<String, String>,
        evaluations: HashMap<String, SubmittedEvaluation>,
    ) -> Result<InterviewSummary, AppError> {
        let session = self.open_session(user_id, session_id).await?;

        let interview = self
            .content
            .find_interview(session.interview_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Interview not found".to_string()))?;

        let mut final_evaluations = session.evaluations;
        for (question_id, submitted) in evaluations {
            if interview.find_question(&question_id).is_none() {
                tracing::warn!(session_id, question_id = %question_id, "Dropping evaluation for unknown question");
                continue;
            }
            final_evaluations
                .entry(question_id)
                .or_insert_with(|| InterviewEvaluation::from(submitted));
        }

        let mut final_answers = session.answers;
        for (question_id, answer) in answers {
            if interview.find_question(&question_id).is_some() {
                final_answers.entry(question_id).or_insert(answer);
            }
        }

        let score = final_score(final_evaluations.values());
        let category = Category::from_score(score);

        let result = NewInterviewResult {
            user_id,
            interview_id: interview.id,
            interview_title: interview.title.clone(),
            session_id,
            final_score: score,
            category,
            evaluations: final_evaluations.clone(),
            answers: final_answers.clone(),
        };

        self.sessions
            .complete_interview_session(session_id, &final_answers, &final_evaluations, result)
            .await?
            .ok_or_else(|| AppError::AlreadySubmitted("Interview already submitted.".to_string()))?;

        tracing::info!(user_id, session_id, final_score = score, "Interview submitted");
        Ok(InterviewSummary {
            final_score: score,
            category,
        })
    }
}
