// src/services/grading.rs

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::{
    error::AppError,
    models::{
        attempt::{AttemptOutcome, NewAttempt, QuestionDetail},
        content::{ContentItem, ContentKind},
        question::{CodingQuestion, McqQuestion, Question},
        session::ExamSession,
    },
    repositories::{ContentRepository, ResultRepository, SessionRepository},
    services::judge::{CodeJudge, JudgeCase, JudgeStatus},
};

/// Aggregated grade for one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeReport {
    /// Percentage in [0, 100], two decimals.
    pub score: f64,
    pub passed: bool,
    pub correct: usize,
    pub total: usize,
    /// One entry per question, in the content item's order.
    pub details: Vec<QuestionDetail>,
}

#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub report: GradeReport,
    pub attempt: AttemptOutcome,
}

impl SubmissionOutcome {
    pub fn certification_awarded(&self) -> bool {
        self.attempt.certification_id.is_some()
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `100 * correct / total` rounded to two decimals; zero questions score 0.
pub fn percentage(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(correct as f64 / total as f64 * 100.0, 2)
}

fn grade_mcq(question: &McqQuestion, answer: Option<&String>) -> QuestionDetail {
    // Exact, case-sensitive match without trimming.
    let is_correct = match (answer, &question.correct_answer) {
        (Some(given), Some(correct)) => given == correct,
        _ => false,
    };
    QuestionDetail::mcq(
        &question.id,
        is_correct,
        answer.cloned(),
        question.correct_answer.clone(),
    )
}

async fn grade_coding(
    judge: &dyn CodeJudge,
    language_id: i32,
    question: &CodingQuestion,
    answer: Option<&String>,
) -> QuestionDetail {
    let hidden = question.hidden_cases();
    if hidden.is_empty() {
        return QuestionDetail::ungraded(&question.id, "coding", "No hidden test cases for grading.");
    }

    let Some(source) = answer.filter(|a| !a.trim().is_empty()) else {
        return QuestionDetail::ungraded(&question.id, "coding", "No code submitted.");
    };

    let cases: Vec<JudgeCase> = hidden
        .iter()
        .map(|tc| JudgeCase {
            source_code: source.clone(),
            language_id,
            stdin: tc.input.clone(),
            expected_output: Some(tc.output.clone()),
        })
        .collect();

    match judge.run_batch(&cases).await {
        Ok(outcomes) => {
            let passed = outcomes
                .iter()
                .filter(|o| o.status == JudgeStatus::Accepted)
                .count();
            QuestionDetail::coding(&question.id, passed, cases.len())
        }
        Err(e) => {
            tracing::warn!(question_id = %question.id, "Coding question could not be graded: {}", e);
            QuestionDetail::ungraded(&question.id, "coding", format!("Grading failed: {}", e))
        }
    }
}

/// Grades every question of `item` against `answers`.
///
/// MCQ and coding questions are worth one unit each; a coding question earns
/// its unit only when every hidden case is accepted. Questions that cannot be
/// graded are recorded in the details and earn nothing.
pub async fn grade(
    judge: &dyn CodeJudge,
    language_id: i32,
    item: &ContentItem,
    answers: &HashMap<String, String>,
) -> GradeReport {
    let total = item.questions.len();
    let mut details = Vec::with_capacity(total);

    for record in &item.questions {
        let answer = answers.get(&record.id);
        let detail = match Question::try_from(record.clone()) {
            Ok(Question::Mcq(q)) => grade_mcq(&q, answer),
            Ok(Question::Coding(q)) => grade_coding(judge, language_id, &q, answer).await,
            Err(unsupported) => {
                tracing::warn!(
                    content_id = item.id,
                    question_id = %unsupported.question_id,
                    "{}",
                    unsupported
                );
                QuestionDetail::ungraded(
                    &unsupported.question_id,
                    &unsupported.question_type,
                    unsupported.to_string(),
                )
            }
        };
        details.push(detail);
    }

    let correct = details.iter().filter(|d| d.is_correct).count();
    let score = percentage(correct, total);

    GradeReport {
        score,
        passed: score >= item.pass_threshold(),
        correct,
        total,
        details,
    }
}

/// Exam and test submission flows on top of [`grade`].
pub struct GradingService {
    content: Arc<dyn ContentRepository>,
    sessions: Arc<dyn SessionRepository>,
    results: Arc<dyn ResultRepository>,
    judge: Arc<dyn CodeJudge>,
    language_id: i32,
}

impl GradingService {
    pub fn new(
        content: Arc<dyn ContentRepository>,
        sessions: Arc<dyn SessionRepository>,
        results: Arc<dyn ResultRepository>,
        judge: Arc<dyn CodeJudge>,
        language_id: i32,
    ) -> Self {
        Self {
            content,
            sessions,
            results,
            judge,
            language_id,
        }
    }

    async fn load(&self, kind: ContentKind, id: i64) -> Result<ContentItem, AppError> {
        self.content.find_content(kind, id).await?.ok_or_else(|| match kind {
            ContentKind::Exam => AppError::NotFound("Exam not found.".to_string()),
            ContentKind::Test => AppError::NotFound("Test not found".to_string()),
            ContentKind::Practice => AppError::NotFound("Practice question not found".to_string()),
        })
    }

    /// Opens a new session on an existing exam.
    pub async fn start_exam(&self, user_id: i64, exam_id: i64) -> Result<ExamSession, AppError> {
        self.load(ContentKind::Exam, exam_id).await?;
        let session = self.sessions.create_exam_session(user_id, exam_id).await?;
        tracing::info!(user_id, exam_id, session_id = session.id, "Exam session started");
        Ok(session)
    }

    /// Grades an exam session and closes it. A session can be submitted once.
    pub async fn submit_exam(
        &self,
        user_id: i64,
        session_id: i64,
        answers: HashMap<String, String>,
    ) -> Result<SubmissionOutcome, AppError> {
        let session = self
            .sessions
            .find_exam_session(session_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Exam session not found.".to_string()))?;

        if session.is_closed() {
            return Err(AppError::AlreadySubmitted("Exam already submitted.".to_string()));
        }

        let exam = self.load(ContentKind::Exam, session.exam_id).await?;
        let report = grade(self.judge.as_ref(), self.language_id, &exam, &answers).await;

        let attempt = new_attempt(user_id, Some(session_id), &exam, &report, answers);
        let outcome = self
            .sessions
            .complete_exam_session(session_id, attempt)
            .await?
            .ok_or_else(|| AppError::AlreadySubmitted("Exam already submitted.".to_string()))?;

        tracing::info!(
            user_id,
            session_id,
            score = report.score,
            passed = report.passed,
            "Exam graded"
        );

        Ok(SubmissionOutcome {
            report,
            attempt: outcome,
        })
    }

    /// Grades a test. Every call records a new attempt.
    pub async fn submit_test(
        &self,
        user_id: i64,
        test_id: i64,
        answers: HashMap<String, String>,
    ) -> Result<SubmissionOutcome, AppError> {
        let test = self.load(ContentKind::Test, test_id).await?;
        let report = grade(self.judge.as_ref(), self.language_id, &test, &answers).await;

        let attempt = new_attempt(user_id, None, &test, &report, answers);
        let outcome = self.results.record_attempt(attempt).await?;

        tracing::info!(
            user_id,
            test_id,
            score = report.score,
            passed = report.passed,
            "Test graded"
        );

        Ok(SubmissionOutcome {
            report,
            attempt: outcome,
        })
    }
}

fn new_attempt(
    user_id: i64,
    session_id: Option<i64>,
    item: &ContentItem,
    report: &GradeReport,
    answers: HashMap<String, String>,
) -> NewAttempt {
    NewAttempt {
        user_id,
        session_id,
        content_id: item.id,
        content_kind: item.kind,
        content_title: item.title.clone(),
        score: report.score,
        passed: report.passed,
        details: report.details.clone(),
        answers: answers.into_iter().collect::<BTreeMap<_, _>>(),
    }
}
