// src/repositories/postgres.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction, types::Json};

use super::{ContentRepository, ResultRepository, SessionRepository, UserRepository};
use crate::{
    error::AppError,
    models::{
        attempt::{Attempt, AttemptOutcome, Certification, NewAttempt, QuestionDetail},
        content::{ContentItem, ContentKind},
        interview::{
            Category, Interview, InterviewEvaluation, InterviewQuestion, InterviewResult,
            NewInterviewResult,
        },
        question::QuestionRecord,
        session::{ExamSession, InterviewSession},
        user::User,
    },
};

type Timestamp = chrono::DateTime<chrono::Utc>;

/// Postgres-backed repositories sharing one connection pool.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password: String,
    role: String,
    created_at: Option<Timestamp>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            password: row.password,
            role: row.role,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct ContentRow {
    id: i64,
    kind: String,
    title: String,
    description: String,
    duration_minutes: i32,
    language: Option<String>,
    difficulty: Option<String>,
    tags: Json<Vec<String>>,
    pass_criteria: Option<f64>,
    questions: Json<Vec<QuestionRecord>>,
}

impl TryFrom<ContentRow> for ContentItem {
    type Error = AppError;

    fn try_from(row: ContentRow) -> Result<Self, Self::Error> {
        let kind = ContentKind::parse(&row.kind).ok_or_else(|| {
            AppError::InternalServerError(format!("unknown content kind '{}'", row.kind))
        })?;
        Ok(Self {
            id: row.id,
            kind,
            title: row.title,
            description: row.description,
            duration_minutes: row.duration_minutes,
            language: row.language,
            difficulty: row.difficulty,
            tags: row.tags.0,
            pass_criteria: row.pass_criteria,
            questions: row.questions.0,
        })
    }
}

#[derive(FromRow)]
struct InterviewRow {
    id: i64,
    title: String,
    description: String,
    duration_minutes: i32,
    difficulty: Option<String>,
    tags: Json<Vec<String>>,
    questions: Json<Vec<InterviewQuestion>>,
}

impl From<InterviewRow> for Interview {
    fn from(row: InterviewRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            duration_minutes: row.duration_minutes,
            difficulty: row.difficulty,
            tags: row.tags.0,
            questions: row.questions.0,
        }
    }
}

#[derive(FromRow)]
struct ExamSessionRow {
    id: i64,
    user_id: i64,
    exam_id: i64,
    start_time: Timestamp,
    end_time: Option<Timestamp>,
    answers: Json<BTreeMap<String, String>>,
}

impl From<ExamSessionRow> for ExamSession {
    fn from(row: ExamSessionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            exam_id: row.exam_id,
            start_time: row.start_time,
            end_time: row.end_time,
            answers: row.answers.0,
        }
    }
}

#[derive(FromRow)]
struct InterviewSessionRow {
    id: i64,
    user_id: i64,
    interview_id: i64,
    start_time: Timestamp,
    end_time: Option<Timestamp>,
    current_question_index: i32,
    answers: Json<BTreeMap<String, String>>,
    evaluations: Json<BTreeMap<String, InterviewEvaluation>>,
}

impl From<InterviewSessionRow> for InterviewSession {
    fn from(row: InterviewSessionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            interview_id: row.interview_id,
            start_time: row.start_time,
            end_time: row.end_time,
            current_question_index: row.current_question_index,
            answers: row.answers.0,
            evaluations: row.evaluations.0,
        }
    }
}

#[derive(FromRow)]
struct AttemptRow {
    id: i64,
    user_id: i64,
    session_id: Option<i64>,
    content_id: i64,
    content_kind: String,
    content_title: String,
    score: f64,
    passed: bool,
    details: Json<Vec<QuestionDetail>>,
    answers: Json<BTreeMap<String, String>>,
    submitted_at: Timestamp,
}

impl TryFrom<AttemptRow> for Attempt {
    type Error = AppError;

    fn try_from(row: AttemptRow) -> Result<Self, Self::Error> {
        let content_kind = ContentKind::parse(&row.content_kind).ok_or_else(|| {
            AppError::InternalServerError(format!("unknown content kind '{}'", row.content_kind))
        })?;
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            session_id: row.session_id,
            content_id: row.content_id,
            content_kind,
            content_title: row.content_title,
            score: row.score,
            passed: row.passed,
            details: row.details.0,
            answers: row.answers.0,
            submitted_at: row.submitted_at,
        })
    }
}

#[derive(FromRow)]
struct CertificationRow {
    id: i64,
    user_id: i64,
    content_id: i64,
    content_title: String,
    score: f64,
    attempt_id: i64,
    awarded_at: Timestamp,
}

impl From<CertificationRow> for Certification {
    fn from(row: CertificationRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            content_id: row.content_id,
            content_title: row.content_title,
            score: row.score,
            attempt_id: row.attempt_id,
            awarded_at: row.awarded_at,
        }
    }
}

#[derive(FromRow)]
struct InterviewResultRow {
    id: i64,
    user_id: i64,
    interview_id: i64,
    interview_title: String,
    session_id: i64,
    final_score: f64,
    category: String,
    evaluations: Json<BTreeMap<String, InterviewEvaluation>>,
    answers: Json<BTreeMap<String, String>>,
    submitted_at: Timestamp,
}

impl From<InterviewResultRow> for InterviewResult {
    fn from(row: InterviewResultRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            interview_id: row.interview_id,
            interview_title: row.interview_title,
            session_id: row.session_id,
            category: Category::parse(&row.category)
                .unwrap_or_else(|| Category::from_score(row.final_score)),
            final_score: row.final_score,
            evaluations: row.evaluations.0,
            answers: row.answers.0,
            submitted_at: row.submitted_at,
        }
    }
}

/// Writes an attempt and, when it passed, its certification inside `tx`.
async fn insert_attempt(
    tx: &mut Transaction<'_, Postgres>,
    attempt: NewAttempt,
) -> Result<AttemptOutcome, AppError> {
    let attempt_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO attempts
            (user_id, session_id, content_id, content_kind, content_title, score, passed, details, answers)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id
        "#,
    )
    .bind(attempt.user_id)
    .bind(attempt.session_id)
    .bind(attempt.content_id)
    .bind(attempt.content_kind.as_str())
    .bind(&attempt.content_title)
    .bind(attempt.score)
    .bind(attempt.passed)
    .bind(Json(&attempt.details))
    .bind(Json(&attempt.answers))
    .fetch_one(&mut **tx)
    .await?;

    let certification_id = if attempt.passed {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO certifications (user_id, content_id, content_title, score, attempt_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(attempt.user_id)
        .bind(attempt.content_id)
        .bind(&attempt.content_title)
        .bind(attempt.score)
        .bind(attempt_id)
        .fetch_one(&mut **tx)
        .await?;
        Some(id)
    } else {
        None
    };

    Ok(AttemptOutcome {
        attempt_id,
        certification_id,
    })
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password)
            VALUES ($1, $2)
            RETURNING id, username, password, role, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Postgres error code for unique violation is 23505
            if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
                AppError::Conflict(format!("Username '{}' already exists", username))
            } else {
                tracing::error!("Failed to register user: {:?}", e);
                AppError::from(e)
            }
        })?;

        Ok(row.into())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password, role, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }
}

const CONTENT_COLUMNS: &str = "id, kind, title, description, duration_minutes, language, difficulty, tags, pass_criteria, questions";
const INTERVIEW_COLUMNS: &str = "id, title, description, duration_minutes, difficulty, tags, questions";

#[async_trait]
impl ContentRepository for PgRepository {
    async fn list_content(&self, kind: ContentKind) -> Result<Vec<ContentItem>, AppError> {
        let rows = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT {CONTENT_COLUMNS} FROM content_items WHERE kind = $1 ORDER BY id LIMIT 100"
        ))
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ContentItem::try_from).collect()
    }

    async fn find_content(&self, kind: ContentKind, id: i64) -> Result<Option<ContentItem>, AppError> {
        let row = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT {CONTENT_COLUMNS} FROM content_items WHERE kind = $1 AND id = $2"
        ))
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ContentItem::try_from).transpose()
    }

    async fn list_interviews(&self) -> Result<Vec<Interview>, AppError> {
        let rows = sqlx::query_as::<_, InterviewRow>(&format!(
            "SELECT {INTERVIEW_COLUMNS} FROM interviews ORDER BY id LIMIT 100"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Interview::from).collect())
    }

    async fn find_interview(&self, id: i64) -> Result<Option<Interview>, AppError> {
        let row = sqlx::query_as::<_, InterviewRow>(&format!(
            "SELECT {INTERVIEW_COLUMNS} FROM interviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Interview::from))
    }
}

#[async_trait]
impl SessionRepository for PgRepository {
    async fn create_exam_session(&self, user_id: i64, exam_id: i64) -> Result<ExamSession, AppError> {
        let row = sqlx::query_as::<_, ExamSessionRow>(
            r#"
            INSERT INTO exam_sessions (user_id, exam_id)
            VALUES ($1, $2)
            RETURNING id, user_id, exam_id, start_time, end_time, answers
            "#,
        )
        .bind(user_id)
        .bind(exam_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_exam_session(&self, session_id: i64, user_id: i64) -> Result<Option<ExamSession>, AppError> {
        let row = sqlx::query_as::<_, ExamSessionRow>(
            r#"
            SELECT id, user_id, exam_id, start_time, end_time, answers
            FROM exam_sessions
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ExamSession::from))
    }

    async fn complete_exam_session(
        &self,
        session_id: i64,
        attempt: NewAttempt,
    ) -> Result<Option<AttemptOutcome>, AppError> {
        let mut tx = self.pool.begin().await?;

        // First writer to set end_time wins; everyone else sees zero rows.
        let closed = sqlx::query(
            r#"
            UPDATE exam_sessions
            SET end_time = NOW(), answers = $3
            WHERE id = $1 AND user_id = $2 AND end_time IS NULL
            "#,
        )
        .bind(session_id)
        .bind(attempt.user_id)
        .bind(Json(&attempt.answers))
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if closed == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let outcome = insert_attempt(&mut tx, attempt).await?;
        tx.commit().await?;
        Ok(Some(outcome))
    }

    async fn create_interview_session(
        &self,
        user_id: i64,
        interview_id: i64,
    ) -> Result<InterviewSession, AppError> {
        let row = sqlx::query_as::<_, InterviewSessionRow>(
            r#"
            INSERT INTO interview_sessions (user_id, interview_id)
            VALUES ($1, $2)
            RETURNING id, user_id, interview_id, start_time, end_time,
                      current_question_index, answers, evaluations
            "#,
        )
        .bind(user_id)
        .bind(interview_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_interview_session(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> Result<Option<InterviewSession>, AppError> {
        let row = sqlx::query_as::<_, InterviewSessionRow>(
            r#"
            SELECT id, user_id, interview_id, start_time, end_time,
                   current_question_index, answers, evaluations
            FROM interview_sessions
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(InterviewSession::from))
    }

    async fn record_interview_evaluation(
        &self,
        session_id: i64,
        question_id: &str,
        answer: &str,
        evaluation: &InterviewEvaluation,
        next_question_index: i32,
    ) -> Result<bool, AppError> {
        let updated = sqlx::query(
            r#"
            UPDATE interview_sessions
            SET answers = answers || jsonb_build_object($2::TEXT, $3::TEXT),
                evaluations = evaluations || jsonb_build_object($2::TEXT, $4::JSONB),
                current_question_index = GREATEST(current_question_index, $5)
            WHERE id = $1 AND end_time IS NULL
            "#,
        )
        .bind(session_id)
        .bind(question_id)
        .bind(answer)
        .bind(Json(evaluation))
        .bind(next_question_index)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn complete_interview_session(
        &self,
        session_id: i64,
        answers: &BTreeMap<String, String>,
        evaluations: &BTreeMap<String, InterviewEvaluation>,
        result: NewInterviewResult,
    ) -> Result<Option<i64>, AppError> {
        let mut tx = self.pool.begin().await?;

        let closed = sqlx::query(
            r#"
            UPDATE interview_sessions
            SET end_time = NOW(), answers = $3, evaluations = $4
            WHERE id = $1 AND user_id = $2 AND end_time IS NULL
            "#,
        )
        .bind(session_id)
        .bind(result.user_id)
        .bind(Json(answers))
        .bind(Json(evaluations))
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if closed == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO interview_results
                (user_id, interview_id, interview_title, session_id, final_score, category, evaluations, answers)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(result.user_id)
        .bind(result.interview_id)
        .bind(&result.interview_title)
        .bind(result.session_id)
        .bind(result.final_score)
        .bind(result.category.as_str())
        .bind(Json(&result.evaluations))
        .bind(Json(&result.answers))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(id))
    }
}

#[async_trait]
impl ResultRepository for PgRepository {
    async fn record_attempt(&self, attempt: NewAttempt) -> Result<AttemptOutcome, AppError> {
        let mut tx = self.pool.begin().await?;
        let outcome = insert_attempt(&mut tx, attempt).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    async fn list_attempts(&self, user_id: i64, kind: ContentKind) -> Result<Vec<Attempt>, AppError> {
        let rows = sqlx::query_as::<_, AttemptRow>(
            r#"
            SELECT id, user_id, session_id, content_id, content_kind, content_title,
                   score, passed, details, answers, submitted_at
            FROM attempts
            WHERE user_id = $1 AND content_kind = $2
            ORDER BY submitted_at DESC
            LIMIT 50
            "#,
        )
        .bind(user_id)
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Attempt::try_from).collect()
    }

    async fn list_certifications(&self, user_id: i64) -> Result<Vec<Certification>, AppError> {
        let rows = sqlx::query_as::<_, CertificationRow>(
            r#"
            SELECT id, user_id, content_id, content_title, score, attempt_id, awarded_at
            FROM certifications
            WHERE user_id = $1
            ORDER BY awarded_at DESC
            LIMIT 50
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Certification::from).collect())
    }

    async fn list_interview_results(&self, user_id: i64) -> Result<Vec<InterviewResult>, AppError> {
        let rows = sqlx::query_as::<_, InterviewResultRow>(
            r#"
            SELECT id, user_id, interview_id, interview_title, session_id, final_score,
                   category, evaluations, answers, submitted_at
            FROM interview_results
            WHERE user_id = $1
            ORDER BY submitted_at DESC
            LIMIT 50
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(InterviewResult::from).collect())
    }
}
