// tests/api_tests.rs

use std::sync::Arc;

use async_trait::async_trait;
use backend::{
    config::{Config, JudgeConfig, OracleConfig},
    models::{
        content::{ContentItem, ContentKind},
        interview::{Category, Interview, InterviewQuestion},
        question::{QuestionRecord, TestCase},
    },
    repositories::MemoryRepository,
    routes,
    services::{
        judge::{CodeJudge, JudgeCase, JudgeError, JudgeOutcome, JudgeStatus},
        oracle::{Evaluation, EvaluationOracle},
    },
    state::AppState,
    utils::jwt::sign_jwt,
};
use serde_json::{Value, json};

const JWT_SECRET: &str = "test_secret_for_integration_tests";

/// Accepts any program that prints, rejects everything else.
struct PrintJudge;

#[async_trait]
impl CodeJudge for PrintJudge {
    async fn run_batch(&self, cases: &[JudgeCase]) -> Result<Vec<JudgeOutcome>, JudgeError> {
        Ok(cases
            .iter()
            .map(|case| {
                let accepted = case.source_code.contains("print");
                JudgeOutcome {
                    stdout: accepted.then(|| case.expected_output.clone().unwrap_or_default()),
                    stderr: None,
                    status: if accepted {
                        JudgeStatus::Accepted
                    } else {
                        JudgeStatus::WrongAnswer
                    },
                }
            })
            .collect())
    }
}

/// Judge whose service is down.
struct DownJudge;

#[async_trait]
impl CodeJudge for DownJudge {
    async fn run_batch(&self, _cases: &[JudgeCase]) -> Result<Vec<JudgeOutcome>, JudgeError> {
        Err(JudgeError::ServiceUnavailable("connection refused".to_string()))
    }
}

struct FixedOracle(f64);

#[async_trait]
impl EvaluationOracle for FixedOracle {
    async fn evaluate(&self, _question: &str, _expected: &str, _answer: &str) -> Evaluation {
        Evaluation {
            score: self.0,
            feedback: "Solid answer.".to_string(),
            category: Category::from_score(self.0),
        }
    }
}

struct TestApp {
    address: String,
    repo: Arc<MemoryRepository>,
    client: reqwest::Client,
}

impl TestApp {
    fn token(&self, user_id: i64) -> String {
        sign_jwt(user_id, "user", JWT_SECRET, 600).unwrap()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    async fn get(&self, path: &str, user_id: i64) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(self.token(user_id))
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn post_json(&self, path: &str, user_id: i64, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(self.token(user_id))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        port: 0,
        judge: JudgeConfig::default(),
        oracle: OracleConfig::default(),
    }
}

/// Helper function to spawn the app on a random port for testing.
async fn spawn_app_with(judge: Arc<dyn CodeJudge>, oracle: Arc<dyn EvaluationOracle>) -> TestApp {
    let repo = Arc::new(MemoryRepository::new());
    let state = AppState::new(test_config(), repo.clone(), judge, oracle);
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        repo,
        client: reqwest::Client::new(),
    }
}

async fn spawn_app() -> TestApp {
    spawn_app_with(Arc::new(PrintJudge), Arc::new(FixedOracle(3.0))).await
}

fn mcq(id: &str, answer: &str) -> QuestionRecord {
    QuestionRecord {
        id: id.to_string(),
        question_type: "mcq".to_string(),
        text: "Pick one".to_string(),
        difficulty: None,
        options: vec!["A".to_string(), "B".to_string()],
        correct_answer: Some(answer.to_string()),
        test_cases: Vec::new(),
        starter_code: None,
    }
}

fn coding(id: &str) -> QuestionRecord {
    QuestionRecord {
        id: id.to_string(),
        question_type: "coding".to_string(),
        text: "Echo the input".to_string(),
        difficulty: None,
        options: Vec::new(),
        correct_answer: None,
        test_cases: vec![
            TestCase {
                input: "1".to_string(),
                output: "1".to_string(),
                hidden: false,
            },
            TestCase {
                input: "2".to_string(),
                output: "2".to_string(),
                hidden: true,
            },
            TestCase {
                input: "3".to_string(),
                output: "3".to_string(),
                hidden: true,
            },
        ],
        starter_code: Some("# write code".to_string()),
    }
}

fn content(kind: ContentKind, questions: Vec<QuestionRecord>) -> ContentItem {
    ContentItem {
        id: 0,
        kind,
        title: "Python Basics".to_string(),
        description: String::new(),
        duration_minutes: 30,
        language: Some("python".to_string()),
        difficulty: None,
        tags: Vec::new(),
        pass_criteria: None,
        questions,
    }
}

fn interview() -> Interview {
    Interview {
        id: 0,
        title: "Backend Engineer".to_string(),
        description: String::new(),
        duration_minutes: 20,
        difficulty: None,
        tags: Vec::new(),
        questions: vec![
            InterviewQuestion {
                id: "q1".to_string(),
                text: "What is a mutex?".to_string(),
                expected_answer: "Mutual exclusion lock.".to_string(),
                time_limit: 120,
            },
            InterviewQuestion {
                id: "q2".to_string(),
                text: "What is a deadlock?".to_string(),
                expected_answer: "Circular wait.".to_string(),
                time_limit: 120,
            },
        ],
    }
}

#[tokio::test]
async fn health_check_404() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/random_path_that_does_not_exist"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_then_login_works() {
    let app = spawn_app().await;
    let unique_name = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let credentials = json!({ "username": unique_name, "password": "password123" });

    let response = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&credentials)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
    let user: Value = response.json().await.unwrap();
    assert!(user.get("password").is_none());

    let duplicate = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&credentials)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(duplicate.status().as_u16(), 409);

    let login = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&credentials)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(login.status().as_u16(), 200);
    let body: Value = login.json().await.unwrap();
    let token = body["token"].as_str().unwrap();

    let exams = app
        .client
        .get(app.url("/api/exams"))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(exams.status().as_u16(), 200);
}

#[tokio::test]
async fn register_fails_validation() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&json!({ "username": "yo", "password": "password123" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = spawn_app().await;
    let credentials = json!({ "username": "alice", "password": "password123" });
    app.client
        .post(app.url("/api/auth/register"))
        .json(&credentials)
        .send()
        .await
        .expect("Failed to execute request");

    let response = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "username": "alice", "password": "wrong-password" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn protected_routes_require_token() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/api/exams"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);

    let response = app
        .client
        .get(app.url("/api/tests"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn exam_details_hide_answer_keys() {
    let app = spawn_app().await;
    let exam_id = app
        .repo
        .insert_content(content(ContentKind::Exam, vec![mcq("q1", "A"), coding("q2")]))
        .unwrap();

    let response = app.get(&format!("/api/exams/{}", exam_id), 1).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();

    let text = body.to_string();
    assert!(!text.contains("correct_answer"));
    assert_eq!(body["pass_criteria"], 80.0);
    // Only the visible case of the coding question is sent.
    assert_eq!(body["questions"][1]["test_cases"].as_array().unwrap().len(), 1);

    let missing = app.get("/api/exams/9999", 1).await;
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn exam_flow_grades_once_and_certifies() {
    let app = spawn_app().await;
    let exam_id = app
        .repo
        .insert_content(content(ContentKind::Exam, vec![mcq("q1", "A"), coding("q2")]))
        .unwrap();

    let start = app
        .post_json(&format!("/api/exams/start/{}", exam_id), 7, json!({}))
        .await;
    assert_eq!(start.status().as_u16(), 200);
    let session_id = start.json::<Value>().await.unwrap()["session_id"]
        .as_i64()
        .unwrap();

    let submission = json!({
        "session_id": session_id,
        "answers": { "q1": "A", "q2": "print(input())" }
    });
    let response = app.post_json("/api/exams/submit", 7, submission.clone()).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["score"], 100.0);
    assert_eq!(body["passed"], true);
    assert_eq!(body["certification_awarded"], true);
    assert_eq!(body["details"].as_array().unwrap().len(), 2);

    // A second submission of the same session is rejected and writes nothing.
    let again = app.post_json("/api/exams/submit", 7, submission).await;
    assert_eq!(again.status().as_u16(), 400);
    let error: Value = again.json().await.unwrap();
    assert_eq!(error["error"], "Exam already submitted.");

    assert_eq!(app.repo.attempts().unwrap().len(), 1);
    assert_eq!(app.repo.certifications().unwrap().len(), 1);

    let results: Value = app.get("/api/user/results", 7).await.json().await.unwrap();
    assert_eq!(results.as_array().unwrap().len(), 1);
    assert_eq!(results[0]["details"][0]["question_id"], "q1");
    assert_eq!(results[0]["details"][1]["passed_cases"], 2);
}

#[tokio::test]
async fn exam_session_of_another_user_is_not_found() {
    let app = spawn_app().await;
    let exam_id = app
        .repo
        .insert_content(content(ContentKind::Exam, vec![mcq("q1", "A")]))
        .unwrap();

    let start = app
        .post_json(&format!("/api/exams/start/{}", exam_id), 1, json!({}))
        .await;
    let session_id = start.json::<Value>().await.unwrap()["session_id"]
        .as_i64()
        .unwrap();

    let response = app
        .post_json(
            "/api/exams/submit",
            2,
            json!({ "session_id": session_id, "answers": { "q1": "A" } }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn failing_code_earns_no_credit() {
    let app = spawn_app().await;
    let test_id = app
        .repo
        .insert_content(content(ContentKind::Test, vec![mcq("q1", "A"), coding("q2")]))
        .unwrap();

    let response = app
        .post_json(
            &format!("/api/tests/{}/submit", test_id),
            3,
            json!({ "answers": { "q1": "A", "q2": "return 1" } }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["score"], 50.0);
    assert_eq!(body["passed"], false);
    assert_eq!(body["certification_awarded"], false);

    let certs: Value = app
        .get("/api/tests/user/certifications", 3)
        .await
        .json()
        .await
        .unwrap();
    assert!(certs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_attempts_accumulate() {
    let app = spawn_app().await;
    let test_id = app
        .repo
        .insert_content(content(ContentKind::Test, vec![mcq("q1", "A")]))
        .unwrap();

    for answer in ["B", "A"] {
        let response = app
            .post_json(
                &format!("/api/tests/{}/submit", test_id),
                4,
                json!({ "answers": { "q1": answer } }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 200);
    }

    let attempts: Value = app.get("/api/tests/user/attempts", 4).await.json().await.unwrap();
    let attempts = attempts.as_array().unwrap();
    assert_eq!(attempts.len(), 2);
    // Newest first.
    assert_eq!(attempts[0]["passed"], true);
    assert_eq!(attempts[1]["score"], 0.0);

    let certs: Value = app
        .get("/api/tests/user/certifications", 4)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(certs.as_array().unwrap().len(), 1);

    // Exam history stays separate from test history.
    let exam_results: Value = app.get("/api/user/results", 4).await.json().await.unwrap();
    assert!(exam_results.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn empty_test_scores_zero() {
    let app = spawn_app().await;
    let test_id = app
        .repo
        .insert_content(content(ContentKind::Test, Vec::new()))
        .unwrap();

    let response = app
        .post_json(&format!("/api/tests/{}/submit", test_id), 5, json!({}))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["score"], 0.0);
    assert_eq!(body["passed"], false);
}

#[tokio::test]
async fn unknown_test_is_not_found() {
    let app = spawn_app().await;

    let response = app
        .post_json("/api/tests/42/submit", 1, json!({ "answers": {} }))
        .await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn run_code_returns_results_in_case_order() {
    let app = spawn_app().await;

    let response = app
        .post_json(
            "/api/exams/run-code",
            1,
            json!({
                "source_code": "print(input())",
                "test_cases": [
                    { "input": "1", "expected_output": "1" },
                    { "input": "2", "expected_output": "2" }
                ]
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["status"], "accepted");
    assert_eq!(results[1]["stdout"], "2");
}

#[tokio::test]
async fn run_code_reports_unavailable_judge() {
    let app = spawn_app_with(Arc::new(DownJudge), Arc::new(FixedOracle(3.0))).await;

    let response = app
        .post_json(
            "/api/exams/run-code",
            1,
            json!({ "source_code": "print(1)", "test_cases": [{ "input": "" }] }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 503);
}

#[tokio::test]
async fn unavailable_judge_degrades_grading() {
    let app = spawn_app_with(Arc::new(DownJudge), Arc::new(FixedOracle(3.0))).await;
    let test_id = app
        .repo
        .insert_content(content(ContentKind::Test, vec![mcq("q1", "A"), coding("q2")]))
        .unwrap();

    let response = app
        .post_json(
            &format!("/api/tests/{}/submit", test_id),
            6,
            json!({ "answers": { "q1": "A", "q2": "print(input())" } }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["score"], 50.0);

    let attempts = app.repo.attempts().unwrap();
    let detail = &attempts[0].details[1];
    assert!(!detail.is_correct);
    assert!(detail.error.as_deref().unwrap().starts_with("Grading failed"));
}

#[tokio::test]
async fn interview_flow_scores_and_closes() {
    let app = spawn_app().await;
    let interview_id = app.repo.insert_interview(interview()).unwrap();

    let listed: Value = app.get("/api/interview", 9).await.json().await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert!(!listed.to_string().contains("expected_answer"));

    let one = app.get(&format!("/api/interview/{}", interview_id), 9).await;
    assert_eq!(one.status().as_u16(), 200);
    let one: Value = one.json().await.unwrap();
    assert_eq!(one["title"], "Backend Engineer");
    assert!(!one.to_string().contains("expected_answer"));

    let start = app
        .post_json(&format!("/api/interview/start/{}", interview_id), 9, json!({}))
        .await;
    assert_eq!(start.status().as_u16(), 200);
    let started: Value = start.json().await.unwrap();
    assert_eq!(started["first_question"]["id"], "q1");
    let session_id = started["session_id"].as_i64().unwrap();

    // Technical 3.0 with default signals: 1.8 + 0.8 + 0.8 + 0.4 = 3.8.
    let form = reqwest::multipart::Form::new()
        .text("question_id", "q1")
        .text("session_id", session_id.to_string())
        .text("user_answer", "A lock that allows one holder at a time.")
        .part("audio", reqwest::multipart::Part::bytes(vec![0u8; 16]).file_name("answer.webm"));
    let response = app
        .client
        .post(app.url("/api/interview/evaluate-answer"))
        .bearer_auth(app.token(9))
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    let evaluation: Value = response.json().await.unwrap();
    assert_eq!(evaluation["overall_score"], 3.8);
    assert_eq!(evaluation["technical_score"], 3.0);
    // The category is the model's verdict on the technical answer alone.
    assert_eq!(evaluation["category"], "average");

    // The client-side copy of q1 is ignored; q2 was never evaluated so its entry is used.
    let response = app
        .post_json(
            "/api/interview/submit",
            9,
            json!({
                "session_id": session_id,
                "answers": { "q2": "Two threads waiting on each other." },
                "evaluations": {
                    "q1": { "overall_score": 1.0 },
                    "q2": { "overall_score": 3.2 }
                }
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let summary: Value = response.json().await.unwrap();
    assert_eq!(summary["success"], true);
    assert_eq!(summary["final_score"], 3.5);
    assert_eq!(summary["category"], "good");

    let again = app
        .post_json("/api/interview/submit", 9, json!({ "session_id": session_id }))
        .await;
    assert_eq!(again.status().as_u16(), 400);

    let results: Value = app
        .get("/api/interview/user/results", 9)
        .await
        .json()
        .await
        .unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["interview_title"], "Backend Engineer");
    assert_eq!(results[0]["final_score"], 3.5);
}

#[tokio::test]
async fn evaluate_answer_rejects_unknown_question() {
    let app = spawn_app().await;
    let interview_id = app.repo.insert_interview(interview()).unwrap();
    let started: Value = app
        .post_json(&format!("/api/interview/start/{}", interview_id), 9, json!({}))
        .await
        .json()
        .await
        .unwrap();
    let session_id = started["session_id"].as_i64().unwrap();

    let form = reqwest::multipart::Form::new()
        .text("question_id", "q99")
        .text("session_id", session_id.to_string())
        .text("user_answer", "anything");
    let response = app
        .client
        .post(app.url("/api/interview/evaluate-answer"))
        .bearer_auth(app.token(9))
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn empty_interview_submission_scores_three() {
    let app = spawn_app().await;
    let interview_id = app.repo.insert_interview(interview()).unwrap();
    let started: Value = app
        .post_json(&format!("/api/interview/start/{}", interview_id), 9, json!({}))
        .await
        .json()
        .await
        .unwrap();

    let response = app
        .post_json(
            "/api/interview/submit",
            9,
            json!({ "session_id": started["session_id"] }),
        )
        .await;
    let summary: Value = response.json().await.unwrap();
    assert_eq!(summary["final_score"], 3.0);
    assert_eq!(summary["category"], "average");
}

#[tokio::test]
async fn unknown_interview_is_not_found() {
    let app = spawn_app().await;

    let response = app.post_json("/api/interview/start/77", 1, json!({})).await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn get_interview_unknown_id_is_not_found() {
    let app = spawn_app().await;

    let response = app.get("/api/interview/4242", 1).await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn evaluate_answer_requires_user_answer() {
    let app = spawn_app_with(Arc::new(PrintJudge), Arc::new(FixedOracle(5.0))).await;
    let interview_id = app.repo.insert_interview(interview()).unwrap();
    let started: Value = app
        .post_json(&format!("/api/interview/start/{}", interview_id), 9, json!({}))
        .await
        .json()
        .await
        .unwrap();
    let session_id = started["session_id"].as_i64().unwrap();

    let form = reqwest::multipart::Form::new()
        .text("question_id", "q1")
        .text("session_id", session_id.to_string());
    let response = app
        .client
        .post(app.url("/api/interview/evaluate-answer"))
        .bearer_auth(app.token(9))
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("user_answer"));

    // Nothing was evaluated, so the session still scores as empty.
    let summary: Value = app
        .post_json("/api/interview/submit", 9, json!({ "session_id": session_id }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(summary["final_score"], 3.0);
}

#[tokio::test]
async fn interview_submit_ignores_unknown_question_ids() {
    let app = spawn_app().await;
    let interview_id = app.repo.insert_interview(interview()).unwrap();
    let started: Value = app
        .post_json(&format!("/api/interview/start/{}", interview_id), 9, json!({}))
        .await
        .json()
        .await
        .unwrap();

    let response = app
        .post_json(
            "/api/interview/submit",
            9,
            json!({
                "session_id": started["session_id"],
                "answers": { "bogus": "padding" },
                "evaluations": {
                    "q1": { "overall_score": 2.0 },
                    "bogus-1": { "overall_score": 5.0 },
                    "bogus-2": { "overall_score": 5.0 }
                }
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let summary: Value = response.json().await.unwrap();
    assert_eq!(summary["final_score"], 2.0);
    assert_eq!(summary["category"], "bad");

    let results: Value = app
        .get("/api/interview/user/results", 9)
        .await
        .json()
        .await
        .unwrap();
    let evaluations = results[0]["evaluations"].as_object().unwrap();
    assert_eq!(evaluations.keys().collect::<Vec<_>>(), vec!["q1"]);
    assert!(results[0]["answers"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn practice_sets_are_listed_apart_from_exams() {
    let app = spawn_app().await;
    app.repo
        .insert_content(content(ContentKind::Exam, vec![mcq("q1", "A")]))
        .unwrap();
    let practice_id = app
        .repo
        .insert_content(content(ContentKind::Practice, vec![mcq("p1", "B"), coding("p2")]))
        .unwrap();

    let listed: Value = app.get("/api/practice", 3).await.json().await.unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], practice_id);

    let response = app.get(&format!("/api/practice/{}", practice_id), 3).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(!body.to_string().contains("correct_answer"));
    assert_eq!(body["questions"][1]["test_cases"].as_array().unwrap().len(), 1);

    let exams: Value = app.get("/api/exams", 3).await.json().await.unwrap();
    assert_eq!(exams.as_array().unwrap().len(), 1);

    // A practice set cannot be opened as an exam.
    let as_exam = app.get(&format!("/api/exams/{}", practice_id), 3).await;
    assert_eq!(as_exam.status().as_u16(), 404);

    let missing = app.get("/api/practice/9999", 3).await;
    assert_eq!(missing.status().as_u16(), 404);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["error"], "Practice question not found");
}
