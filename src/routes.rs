// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, exams, interview, practice, tests},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Auth routes are public; everything else requires a bearer token.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
        HeaderValue::from_static("http://localhost:5173"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let exam_routes = Router::new()
        .route("/", get(exams::list_exams))
        .route("/{id}", get(exams::get_exam))
        .route("/start/{exam_id}", post(exams::start_exam))
        .route("/submit", post(exams::submit_exam))
        .route("/run-code", post(exams::run_code));

    let test_routes = Router::new()
        .route("/", get(tests::list_tests))
        .route("/{id}", get(tests::get_test))
        .route("/{id}/submit", post(tests::submit_test))
        .route("/user/attempts", get(tests::user_attempts))
        .route("/user/certifications", get(tests::user_certifications));

    let practice_routes = Router::new()
        .route("/", get(practice::list_practice))
        .route("/{id}", get(practice::get_practice));

    let interview_routes = Router::new()
        .route("/", get(interview::list_interviews))
        .route("/{id}", get(interview::get_interview))
        .route("/start/{interview_id}", post(interview::start_interview))
        .route("/evaluate-answer", post(interview::evaluate_answer))
        .route("/submit", post(interview::submit_interview))
        .route("/user/results", get(interview::user_results));

    let protected = Router::new()
        .nest("/exams", exam_routes)
        .nest("/tests", test_routes)
        .nest("/practice", practice_routes)
        .nest("/interview", interview_routes)
        .route("/user/results", get(exams::user_results))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", protected)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
