// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    repositories::{ContentRepository, ResultRepository, SessionRepository, UserRepository},
    services::{
        grading::GradingService, interview::InterviewService, judge::CodeJudge,
        oracle::EvaluationOracle,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserRepository>,
    pub content: Arc<dyn ContentRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub results: Arc<dyn ResultRepository>,
    pub judge: Arc<dyn CodeJudge>,
    pub oracle: Arc<dyn EvaluationOracle>,
}

impl AppState {
    /// Wires every repository seam to the same backing store.
    pub fn new<R>(
        config: Config,
        repository: Arc<R>,
        judge: Arc<dyn CodeJudge>,
        oracle: Arc<dyn EvaluationOracle>,
    ) -> Self
    where
        R: UserRepository + ContentRepository + SessionRepository + ResultRepository + 'static,
    {
        Self {
            config,
            users: repository.clone(),
            content: repository.clone(),
            sessions: repository.clone(),
            results: repository,
            judge,
            oracle,
        }
    }

    pub fn grading(&self) -> GradingService {
        GradingService::new(
            self.content.clone(),
            self.sessions.clone(),
            self.results.clone(),
            self.judge.clone(),
            self.config.judge.language_id,
        )
    }

    pub fn interviews(&self) -> InterviewService {
        InterviewService::new(self.content.clone(), self.sessions.clone(), self.oracle.clone())
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
