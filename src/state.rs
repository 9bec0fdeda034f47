//! Application state shared by all handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::grading::GradingMode;
use crate::llm::CompletionService;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared database (curriculum, users, sessions, learning state)
    pub db: DbPool,

    /// Language-model client used for grading, generation and tutoring
    pub completion: Arc<dyn CompletionService>,

    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: DbPool, completion: Arc<dyn CompletionService>, config: AppConfig) -> Self {
        Self {
            db,
            completion,
            config: Arc::new(config),
        }
    }

    pub fn grading_mode(&self) -> GradingMode {
        GradingMode::from_flag(self.config.grade_with_llm)
    }
}
