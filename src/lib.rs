pub mod auth;
pub mod config;
pub mod content;
pub mod db;
pub mod domain;
pub mod grading;
pub mod handlers;
pub mod llm;
pub mod paths;
pub mod srs;
pub mod state;
pub mod tutor;

#[cfg(test)]
pub mod testing;

use axum::{
  routing::{get, post},
  Router,
};
use tower_http::trace::TraceLayer;

use state::AppState;

/// All API routes. Everything except `/health` requires a session.
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/health", get(handlers::health))
    // Review scheduling and marking
    .route(
      "/active-recall",
      get(handlers::due_reviews).post(handlers::record_attempt),
    )
    .route("/mark-answer", post(handlers::mark_answer))
    .route("/submit-answer", post(handlers::submit_answer))
    // Curriculum
    .route("/subjects", get(handlers::list_subjects))
    .route("/subjects/{code}", get(handlers::subject_detail))
    .route("/topics/{id}/questions", get(handlers::topic_questions))
    .route("/generate-questions", post(handlers::generate_questions))
    // Student
    .route("/dashboard", get(handlers::dashboard))
    .route("/tutor", post(handlers::tutor))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
