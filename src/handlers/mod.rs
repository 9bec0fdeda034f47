pub mod curriculum;
pub mod dashboard;
pub mod error;
pub mod generate;
pub mod marking;
pub mod recall;
pub mod submit;
pub mod tutor;

pub use curriculum::{list_subjects, subject_detail, topic_questions};
pub use dashboard::dashboard;
pub use error::ApiError;
pub use generate::generate_questions;
pub use marking::mark_answer;
pub use recall::{due_reviews, record_attempt};
pub use submit::submit_answer;
pub use tutor::tutor;

use axum::Json;
use rusqlite::Connection;
use serde_json::{json, Value};

use crate::db;
use crate::domain::TopicContext;

/// Topic with its theme title and subject.
/// Unknown topic is a 404; a topic whose theme or subject is missing is a 500.
pub(crate) fn load_topic_context(conn: &Connection, topic_id: i64) -> Result<TopicContext, ApiError> {
  let topic = db::get_topic(conn, topic_id)?
    .ok_or_else(|| ApiError::not_found("Topic not found for given topicId."))?;

  let theme = db::get_theme(conn, topic.theme_id)?.ok_or_else(|| {
    tracing::error!("Topic {} references missing theme {}", topic.id, topic.theme_id);
    ApiError::internal("Theme not found for topic.")
  })?;

  let subject = db::get_subject(conn, theme.subject_id)?.ok_or_else(|| {
    tracing::error!("Theme {} references missing subject {}", theme.id, theme.subject_id);
    ApiError::internal("Subject not found for theme.")
  })?;

  Ok(TopicContext {
    topic,
    theme_title: theme.title,
    subject,
  })
}

pub async fn health() -> Json<Value> {
  Json(json!({
    "status": "ok",
    "version": env!("CARGO_PKG_VERSION"),
  }))
}
