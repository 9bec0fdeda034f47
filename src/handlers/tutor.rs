use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::ApiError;
use crate::auth::AuthContext;
use crate::config;
use crate::db::{self, try_lock, LogOnError};
use crate::state::AppState;
use crate::tutor as tutor_core;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorRequest {
  #[serde(default)]
  pub message: String,
  pub topic_id: Option<i64>,
}

/// POST /tutor
pub async fn tutor(
  State(state): State<AppState>,
  auth: AuthContext,
  Json(req): Json<TutorRequest>,
) -> Result<Json<Value>, ApiError> {
  let message = req.message.trim();
  if message.is_empty() {
    return Err(ApiError::bad_request("Message is required."));
  }

  let (topic_title, weak_topics, memory) = {
    let conn = try_lock(&state.db)?;
    let topic_title = match req.topic_id {
      Some(id) => Some(
        db::get_topic(&conn, id)?
          .ok_or_else(|| ApiError::not_found("Topic not found for given topicId."))?
          .title,
      ),
      None => None,
    };
    let weak_topics = db::get_weak_topics(&conn, auth.user_id, config::WEAK_TOPICS_LIMIT)?;
    let memory = db::get_tutor_memory(&conn, auth.user_id)?;
    (topic_title, weak_topics, memory)
  };

  let request =
    tutor_core::build_tutor_request(message, topic_title.as_deref(), &weak_topics, &memory);
  let response = state.completion.complete(&request).await.map_err(|e| {
    tracing::error!("Tutor completion failed: {}", e);
    ApiError::Upstream("Failed to get response".to_string())
  })?;

  // A failed memory write is logged; the reply is still returned
  let updated = tutor_core::next_memory(&memory, message, topic_title.as_deref(), &response);
  if let Some(conn) = try_lock(&state.db).log_warn("Tutor memory not saved") {
    db::save_tutor_memory(&conn, auth.user_id, &updated, Utc::now())
      .log_warn("Tutor memory not saved");
  }

  Ok(Json(json!({ "response": response })))
}
