//! Active recall queue endpoints.

use axum::{
  extract::{Query, State},
  Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::ApiError;
use crate::auth::AuthContext;
use crate::db::{self, try_lock};
use crate::srs;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAttemptRequest {
  pub question_id: i64,
  pub topic_id: i64,
  pub marks_awarded: i64,
  pub max_marks: i64,
}

/// POST /active-recall
pub async fn record_attempt(
  State(state): State<AppState>,
  auth: AuthContext,
  Json(req): Json<RecordAttemptRequest>,
) -> Result<Json<Value>, ApiError> {
  if req.max_marks <= 0 {
    return Err(ApiError::bad_request("maxMarks must be a positive number."));
  }
  let max_marks = u32::try_from(req.max_marks)
    .map_err(|_| ApiError::bad_request("maxMarks is too large."))?;
  let awarded = req.marks_awarded.clamp(0, req.max_marks) as u32;
  let confidence = srs::confidence_level(awarded, max_marks);

  let conn = try_lock(&state.db)?;
  if db::get_question(&conn, req.question_id)?.is_none() {
    return Err(ApiError::not_found("Question not found."));
  }

  let entry = db::record_attempt(
    &conn,
    auth.user_id,
    req.question_id,
    req.topic_id,
    confidence,
    Utc::now(),
  )?;
  tracing::info!(
    "User {} attempted question {}: confidence {}, review #{} due {}",
    auth.user_id,
    entry.question_id,
    entry.confidence_level,
    entry.review_count,
    entry.next_review_at
  );

  Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueQuery {
  pub topic_id: Option<i64>,
}

/// GET /active-recall?topicId=
pub async fn due_reviews(
  State(state): State<AppState>,
  auth: AuthContext,
  Query(query): Query<DueQuery>,
) -> Result<Json<Value>, ApiError> {
  let conn = try_lock(&state.db)?;
  let items = db::get_due_reviews(&conn, auth.user_id, query.topic_id, Utc::now(), None)?;
  Ok(Json(json!({ "items": items })))
}
