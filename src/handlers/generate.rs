use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{load_topic_context, ApiError};
use crate::auth::AuthContext;
use crate::config;
use crate::content;
use crate::db::{self, try_lock};
use crate::domain::QuestionType;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsRequest {
  pub topic_id: Option<i64>,
  pub count: Option<i64>,
  pub force_type: Option<String>,
}

/// POST /generate-questions
pub async fn generate_questions(
  State(state): State<AppState>,
  auth: AuthContext,
  Json(req): Json<GenerateQuestionsRequest>,
) -> Result<Json<Value>, ApiError> {
  let topic_id = req
    .topic_id
    .filter(|id| *id > 0)
    .ok_or_else(|| ApiError::bad_request("topicId is required and must be a number."))?;

  let count = req.count.unwrap_or(config::DEFAULT_GENERATION_COUNT as i64);
  if !(1..=config::MAX_GENERATION_COUNT as i64).contains(&count) {
    return Err(ApiError::bad_request(format!(
      "count must be between 1 and {} per request.",
      config::MAX_GENERATION_COUNT
    )));
  }
  let count = count as u32;

  let force_type = match req.force_type.as_deref().map(str::trim) {
    None | Some("") => None,
    Some(value) => Some(QuestionType::from_str(value).ok_or_else(|| {
      ApiError::bad_request(
        "forceType must be one of multiple_choice, short_answer, calculation, essay.",
      )
    })?),
  };

  let context = {
    let conn = try_lock(&state.db)?;
    load_topic_context(&conn, topic_id)?
  };

  tracing::info!(
    "User {} generating {} questions for topic {} ({})",
    auth.user_id,
    count,
    context.topic.id,
    context.topic.title
  );

  let request = content::build_generation_request(&context, count, force_type);
  let raw = state.completion.complete(&request).await?;
  let batch = content::parse_generated_questions(&raw, force_type)?;
  if batch.skipped > 0 {
    tracing::warn!("Skipped {} unusable generated questions", batch.skipped);
  }

  let inserted = {
    let conn = try_lock(&state.db)?;
    db::insert_questions(&conn, topic_id, &batch.questions)?
  };

  Ok(Json(json!({
    "message": "Questions generated and inserted successfully.",
    "topic": {
      "id": context.topic.id,
      "title": context.topic.title,
    },
    "insertedCount": inserted,
    "skippedCount": batch.skipped,
  })))
}
