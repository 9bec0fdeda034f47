//! Full practice flow for a stored question.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::ApiError;
use crate::auth::AuthContext;
use crate::config;
use crate::db::{self, try_lock};
use crate::domain::{GradingRequest, MasteryLevel};
use crate::grading;
use crate::srs;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
  pub question_id: i64,
  #[serde(default)]
  pub answer: String,
}

/// POST /submit-answer
///
/// Marks the answer, then records it, reschedules the question, updates the
/// topic's progress and flags the topic as weak on a poor result.
pub async fn submit_answer(
  State(state): State<AppState>,
  auth: AuthContext,
  Json(req): Json<SubmitAnswerRequest>,
) -> Result<Json<Value>, ApiError> {
  let question = {
    let conn = try_lock(&state.db)?;
    db::get_question(&conn, req.question_id)?
      .ok_or_else(|| ApiError::not_found("Question not found."))?
  };

  let grading_request = GradingRequest {
    question_text: question.question_text.clone(),
    student_answer: req.answer.clone(),
    mark_scheme: question.mark_scheme.clone(),
    max_marks: question.marks,
    question_type: question.question_type,
    reference_answer: question.correct_answer.clone(),
  };
  let result = grading::mark_answer(
    &grading_request,
    state.grading_mode(),
    state.completion.as_ref(),
  )
  .await?;

  let percentage = srs::confidence_level(result.awarded_marks, question.marks);
  let mastery = MasteryLevel::from_percentage(percentage);
  let now = Utc::now();

  let entry = {
    let conn = try_lock(&state.db)?;
    let tx = conn.unchecked_transaction()?;
    db::insert_answer(
      &tx,
      auth.user_id,
      question.id,
      &req.answer,
      result.awarded_marks,
      &result.feedback,
      now,
    )?;
    let entry = db::record_attempt(&tx, auth.user_id, question.id, question.topic_id, percentage, now)?;
    db::upsert_progress(&tx, auth.user_id, question.topic_id, percentage, mastery, now)?;
    if percentage < config::WEAK_TOPIC_THRESHOLD {
      db::upsert_weak_topic(&tx, auth.user_id, question.topic_id, 100 - percentage, now)?;
    }
    tx.commit()?;
    entry
  };

  tracing::info!(
    "User {} scored {}/{} on question {} ({}%, {})",
    auth.user_id,
    result.awarded_marks,
    question.marks,
    question.id,
    percentage,
    mastery.as_str()
  );

  Ok(Json(json!({
    "marks": result.awarded_marks,
    "maxMarks": question.marks,
    "feedback": result.feedback,
    "percentage": percentage,
    "masteryLevel": mastery,
    "nextReviewAt": db::timestamp(entry.next_review_at),
  })))
}
