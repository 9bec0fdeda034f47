//! Curriculum browsing.

use axum::{
  extract::{Path, Query, State},
  Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{load_topic_context, ApiError};
use crate::auth::AuthContext;
use crate::db::{self, try_lock};
use crate::domain::Difficulty;
use crate::state::AppState;

/// GET /subjects
pub async fn list_subjects(
  State(state): State<AppState>,
  _auth: AuthContext,
) -> Result<Json<Value>, ApiError> {
  let conn = try_lock(&state.db)?;
  let subjects = db::list_subjects(&conn)?;
  Ok(Json(json!({ "subjects": subjects })))
}

/// GET /subjects/{code}
pub async fn subject_detail(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(code): Path<String>,
) -> Result<Json<Value>, ApiError> {
  let conn = try_lock(&state.db)?;
  let subject = db::get_subject_by_code(&conn, &code)?
    .ok_or_else(|| ApiError::not_found(format!("Subject {} not found.", code.to_uppercase())))?;
  let themes = db::get_themes_with_topics(&conn, subject.id)?;
  let progress = db::get_progress_for_subject(&conn, auth.user_id, subject.id)?;

  Ok(Json(json!({
    "subject": subject,
    "themes": themes,
    "progress": progress,
  })))
}

#[derive(Debug, Deserialize)]
pub struct QuestionFilter {
  pub difficulty: Option<String>,
}

/// GET /topics/{id}/questions?difficulty=
pub async fn topic_questions(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(topic_id): Path<i64>,
  Query(filter): Query<QuestionFilter>,
) -> Result<Json<Value>, ApiError> {
  let difficulty = match filter.difficulty.as_deref().map(str::trim) {
    None | Some("") => None,
    Some(value) => Some(Difficulty::from_str(value).ok_or_else(|| {
      ApiError::bad_request("difficulty must be one of easy, medium, hard.")
    })?),
  };

  let conn = try_lock(&state.db)?;
  let context = load_topic_context(&conn, topic_id)?;
  let questions = db::get_questions_for_topic(&conn, topic_id, difficulty)?;
  let answers = db::get_answers_for_topic(&conn, auth.user_id, topic_id)?;

  Ok(Json(json!({
    "topic": context.topic,
    "themeTitle": context.theme_title,
    "subject": context.subject,
    "questions": questions,
    "previousAnswers": answers,
  })))
}
