use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use super::ApiError;
use crate::auth::AuthContext;
use crate::config;
use crate::db::{self, try_lock};
use crate::state::AppState;

/// GET /dashboard
pub async fn dashboard(
  State(state): State<AppState>,
  auth: AuthContext,
) -> Result<Json<Value>, ApiError> {
  let conn = try_lock(&state.db)?;
  let now = Utc::now();

  let recent = db::get_recent_progress(&conn, auth.user_id, config::DASHBOARD_PROGRESS_LIMIT)?;
  let due = db::get_due_reviews(&conn, auth.user_id, None, now, Some(config::DASHBOARD_DUE_LIMIT))?;
  let due_count = db::count_due_reviews(&conn, auth.user_id, now)?;
  let mastered = db::count_mastered_topics(&conn, auth.user_id)?;
  let total_answers = db::count_answers(&conn, auth.user_id)?;

  Ok(Json(json!({
    "username": auth.username,
    "recentProgress": recent,
    "dueReviews": due,
    "dueCount": due_count,
    "masteredCount": mastered,
    "totalAnswers": total_answers,
  })))
}
