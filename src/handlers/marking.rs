use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use super::ApiError;
use crate::auth::AuthContext;
use crate::domain::{GradingRequest, QuestionType};
use crate::grading;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAnswerRequest {
  #[serde(default)]
  pub question: String,
  #[serde(default)]
  pub answer: String,
  #[serde(default)]
  pub mark_scheme: String,
  #[serde(default)]
  pub max_marks: i64,
  #[serde(default)]
  pub question_type: String,
  #[serde(default)]
  pub correct_answer: String,
}

impl MarkAnswerRequest {
  /// Unrecognised question types are marked as short answers
  fn into_grading_request(self) -> GradingRequest {
    let question_type = QuestionType::from_str(&self.question_type).unwrap_or_else(|| {
      tracing::debug!("Unknown question type {:?}, marking as short answer", self.question_type);
      QuestionType::ShortAnswer
    });
    GradingRequest {
      question_text: self.question,
      student_answer: self.answer,
      mark_scheme: self.mark_scheme,
      max_marks: self.max_marks.clamp(1, u32::MAX as i64) as u32,
      question_type,
      reference_answer: self.correct_answer,
    }
  }
}

/// POST /mark-answer
pub async fn mark_answer(
  State(state): State<AppState>,
  auth: AuthContext,
  Json(req): Json<MarkAnswerRequest>,
) -> Result<Json<Value>, ApiError> {
  if req.max_marks <= 0 {
    return Err(ApiError::bad_request("maxMarks must be a positive number."));
  }
  let request = req.into_grading_request();
  let result =
    grading::mark_answer(&request, state.grading_mode(), state.completion.as_ref()).await?;

  tracing::debug!(
    "Marked {} answer for user {}: {}/{}",
    request.question_type.as_str(),
    auth.user_id,
    result.awarded_marks,
    request.max_marks
  );

  Ok(Json(json!({
    "marks": result.awarded_marks,
    "feedback": result.feedback,
  })))
}
