use serde::Serialize;

use super::question::QuestionType;

/// Everything needed to mark one answer
#[derive(Debug, Clone)]
pub struct GradingRequest {
  pub question_text: String,
  pub student_answer: String,
  pub mark_scheme: String,
  pub max_marks: u32,
  pub question_type: QuestionType,
  /// Correct option for multiple choice, expected value for calculations
  pub reference_answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradingResult {
  pub awarded_marks: u32,
  pub feedback: String,
}

impl GradingResult {
  /// Build a result, clamping the mark into `[0, max_marks]`
  pub fn clamped(marks: i64, max_marks: u32, feedback: String) -> Self {
    Self {
      awarded_marks: marks.clamp(0, max_marks as i64) as u32,
      feedback,
    }
  }

  pub fn full(max_marks: u32, feedback: String) -> Self {
    Self {
      awarded_marks: max_marks,
      feedback,
    }
  }

  pub fn zero(feedback: String) -> Self {
    Self {
      awarded_marks: 0,
      feedback,
    }
  }
}
