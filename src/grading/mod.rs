//! Answer marking.
//!
//! [`score_answer`] is the rule-based scorer: exact match for multiple choice,
//! numeric tolerance for calculations and keyword overlap for free text.
//! [`mark_answer`] adds the option of sending free-text answers to the
//! completion service instead.

pub mod choice;
pub mod keywords;
pub mod llm;
pub mod numeric;

use crate::domain::{GradingRequest, GradingResult, QuestionType};
use crate::llm::{CompletionError, CompletionService};

/// How free-text answers are marked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradingMode {
  /// Keyword overlap and length heuristics
  Heuristic,
  /// Completion service marks against the scheme
  Llm,
}

impl GradingMode {
  pub fn from_flag(use_llm: bool) -> Self {
    if use_llm { Self::Llm } else { Self::Heuristic }
  }
}

/// Rule-based marking. Never fails; the mark is always within `[0, max_marks]`.
pub fn score_answer(request: &GradingRequest) -> GradingResult {
  match request.question_type {
    QuestionType::MultipleChoice => choice::score_multiple_choice(
      &request.student_answer,
      &request.reference_answer,
      request.max_marks,
    ),
    QuestionType::Calculation => numeric::score_calculation(
      &request.student_answer,
      &request.reference_answer,
      request.max_marks,
    ),
    QuestionType::ShortAnswer | QuestionType::Essay => keywords::score_free_text(
      &request.student_answer,
      &request.mark_scheme,
      request.max_marks,
      request.question_type,
    ),
  }
}

/// Mark an answer, using the completion service for free text when `mode` asks for it.
/// Multiple choice and calculations are always marked by rule.
pub async fn mark_answer(
  request: &GradingRequest,
  mode: GradingMode,
  service: &dyn CompletionService,
) -> Result<GradingResult, CompletionError> {
  if mode == GradingMode::Llm && request.question_type.is_free_text() {
    llm::grade_with_service(service, request).await
  } else {
    Ok(score_answer(request))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::ScriptedCompletion;

  fn request(question_type: QuestionType, answer: &str, reference: &str, scheme: &str) -> GradingRequest {
    GradingRequest {
      question_text: "Q".to_string(),
      student_answer: answer.to_string(),
      mark_scheme: scheme.to_string(),
      max_marks: 4,
      question_type,
      reference_answer: reference.to_string(),
    }
  }

  #[test]
  fn test_dispatch_by_type() {
    let mc = score_answer(&request(QuestionType::MultipleChoice, " B ", "b", ""));
    assert_eq!(mc.awarded_marks, 4);

    let calc = score_answer(&request(QuestionType::Calculation, "98", "100", ""));
    assert_eq!(calc.awarded_marks, 0);

    let text = score_answer(&request(QuestionType::ShortAnswer, "brief", "", ""));
    // No keywords, under 20 words: 30% of 4 rounds to 1
    assert_eq!(text.awarded_marks, 1);
  }

  #[test]
  fn test_scoring_is_idempotent() {
    let req = request(
      QuestionType::Essay,
      "Supply rises when price rises because firms seek profit",
      "",
      "\"supply\" \"profit\" and market equilibrium",
    );
    assert_eq!(score_answer(&req), score_answer(&req));
  }

  #[test]
  fn test_marks_stay_in_range_for_odd_inputs() {
    let answers = ["", " ", "supply supply supply", "-1e9", "999999999999"];
    let schemes = ["", "\"\"", "'supply' \"supply\" supply", "''''"];
    for qt in QuestionType::ALL {
      for answer in answers {
        for scheme in schemes {
          for max in [0, 1, 7] {
            let mut req = request(qt, answer, answer, scheme);
            req.max_marks = max;
            let result = score_answer(&req);
            assert!(result.awarded_marks <= max, "{qt:?} {answer:?} {scheme:?} {max}");
          }
        }
      }
    }
  }

  #[tokio::test]
  async fn test_llm_mode_only_for_free_text() {
    let service = ScriptedCompletion::replying("Mark: 3/4");

    let mc = request(QuestionType::MultipleChoice, "A", "A", "");
    let result = mark_answer(&mc, GradingMode::Llm, &service).await.unwrap();
    assert_eq!(result.awarded_marks, 4);
    assert_eq!(service.calls(), 0);

    let essay = request(QuestionType::Essay, "An answer", "", "scheme");
    let result = mark_answer(&essay, GradingMode::Llm, &service).await.unwrap();
    assert_eq!(result.awarded_marks, 3);
    assert_eq!(service.calls(), 1);
  }

  #[tokio::test]
  async fn test_heuristic_mode_never_calls_service() {
    let service = ScriptedCompletion::failing();
    let essay = request(QuestionType::Essay, "An answer", "", "scheme");
    let result = mark_answer(&essay, GradingMode::Heuristic, &service).await;
    assert!(result.is_ok());
    assert_eq!(service.calls(), 0);
  }
}
