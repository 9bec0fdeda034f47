//! Free-text marking delegated to the completion service.
//!
//! The model is asked to mark against the scheme under the four assessment
//! objectives and to state the mark as "X/Y" or "X out of Y". The first such
//! mark whose denominator equals the question's maximum is accepted. When no
//! usable mark is found the answer gets 0; a missing mark is never read as
//! full marks.

use regex::Regex;
use std::sync::LazyLock;

use crate::config;
use crate::domain::{GradingRequest, GradingResult};
use crate::llm::{CompletionError, CompletionRequest, CompletionService};

static MARK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:/|out\s+of)\s*(\d+)").expect("valid mark pattern")
});

fn system_prompt(max_marks: u32) -> String {
  format!(
    r#"You are a strict A-Level examiner. Mark the student's answer ONLY against the mark scheme provided.

Assess the answer under four assessment objectives:
- AO1 Knowledge: accurate definitions and recall of relevant content.
- AO2 Application: knowledge applied to the context of the question.
- AO3 Analysis: developed chains of reasoning, causes and consequences.
- AO4 Evaluation: supported judgements, weighing of arguments, conclusions.

Do not reward content that the mark scheme does not credit. Do not exceed {max} marks.

Respond with brief feedback for the student (what was done well, what is missing),
then finish with a final line in exactly this format:
Mark: X/{max}"#,
    max = max_marks
  )
}

fn user_prompt(request: &GradingRequest) -> String {
  let scheme = if request.mark_scheme.trim().is_empty() {
    "(no mark scheme supplied - mark on accuracy and development)"
  } else {
    request.mark_scheme.trim()
  };

  format!(
    "Question ({max} marks, {kind}):\n{question}\n\nMark scheme:\n{scheme}\n\nStudent answer:\n{answer}",
    max = request.max_marks,
    kind = request.question_type.as_str(),
    question = request.question_text.trim(),
    scheme = scheme,
    answer = request.student_answer.trim(),
  )
}

/// Completion request asking the model to mark one answer
pub fn build_grading_request(request: &GradingRequest) -> CompletionRequest {
  CompletionRequest::new(
    system_prompt(request.max_marks),
    user_prompt(request),
    config::GRADING_TEMPERATURE,
  )
  .with_max_tokens(config::GRADING_MAX_TOKENS)
}

/// Find the awarded mark in model output.
/// Marks out of anything other than `max_marks` are ignored.
pub fn extract_mark(text: &str, max_marks: u32) -> Option<u32> {
  MARK_PATTERN.captures_iter(text).find_map(|caps| {
    let denominator: u32 = caps.get(2)?.as_str().parse().ok()?;
    if denominator != max_marks {
      return None;
    }
    let numerator: f64 = caps.get(1)?.as_str().parse().ok()?;
    Some((numerator.round() as i64).clamp(0, max_marks as i64) as u32)
  })
}

/// Turn raw model output into a result
pub fn interpret_response(text: &str, max_marks: u32) -> GradingResult {
  let marks = match extract_mark(text, max_marks) {
    Some(marks) => marks,
    None => {
      tracing::warn!("No mark out of {} found in grading response; awarding 0", max_marks);
      0
    }
  };

  GradingResult::clamped(marks as i64, max_marks, text.trim().to_string())
}

/// Mark a free-text answer with the completion service
pub async fn grade_with_service(
  service: &dyn CompletionService,
  request: &GradingRequest,
) -> Result<GradingResult, CompletionError> {
  let completion = build_grading_request(request);
  let text = service.complete(&completion).await?;
  Ok(interpret_response(&text, request.max_marks))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::QuestionType;
  use crate::testing::ScriptedCompletion;

  fn essay_request(max_marks: u32) -> GradingRequest {
    GradingRequest {
      question_text: "Evaluate the use of minimum wages.".to_string(),
      student_answer: "Minimum wages raise incomes but may cause unemployment.".to_string(),
      mark_scheme: "\"unemployment\", \"elasticity of demand for labour\"".to_string(),
      max_marks,
      question_type: QuestionType::Essay,
      reference_answer: String::new(),
    }
  }

  #[test]
  fn test_extract_slash_mark() {
    assert_eq!(extract_mark("Good analysis.\nMark: 7/12", 12), Some(7));
  }

  #[test]
  fn test_extract_out_of_mark() {
    assert_eq!(extract_mark("I would award 5 out of 8 marks.", 8), Some(5));
    assert_eq!(extract_mark("5 OUT OF 8", 8), Some(5));
  }

  #[test]
  fn test_denominator_must_match_max() {
    assert_eq!(extract_mark("Mark: 7/10", 12), None);
  }

  #[test]
  fn test_skips_rubric_subtotals() {
    let text = "AO1: 2/3\nAO2: 2/3\nTotal: 6/12";
    assert_eq!(extract_mark(text, 12), Some(6));
  }

  #[test]
  fn test_numerator_clamped_and_rounded() {
    assert_eq!(extract_mark("Mark: 15/12", 12), Some(12));
    assert_eq!(extract_mark("Mark: 6.5/12", 12), Some(7));
  }

  #[test]
  fn test_missing_mark_defaults_to_zero() {
    let result = interpret_response("A thoughtful answer with some gaps.", 10);
    assert_eq!(result.awarded_marks, 0);
    assert_eq!(result.feedback, "A thoughtful answer with some gaps.");
  }

  #[test]
  fn test_prompt_mentions_rubric_and_max() {
    let completion = build_grading_request(&essay_request(12));
    let system = completion.system_prompt().unwrap();
    assert!(system.contains("AO1 Knowledge"));
    assert!(system.contains("AO4 Evaluation"));
    assert!(system.contains("Mark: X/12"));
    let user = completion.user_prompt().unwrap();
    assert!(user.contains("elasticity of demand for labour"));
    assert!(user.contains("Minimum wages raise incomes"));
  }

  #[tokio::test]
  async fn test_grade_with_service() {
    let service = ScriptedCompletion::replying("Clear point on unemployment.\nMark: 4/12");
    let result = grade_with_service(&service, &essay_request(12)).await.unwrap();
    assert_eq!(result.awarded_marks, 4);
    assert!(result.feedback.starts_with("Clear point"));
    assert_eq!(service.calls(), 1);
  }

  #[tokio::test]
  async fn test_grade_with_service_propagates_failure() {
    let service = ScriptedCompletion::failing();
    let result = grade_with_service(&service, &essay_request(12)).await;
    assert!(result.is_err());
  }
}
