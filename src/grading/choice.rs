//! Multiple choice marking: exact match after trimming and lower-casing.

use crate::domain::GradingResult;

/// Normalize an option for comparison
fn normalize_option(option: &str) -> String {
  option.trim().to_lowercase()
}

pub fn score_multiple_choice(
  student_answer: &str,
  correct_answer: &str,
  max_marks: u32,
) -> GradingResult {
  let expected = normalize_option(correct_answer);
  let is_correct = !expected.is_empty() && normalize_option(student_answer) == expected;

  if is_correct {
    GradingResult::full(max_marks, "Correct! Well done.".to_string())
  } else {
    GradingResult::zero(format!(
      "Incorrect. The correct answer is {}. Review the topic to understand why this is the correct choice.",
      correct_answer.trim()
    ))
  }
}
