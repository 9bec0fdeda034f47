//! Calculation marking with a 1% relative tolerance.
//!
//! Answers are reduced to digits, decimal points and minus signs before the
//! leading number is read, so "£1,250.50" and "1250.5" compare equal.
//! Anything without a readable number counts as 0.

use regex::Regex;
use std::sync::LazyLock;

use crate::config;
use crate::domain::GradingResult;

static NON_NUMERIC: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[^0-9.\-]").expect("valid non-numeric pattern"));

static LEADING_NUMBER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^-?(?:\d+(?:\.\d*)?|\.\d+)").expect("valid number pattern"));

/// Read the number in an answer, if there is one
pub fn extract_number(text: &str) -> Option<f64> {
  let stripped = NON_NUMERIC.replace_all(text, "");
  LEADING_NUMBER
    .find(&stripped)
    .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Number in an answer, or 0 when none can be read
pub fn number_or_zero(text: &str) -> f64 {
  extract_number(text).unwrap_or(0.0)
}

pub fn within_tolerance(student: f64, reference: f64) -> bool {
  let tolerance = (reference * config::CALCULATION_TOLERANCE).abs();
  (student - reference).abs() <= tolerance
}

pub fn score_calculation(
  student_answer: &str,
  reference_answer: &str,
  max_marks: u32,
) -> GradingResult {
  let student_answer = student_answer.trim();
  let reference_answer = reference_answer.trim();

  let is_correct = within_tolerance(number_or_zero(student_answer), number_or_zero(reference_answer));

  if is_correct {
    GradingResult::full(
      max_marks,
      format!(
        "Correct! Your answer of {} matches the expected result. Great work with your calculations.",
        student_answer
      ),
    )
  } else {
    GradingResult::zero(format!(
      "Incorrect. The correct answer is {}. Check your calculations and ensure you've used the correct formula. Review the working to identify where the error occurred.",
      reference_answer
    ))
  }
}
