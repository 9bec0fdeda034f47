//! Fixed-interval review scheduling.
//!
//! The interval is picked from one of three ladders depending on how well the
//! last attempt went, indexed by how many times the question has been reviewed.
//! Past the end of a ladder the interval stays at its last rung.

use chrono::{DateTime, Duration, Utc};

use crate::config;

/// Ladder of day intervals for a confidence level
pub fn ladder_for(confidence_level: i64) -> &'static [i64] {
  if confidence_level >= config::HIGH_CONFIDENCE_THRESHOLD {
    &config::HIGH_CONFIDENCE_LADDER
  } else if confidence_level >= config::MEDIUM_CONFIDENCE_THRESHOLD {
    &config::MEDIUM_CONFIDENCE_LADDER
  } else {
    &config::LOW_CONFIDENCE_LADDER
  }
}

/// Days until the next review
pub fn interval_days(review_count: u32, confidence_level: i64) -> i64 {
  let ladder = ladder_for(confidence_level);
  let index = (review_count as usize).min(ladder.len() - 1);
  ladder[index]
}

/// Next review time relative to an explicit `now`
pub fn compute_next_review_at(
  review_count: u32,
  confidence_level: i64,
  now: DateTime<Utc>,
) -> DateTime<Utc> {
  let days = interval_days(review_count, confidence_level);
  tracing::debug!(
    "Scheduling review: count={}, confidence={}, interval={}d",
    review_count,
    confidence_level,
    days
  );
  now + Duration::days(days)
}

pub fn compute_next_review(review_count: u32, confidence_level: i64) -> DateTime<Utc> {
  compute_next_review_at(review_count, confidence_level, Utc::now())
}

/// Percentage of marks awarded, rounded to the nearest integer.
/// Awards above the maximum count as full marks; a zero maximum gives 0.
pub fn confidence_level(marks_awarded: u32, max_marks: u32) -> i64 {
  if max_marks == 0 {
    return 0;
  }
  let awarded = marks_awarded.min(max_marks) as f64;
  (awarded / max_marks as f64 * 100.0).round() as i64
}
