use chrono::{DateTime, Utc};
use serde::Serialize;

use super::curriculum::TopicSummary;
use super::question::{Difficulty, QuestionType};

/// One question in a user's spaced-repetition queue
#[derive(Debug, Clone, Serialize)]
pub struct ReviewQueueEntry {
  pub id: i64,
  pub user_id: i64,
  pub question_id: i64,
  pub topic_id: i64,
  pub last_attempted_at: DateTime<Utc>,
  pub next_review_at: DateTime<Utc>,
  pub review_count: u32,
  pub confidence_level: i64,
}

impl ReviewQueueEntry {
  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    self.next_review_at <= now
  }
}

/// Question fields shown alongside a due review
#[derive(Debug, Clone, Serialize)]
pub struct QuestionSummary {
  pub id: i64,
  pub question_text: String,
  pub question_type: QuestionType,
  pub difficulty: Difficulty,
  pub marks: u32,
}

/// A due queue entry joined with its question and topic
#[derive(Debug, Clone, Serialize)]
pub struct DueReview {
  #[serde(flatten)]
  pub entry: ReviewQueueEntry,
  pub question: QuestionSummary,
  pub topic: TopicSummary,
}
