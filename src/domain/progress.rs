use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::curriculum::TopicSummary;

/// Coarse per-topic mastery derived from the latest attempt percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryLevel {
  Learning,
  Practiced,
  Mastered,
}

impl MasteryLevel {
  pub fn from_percentage(percentage: i64) -> Self {
    if percentage >= 80 {
      Self::Mastered
    } else if percentage >= 50 {
      Self::Practiced
    } else {
      Self::Learning
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Learning => "learning",
      Self::Practiced => "practiced",
      Self::Mastered => "mastered",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "learning" => Some(Self::Learning),
      "practiced" => Some(Self::Practiced),
      "mastered" => Some(Self::Mastered),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicProgress {
  pub topic: TopicSummary,
  pub mastery_level: MasteryLevel,
  pub completion_percentage: i64,
  pub questions_answered: i64,
  pub last_accessed: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeakTopic {
  pub topic: TopicSummary,
  pub weakness_score: i64,
}

/// A previously submitted answer
#[derive(Debug, Clone, Serialize)]
pub struct AnswerRecord {
  pub id: i64,
  pub question_id: i64,
  pub answer_text: String,
  pub marks_awarded: u32,
  pub feedback: String,
  pub answered_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mastery_bands() {
    assert_eq!(MasteryLevel::from_percentage(100), MasteryLevel::Mastered);
    assert_eq!(MasteryLevel::from_percentage(80), MasteryLevel::Mastered);
    assert_eq!(MasteryLevel::from_percentage(79), MasteryLevel::Practiced);
    assert_eq!(MasteryLevel::from_percentage(50), MasteryLevel::Practiced);
    assert_eq!(MasteryLevel::from_percentage(49), MasteryLevel::Learning);
    assert_eq!(MasteryLevel::from_percentage(0), MasteryLevel::Learning);
  }
}
