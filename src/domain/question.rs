use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config;

/// Question format, which decides how an answer is marked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
  /// Single option picked from a closed set - exact match
  MultipleChoice,
  /// Numeric answer - relative tolerance
  Calculation,
  /// Free text, a few sentences
  ShortAnswer,
  /// Free text, extended writing
  Essay,
}

impl QuestionType {
  pub const ALL: [QuestionType; 4] = [
    Self::MultipleChoice,
    Self::Calculation,
    Self::ShortAnswer,
    Self::Essay,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::MultipleChoice => "multiple_choice",
      Self::Calculation => "calculation",
      Self::ShortAnswer => "short_answer",
      Self::Essay => "essay",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s.trim() {
      "multiple_choice" => Some(Self::MultipleChoice),
      "calculation" => Some(Self::Calculation),
      "short_answer" => Some(Self::ShortAnswer),
      "essay" => Some(Self::Essay),
      _ => None,
    }
  }

  /// Whether answers are free text marked against a mark scheme
  pub fn is_free_text(&self) -> bool {
    matches!(self, Self::ShortAnswer | Self::Essay)
  }

  /// Words an answer needs before it counts as fully developed
  pub fn min_word_count(&self) -> usize {
    match self {
      Self::Essay => config::ESSAY_MIN_WORDS,
      _ => config::SHORT_ANSWER_MIN_WORDS,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Easy => "easy",
      Self::Medium => "medium",
      Self::Hard => "hard",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s.trim() {
      "easy" => Some(Self::Easy),
      "medium" => Some(Self::Medium),
      "hard" => Some(Self::Hard),
      _ => None,
    }
  }

  /// Sort position (easy first)
  pub fn rank(&self) -> i64 {
    match self {
      Self::Easy => 0,
      Self::Medium => 1,
      Self::Hard => 2,
    }
  }
}

/// A stored practice question
#[derive(Debug, Clone, Serialize)]
pub struct Question {
  pub id: i64,
  pub topic_id: i64,
  pub question_text: String,
  pub question_type: QuestionType,
  pub difficulty: Difficulty,
  pub marks: u32,
  pub correct_answer: String,
  pub explanation: String,
  pub mark_scheme: String,
  pub created_at: DateTime<Utc>,
}

/// A question about to be inserted (no id yet)
#[derive(Debug, Clone)]
pub struct NewQuestion {
  pub question_text: String,
  pub question_type: QuestionType,
  pub difficulty: Difficulty,
  pub marks: u32,
  pub correct_answer: String,
  pub explanation: String,
  pub mark_scheme: String,
}
