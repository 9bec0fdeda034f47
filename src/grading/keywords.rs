//! Keyword-overlap marking for short answers and essays.
//!
//! Keywords come from the mark scheme: quoted phrases plus any subject term
//! from a fixed vocabulary that the scheme mentions. The mark is the share of
//! keywords the answer contains, less a penalty when the answer is too short.
//! A scheme with no keywords falls back to marking on length alone.

use regex::Regex;
use std::sync::LazyLock;

use crate::config;
use crate::domain::{GradingResult, QuestionType};

// ============================================================================
// Vocabulary
// ============================================================================

/// Economics, business and politics terms recognised in mark schemes
static DOMAIN_VOCABULARY: &[&str] = &[
  "supply",
  "demand",
  "elasticity",
  "market",
  "competition",
  "monopoly",
  "externality",
  "inflation",
  "unemployment",
  "gdp",
  "fiscal",
  "monetary",
  "policy",
  "stakeholder",
  "profit",
  "revenue",
  "cost",
  "democracy",
  "parliament",
  "government",
  "election",
  "legislation",
  "constitution",
];

static QUOTED_PHRASE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#""([^"]+)"|'([^']+)'"#).expect("valid quoted phrase pattern"));

// ============================================================================
// Extraction
// ============================================================================

/// Keywords expected by a mark scheme, lower-cased. Duplicates are kept.
pub fn extract_keywords(mark_scheme: &str) -> Vec<String> {
  let scheme = mark_scheme.to_lowercase();
  let mut keywords: Vec<String> = QUOTED_PHRASE
    .captures_iter(&scheme)
    .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
    .map(|m| m.as_str().to_string())
    .collect();

  keywords.extend(
    DOMAIN_VOCABULARY
      .iter()
      .filter(|term| scheme.contains(*term))
      .map(|term| term.to_string()),
  );

  keywords
}

/// Number of keywords found anywhere in the answer
pub fn count_matches(keywords: &[String], answer: &str) -> usize {
  let answer = answer.to_lowercase();
  keywords
    .iter()
    .filter(|keyword| answer.contains(keyword.as_str()))
    .count()
}

pub fn word_count(text: &str) -> usize {
  text.split_whitespace().count()
}

// ============================================================================
// Scoring
// ============================================================================

/// Intermediate measurements behind a free-text mark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordAssessment {
  pub keywords_total: usize,
  pub keywords_matched: usize,
  pub word_count: usize,
  pub min_words: usize,
}

impl KeywordAssessment {
  pub fn new(answer: &str, mark_scheme: &str, question_type: QuestionType) -> Self {
    let keywords = extract_keywords(mark_scheme);
    Self {
      keywords_total: keywords.len(),
      keywords_matched: count_matches(&keywords, answer),
      word_count: word_count(answer),
      min_words: question_type.min_word_count(),
    }
  }

  pub fn meets_min_length(&self) -> bool {
    self.word_count >= self.min_words
  }

  /// Unclamped mark before rounding to the `[0, max_marks]` range
  pub fn raw_marks(&self, max_marks: u32) -> f64 {
    let max = max_marks as f64;

    if self.keywords_total > 0 {
      let ratio = self.keywords_matched.min(self.keywords_total) as f64 / self.keywords_total as f64;
      let penalty = if self.meets_min_length() {
        0.0
      } else {
        max * config::SHORT_ANSWER_PENALTY
      };
      max * ratio - penalty
    } else if self.word_count < self.min_words {
      max * config::LENGTH_FALLBACK_SHORT
    } else if self.word_count < self.min_words * 2 {
      max * config::LENGTH_FALLBACK_ADEQUATE
    } else {
      max * config::LENGTH_FALLBACK_EXTENDED
    }
  }

  pub fn marks(&self, max_marks: u32) -> u32 {
    let rounded = self.raw_marks(max_marks).round() as i64;
    rounded.clamp(0, max_marks as i64) as u32
  }
}

pub fn score_free_text(
  student_answer: &str,
  mark_scheme: &str,
  max_marks: u32,
  question_type: QuestionType,
) -> GradingResult {
  let assessment = KeywordAssessment::new(student_answer, mark_scheme, question_type);
  let marks = assessment.marks(max_marks);
  tracing::debug!(
    "Keyword marking: {}/{} keywords, {} words (min {}), {}/{} marks",
    assessment.keywords_matched,
    assessment.keywords_total,
    assessment.word_count,
    assessment.min_words,
    marks,
    max_marks
  );

  GradingResult {
    awarded_marks: marks,
    feedback: free_text_feedback(marks, max_marks, &assessment),
  }
}

// ============================================================================
// Feedback
// ============================================================================

fn free_text_feedback(marks: u32, max_marks: u32, assessment: &KeywordAssessment) -> String {
  let percentage = if max_marks == 0 {
    0.0
  } else {
    marks as f64 / max_marks as f64 * 100.0
  };
  let short = !assessment.meets_min_length();

  if percentage >= 80.0 {
    let concepts = if assessment.keywords_matched > 0 {
      format!("Key concepts identified: {}.", assessment.keywords_matched)
    } else {
      String::new()
    };
    format!(
      "Excellent answer! ({}/{}) You've demonstrated strong understanding with relevant terminology and well-developed points. {}",
      marks, max_marks, concepts
    )
    .trim_end()
    .to_string()
  } else if percentage >= 60.0 {
    format!(
      "Good answer. ({}/{}) You've shown understanding of the topic. To improve: {}Include more specific examples and ensure all aspects of the question are addressed.",
      marks,
      max_marks,
      if short { "Expand your answer with more detail. " } else { "" }
    )
  } else if percentage >= 40.0 {
    format!(
      "Satisfactory attempt. ({}/{}) Your answer shows some understanding but needs development. {}Review the mark scheme and include key terminology and concepts.",
      marks,
      max_marks,
      if short { "Write more to fully answer the question. " } else { "" }
    )
  } else {
    format!(
      "Your answer needs significant improvement. ({}/{}) {}Review the topic content, understand the key concepts, and try to address all parts of the question. Use the textbook reference material to strengthen your understanding.",
      marks,
      max_marks,
      if short { "Your answer is too brief. " } else { "" }
    )
  }
}
