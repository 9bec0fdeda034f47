use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Subject {
  pub id: i64,
  pub name: String,
  /// Upper-case short code used in URLs (e.g. "ECON")
  pub code: String,
  pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Topic {
  pub id: i64,
  pub theme_id: i64,
  pub topic_code: String,
  pub title: String,
  pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Theme {
  pub id: i64,
  pub subject_id: i64,
  pub theme_number: i64,
  pub title: String,
  pub topics: Vec<Topic>,
}

/// Topic identity used when listing reviews, progress and weak areas
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicSummary {
  pub id: i64,
  pub topic_code: String,
  pub title: String,
}

/// A topic with the theme and subject it belongs to
#[derive(Debug, Clone, Serialize)]
pub struct TopicContext {
  pub topic: Topic,
  pub theme_title: String,
  pub subject: Subject,
}
