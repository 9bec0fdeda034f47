use chrono::{DateTime, Utc};
use serde::Serialize;

/// What the tutor remembers about a student between messages.
/// One record per user; each write replaces the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TutorMemory {
  pub last_topic: Option<String>,
  pub last_confusion: Option<String>,
  pub last_tip: Option<String>,
  pub updated_at: Option<DateTime<Utc>>,
}

impl TutorMemory {
  pub fn is_empty(&self) -> bool {
    self.last_topic.is_none() && self.last_confusion.is_none() && self.last_tip.is_none()
  }
}
