//! Tutor chat: prompt construction and mini-memory updates.

use crate::config;
use crate::domain::{TutorMemory, WeakTopic};
use crate::llm::CompletionRequest;

fn system_prompt(weak_topics: &[WeakTopic], memory: &TutorMemory) -> String {
  let mut prompt = String::from(
    r#"You are a helpful A-Level tutor for Edexcel Economics, Business and Politics.
Your goal is to help the student UNDERSTAND, not to hand over answers.

Teaching style:
- Short, simple sentences; two or three per reply.
- Explain the idea briefly and give an example when it helps.
- Ask one or two guiding questions.
- Be encouraging.
- Never reveal a full exam answer.
- Use Edexcel terminology."#,
  );

  if !weak_topics.is_empty() {
    let list = weak_topics
      .iter()
      .map(|w| format!("{} - {}", w.topic.topic_code, w.topic.title))
      .collect::<Vec<_>>()
      .join(", ");
    prompt.push_str(&format!("\n\nThe student is weaker in: {}.", list));
  }

  if !memory.is_empty() {
    prompt.push_str("\n\nFrom your last conversation:");
    if let Some(topic) = &memory.last_topic {
      prompt.push_str(&format!("\n- Topic: {}", topic));
    }
    if let Some(confusion) = &memory.last_confusion {
      prompt.push_str(&format!("\n- They asked: {}", confusion));
    }
    if let Some(tip) = &memory.last_tip {
      prompt.push_str(&format!("\n- You suggested: {}", tip));
    }
  }

  prompt
}

fn user_prompt(message: &str, topic_title: Option<&str>) -> String {
  let topic_line = topic_title
    .map(|t| format!("They are studying: {}\n", t))
    .unwrap_or_default();
  format!(
    "{}The student asked: \"{}\"\n\nGive a short explanation and ask 1-2 questions that guide them. Do NOT give the full answer.",
    topic_line,
    message.trim()
  )
}

pub fn build_tutor_request(
  message: &str,
  topic_title: Option<&str>,
  weak_topics: &[WeakTopic],
  memory: &TutorMemory,
) -> CompletionRequest {
  CompletionRequest::new(
    system_prompt(weak_topics, memory),
    user_prompt(message, topic_title),
    config::TUTOR_TEMPERATURE,
  )
}

/// At most `max` characters, cut on a char boundary
pub fn truncate_chars(text: &str, max: usize) -> String {
  text.chars().take(max).collect()
}

/// Text up to and including the first sentence terminator that ends a word
pub fn first_sentence(text: &str) -> String {
  let text = text.trim();
  let mut chars = text.char_indices().peekable();
  while let Some((i, c)) = chars.next() {
    if matches!(c, '.' | '!' | '?') {
      let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
      if at_boundary {
        return text[..i + c.len_utf8()].to_string();
      }
    }
  }
  text.to_string()
}

/// Memory after one exchange. Each field is overwritten; the topic is kept
/// when the request named none.
pub fn next_memory(
  previous: &TutorMemory,
  message: &str,
  topic_title: Option<&str>,
  response: &str,
) -> TutorMemory {
  let max = config::MEMORY_FIELD_MAX_CHARS;
  let tip = first_sentence(response);

  TutorMemory {
    last_topic: topic_title
      .map(|t| truncate_chars(t, max))
      .or_else(|| previous.last_topic.clone()),
    last_confusion: Some(truncate_chars(message.trim(), max)),
    last_tip: if tip.is_empty() { None } else { Some(truncate_chars(&tip, max)) },
    updated_at: None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::TopicSummary;

  fn weak(code: &str, title: &str) -> WeakTopic {
    WeakTopic {
      topic: TopicSummary {
        id: 1,
        topic_code: code.to_string(),
        title: title.to_string(),
      },
      weakness_score: 70,
    }
  }

  #[test]
  fn test_first_sentence() {
    assert_eq!(first_sentence("GDP is output. It grows."), "GDP is output.");
    assert_eq!(first_sentence("  Why? Because."), "Why?");
    assert_eq!(first_sentence("Growth was 2.5 percent. Next."), "Growth was 2.5 percent.");
    assert_eq!(first_sentence("No terminator here"), "No terminator here");
    assert_eq!(first_sentence(""), "");
  }

  #[test]
  fn test_truncate_chars_is_char_safe() {
    assert_eq!(truncate_chars("£££££", 3), "£££");
    assert_eq!(truncate_chars("short", 280), "short");
  }

  #[test]
  fn test_prompt_includes_weak_topics_and_memory() {
    let memory = TutorMemory {
      last_topic: Some("Elasticity".to_string()),
      last_confusion: Some("Why is PED negative?".to_string()),
      last_tip: Some("Look at the direction of change.".to_string()),
      updated_at: None,
    };
    let request = build_tutor_request(
      "What is YED?",
      Some("Income elasticity"),
      &[weak("1.2.3", "PED"), weak("2.1", "GDP")],
      &memory,
    );

    assert_eq!(request.temperature, config::TUTOR_TEMPERATURE);
    let system = request.system_prompt().unwrap();
    assert!(system.contains("weaker in: 1.2.3 - PED, 2.1 - GDP."));
    assert!(system.contains("Why is PED negative?"));
    assert!(system.contains("Never reveal a full exam answer"));
    let user = request.user_prompt().unwrap();
    assert!(user.contains("\"What is YED?\""));
    assert!(user.contains("studying: Income elasticity"));
  }

  #[test]
  fn test_prompt_without_context() {
    let request = build_tutor_request("Hi", None, &[], &TutorMemory::default());
    let system = request.system_prompt().unwrap();
    assert!(!system.contains("weaker in"));
    assert!(!system.contains("last conversation"));
  }

  #[test]
  fn test_next_memory_last_write_wins() {
    let previous = TutorMemory {
      last_topic: Some("Elasticity".to_string()),
      last_confusion: Some("old".to_string()),
      last_tip: Some("old tip.".to_string()),
      updated_at: None,
    };

    let kept_topic = next_memory(&previous, "new question", None, "Think about income. Then price.");
    assert_eq!(kept_topic.last_topic.as_deref(), Some("Elasticity"));
    assert_eq!(kept_topic.last_confusion.as_deref(), Some("new question"));
    assert_eq!(kept_topic.last_tip.as_deref(), Some("Think about income."));

    let new_topic = next_memory(&previous, "q", Some("Monopoly"), "");
    assert_eq!(new_topic.last_topic.as_deref(), Some("Monopoly"));
    assert!(new_topic.last_tip.is_none());
  }

  #[test]
  fn test_next_memory_truncates() {
    let long = "a".repeat(500);
    let memory = next_memory(&TutorMemory::default(), &long, None, &long);
    assert_eq!(memory.last_confusion.unwrap().chars().count(), config::MEMORY_FIELD_MAX_CHARS);
    assert_eq!(memory.last_tip.unwrap().chars().count(), config::MEMORY_FIELD_MAX_CHARS);
  }
}
