//! Practice question generation through the completion service.
//!
//! The model is asked for strict JSON `{"questions": [...]}`. Replies wrapped
//! in markdown code fences are accepted. Individual rows that cannot be used
//! (blank text, unknown type or difficulty, no positive mark) are skipped
//! rather than failing the whole batch.

use serde::Deserialize;
use thiserror::Error;

use crate::config;
use crate::domain::{Difficulty, NewQuestion, QuestionType, TopicContext};
use crate::llm::CompletionRequest;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Model did not return valid JSON.")]
    InvalidJson {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Model JSON missing 'questions' array.")]
    MissingQuestions { raw: serde_json::Value },
}

/// One row as the model wrote it; every field is optional until validated
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GeneratedQuestion {
    question_text: Option<String>,
    question_type: Option<String>,
    difficulty: Option<String>,
    marks: Option<serde_json::Value>,
    correct_answer: Option<String>,
    explanation: Option<String>,
    mark_scheme: Option<String>,
}

/// Validated rows plus how many were dropped
#[derive(Debug, Default)]
pub struct GeneratedBatch {
    pub questions: Vec<NewQuestion>,
    pub skipped: usize,
}

fn system_prompt(subject_name: &str, force_type: Option<QuestionType>) -> String {
    let type_rule = match force_type {
        Some(qt) => format!(
            "- Every question MUST have question_type \"{}\". Do not use any other type.",
            qt.as_str()
        ),
        None => "- Use a mix of question types: multiple_choice, short_answer, calculation (where the topic \
                 has quantitative content) and essay (analyse/evaluate style)."
            .to_string(),
    };

    format!(
        r#"You are an assessment designer for Edexcel A-Level {subject}.
You write accurate, original exam-style questions for the topic described by the user.

Rules:
- Follow Edexcel style and command words.
- Content must be factually correct and appropriate to the exam board syllabus.
{type_rule}
- Difficulty is one of "easy", "medium", "hard".
- Give realistic maximum marks, typically 1 to 12.
- multiple_choice: put the options in question_text and the correct option letter (A/B/C/D) in correct_answer.
- calculation: put the numerical answer first in correct_answer, then the unit or brief working.
- essay: leave correct_answer empty; give a strong outline in explanation and mark_scheme.
- mark_scheme should quote the key terms a good answer must use.

Return STRICT JSON ONLY. No markdown, no commentary, no backticks.

{{
  "questions": [
    {{
      "question_text": "...",
      "question_type": "multiple_choice" | "short_answer" | "calculation" | "essay",
      "difficulty": "easy" | "medium" | "hard",
      "marks": number,
      "correct_answer": "...",
      "explanation": "...",
      "mark_scheme": "..."
    }}
  ]
}}"#,
        subject = subject_name,
        type_rule = type_rule,
    )
}

fn user_prompt(context: &TopicContext, count: u32) -> String {
    format!(
        r#"Subject: {subject} ({code})
Theme: {theme}
Topic: {topic}
Topic content:
{content}

Generate {count} high-quality questions for this topic across a range of difficulties.

Important:
- Every question must be about THIS topic.
- Do not reproduce real past paper questions; make them original but realistic.
- Check that all subject content is correct."#,
        subject = context.subject.name,
        code = context.subject.code,
        theme = context.theme_title,
        topic = context.topic.title,
        content = context.topic.content,
        count = count,
    )
}

/// Completion request asking for `count` questions on a topic
pub fn build_generation_request(
    context: &TopicContext,
    count: u32,
    force_type: Option<QuestionType>,
) -> CompletionRequest {
    CompletionRequest::new(
        system_prompt(&context.subject.name, force_type),
        user_prompt(context, count),
        config::GENERATION_TEMPERATURE,
    )
    .with_max_tokens(config::GENERATION_MAX_TOKENS)
}

/// Remove a surrounding ```json ... ``` fence if present
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Accept marks as a JSON number or a numeric string
fn parse_marks(value: Option<&serde_json::Value>) -> Option<u32> {
    let marks = match value? {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    let marks = marks.round();
    if marks >= 1.0 && marks <= u32::MAX as f64 {
        Some(marks as u32)
    } else {
        None
    }
}

fn validate_row(row: GeneratedQuestion, force_type: Option<QuestionType>) -> Option<NewQuestion> {
    let question_text = row.question_text.as_deref().map(str::trim).unwrap_or("");
    if question_text.is_empty() {
        return None;
    }
    let question_type = QuestionType::from_str(row.question_type.as_deref()?)?;
    if force_type.is_some_and(|forced| forced != question_type) {
        return None;
    }
    let difficulty = Difficulty::from_str(row.difficulty.as_deref()?.trim())?;
    let marks = parse_marks(row.marks.as_ref())?;

    Some(NewQuestion {
        question_text: question_text.to_string(),
        question_type,
        difficulty,
        marks,
        correct_answer: row.correct_answer.unwrap_or_default(),
        explanation: row.explanation.unwrap_or_default(),
        mark_scheme: row.mark_scheme.unwrap_or_default(),
    })
}

/// Parse model output into insertable questions
pub fn parse_generated_questions(
    raw: &str,
    force_type: Option<QuestionType>,
) -> Result<GeneratedBatch, GenerationError> {
    let value: serde_json::Value =
        serde_json::from_str(strip_code_fences(raw)).map_err(|source| GenerationError::InvalidJson {
            raw: raw.to_string(),
            source,
        })?;

    let Some(rows) = value.get("questions").and_then(|q| q.as_array()) else {
        return Err(GenerationError::MissingQuestions { raw: value });
    };

    let mut batch = GeneratedBatch::default();
    for (index, row) in rows.iter().enumerate() {
        let parsed = serde_json::from_value::<GeneratedQuestion>(row.clone())
            .ok()
            .and_then(|row| validate_row(row, force_type));
        match parsed {
            Some(question) => batch.questions.push(question),
            None => {
                tracing::warn!("Skipping generated question {}: {}", index, row);
                batch.skipped += 1;
            }
        }
    }

    Ok(batch)
}
