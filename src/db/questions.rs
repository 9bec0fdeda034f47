//! Practice questions

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use super::{parse_timestamp, timestamp};
use crate::domain::{Difficulty, NewQuestion, Question, QuestionType};

const QUESTION_COLUMNS: &str = "id, topic_id, question_text, question_type, difficulty, marks, \
     correct_answer, explanation, mark_scheme, created_at";

fn row_to_question(row: &Row) -> Result<Question> {
    let question_type: String = row.get(3)?;
    let difficulty: String = row.get(4)?;
    let created_at: String = row.get(9)?;
    Ok(Question {
        id: row.get(0)?,
        topic_id: row.get(1)?,
        question_text: row.get(2)?,
        question_type: QuestionType::from_str(&question_type).unwrap_or(QuestionType::ShortAnswer),
        difficulty: Difficulty::from_str(&difficulty).unwrap_or(Difficulty::Medium),
        marks: row.get(5)?,
        correct_answer: row.get(6)?,
        explanation: row.get(7)?,
        mark_scheme: row.get(8)?,
        created_at: parse_timestamp(&created_at),
    })
}

pub fn insert_question(conn: &Connection, topic_id: i64, question: &NewQuestion) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO questions
      (topic_id, question_text, question_type, difficulty, marks, correct_answer, explanation, mark_scheme, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
    "#,
        params![
            topic_id,
            question.question_text,
            question.question_type.as_str(),
            question.difficulty.as_str(),
            question.marks,
            question.correct_answer,
            question.explanation,
            question.mark_scheme,
            timestamp(Utc::now()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert a batch for one topic; all or nothing
pub fn insert_questions(conn: &Connection, topic_id: i64, questions: &[NewQuestion]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    for question in questions {
        insert_question(&tx, topic_id, question)?;
    }
    tx.commit()?;
    Ok(questions.len())
}

pub fn get_question(conn: &Connection, id: i64) -> Result<Option<Question>> {
    conn.query_row(
        &format!("SELECT {} FROM questions WHERE id = ?1", QUESTION_COLUMNS),
        params![id],
        row_to_question,
    )
    .optional()
}

/// Questions for a topic, easy to hard then by id
pub fn get_questions_for_topic(
    conn: &Connection,
    topic_id: i64,
    difficulty: Option<Difficulty>,
) -> Result<Vec<Question>> {
    let sql = format!(
        r#"
    SELECT {}
    FROM questions
    WHERE topic_id = ?1 AND (?2 IS NULL OR difficulty = ?2)
    ORDER BY CASE difficulty WHEN 'easy' THEN 0 WHEN 'medium' THEN 1 WHEN 'hard' THEN 2 ELSE 3 END,
             id ASC
    "#,
        QUESTION_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let questions = stmt
        .query_map(params![topic_id, difficulty.map(|d| d.as_str())], row_to_question)?
        .collect::<Result<Vec<_>>>()?;
    Ok(questions)
}
