//! Answers, per-topic progress and weak topics

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result, Row};

use super::{parse_timestamp, timestamp};
use crate::domain::{AnswerRecord, MasteryLevel, TopicProgress, TopicSummary, WeakTopic};

pub fn insert_answer(
    conn: &Connection,
    user_id: i64,
    question_id: i64,
    answer_text: &str,
    marks_awarded: u32,
    feedback: &str,
    answered_at: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO user_answers (user_id, question_id, answer_text, marks_awarded, feedback, answered_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
        params![
            user_id,
            question_id,
            answer_text,
            marks_awarded,
            feedback,
            timestamp(answered_at)
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// The user's answers to questions in a topic, newest first
pub fn get_answers_for_topic(conn: &Connection, user_id: i64, topic_id: i64) -> Result<Vec<AnswerRecord>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT a.id, a.question_id, a.answer_text, a.marks_awarded, a.feedback, a.answered_at
    FROM user_answers a
    JOIN questions q ON q.id = a.question_id
    WHERE a.user_id = ?1 AND q.topic_id = ?2
    ORDER BY a.answered_at DESC, a.id DESC
    "#,
    )?;
    let answers = stmt
        .query_map(params![user_id, topic_id], |row| {
            let answered_at: String = row.get(5)?;
            Ok(AnswerRecord {
                id: row.get(0)?,
                question_id: row.get(1)?,
                answer_text: row.get(2)?,
                marks_awarded: row.get(3)?,
                feedback: row.get(4)?,
                answered_at: parse_timestamp(&answered_at),
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(answers)
}

pub fn count_answers(conn: &Connection, user_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM user_answers WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )
}

/// Record the latest result for a topic, replacing the previous one
pub fn upsert_progress(
    conn: &Connection,
    user_id: i64,
    topic_id: i64,
    completion_percentage: i64,
    mastery_level: MasteryLevel,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        r#"
    INSERT INTO user_progress (user_id, topic_id, completion_percentage, mastery_level, last_accessed)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(user_id, topic_id) DO UPDATE SET
      completion_percentage = excluded.completion_percentage,
      mastery_level = excluded.mastery_level,
      last_accessed = excluded.last_accessed
    "#,
        params![
            user_id,
            topic_id,
            completion_percentage,
            mastery_level.as_str(),
            timestamp(now)
        ],
    )?;
    Ok(())
}

const PROGRESS_SELECT: &str = r#"
    SELECT p.topic_id, t.topic_code, t.title, p.mastery_level, p.completion_percentage,
           (SELECT COUNT(DISTINCT a.question_id)
              FROM user_answers a JOIN questions q ON q.id = a.question_id
              WHERE a.user_id = p.user_id AND q.topic_id = p.topic_id),
           p.last_accessed
    FROM user_progress p
    JOIN topics t ON t.id = p.topic_id
"#;

fn row_to_progress(row: &Row) -> Result<TopicProgress> {
    let mastery: String = row.get(3)?;
    let last_accessed: String = row.get(6)?;
    Ok(TopicProgress {
        topic: TopicSummary {
            id: row.get(0)?,
            topic_code: row.get(1)?,
            title: row.get(2)?,
        },
        mastery_level: MasteryLevel::from_str(&mastery).unwrap_or(MasteryLevel::Learning),
        completion_percentage: row.get(4)?,
        questions_answered: row.get(5)?,
        last_accessed: parse_timestamp(&last_accessed),
    })
}

/// Most recently accessed topics first
pub fn get_recent_progress(conn: &Connection, user_id: i64, limit: usize) -> Result<Vec<TopicProgress>> {
    let sql = format!(
        "{} WHERE p.user_id = ?1 ORDER BY p.last_accessed DESC, p.id DESC LIMIT ?2",
        PROGRESS_SELECT
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![user_id, limit as i64], row_to_progress)?
        .collect::<Result<Vec<_>>>()?;
    Ok(rows)
}

/// Progress rows for every topic of a subject the user has attempted
pub fn get_progress_for_subject(
    conn: &Connection,
    user_id: i64,
    subject_id: i64,
) -> Result<Vec<TopicProgress>> {
    let sql = format!(
        "{} JOIN themes th ON th.id = t.theme_id \
         WHERE p.user_id = ?1 AND th.subject_id = ?2 ORDER BY t.topic_code ASC",
        PROGRESS_SELECT
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![user_id, subject_id], row_to_progress)?
        .collect::<Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn count_mastered_topics(conn: &Connection, user_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM user_progress WHERE user_id = ?1 AND mastery_level = ?2",
        params![user_id, MasteryLevel::Mastered.as_str()],
        |row| row.get(0),
    )
}

pub fn upsert_weak_topic(
    conn: &Connection,
    user_id: i64,
    topic_id: i64,
    weakness_score: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        r#"
    INSERT INTO user_weak_topics (user_id, topic_id, weakness_score, last_updated)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(user_id, topic_id) DO UPDATE SET
      weakness_score = excluded.weakness_score,
      last_updated = excluded.last_updated
    "#,
        params![user_id, topic_id, weakness_score, timestamp(now)],
    )?;
    Ok(())
}

/// Weakest topics first
pub fn get_weak_topics(conn: &Connection, user_id: i64, limit: usize) -> Result<Vec<WeakTopic>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT w.topic_id, t.topic_code, t.title, w.weakness_score
    FROM user_weak_topics w
    JOIN topics t ON t.id = w.topic_id
    WHERE w.user_id = ?1
    ORDER BY w.weakness_score DESC, w.last_updated DESC
    LIMIT ?2
    "#,
    )?;
    let topics = stmt
        .query_map(params![user_id, limit as i64], |row| {
            Ok(WeakTopic {
                topic: TopicSummary {
                    id: row.get(0)?,
                    topic_code: row.get(1)?,
                    title: row.get(2)?,
                },
                weakness_score: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(topics)
}
