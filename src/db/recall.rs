//! Active recall queue (one row per user and question)

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use super::{parse_timestamp, timestamp};
use crate::domain::{
    Difficulty, DueReview, QuestionSummary, QuestionType, ReviewQueueEntry, TopicSummary,
};
use crate::srs;

const ENTRY_COLUMNS: &str = "r.id, r.user_id, r.question_id, r.topic_id, r.last_attempted_at, \
     r.next_review_at, r.review_count, r.confidence_level";

fn row_to_entry(row: &Row) -> Result<ReviewQueueEntry> {
    let last_attempted_at: String = row.get(4)?;
    let next_review_at: String = row.get(5)?;
    Ok(ReviewQueueEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        question_id: row.get(2)?,
        topic_id: row.get(3)?,
        last_attempted_at: parse_timestamp(&last_attempted_at),
        next_review_at: parse_timestamp(&next_review_at),
        review_count: row.get(6)?,
        confidence_level: row.get(7)?,
    })
}

pub fn get_queue_entry(
    conn: &Connection,
    user_id: i64,
    question_id: i64,
) -> Result<Option<ReviewQueueEntry>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM active_recall_queue r WHERE r.user_id = ?1 AND r.question_id = ?2",
            ENTRY_COLUMNS
        ),
        params![user_id, question_id],
        row_to_entry,
    )
    .optional()
}

/// Record a graded attempt and reschedule the question.
///
/// A first attempt is scheduled from review count 0 and stored with count 1.
/// Later attempts are scheduled from, and store, the incremented count, and
/// keep the topic recorded on the first attempt.
pub fn record_attempt(
    conn: &Connection,
    user_id: i64,
    question_id: i64,
    topic_id: i64,
    confidence_level: i64,
    now: DateTime<Utc>,
) -> Result<ReviewQueueEntry> {
    match get_queue_entry(conn, user_id, question_id)? {
        Some(existing) => {
            let review_count = existing.review_count + 1;
            let next_review_at = srs::compute_next_review_at(review_count, confidence_level, now);
            conn.execute(
                r#"
        UPDATE active_recall_queue
        SET last_attempted_at = ?1, next_review_at = ?2,
            review_count = ?3, confidence_level = ?4
        WHERE id = ?5
        "#,
                params![
                    timestamp(now),
                    timestamp(next_review_at),
                    review_count,
                    confidence_level,
                    existing.id,
                ],
            )?;
            Ok(ReviewQueueEntry {
                last_attempted_at: now,
                next_review_at,
                review_count,
                confidence_level,
                ..existing
            })
        }
        None => {
            let next_review_at = srs::compute_next_review_at(0, confidence_level, now);
            conn.execute(
                r#"
        INSERT INTO active_recall_queue
          (user_id, question_id, topic_id, last_attempted_at, next_review_at, review_count, confidence_level)
        VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)
        "#,
                params![
                    user_id,
                    question_id,
                    topic_id,
                    timestamp(now),
                    timestamp(next_review_at),
                    confidence_level,
                ],
            )?;
            Ok(ReviewQueueEntry {
                id: conn.last_insert_rowid(),
                user_id,
                question_id,
                topic_id,
                last_attempted_at: now,
                next_review_at,
                review_count: 1,
                confidence_level,
            })
        }
    }
}

/// Entries due at `now`, soonest first, with their question and topic.
/// `limit` of None returns every due entry.
pub fn get_due_reviews(
    conn: &Connection,
    user_id: i64,
    topic_id: Option<i64>,
    now: DateTime<Utc>,
    limit: Option<usize>,
) -> Result<Vec<DueReview>> {
    let sql = format!(
        r#"
    SELECT {},
           q.question_text, q.question_type, q.difficulty, q.marks,
           t.topic_code, t.title
    FROM active_recall_queue r
    JOIN questions q ON q.id = r.question_id
    JOIN topics t ON t.id = r.topic_id
    WHERE r.user_id = ?1
      AND r.next_review_at <= ?2
      AND (?3 IS NULL OR r.topic_id = ?3)
    ORDER BY r.next_review_at ASC, r.id ASC
    LIMIT ?4
    "#,
        ENTRY_COLUMNS
    );

    // SQLite treats a negative LIMIT as unbounded
    let limit = limit.map(|l| l as i64).unwrap_or(-1);

    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map(params![user_id, timestamp(now), topic_id, limit], |row| {
            let entry = row_to_entry(row)?;
            let question_type: String = row.get(9)?;
            let difficulty: String = row.get(10)?;
            let question = QuestionSummary {
                id: entry.question_id,
                question_text: row.get(8)?,
                question_type: QuestionType::from_str(&question_type)
                    .unwrap_or(QuestionType::ShortAnswer),
                difficulty: Difficulty::from_str(&difficulty).unwrap_or(Difficulty::Medium),
                marks: row.get(11)?,
            };
            let topic = TopicSummary {
                id: entry.topic_id,
                topic_code: row.get(12)?,
                title: row.get(13)?,
            };
            Ok(DueReview {
                entry,
                question,
                topic,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(items)
}

pub fn count_due_reviews(conn: &Connection, user_id: i64, now: DateTime<Utc>) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM active_recall_queue WHERE user_id = ?1 AND next_review_at <= ?2",
        params![user_id, timestamp(now)],
        |row| row.get(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;
    use chrono::Duration;

    #[test]
    fn test_first_attempt_creates_entry() {
        let env = TestEnv::new();
        let conn = env.conn();
        let now = Utc::now();

        let entry =
            record_attempt(&conn, env.user_id, env.mc_question_id, env.topic_id, 90, now).unwrap();
        assert_eq!(entry.review_count, 1);
        assert_eq!(entry.confidence_level, 90);
        assert_eq!(entry.next_review_at - now, Duration::days(1));

        let stored = get_queue_entry(&conn, env.user_id, env.mc_question_id)
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, entry.id);
        assert_eq!(stored.review_count, 1);
    }

    #[test]
    fn test_repeat_attempt_increments_count() {
        let env = TestEnv::new();
        let conn = env.conn();
        let now = Utc::now();

        record_attempt(&conn, env.user_id, env.mc_question_id, env.topic_id, 90, now).unwrap();
        let second =
            record_attempt(&conn, env.user_id, env.mc_question_id, env.topic_id, 90, now).unwrap();
        // count 2 on the high-confidence ladder is 7 days
        assert_eq!(second.review_count, 2);
        assert_eq!(second.next_review_at - now, Duration::days(7));

        let third =
            record_attempt(&conn, env.user_id, env.mc_question_id, env.topic_id, 20, now).unwrap();
        // count 3 on the low-confidence ladder is 3 days
        assert_eq!(third.review_count, 3);
        assert_eq!(third.confidence_level, 20);
        assert_eq!(third.next_review_at - now, Duration::days(3));

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM active_recall_queue", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_repeat_attempt_keeps_first_topic() {
        let env = TestEnv::new();
        let conn = env.conn();
        let now = Utc::now();

        record_attempt(&conn, env.user_id, env.mc_question_id, env.topic_id, 60, now).unwrap();
        let second = record_attempt(
            &conn,
            env.user_id,
            env.mc_question_id,
            env.other_topic_id,
            60,
            now,
        )
        .unwrap();
        assert_eq!(second.topic_id, env.topic_id);

        let stored = get_queue_entry(&conn, env.user_id, env.mc_question_id)
            .unwrap()
            .unwrap();
        assert_eq!(stored.topic_id, env.topic_id);
        assert_eq!(stored.review_count, 2);
    }

    #[test]
    fn test_due_reviews_ordered_and_filtered() {
        let env = TestEnv::new();
        let conn = env.conn();
        let past = Utc::now() - Duration::days(10);

        // Scheduled 1 day after `past`, so both are due now
        record_attempt(&conn, env.user_id, env.calc_question_id, env.topic_id, 10, past).unwrap();
        record_attempt(
            &conn,
            env.user_id,
            env.other_topic_question_id,
            env.other_topic_id,
            10,
            past - Duration::days(1),
        )
        .unwrap();
        // Not due yet
        record_attempt(&conn, env.user_id, env.mc_question_id, env.topic_id, 10, Utc::now())
            .unwrap();

        let now = Utc::now();
        let due = get_due_reviews(&conn, env.user_id, None, now, None).unwrap();
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].entry.question_id, env.other_topic_question_id);
        assert_eq!(due[1].entry.question_id, env.calc_question_id);
        assert_eq!(due[1].question.question_type, QuestionType::Calculation);
        assert_eq!(due[1].topic.id, env.topic_id);

        let filtered = get_due_reviews(&conn, env.user_id, Some(env.topic_id), now, None).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].entry.question_id, env.calc_question_id);

        let limited = get_due_reviews(&conn, env.user_id, None, now, Some(1)).unwrap();
        assert_eq!(limited.len(), 1);

        assert_eq!(count_due_reviews(&conn, env.user_id, now).unwrap(), 2);
    }

    #[test]
    fn test_due_reviews_scoped_to_user() {
        let env = TestEnv::new();
        let conn = env.conn();
        let past = Utc::now() - Duration::days(5);
        record_attempt(&conn, env.user_id, env.mc_question_id, env.topic_id, 50, past).unwrap();

        let other_user = crate::auth::db::create_user(&conn, "someone_else", None).unwrap();
        let due = get_due_reviews(&conn, other_user, None, Utc::now(), None).unwrap();
        assert!(due.is_empty());
    }
}
