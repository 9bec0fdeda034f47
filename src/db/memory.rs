//! Tutor mini-memory, one row per user, last write wins

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

use super::{parse_timestamp, timestamp};
use crate::domain::TutorMemory;

/// Stored memory, or an empty one if the user has never talked to the tutor
pub fn get_tutor_memory(conn: &Connection, user_id: i64) -> Result<TutorMemory> {
    let memory = conn
        .query_row(
            "SELECT last_topic, last_confusion, last_tip, updated_at FROM tutor_memory WHERE user_id = ?1",
            params![user_id],
            |row| {
                let updated_at: String = row.get(3)?;
                Ok(TutorMemory {
                    last_topic: row.get(0)?,
                    last_confusion: row.get(1)?,
                    last_tip: row.get(2)?,
                    updated_at: Some(parse_timestamp(&updated_at)),
                })
            },
        )
        .optional()?;
    Ok(memory.unwrap_or_default())
}

pub fn save_tutor_memory(
    conn: &Connection,
    user_id: i64,
    memory: &TutorMemory,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        r#"
    INSERT INTO tutor_memory (user_id, last_topic, last_confusion, last_tip, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(user_id) DO UPDATE SET
      last_topic = excluded.last_topic,
      last_confusion = excluded.last_confusion,
      last_tip = excluded.last_tip,
      updated_at = excluded.updated_at
    "#,
        params![
            user_id,
            memory.last_topic,
            memory.last_confusion,
            memory.last_tip,
            timestamp(now)
        ],
    )?;
    Ok(())
}
