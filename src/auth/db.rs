//! User and session table access.
//!
//! Sessions are issued by the login service that shares this database; the
//! API only resolves them. The write helpers exist for that service and for
//! tests.

use chrono::{Duration, Utc};
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::db::timestamp;

pub const SESSION_DURATION_HOURS: i64 = 24 * 7;

pub fn create_user(conn: &Connection, username: &str, display_name: Option<&str>) -> Result<i64> {
    conn.execute(
        "INSERT INTO users (username, display_name, created_at) VALUES (?1, ?2, ?3)",
        params![username, display_name, timestamp(Utc::now())],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM users WHERE username = ?1",
        params![username],
        |row| row.get(0),
    )
    .optional()
}

/// Random 32-character lowercase alphanumeric token
pub fn generate_session_id() -> String {
    let mut rng = rand::rng();
    (0..32)
        .map(|_| {
            let idx = rng.random_range(0..36u8);
            if idx < 10 {
                (b'0' + idx) as char
            } else {
                (b'a' + idx - 10) as char
            }
        })
        .collect()
}

/// Open a session for a user and return its token
pub fn create_session(conn: &Connection, user_id: i64, duration_hours: i64) -> Result<String> {
    let session_id = generate_session_id();
    let now = Utc::now();
    let expires = now + Duration::hours(duration_hours);
    conn.execute(
        "INSERT INTO sessions (id, user_id, created_at, expires_at, last_access_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            session_id,
            user_id,
            timestamp(now),
            timestamp(expires),
            timestamp(now)
        ],
    )?;
    Ok(session_id)
}

/// Resolve an unexpired session to (user_id, username)
pub fn get_session_user(conn: &Connection, session_id: &str) -> Result<Option<(i64, String)>> {
    let now = timestamp(Utc::now());
    let user = conn
        .query_row(
            r#"
        SELECT u.id, u.username
        FROM sessions s
        JOIN users u ON s.user_id = u.id
        WHERE s.id = ?1 AND s.expires_at > ?2
    "#,
            params![session_id, now],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    if user.is_some() {
        // Update last access time
        let _ = conn.execute(
            "UPDATE sessions SET last_access_at = ?1 WHERE id = ?2",
            params![now, session_id],
        );
    }
    Ok(user)
}

pub fn delete_session(conn: &Connection, session_id: &str) -> Result<()> {
    conn.execute("DELETE FROM sessions WHERE id = ?1", params![session_id])?;
    Ok(())
}

pub fn cleanup_expired_sessions(conn: &Connection) -> Result<usize> {
    let now = timestamp(Utc::now());
    let count = conn.execute("DELETE FROM sessions WHERE expires_at < ?1", params![now])?;
    Ok(count)
}
