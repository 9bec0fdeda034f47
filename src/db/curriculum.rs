//! Subjects, themes and topics

use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use crate::domain::{Subject, Theme, Topic};

fn row_to_subject(row: &Row) -> Result<Subject> {
    Ok(Subject {
        id: row.get(0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        description: row.get(3)?,
    })
}

fn row_to_topic(row: &Row) -> Result<Topic> {
    Ok(Topic {
        id: row.get(0)?,
        theme_id: row.get(1)?,
        topic_code: row.get(2)?,
        title: row.get(3)?,
        content: row.get(4)?,
    })
}

/// Insert a subject. Codes are stored upper-case.
pub fn insert_subject(conn: &Connection, name: &str, code: &str, description: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO subjects (name, code, description) VALUES (?1, ?2, ?3)",
        params![name, code.trim().to_uppercase(), description],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_theme(conn: &Connection, subject_id: i64, theme_number: i64, title: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO themes (subject_id, theme_number, title) VALUES (?1, ?2, ?3)",
        params![subject_id, theme_number, title],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_topic(
    conn: &Connection,
    theme_id: i64,
    topic_code: &str,
    title: &str,
    content: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO topics (theme_id, topic_code, title, content) VALUES (?1, ?2, ?3, ?4)",
        params![theme_id, topic_code, title, content],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_subjects(conn: &Connection) -> Result<Vec<Subject>> {
    let mut stmt =
        conn.prepare("SELECT id, name, code, description FROM subjects ORDER BY name ASC, id ASC")?;
    let subjects = stmt
        .query_map([], row_to_subject)?
        .collect::<Result<Vec<_>>>()?;
    Ok(subjects)
}

pub fn get_subject(conn: &Connection, id: i64) -> Result<Option<Subject>> {
    conn.query_row(
        "SELECT id, name, code, description FROM subjects WHERE id = ?1",
        params![id],
        row_to_subject,
    )
    .optional()
}

/// Case-insensitive lookup by subject code
pub fn get_subject_by_code(conn: &Connection, code: &str) -> Result<Option<Subject>> {
    conn.query_row(
        "SELECT id, name, code, description FROM subjects WHERE code = ?1",
        params![code.trim().to_uppercase()],
        row_to_subject,
    )
    .optional()
}

/// Theme without its topics
pub fn get_theme(conn: &Connection, id: i64) -> Result<Option<Theme>> {
    conn.query_row(
        "SELECT id, subject_id, theme_number, title FROM themes WHERE id = ?1",
        params![id],
        |row| {
            Ok(Theme {
                id: row.get(0)?,
                subject_id: row.get(1)?,
                theme_number: row.get(2)?,
                title: row.get(3)?,
                topics: Vec::new(),
            })
        },
    )
    .optional()
}

/// Themes of a subject by theme number, each with topics by topic code
pub fn get_themes_with_topics(conn: &Connection, subject_id: i64) -> Result<Vec<Theme>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, subject_id, theme_number, title
    FROM themes
    WHERE subject_id = ?1
    ORDER BY theme_number ASC, id ASC
    "#,
    )?;
    let mut themes = stmt
        .query_map(params![subject_id], |row| {
            Ok(Theme {
                id: row.get(0)?,
                subject_id: row.get(1)?,
                theme_number: row.get(2)?,
                title: row.get(3)?,
                topics: Vec::new(),
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    let mut topic_stmt = conn.prepare(
        r#"
    SELECT id, theme_id, topic_code, title, content
    FROM topics
    WHERE theme_id = ?1
    ORDER BY topic_code ASC, id ASC
    "#,
    )?;
    for theme in &mut themes {
        theme.topics = topic_stmt
            .query_map(params![theme.id], row_to_topic)?
            .collect::<Result<Vec<_>>>()?;
    }

    Ok(themes)
}

pub fn get_topic(conn: &Connection, id: i64) -> Result<Option<Topic>> {
    conn.query_row(
        "SELECT id, theme_id, topic_code, title, content FROM topics WHERE id = ?1",
        params![id],
        row_to_topic,
    )
    .optional()
}
