use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub struct Database {
    conn: Mutex<Connection>,
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub id: i64,
    pub email: String,
    pub video_url: String,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let created_at_str: String = row.get(3)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|_| rusqlite::Error::InvalidColumnType(3, "TEXT".to_string(), rusqlite::types::Type::Text))?
            .with_timezone(&Utc);

        Ok(Submission {
            id: row.get(0)?,
            email: row.get(1)?,
            video_url: row.get(2)?,
            created_at,
        })
    }
}

impl Database {
    pub fn new(db_path: &Path) -> Result<Self> {
        Self::from_connection(Connection::open(db_path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Database {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS story_submissions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL,
                video_url TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_story_submissions_created_at
                ON story_submissions(created_at)",
            [],
        )?;
        Ok(())
    }

    /// `created_at` is the interview start time, not the insert time.
    pub fn insert_submission(
        &self,
        email: &str,
        video_url: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO story_submissions (email, video_url, created_at) VALUES (?1, ?2, ?3)",
            params![email, video_url, created_at.to_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_submission(&self, id: i64) -> Result<Option<Submission>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, email, video_url, created_at FROM story_submissions WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], |row| Submission::from_row(row))?;

        match rows.next() {
            Some(Ok(submission)) => Ok(Some(submission)),
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    pub fn list_submissions(&self) -> Result<Vec<Submission>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, email, video_url, created_at FROM story_submissions ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], |row| Submission::from_row(row))?;

        let mut submissions = Vec::new();
        for row in rows {
            submissions.push(row?);
        }
        Ok(submissions)
    }

    /// Returns whether a row was removed.
    pub fn delete_submission(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM story_submissions WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }
}
