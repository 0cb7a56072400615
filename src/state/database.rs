//! SQLite database wrapper with WAL mode and migration support.

use crate::state::schema;
use crate::types::*;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::info;

/// The advisor database: career catalog and query history.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).context("Failed to open SQLite database")?;

        // Enable WAL mode for better concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Run schema creation and migrations.
    fn migrate(&mut self) -> Result<()> {
        let version = self.schema_version();

        if version == 0 {
            info!("Creating database schema v{}", schema::SCHEMA_VERSION);
            self.conn
                .execute_batch(schema::CREATE_SCHEMA)
                .context("Failed to create schema")?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::SCHEMA_VERSION],
            )?;
        } else if version > schema::SCHEMA_VERSION {
            anyhow::bail!(
                "Database schema v{} is newer than supported v{}",
                version,
                schema::SCHEMA_VERSION
            );
        }

        Ok(())
    }

    /// Get the current schema version (0 if uninitialized).
    fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    // -----------------------------------------------------------------------
    // Careers
    // -----------------------------------------------------------------------

    /// Insert a career unless one with the same id exists. Returns whether it was inserted.
    pub fn insert_career(&self, career: &CareerRecord) -> Result<bool> {
        let skills_json = serde_json::to_string(&career.required_skills)?;
        let transitions_json = serde_json::to_string(&career.common_transitions)?;

        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO careers
                (id, title, description, required_skills_json, timeline, salary_range,
                 job_growth, common_transitions_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                career.id,
                career.title,
                career.description,
                skills_json,
                career.timeline,
                career.salary_range,
                career.growth_outlook,
                transitions_json,
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn get_career(&self, id: &str) -> Result<Option<CareerRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, required_skills_json, timeline, salary_range,
                    job_growth, common_transitions_json
             FROM careers WHERE id = ?1",
        )?;
        let career = stmt.query_row(params![id], career_from_row).optional()?;
        Ok(career)
    }

    /// All careers, ordered by title.
    pub fn all_careers(&self) -> Result<Vec<CareerRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, required_skills_json, timeline, salary_range,
                    job_growth, common_transitions_json
             FROM careers ORDER BY title, id",
        )?;
        let rows = stmt.query_map([], career_from_row)?;
        let mut careers = Vec::new();
        for row in rows {
            careers.push(row?);
        }
        Ok(careers)
    }

    pub fn career_count(&self) -> Result<u64> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM careers", [], |row| row.get(0))?;
        Ok(count)
    }

    // -----------------------------------------------------------------------
    // Query history
    // -----------------------------------------------------------------------

    /// Persist an advice request.
    pub fn save_query(&self, query: &QueryRecord) -> Result<()> {
        let careers_json = serde_json::to_string(&query.careers_used)?;

        self.conn.execute(
            "INSERT INTO queries (id, question, status, answer, rounds, careers_used_json, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                query.id,
                query.question,
                query.status.to_string(),
                query.answer,
                query.rounds,
                careers_json,
                query.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Most recent queries first.
    pub fn recent_queries(&self, limit: usize) -> Result<Vec<QueryRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, question, status, answer, rounds, careers_used_json, created_at
             FROM queries ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], query_from_row)?;
        let mut queries = Vec::new();
        for row in rows {
            queries.push(row?);
        }
        Ok(queries)
    }

    pub fn query_count(&self) -> Result<u64> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM queries", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn json_column<T: serde::de::DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn career_from_row(row: &Row) -> rusqlite::Result<CareerRecord> {
    Ok(CareerRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        required_skills: json_column(row, 3)?,
        timeline: row.get(4)?,
        salary_range: row.get(5)?,
        growth_outlook: row.get(6)?,
        common_transitions: json_column(row, 7)?,
    })
}

fn query_from_row(row: &Row) -> rusqlite::Result<QueryRecord> {
    let status: String = row.get(2)?;
    let created_at: String = row.get(6)?;
    Ok(QueryRecord {
        id: row.get(0)?,
        question: row.get(1)?,
        status: status.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, e.into())
        })?,
        answer: row.get(3)?,
        rounds: row.get(4)?,
        careers_used: json_column(row, 5)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
            })?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn career(id: &str, title: &str) -> CareerRecord {
        CareerRecord {
            id: id.into(),
            title: title.into(),
            description: "desc".into(),
            required_skills: vec!["Python".into(), "SQL".into()],
            common_transitions: vec!["Software Engineer".into()],
            ..CareerRecord::default()
        }
    }

    fn query(id: &str, at: DateTime<Utc>, status: AdviceStatus) -> QueryRecord {
        QueryRecord {
            id: id.into(),
            question: format!("question {id}"),
            status,
            answer: (status == AdviceStatus::Done).then(|| "answer".to_string()),
            rounds: 2,
            careers_used: vec!["Data Scientist".into()],
            created_at: at,
        }
    }

    #[test]
    fn career_insert_is_idempotent_per_id() {
        let db = Database::open_memory().unwrap();
        assert!(db.insert_career(&career("ds", "Data Scientist")).unwrap());
        assert!(!db.insert_career(&career("ds", "Other Title")).unwrap());
        assert_eq!(db.career_count().unwrap(), 1);
        assert_eq!(db.get_career("ds").unwrap().unwrap().title, "Data Scientist");
    }

    #[test]
    fn career_fields_round_trip() {
        let db = Database::open_memory().unwrap();
        let original = career("mle", "ML Engineer");
        db.insert_career(&original).unwrap();
        assert_eq!(db.get_career("mle").unwrap(), Some(original));
        assert_eq!(db.get_career("missing").unwrap(), None);
    }

    #[test]
    fn careers_listed_by_title() {
        let db = Database::open_memory().unwrap();
        db.insert_career(&career("b", "ML Engineer")).unwrap();
        db.insert_career(&career("a", "Data Scientist")).unwrap();
        let titles: Vec<String> = db
            .all_careers()
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["Data Scientist", "ML Engineer"]);
    }

    #[test]
    fn recent_queries_newest_first() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.save_query(&query("old", now - Duration::minutes(5), AdviceStatus::Done))
            .unwrap();
        db.save_query(&query("new", now, AdviceStatus::Exhausted))
            .unwrap();

        let recent = db.recent_queries(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, "new");
        assert_eq!(recent[0].status, AdviceStatus::Exhausted);
        assert!(recent[0].answer.is_none());
        assert_eq!(recent[1].careers_used, vec!["Data Scientist"]);
        assert_eq!(db.query_count().unwrap(), 2);
        assert_eq!(db.recent_queries(1).unwrap().len(), 1);
    }

    #[test]
    fn reopening_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("advisor.db");
        {
            let db = Database::open(&path).unwrap();
            db.insert_career(&career("ds", "Data Scientist")).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.career_count().unwrap(), 1);
    }
}
