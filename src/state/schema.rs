//! Database schema definitions and migrations.

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Full DDL for the advisor database.
pub const CREATE_SCHEMA: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

-- Career catalog used as retrieval context
CREATE TABLE IF NOT EXISTS careers (
    id                      TEXT PRIMARY KEY,
    title                   TEXT NOT NULL,
    description             TEXT NOT NULL DEFAULT '',
    required_skills_json    TEXT NOT NULL DEFAULT '[]',
    timeline                TEXT NOT NULL DEFAULT '',
    salary_range            TEXT NOT NULL DEFAULT '',
    job_growth              TEXT NOT NULL DEFAULT '',
    common_transitions_json TEXT NOT NULL DEFAULT '[]',
    added_at                TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Advice request history
CREATE TABLE IF NOT EXISTS queries (
    id                TEXT PRIMARY KEY,
    question          TEXT NOT NULL,
    status            TEXT NOT NULL,
    answer            TEXT,
    rounds            INTEGER NOT NULL DEFAULT 0,
    careers_used_json TEXT NOT NULL DEFAULT '[]',
    created_at        TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_careers_title ON careers(title);
CREATE INDEX IF NOT EXISTS idx_queries_created ON queries(created_at);
"#;
