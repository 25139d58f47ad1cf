use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;

pub const CURRENT_SCHEMA: &str = r#"
PRAGMA foreign_keys = 1;

CREATE TABLE IF NOT EXISTS courses (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    icon TEXT NOT NULL DEFAULT 'default-icon.jpg' CHECK (icon <> '')
);

CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY,
    course_id INTEGER NOT NULL,
    type TEXT NOT NULL,
    duration INTEGER NOT NULL CHECK (duration > 0 AND duration <= 1440),
    FOREIGN KEY (course_id) REFERENCES courses (id)
);

CREATE INDEX IF NOT EXISTS idx_sessions_course_id ON sessions (course_id);

CREATE TABLE IF NOT EXISTS study_types (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
"#;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the application pool. Every connection enforces foreign keys and
/// waits on a locked database instead of failing straight away.
#[instrument]
pub async fn connect(database_url: &str) -> Result<Pool<Sqlite>, AppError> {
    info!("Connecting to SQLite database");
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    Ok(pool)
}

/// Applies [`CURRENT_SCHEMA`]. Every statement is `IF NOT EXISTS`, so this
/// runs on each startup.
#[instrument(skip(pool))]
pub async fn initialize_schema(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    info!("Applying database schema");
    sqlx::raw_sql(CURRENT_SCHEMA).execute(pool).await?;
    Ok(())
}
