pub mod crossword;
pub mod models;
pub mod wordle;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Get the path to the database file using platform-specific data directory
pub fn get_db_path() -> Result<PathBuf> {
    let mut path = data_dir()?;
    path.push("games.db");
    Ok(path)
}

/// Application data directory, created on first use.
pub fn data_dir() -> Result<PathBuf> {
    let mut path = dirs::data_dir().context("Unable to determine data directory for your platform")?;

    path.push("daily-minigames");

    std::fs::create_dir_all(&path).context("Failed to create daily-minigames data directory")?;

    Ok(path)
}

/// Create a connection pool to the SQLite database and bring the schema up to date
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid database URL {database_url}"))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::debug!(database_url, "database ready");
    Ok(pool)
}

/// True when a sqlx error is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(e) if e.is_unique_violation())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    /// A fresh file-backed database. Keep the `TempDir` alive for the test.
    pub(crate) async fn test_pool() -> (SqlitePool, TempDir) {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite:{}", dir.path().join("test.db").display());
        let pool = create_pool(&url).await.unwrap();
        (pool, dir)
    }

    #[tokio::test]
    async fn test_create_pool() {
        let (pool, _dir) = test_pool().await;
        let tables: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(&pool)
                .await
                .unwrap();
        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
        assert!(names.contains(&"wordle_daily_challenges"));
        assert!(names.contains(&"crossword_sessions"));
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite:{}", dir.path().join("again.db").display());
        create_pool(&url).await.unwrap().close().await;
        assert!(create_pool(&url).await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_path_is_error() {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite:{}", dir.path().join("missing/dir/games.db").display());
        assert!(create_pool(&url).await.is_err());
    }
}
