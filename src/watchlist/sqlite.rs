use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

use super::WatchlistStore;
use crate::models::WatchlistEntry;

/// Embedded watchlist backend: one `shows` table of six TEXT columns.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(path)
            .with_context(|| format!("invalid sqlite path '{}'", path))?
            .create_if_missing(true);
        // In-memory databases exist per connection, so keep exactly one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("opening sqlite database failed")?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS shows (
                show_id TEXT,
                show_name TEXT,
                backdrop_path TEXT,
                poster_path TEXT,
                overview TEXT,
                first_air_date TEXT
            )",
        )
        .execute(&pool)
        .await?;
        info!("Watchlist sqlite store ready at {}", path);
        Ok(Self { pool })
    }
}

type Row = (String, String, String, String, String, String);

#[async_trait]
impl WatchlistStore for SqliteStore {
    async fn select(&self) -> Result<Vec<WatchlistEntry>> {
        let rows: Vec<Row> = sqlx::query_as(
            "SELECT show_id, show_name, backdrop_path, poster_path, overview, first_air_date
             FROM shows",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(
                |(show_id, show_name, backdrop_path, poster_path, overview, first_air_date)| {
                    WatchlistEntry {
                        show_id,
                        show_name,
                        backdrop_path,
                        poster_path,
                        overview,
                        first_air_date,
                    }
                },
            )
            .collect())
    }

    async fn insert(&self, entry: &WatchlistEntry) -> Result<bool> {
        sqlx::query(
            "INSERT INTO shows (show_id, show_name, backdrop_path, poster_path, overview, first_air_date)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.show_id)
        .bind(&entry.show_name)
        .bind(&entry.backdrop_path)
        .bind(&entry.poster_path)
        .bind(&entry.overview)
        .bind(&entry.first_air_date)
        .execute(&self.pool)
        .await?;
        Ok(true)
    }

    async fn delete(&self, show_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM shows WHERE show_id = ?")
            .bind(show_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
