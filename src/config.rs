use anyhow::{Context, Result};
use std::env;

/// Which backend the watchlist store uses, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchlistBackend {
    Sqlite,
    Notion,
}

/// Everything read from the environment, built once in `main` and passed
/// into the client constructors. Pipeline code never touches `env::var`.
#[derive(Debug, Clone)]
pub struct Config {
    pub tmdb_api_key: String,
    pub availability_api_key: String,
    pub port: u16,
    pub watchlist_backend: WatchlistBackend,
    pub watchlist_db_path: String,
    pub notion_api_key: Option<String>,
    pub notion_database_id: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let tmdb_api_key = env::var("TMDB_API_KEY").context("TMDB_API_KEY not set")?;
        let availability_api_key =
            env::var("AVAILABILITY_API_KEY").context("AVAILABILITY_API_KEY not set")?;

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT is not a valid port number")?,
            Err(_) => 5000,
        };

        let backend_raw = env::var("WATCHLIST_BACKEND").unwrap_or_else(|_| "sqlite".to_string());
        let watchlist_backend = match backend_raw.to_lowercase().as_str() {
            "sqlite" => WatchlistBackend::Sqlite,
            "notion" => WatchlistBackend::Notion,
            other => anyhow::bail!("Unknown WATCHLIST_BACKEND '{}'", other),
        };

        let notion_api_key = env::var("NOTION_API_KEY").ok();
        let notion_database_id = env::var("NOTION_DATABASE_ID").ok();
        if watchlist_backend == WatchlistBackend::Notion
            && (notion_api_key.is_none() || notion_database_id.is_none())
        {
            anyhow::bail!(
                "WATCHLIST_BACKEND=notion requires NOTION_API_KEY and NOTION_DATABASE_ID"
            );
        }

        Ok(Self {
            tmdb_api_key,
            availability_api_key,
            port,
            watchlist_backend,
            watchlist_db_path: env::var("WATCHLIST_DB").unwrap_or_else(|_| "mylist.db".to_string()),
            notion_api_key,
            notion_database_id,
        })
    }
}
