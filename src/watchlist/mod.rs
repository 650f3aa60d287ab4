use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Config, WatchlistBackend};
use crate::models::WatchlistEntry;

mod notion;
mod sqlite;

pub use notion::NotionStore;
pub use sqlite::SqliteStore;

/// The three-operation storage contract both backends implement. The store
/// itself does not enforce uniqueness; see [`add_unique`].
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    async fn select(&self) -> Result<Vec<WatchlistEntry>>;
    async fn insert(&self, entry: &WatchlistEntry) -> Result<bool>;
    async fn delete(&self, show_id: &str) -> Result<bool>;
}

pub async fn from_config(config: &Config) -> Result<Arc<dyn WatchlistStore>> {
    match config.watchlist_backend {
        WatchlistBackend::Sqlite => Ok(Arc::new(
            SqliteStore::connect(&config.watchlist_db_path).await?,
        )),
        WatchlistBackend::Notion => Ok(Arc::new(NotionStore::new(config)?)),
    }
}

/// Insert `entry` unless its `show_id` is already stored. Read-then-write,
/// so two identical concurrent adds can still race; acceptable for a
/// single-user list. Returns whether an insert happened.
pub async fn add_unique(store: &dyn WatchlistStore, entry: &WatchlistEntry) -> Result<bool> {
    let existing = store.select().await?;
    if existing.iter().any(|e| e.show_id == entry.show_id) {
        return Ok(false);
    }
    store.insert(entry).await?;
    Ok(true)
}
