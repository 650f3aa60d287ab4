use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde_json::{json, Value};

use super::WatchlistStore;
use crate::config::Config;
use crate::models::WatchlistEntry;

const NOTION_BASE: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2022-06-28";

/// Managed document-store backend: one Notion database page per entry.
/// "Show Name" is the title property, the other five fields are rich text.
pub struct NotionStore {
    client: Client,
    api_key: String,
    database_id: String,
}

impl NotionStore {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .notion_api_key
            .clone()
            .ok_or_else(|| anyhow!("NOTION_API_KEY must be set for the notion backend"))?;
        let database_id = config
            .notion_database_id
            .clone()
            .ok_or_else(|| anyhow!("NOTION_DATABASE_ID must be set for the notion backend"))?;
        Ok(Self {
            client: Client::new(),
            api_key,
            database_id,
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            format!("Bearer {}", self.api_key)
                .parse()
                .context("invalid api key header")?,
        );
        headers.insert("Content-Type", "application/json".parse()?);
        headers.insert("Notion-Version", NOTION_VERSION.parse()?);
        Ok(headers)
    }

    async fn query_pages(&self, filter: Option<Value>) -> Result<Vec<Value>> {
        let url = format!("{NOTION_BASE}/databases/{}/query", self.database_id);
        let mut payload = json!({});
        if let Some(filter) = filter {
            payload = json!({ "filter": filter });
        }
        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&payload)
            .send()
            .await
            .context("notion query failed")?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "Notion query returned status {}",
                response.status()
            ));
        }
        let body: Value = response.json().await.context("notion query body")?;
        Ok(body["results"].as_array().cloned().unwrap_or_default())
    }
}

fn rich_text_value(text: &str) -> Value {
    json!({ "rich_text": [{ "text": { "content": text } }] })
}

fn plain_text(props: &Value, name: &str, kind: &str) -> String {
    props[name][kind][0]["plain_text"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

fn entry_from_page(page: &Value) -> WatchlistEntry {
    let props = &page["properties"];
    WatchlistEntry {
        show_id: plain_text(props, "Show ID", "rich_text"),
        show_name: plain_text(props, "Show Name", "title"),
        backdrop_path: plain_text(props, "Backdrop", "rich_text"),
        poster_path: plain_text(props, "Poster", "rich_text"),
        overview: plain_text(props, "Overview", "rich_text"),
        first_air_date: plain_text(props, "First Air Date", "rich_text"),
    }
}

#[async_trait]
impl WatchlistStore for NotionStore {
    async fn select(&self) -> Result<Vec<WatchlistEntry>> {
        let pages = self.query_pages(None).await?;
        Ok(pages.iter().map(entry_from_page).collect())
    }

    async fn insert(&self, entry: &WatchlistEntry) -> Result<bool> {
        let url = format!("{NOTION_BASE}/pages");
        let payload = json!({
            "parent": { "database_id": self.database_id },
            "properties": {
                "Show Name": {
                    "title": [{ "text": { "content": entry.show_name } }]
                },
                "Show ID": rich_text_value(&entry.show_id),
                "Backdrop": rich_text_value(&entry.backdrop_path),
                "Poster": rich_text_value(&entry.poster_path),
                "Overview": rich_text_value(&entry.overview),
                "First Air Date": rich_text_value(&entry.first_air_date),
            }
        });
        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&payload)
            .send()
            .await
            .context("notion insert failed")?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "Failed to add '{}' to Notion. Status: {}",
                entry.show_name,
                response.status()
            ));
        }
        Ok(true)
    }

    async fn delete(&self, show_id: &str) -> Result<bool> {
        let filter = json!({
            "property": "Show ID",
            "rich_text": { "equals": show_id }
        });
        let pages = self.query_pages(Some(filter)).await?;
        let mut removed = false;
        for page in &pages {
            let Some(page_id) = page["id"].as_str() else {
                continue;
            };
            let url = format!("{NOTION_BASE}/pages/{page_id}");
            let response = self
                .client
                .patch(&url)
                .headers(self.headers()?)
                .json(&json!({ "archived": true }))
                .send()
                .await
                .context("notion archive failed")?;
            if !response.status().is_success() {
                return Err(anyhow!(
                    "Failed to archive Notion page {}. Status: {}",
                    page_id,
                    response.status()
                ));
            }
            removed = true;
        }
        Ok(removed)
    }
}
