use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

use crate::config::Config;

const AVAILABILITY_BASE: &str = "https://streaming-availability.p.rapidapi.com";
const AVAILABILITY_HOST: &str = "streaming-availability.p.rapidapi.com";
const REGION: &str = "us";

#[derive(Debug, Clone)]
pub struct AvailabilityClient {
    client: Client,
    api_key: String,
}

#[async_trait]
pub trait AvailabilityApi: Send + Sync {
    /// Resolve the distinct streaming providers carrying `title` in the US.
    async fn resolve_providers(&self, title: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "streamingInfo", default)]
    streaming_info: HashMap<String, HashMap<String, Value>>,
}

impl AvailabilityClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: config.availability_api_key.clone(),
        }
    }

    async fn search_title(&self, title: &str) -> Result<SearchResponse> {
        let url = format!(
            "{AVAILABILITY_BASE}/search/title?title={}&country={REGION}&show_type=series&output_language=en",
            urlencoding::encode(title)
        );
        let res = self
            .client
            .get(&url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", AVAILABILITY_HOST)
            .send()
            .await
            .context("availability request failed")?;
        let status = res.status();
        let text = res.text().await.context("reading body failed")?;
        if !status.is_success() {
            return Err(anyhow!("{} -> {}", url, text));
        }
        serde_json::from_str(&text).context("JSON parse failed")
    }
}

#[async_trait]
impl AvailabilityApi for AvailabilityClient {
    async fn resolve_providers(&self, title: &str) -> Result<Vec<String>> {
        match self.search_title(title).await {
            Ok(data) => Ok(first_region_providers(&data.result)),
            Err(e) => {
                warn!("Availability lookup for '{}' failed: {}", title, e);
                Ok(Vec::new())
            }
        }
    }
}

/// Take the provider key set of the FIRST result that has a US entry and
/// stop there. Later results are never merged in, even when they also list
/// US providers.
fn first_region_providers(hits: &[SearchHit]) -> Vec<String> {
    for hit in hits {
        if let Some(providers) = hit.streaming_info.get(REGION) {
            let unique: BTreeSet<&String> = providers.keys().collect();
            return unique.into_iter().cloned().collect();
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(regions: Value) -> SearchHit {
        serde_json::from_value(json!({ "streamingInfo": regions })).unwrap()
    }

    #[test]
    fn stops_at_first_us_bearing_result() {
        let hits = vec![
            hit(json!({ "gb": { "iplayer": [] } })),
            hit(json!({ "us": { "netflix": [], "hulu": [] } })),
            hit(json!({ "us": { "prime": [] } })),
        ];
        let mut providers = first_region_providers(&hits);
        providers.sort();
        assert_eq!(providers, vec!["hulu", "netflix"]);
    }

    #[test]
    fn no_us_entry_yields_nothing() {
        let hits = vec![hit(json!({ "fr": { "canal": [] } }))];
        assert!(first_region_providers(&hits).is_empty());
        assert!(first_region_providers(&[]).is_empty());
    }
}
