use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::models::ProviderLogo;

const BRAND_SEARCH_BASE: &str = "https://api.brandfetch.io/v2/search";

#[derive(Debug, Clone, Default)]
pub struct BrandClient {
    client: Client,
}

#[async_trait]
pub trait BrandApi: Send + Sync {
    async fn resolve_logo(&self, provider: &str) -> Result<Option<ProviderLogo>>;
}

#[derive(Debug, Deserialize)]
struct BrandHit {
    icon: Option<String>,
}

impl BrandClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl BrandApi for BrandClient {
    async fn resolve_logo(&self, provider: &str) -> Result<Option<ProviderLogo>> {
        let url = format!("{BRAND_SEARCH_BASE}/{}", urlencoding::encode(provider));
        let hits = match self.get_hits(&url).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Brand search for '{}' failed: {}", provider, e);
                return Ok(None);
            }
        };
        // First result only; an empty icon counts as no logo.
        Ok(hits
            .into_iter()
            .next()
            .and_then(|hit| hit.icon)
            .filter(|icon| !icon.is_empty())
            .map(|icon_url| ProviderLogo {
                provider: provider.to_string(),
                icon_url,
            }))
    }
}

impl BrandClient {
    async fn get_hits(&self, url: &str) -> Result<Vec<BrandHit>> {
        let res = self.client.get(url).send().await.context("request failed")?;
        let status = res.status();
        let text = res.text().await.context("reading body failed")?;
        if !status.is_success() {
            return Err(anyhow!("{} -> {}", url, text));
        }
        serde_json::from_str(&text).context("JSON parse failed")
    }
}
