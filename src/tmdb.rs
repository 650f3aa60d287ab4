use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::config::Config;
use crate::models::{ShowEntry, VideoCandidate};

const TMDB_BASE: &str = "https://api.themoviedb.org/3";

/// Length of the default "upcoming" discovery window, starting tomorrow.
pub const UPCOMING_WINDOW_DAYS: i64 = 180;

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
}

#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn search_shows(&self, query: &str) -> Result<Vec<ShowEntry>>;
    async fn discover_upcoming(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<ShowEntry>>;
    async fn select_video(&self, show_id: i64) -> Result<Option<VideoCandidate>>;
}

impl TmdbClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: config.tmdb_api_key.clone(),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .context("request failed")?;
        let status = res.status();
        let text = res.text().await.context("reading body failed")?;
        if !status.is_success() {
            return Err(anyhow!("{} -> {}", url, text));
        }
        let parsed: T = serde_json::from_str(&text).context("JSON parse failed")?;
        Ok(parsed)
    }
}

#[derive(Debug, Deserialize)]
struct ShowListResponse {
    #[serde(default)]
    results: Vec<ShowEntry>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    results: Vec<VideoEntry>,
}

#[derive(Debug, Deserialize)]
struct VideoEntry {
    name: String,
    key: String,
    site: String,
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn search_shows(&self, query: &str) -> Result<Vec<ShowEntry>> {
        let url = format!(
            "{TMDB_BASE}/search/tv?api_key={}&query={}",
            self.api_key,
            urlencoding::encode(query)
        );
        // A failed search is "no results", not an error the caller handles.
        match self.get_json::<ShowListResponse>(&url).await {
            Ok(data) => Ok(data.results),
            Err(e) => {
                warn!("TV search for '{}' failed: {}", query, e);
                Ok(Vec::new())
            }
        }
    }

    async fn discover_upcoming(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<ShowEntry>> {
        let url = format!(
            "{TMDB_BASE}/discover/tv?api_key={}&sort_by=popularity.desc&first_air_date.gte={}&first_air_date.lte={}&include_video=true",
            self.api_key,
            window_start.format("%Y-%m-%d"),
            window_end.format("%Y-%m-%d"),
        );
        match self.get_json::<ShowListResponse>(&url).await {
            Ok(data) => Ok(filter_upcoming(data.results, window_start, window_end)),
            Err(e) => {
                warn!("Discover query failed: {}", e);
                Ok(Vec::new())
            }
        }
    }

    async fn select_video(&self, show_id: i64) -> Result<Option<VideoCandidate>> {
        let url = format!("{TMDB_BASE}/tv/{show_id}/videos?api_key={}", self.api_key);
        match self.get_json::<VideosResponse>(&url).await {
            Ok(data) => Ok(choose_video(data.results)),
            Err(e) => {
                warn!("Video lookup for show {} failed: {}", show_id, e);
                Ok(None)
            }
        }
    }
}

/// Re-check the air-date window (upstream does not always honor the filter)
/// and drop titles with non-ASCII names. The latter is a product decision:
/// the upcoming view only lists Latin-script titles.
fn filter_upcoming(
    shows: Vec<ShowEntry>,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Vec<ShowEntry> {
    shows
        .into_iter()
        .filter(|show| {
            let in_window = show
                .first_air_date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
                .map(|d| d >= window_start && d <= window_end)
                .unwrap_or(false);
            in_window && show.name.is_ascii()
        })
        .collect()
}

/// Pick one representative video out of a show's upstream video list.
///
/// Titles containing "trailer" are excluded, unless that would leave
/// nothing, in which case the unfiltered set is used so a trailer-only
/// show still surfaces its trailer. Among the survivors the
/// lexicographically greatest title wins; the ordering is deterministic
/// and load-bearing for callers, so it must not be changed.
fn choose_video(videos: Vec<VideoEntry>) -> Option<VideoCandidate> {
    let candidates: Vec<(String, String)> = videos
        .into_iter()
        .filter(|v| v.site.eq_ignore_ascii_case("YouTube"))
        .map(|v| (v.name, format!("https://www.youtube.com/watch?v={}", v.key)))
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let non_trailer: Vec<&(String, String)> = candidates
        .iter()
        .filter(|(title, _)| !title.to_lowercase().contains("trailer"))
        .collect();
    let pool = if non_trailer.is_empty() {
        candidates.iter().collect::<Vec<_>>()
    } else {
        non_trailer
    };

    let (title, url) = pool.into_iter().max_by(|a, b| a.0.cmp(&b.0))?.clone();
    let video_id = extract_video_id(&url);
    Some(VideoCandidate {
        title,
        url,
        video_id,
    })
}

/// Pull the id out of a watch URL: the substring after `v=` up to the next
/// `&` or `#`. Returns `None` when the URL has no usable `v=` segment.
pub fn extract_video_id(url: &str) -> Option<String> {
    let start = url.find("v=")? + 2;
    let rest = &url[start..];
    let end = rest.find(['&', '#']).unwrap_or(rest.len());
    let id = &rest[..end];
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
