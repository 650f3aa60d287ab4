use serde::{Deserialize, Serialize};

/// A raw show record as returned by the catalog search/discover endpoints.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ShowEntry {
    pub id: i64,
    pub name: String,
    pub backdrop_path: Option<String>,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: String,
    pub first_air_date: Option<String>,
}

/// One embeddable video picked for a show. `video_id` is parsed out of the
/// URL and may be missing when the URL has no `v=` segment.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct VideoCandidate {
    pub title: String,
    pub url: String,
    pub video_id: Option<String>,
}

/// A show plus its selected video, ready for display.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EnrichedShow {
    #[serde(flatten)]
    pub show: ShowEntry,
    pub video: Option<VideoCandidate>,
}

/// Streaming platform branding resolved for one provider name.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProviderLogo {
    pub provider: String,
    pub icon_url: String,
}

/// The six-field record persisted by the watchlist store. All fields are
/// strings to match the storage contract; `show_id` is unique per list.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WatchlistEntry {
    #[serde(default)]
    pub show_id: String,
    #[serde(default)]
    pub show_name: String,
    #[serde(default)]
    pub backdrop_path: String,
    #[serde(default)]
    pub poster_path: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub first_air_date: String,
}
