use chrono::{Duration, Utc};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

use crate::availability::AvailabilityApi;
use crate::brands::BrandApi;
use crate::models::{EnrichedShow, ProviderLogo, ShowEntry};
use crate::tmdb::{TmdbApi, UPCOMING_WINDOW_DAYS};

/// Upstream fan-out is one call per show (videos) and one per provider
/// (branding); this caps how many run at once. Output order always matches
/// input order regardless of completion order.
const MAX_CONCURRENT_LOOKUPS: usize = 8;

/// Orchestrates catalog, video, availability, and brand lookups into
/// display-ready records.
#[derive(Clone)]
pub struct Enricher {
    tmdb: Arc<dyn TmdbApi>,
    availability: Arc<dyn AvailabilityApi>,
    brands: Arc<dyn BrandApi>,
}

impl Enricher {
    pub fn new(
        tmdb: Arc<dyn TmdbApi>,
        availability: Arc<dyn AvailabilityApi>,
        brands: Arc<dyn BrandApi>,
    ) -> Self {
        Self {
            tmdb,
            availability,
            brands,
        }
    }

    /// Upcoming shows for the default landing view. Shows without a single
    /// qualifying YouTube video are dropped here on purpose.
    pub async fn build_default_view(&self) -> Vec<EnrichedShow> {
        let window_start = Utc::now().date_naive() + Duration::days(1);
        let window_end = window_start + Duration::days(UPCOMING_WINDOW_DAYS);
        let shows = match self.tmdb.discover_upcoming(window_start, window_end).await {
            Ok(shows) => shows,
            Err(e) => {
                warn!("Discover failed, serving empty default view: {}", e);
                return Vec::new();
            }
        };
        info!("Discovered {} upcoming shows", shows.len());

        self.attach_videos(shows)
            .await
            .into_iter()
            .filter(|enriched| enriched.video.is_some())
            .collect()
    }

    /// Search results plus platform logos for the query. Unlike the default
    /// view, shows without a video are kept.
    pub async fn build_search_view(&self, query: &str) -> (Vec<EnrichedShow>, Vec<ProviderLogo>) {
        let shows = match self.tmdb.search_shows(query).await {
            Ok(shows) => shows,
            Err(e) => {
                warn!("Search for '{}' failed: {}", query, e);
                Vec::new()
            }
        };
        if shows.is_empty() {
            return (Vec::new(), Vec::new());
        }

        let enriched = self.attach_videos(shows).await;
        let logos = self.resolve_platform_logos(query).await;
        (enriched, logos)
    }

    async fn attach_videos(&self, shows: Vec<ShowEntry>) -> Vec<EnrichedShow> {
        let tmdb = Arc::clone(&self.tmdb);
        stream::iter(shows)
            .map(|show| {
                let tmdb = Arc::clone(&tmdb);
                async move {
                    let video = match tmdb.select_video(show.id).await {
                        Ok(video) => video,
                        Err(e) => {
                            warn!("Video selection for show {} failed: {}", show.id, e);
                            None
                        }
                    };
                    EnrichedShow { show, video }
                }
            })
            .buffered(MAX_CONCURRENT_LOOKUPS)
            .collect()
            .await
    }

    async fn resolve_platform_logos(&self, query: &str) -> Vec<ProviderLogo> {
        let providers = match self.availability.resolve_providers(query).await {
            Ok(providers) => providers,
            Err(e) => {
                warn!("Provider resolution for '{}' failed: {}", query, e);
                Vec::new()
            }
        };
        info!("Resolved {} providers for '{}'", providers.len(), query);

        let brands = Arc::clone(&self.brands);
        let logos: Vec<Option<ProviderLogo>> = stream::iter(providers)
            .map(|provider| {
                let brands = Arc::clone(&brands);
                async move {
                    match brands.resolve_logo(&provider).await {
                        Ok(logo) => logo,
                        Err(e) => {
                            warn!("Logo lookup for '{}' failed: {}", provider, e);
                            None
                        }
                    }
                }
            })
            .buffered(MAX_CONCURRENT_LOOKUPS)
            .collect()
            .await;
        logos.into_iter().flatten().collect()
    }
}
