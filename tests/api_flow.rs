use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use serde_json::{json, Value};
use showscout::app::{build_router, AppState};
use showscout::availability::AvailabilityApi;
use showscout::brands::BrandApi;
use showscout::enrich::Enricher;
use showscout::models::{ProviderLogo, ShowEntry, VideoCandidate, WatchlistEntry};
use showscout::tmdb::TmdbApi;
use showscout::watchlist::WatchlistStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

struct FakeTmdb {
    upcoming: Vec<ShowEntry>,
    search: Vec<ShowEntry>,
    videos: HashMap<i64, VideoCandidate>,
}

#[async_trait::async_trait]
impl TmdbApi for FakeTmdb {
    async fn search_shows(&self, _query: &str) -> Result<Vec<ShowEntry>> {
        Ok(self.search.clone())
    }

    async fn discover_upcoming(
        &self,
        _window_start: NaiveDate,
        _window_end: NaiveDate,
    ) -> Result<Vec<ShowEntry>> {
        Ok(self.upcoming.clone())
    }

    async fn select_video(&self, show_id: i64) -> Result<Option<VideoCandidate>> {
        Ok(self.videos.get(&show_id).cloned())
    }
}

struct FakeAvailability {
    providers: Vec<String>,
}

#[async_trait::async_trait]
impl AvailabilityApi for FakeAvailability {
    async fn resolve_providers(&self, _title: &str) -> Result<Vec<String>> {
        Ok(self.providers.clone())
    }
}

struct FakeBrands {
    icons: HashMap<String, String>,
}

#[async_trait::async_trait]
impl BrandApi for FakeBrands {
    async fn resolve_logo(&self, provider: &str) -> Result<Option<ProviderLogo>> {
        Ok(self.icons.get(provider).map(|icon_url| ProviderLogo {
            provider: provider.to_string(),
            icon_url: icon_url.clone(),
        }))
    }
}

#[derive(Default)]
struct MemoryStore {
    rows: Mutex<Vec<WatchlistEntry>>,
}

#[async_trait::async_trait]
impl WatchlistStore for MemoryStore {
    async fn select(&self) -> Result<Vec<WatchlistEntry>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn insert(&self, entry: &WatchlistEntry) -> Result<bool> {
        self.rows.lock().unwrap().push(entry.clone());
        Ok(true)
    }

    async fn delete(&self, show_id: &str) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|e| e.show_id != show_id);
        Ok(rows.len() < before)
    }
}

fn show(id: i64, name: &str) -> ShowEntry {
    ShowEntry {
        id,
        name: name.to_string(),
        backdrop_path: Some(format!("/backdrop-{id}.jpg")),
        poster_path: Some(format!("/poster-{id}.jpg")),
        overview: format!("Overview of {name}"),
        first_air_date: Some("2026-10-01".to_string()),
    }
}

fn candidate(title: &str, key: &str) -> VideoCandidate {
    VideoCandidate {
        title: title.to_string(),
        url: format!("https://www.youtube.com/watch?v={key}"),
        video_id: Some(key.to_string()),
    }
}

fn app(tmdb: FakeTmdb, availability: FakeAvailability, brands: FakeBrands) -> Router {
    let state = AppState {
        enricher: Enricher::new(Arc::new(tmdb), Arc::new(availability), Arc::new(brands)),
        store: Arc::new(MemoryStore::default()),
    };
    build_router(state)
}

fn no_availability() -> FakeAvailability {
    FakeAvailability {
        providers: Vec::new(),
    }
}

fn no_brands() -> FakeBrands {
    FakeBrands {
        icons: HashMap::new(),
    }
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn send_json(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn default_view_drops_shows_without_a_video() {
    let tmdb = FakeTmdb {
        upcoming: vec![show(1, "Has Video"), show(2, "No Video")],
        search: Vec::new(),
        videos: HashMap::from([(1, candidate("Season Preview", "abc123"))]),
    };
    let router = app(tmdb, no_availability(), no_brands());

    let (status, body) = get_json(router, "/").await;
    assert_eq!(status, StatusCode::OK);
    let shows = body["shows"].as_array().unwrap();
    assert_eq!(shows.len(), 1);
    assert_eq!(shows[0]["id"], 1);
    assert_eq!(shows[0]["video"]["video_id"], "abc123");
}

#[tokio::test]
async fn search_view_keeps_videoless_shows_and_resolves_logos() {
    let tmdb = FakeTmdb {
        upcoming: Vec::new(),
        search: vec![show(1, "Has Video"), show(2, "No Video")],
        videos: HashMap::from([(1, candidate("Season Preview", "abc123"))]),
    };
    let availability = FakeAvailability {
        providers: vec!["netflix".to_string(), "hulu".to_string()],
    };
    let brands = FakeBrands {
        icons: HashMap::from([(
            "netflix".to_string(),
            "https://cdn.example/netflix.png".to_string(),
        )]),
    };
    let router = app(tmdb, availability, brands);

    let (status, body) = get_json(router, "/?query=video").await;
    assert_eq!(status, StatusCode::OK);

    let shows = body["shows"].as_array().unwrap();
    assert_eq!(shows.len(), 2);
    assert_eq!(shows[0]["id"], 1);
    assert_eq!(shows[1]["id"], 2);
    assert!(shows[1]["video"].is_null());

    // hulu has no icon, so only the netflix logo comes back.
    let logos = body["platform_logos"].as_array().unwrap();
    assert_eq!(logos.len(), 1);
    assert_eq!(logos[0]["provider"], "netflix");
    assert_eq!(logos[0]["icon_url"], "https://cdn.example/netflix.png");
}

#[tokio::test]
async fn empty_search_surfaces_alert_message() {
    let tmdb = FakeTmdb {
        upcoming: Vec::new(),
        search: Vec::new(),
        videos: HashMap::new(),
    };
    let router = app(tmdb, no_availability(), no_brands());

    let (status, body) = get_json(router, "/?query=nothing").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["shows"].as_array().unwrap().is_empty());
    assert_eq!(
        body["message"],
        "Sorry, no show found with this name. Please try again!"
    );
}

#[tokio::test]
async fn health_endpoint_responds() {
    let tmdb = FakeTmdb {
        upcoming: Vec::new(),
        search: Vec::new(),
        videos: HashMap::new(),
    };
    let router = app(tmdb, no_availability(), no_brands());
    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

fn watchlist_payload(show_id: &str) -> String {
    json!({
        "show_id": show_id,
        "show_name": "Stranger Things",
        "backdrop_path": "/b.jpg",
        "poster_path": "/p.jpg",
        "overview": "Upside down.",
        "first_air_date": "2016-07-15",
    })
    .to_string()
}

fn add_request(body: String) -> Request<Body> {
    Request::post("/watchlist")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn watchlist_add_list_and_remove_flow() {
    let tmdb = FakeTmdb {
        upcoming: Vec::new(),
        search: Vec::new(),
        videos: HashMap::new(),
    };
    let router = app(tmdb, no_availability(), no_brands());

    let (status, body) = send_json(router.clone(), add_request(watchlist_payload("66732"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"], true);

    // Same show again: intent is idempotent, nothing new stored.
    let (status, body) = send_json(router.clone(), add_request(watchlist_payload("66732"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"], false);

    let (status, body) = get_json(router.clone(), "/watchlist").await;
    assert_eq!(status, StatusCode::OK);
    let shows = body["shows"].as_array().unwrap();
    assert_eq!(shows.len(), 1);
    assert_eq!(shows[0]["show_id"], "66732");
    assert_eq!(shows[0]["show_name"], "Stranger Things");

    let (status, body) = send_json(
        router.clone(),
        Request::delete("/watchlist/66732")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], true);

    let (_, body) = get_json(router, "/watchlist").await;
    assert!(body["shows"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn watchlist_add_without_show_id_is_rejected() {
    let tmdb = FakeTmdb {
        upcoming: Vec::new(),
        search: Vec::new(),
        videos: HashMap::new(),
    };
    let router = app(tmdb, no_availability(), no_brands());

    let payload = json!({ "show_name": "Nameless" }).to_string();
    let (status, body) = send_json(router, add_request(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}
