use crate::availability::AvailabilityClient;
use crate::brands::BrandClient;
use crate::config::Config;
use crate::enrich::Enricher;
use crate::models::WatchlistEntry;
use crate::tmdb::TmdbClient;
use crate::watchlist::{self, WatchlistStore};
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tracing::{error, info};

const NO_SHOW_MESSAGE: &str = "Sorry, no show found with this name. Please try again!";

#[derive(Clone)]
pub struct AppState {
    pub enricher: Enricher,
    pub store: Arc<dyn WatchlistStore>,
}

pub async fn run_server(config: Config) -> Result<()> {
    let tmdb = Arc::new(TmdbClient::new(&config));
    let availability = Arc::new(AvailabilityClient::new(&config));
    let brands = Arc::new(BrandClient::new());
    let store = watchlist::from_config(&config).await?;

    let state = AppState {
        enricher: Enricher::new(tmdb, availability, brands),
        store,
    };

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/watchlist", get(list_watchlist).post(add_to_watchlist))
        .route("/watchlist/:show_id", axum::routing::delete(remove_from_watchlist))
        .route("/health", get(health))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Deserialize)]
struct IndexQuery {
    query: Option<String>,
}

async fn index(
    State(state): State<AppState>,
    Query(params): Query<IndexQuery>,
) -> Json<serde_json::Value> {
    match params.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(query) => {
            info!("Search request for '{}'", query);
            let (shows, platform_logos) = state.enricher.build_search_view(query).await;
            if shows.is_empty() {
                Json(json!({
                    "shows": [],
                    "platform_logos": [],
                    "message": NO_SHOW_MESSAGE,
                }))
            } else {
                Json(json!({ "shows": shows, "platform_logos": platform_logos }))
            }
        }
        None => {
            let shows = state.enricher.build_default_view().await;
            Json(json!({ "shows": shows }))
        }
    }
}

async fn list_watchlist(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.select().await {
        Ok(shows) => (StatusCode::OK, Json(json!({ "shows": shows }))),
        Err(e) => {
            error!("Failed to read watchlist: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": "watchlist unavailable" })),
            )
        }
    }
}

async fn add_to_watchlist(
    State(state): State<AppState>,
    Json(entry): Json<WatchlistEntry>,
) -> impl IntoResponse {
    if entry.show_id.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "message": "show_id is required" })),
        );
    }
    match watchlist::add_unique(state.store.as_ref(), &entry).await {
        Ok(added) => {
            if added {
                info!("Added '{}' to watchlist", entry.show_name);
            } else {
                info!("'{}' already on watchlist, skipping", entry.show_name);
            }
            (
                StatusCode::OK,
                Json(json!({ "status": "success", "added": added })),
            )
        }
        Err(e) => {
            error!("Failed to add to watchlist: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": "storage failure" })),
            )
        }
    }
}

async fn remove_from_watchlist(
    State(state): State<AppState>,
    Path(show_id): Path<String>,
) -> impl IntoResponse {
    match state.store.delete(&show_id).await {
        Ok(removed) => (
            StatusCode::OK,
            Json(json!({ "status": "success", "removed": removed })),
        ),
        Err(e) => {
            error!("Failed to remove show {}: {:?}", show_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": "storage failure" })),
            )
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
