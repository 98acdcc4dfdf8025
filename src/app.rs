use crate::catalog::{Catalog, Session};
use crate::config::Config;
use crate::content::{Content, ContentBundle, MediaKind};
use crate::store::{LocalStore, API_KEY_KEY};
use crate::tmdb::{TmdbApi, TmdbClient};
use crate::watchlist::Watchlist;
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

const MAX_BODY_BYTES: usize = 16 * 1024;

/// Builds a TMDB client for an API key.
pub type Connector = Arc<dyn Fn(&str) -> Result<Arc<dyn TmdbApi>> + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub watchlist: Arc<Mutex<Watchlist>>,
    pub store: LocalStore,
    pub connect: Connector,
}

pub fn tmdb_connector(base_url: String) -> Connector {
    Arc::new(move |api_key: &str| {
        let client = TmdbClient::with_base_url(api_key, base_url.clone())?;
        Ok(Arc::new(client) as Arc<dyn TmdbApi>)
    })
}

pub async fn run_server(config: Config) -> Result<()> {
    let store = LocalStore::open(&config.data_dir).await?;
    info!("Using data directory {}", store.dir().display());

    let stored_key = match store.get::<String>(API_KEY_KEY).await {
        Ok(key) => key,
        Err(e) => {
            warn!("Ignoring unreadable stored API key: {:#}", e);
            None
        }
    };
    let connect = tmdb_connector(config.tmdb_base_url.clone());
    let catalog = match config.api_key.clone().or(stored_key) {
        Some(key) => Catalog::new(connect(&key)?),
        None => {
            warn!("No TMDB API key configured; waiting for PUT /api/setup");
            Catalog::unconfigured()
        }
    };
    let watchlist = Watchlist::load(store.clone()).await;

    let state = AppState {
        catalog: Arc::new(catalog),
        watchlist: Arc::new(Mutex::new(watchlist)),
        store,
        connect,
    };

    let app = build_router(state);

    info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/setup", get(setup_status).put(setup).delete(reset_setup))
        .route("/api/content", get(content_bundle))
        .route("/api/featured", get(featured))
        .route("/api/categories/:name", get(category))
        .route("/api/search", get(search))
        .route("/api/details/:media/:id", get(details))
        .route("/api/watchlist", get(watchlist))
        .route(
            "/api/watchlist/:id",
            put(add_to_watchlist).delete(remove_from_watchlist),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn setup_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "configured": state.catalog.is_configured().await }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetupRequest {
    api_key: String,
}

async fn setup(State(state): State<AppState>, Json(body): Json<SetupRequest>) -> Response {
    let key = body.api_key.trim();
    if key.is_empty() {
        return (StatusCode::BAD_REQUEST, "apiKey must not be empty").into_response();
    }

    let api = match (state.connect)(key) {
        Ok(api) => api,
        Err(e) => {
            error!("Failed to build TMDB client: {:#}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let session = match Session::validate(api).await {
        Ok(session) => session,
        Err(e) => {
            warn!("Rejected new TMDB API key: {}", e);
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };
    // The live key never differs from the saved one.
    if let Err(e) = state.store.set(API_KEY_KEY, key).await {
        error!("Failed to persist API key: {:#}", e);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    state.catalog.install(session).await;
    info!("TMDB API key updated");
    StatusCode::NO_CONTENT.into_response()
}

async fn reset_setup(State(state): State<AppState>) -> StatusCode {
    if let Err(e) = state.store.remove(API_KEY_KEY).await {
        error!("Failed to remove stored API key: {:#}", e);
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    state.catalog.clear().await;
    StatusCode::NO_CONTENT
}

async fn content_bundle(State(state): State<AppState>) -> Json<ContentBundle> {
    Json(state.catalog.load_all().await)
}

async fn featured(State(state): State<AppState>) -> Json<Option<Content>> {
    Json(state.catalog.featured().await)
}

async fn category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Content>>, StatusCode> {
    let catalog = &state.catalog;
    let list = match name.as_str() {
        "trending" => catalog.trending().await,
        "movies" => catalog.popular_movies().await,
        "series" => catalog.popular_shows().await,
        "cartoons" => catalog.animated().await,
        "documentaries" => catalog.documentaries().await,
        "top-rated-movies" => catalog.top_rated_movies().await,
        "top-rated-series" => catalog.top_rated_shows().await,
        _ => return Err(StatusCode::NOT_FOUND),
    };
    Ok(Json(list))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<Content>> {
    Json(state.catalog.search(&params.q).await)
}

async fn details(
    State(state): State<AppState>,
    Path((media, id)): Path<(String, String)>,
) -> Result<Json<Content>, StatusCode> {
    let media = MediaKind::parse(&media).ok_or(StatusCode::NOT_FOUND)?;
    state
        .catalog
        .details(&id, media)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn watchlist(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.watchlist.lock().await.ids().to_vec())
}

async fn add_to_watchlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<String>>, StatusCode> {
    let mut list = state.watchlist.lock().await;
    list.add(&id).await.map_err(|e| {
        error!("Failed to save watchlist: {:#}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(list.ids().to_vec()))
}

async fn remove_from_watchlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<String>>, StatusCode> {
    let mut list = state.watchlist.lock().await;
    list.remove(&id).await.map_err(|e| {
        error!("Failed to save watchlist: {:#}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(list.ids().to_vec()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
