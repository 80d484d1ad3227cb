pub mod api;
pub mod config;
pub mod error;
pub mod telemetry;

use std::path::Path;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use momo_import::ImportSummary;
use momo_storage::{DbPool, SqliteMessageStore};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use config::{ConfigError, LogFormat, ServerConfig};
pub use error::AppError;

/// Request bodies are single SMS texts.
const MAX_BODY_BYTES: usize = 64 * 1024;

pub struct AppState {
    pub db: DbPool,
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/messages", get(api::list_messages))
        .route("/statistics", get(api::statistics))
        .route("/categories", get(api::categories))
        .route("/trends/daily", get(api::daily_trends))
        .route("/trends/volume/daily", get(api::daily_volume))
        .route("/top/recipients", get(api::top_recipients))
        .route("/top/senders", get(api::top_senders))
        .route("/classify", post(api::classify))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// API under `/api/v1`, `/health`, and the static dashboard for everything else.
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let static_dir = Path::new(&config.static_dir);
    let static_files =
        ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .nest("/api/v1", api_routes())
        .route("/health", get(|| async { "ok" }))
        .fallback_service(static_files)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Import `data_file` when the database holds no messages yet.
/// Returns `None` when nothing was imported.
pub async fn seed_if_empty(pool: &DbPool, data_file: &Path) -> anyhow::Result<Option<ImportSummary>> {
    let existing = momo_storage::count_messages(pool).await?;
    if existing > 0 {
        info!(existing, "Database already populated, skipping seed");
        return Ok(None);
    }
    if !data_file.exists() {
        warn!("Seed file not found: {}", data_file.display());
        return Ok(None);
    }

    let store = SqliteMessageStore::new(pool.clone());
    let summary = momo_import::load_file(data_file, &store).await?;
    Ok(Some(summary))
}

pub async fn serve(config: ServerConfig, pool: DbPool) -> anyhow::Result<()> {
    let state = Arc::new(AppState { db: pool });
    let app = build_router(state, &config);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
