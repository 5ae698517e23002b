//! Axum-based gateway for the Scarlet assistant. Config-driven via CoreConfig.

mod handlers;

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use scarlet_core::{CoreConfig, ItemSource, KnowledgeStore, QueryRouter};
use scarlet_skills::DuckDuckGoSearch;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<CoreConfig>,
    pub(crate) router: Arc<QueryRouter>,
    pub(crate) store: Arc<KnowledgeStore>,
}

/// Pre-flight check: config loads, record store opens, port is free.
fn run_verify() -> Result<(), String> {
    let config = CoreConfig::load().map_err(|e| format!("Config load failed: {}", e))?;

    print!("Checking record store... ");
    let store = KnowledgeStore::open_path(config.knowledge_path())
        .map_err(|e| format!("record store LOCKED or inaccessible: {}", e))?;
    let catalog = store.catalog_count().map_err(|e| e.to_string())?;
    let learned = store.learned_count().map_err(|e| e.to_string())?;
    drop(store);
    println!("OK ({} catalog entries, {} learned terms)", catalog, learned);

    print!("Checking search client... ");
    DuckDuckGoSearch::new(&config.search).map_err(|e| e.to_string())?;
    println!("OK");

    let port = config.port;
    print!("Checking port {}... ", port);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    match std::net::TcpListener::bind(addr) {
        Ok(listener) => {
            drop(listener);
            println!("OK (available)");
        }
        Err(e) => return Err(format!("Port {} BLOCKED: {}", port, e)),
    }

    println!("\nAll checks passed. Ready to start gateway.");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[scarlet-gateway] .env not loaded: {} (using system environment)", e);
    }

    if std::env::args().any(|a| a == "--verify") {
        match run_verify() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("PRE-FLIGHT FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(CoreConfig::load()?);
    let store = Arc::new(KnowledgeStore::open_path(config.knowledge_path())?);
    let search = Arc::new(DuckDuckGoSearch::new(&config.search)?);
    let router = Arc::new(QueryRouter::new(
        store.clone(),
        search,
        config.confidence_threshold,
    ));

    let report = router.rebuild().await;
    tracing::info!(
        target: "scarlet::gateway",
        items = report.items,
        "knowledge base loaded"
    );

    let port = config.port;
    let app = build_app(AppState {
        config,
        router,
        store,
    });

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(target: "scarlet::gateway", "scarlet-gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(handlers::chat))
        .route("/reload", post(handlers::reload))
        .route("/api/v1/health", get(health))
        .route("/v1/status", get(status))
        .route("/v1/learn", post(handlers::learn))
        .route("/v1/catalog", post(handlers::add_catalog_entry))
        .with_state(state)
}

/// GET /api/v1/health – liveness check.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

/// GET /v1/status – app identity and the shape of the current knowledge snapshot.
async fn status(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    let snapshot = state.router.snapshot().await;
    axum::Json(serde_json::json!({
        "app_name": state.config.app_name,
        "generation": snapshot.generation(),
        "items": snapshot.len(),
        "sources": {
            "catalog": snapshot.count_by_source(ItemSource::Catalog),
            "learned": snapshot.count_by_source(ItemSource::Learned),
            "builtin": snapshot.count_by_source(ItemSource::Builtin),
        },
        "vocabulary": snapshot.model().map(|m| m.vocabulary_len()).unwrap_or(0),
        "confidence_threshold": state.router.threshold(),
    }))
}
