//! Record ingestion: writes catalog entries and learned terms to the store.
//! Changes become visible to chat after the next `/reload`. Store writes run on the
//! blocking pool.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use scarlet_core::{CatalogEntry, KnowledgeError, LearnedTerm};

use crate::AppState;

type JsonReply = (StatusCode, axum::Json<serde_json::Value>);

fn error_reply(e: KnowledgeError) -> JsonReply {
    let status = match e {
        KnowledgeError::Invalid(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::warn!(target: "scarlet::gateway", "record write rejected: {}", e);
    (
        status,
        axum::Json(serde_json::json!({ "status": "error", "error": e.to_string() })),
    )
}

fn task_failed(e: tokio::task::JoinError) -> JsonReply {
    tracing::error!(target: "scarlet::gateway", "record write task failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(serde_json::json!({ "status": "error", "error": "record write failed" })),
    )
}

/// POST /v1/learn – stores a term/definition pair, replacing an earlier definition.
pub(crate) async fn learn(
    State(state): State<AppState>,
    Json(term): Json<LearnedTerm>,
) -> JsonReply {
    let store = Arc::clone(&state.store);
    let record = term.clone();
    match tokio::task::spawn_blocking(move || store.learn_term(&record)).await {
        Ok(Ok(prev)) => (
            StatusCode::OK,
            axum::Json(serde_json::json!({
                "status": "ok",
                "term": term.term.trim(),
                "replaced": prev.is_some(),
            })),
        ),
        Ok(Err(e)) => error_reply(e),
        Err(e) => task_failed(e),
    }
}

/// POST /v1/catalog – appends a catalog entry.
pub(crate) async fn add_catalog_entry(
    State(state): State<AppState>,
    Json(entry): Json<CatalogEntry>,
) -> JsonReply {
    let store = Arc::clone(&state.store);
    let record = entry.clone();
    match tokio::task::spawn_blocking(move || store.insert_catalog_entry(&record)).await {
        Ok(Ok(())) => (
            StatusCode::OK,
            axum::Json(serde_json::json!({ "status": "ok", "name": entry.name })),
        ),
        Ok(Err(e)) => error_reply(e),
        Err(e) => task_failed(e),
    }
}
