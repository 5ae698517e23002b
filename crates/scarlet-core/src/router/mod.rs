//! Query router: owns the current knowledge snapshot and decides, per chat message, between
//! an internal answer, a fallback web search, and a generic reply.
//!
//! ```text
//! Received ─ blank? ──────────────────────────────> "..."
//!    │
//! InternalLookup ─ score > threshold ─────────────> item response
//!    │
//!    ├─ more than 2 words ─ InternetLookup ───────> results | nothing found | failure
//!    └─────────────────────────────────────────────> "be more specific"
//! ```

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::knowledge::{best_match, build_snapshot, ItemSource, KnowledgeSnapshot, RecordSource};
use crate::{SearchHit, SearchOutcome};

/// Reply to an empty or whitespace-only message.
pub const EMPTY_QUERY_REPLY: &str = "...";
/// Reply to a short message with no confident internal match.
pub const CLARIFY_REPLY: &str = "Desculpe, não entendi. Tente ser mais específico.";
/// A low-confidence message needs more words than this to justify a web search.
pub const MIN_SEARCH_TOKENS: usize = 2;

const INTERNET_RESULTS_PREFIX: &str = "Não encontrei no meu banco de dados, mas pesquisei online:";
const INTERNET_EMPTY_REPLY: &str = "Pesquisei na internet mas não encontrei nada relevante.";
const INTERNET_FAILED_PREFIX: &str = "Tentei pesquisar online, mas falhei:";

/// External search used when the knowledge base is not confident.
#[async_trait::async_trait]
pub trait WebSearch: Send + Sync {
    /// Runs one bounded search. Failures come back as [`SearchOutcome::Failed`].
    async fn search(&self, query: &str) -> SearchOutcome;
}

/// Which branch of the decision policy produced a reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    EmptyQuery,
    Internal {
        source: ItemSource,
        position: usize,
        score: f64,
    },
    InternetResults(usize),
    InternetEmpty,
    InternetFailed,
    Clarify,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub response: String,
    pub route: Route,
}

/// Outcome of a rebuild, for the reload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildReport {
    pub generation: u64,
    pub items: usize,
}

/// `true` when `score` is strictly above `threshold`.
pub fn is_confident(score: f64, threshold: f64) -> bool {
    score > threshold
}

fn format_results(hits: &[SearchHit]) -> String {
    let lines: Vec<String> = hits
        .iter()
        .map(|h| format!("- [{}]({})", h.title, h.link))
        .collect();
    format!("{}\n\n{}", INTERNET_RESULTS_PREFIX, lines.join("\n"))
}

/// Holds the current snapshot and applies the routing policy.
pub struct QueryRouter {
    current: RwLock<Arc<KnowledgeSnapshot>>,
    rebuild_gate: Mutex<()>,
    source: Arc<dyn RecordSource>,
    search: Arc<dyn WebSearch>,
    threshold: f64,
}

impl QueryRouter {
    /// Starts with an empty snapshot; call [`rebuild`](Self::rebuild) to load the knowledge base.
    pub fn new(source: Arc<dyn RecordSource>, search: Arc<dyn WebSearch>, threshold: f64) -> Self {
        Self {
            current: RwLock::new(Arc::new(KnowledgeSnapshot::empty())),
            rebuild_gate: Mutex::new(()),
            source,
            search,
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// The snapshot queries currently read. Holding the returned `Arc` keeps it alive
    /// across later rebuilds.
    pub async fn snapshot(&self) -> Arc<KnowledgeSnapshot> {
        Arc::clone(&*self.current.read().await)
    }

    /// Rebuilds from the record source and swaps the result in.
    ///
    /// Rebuilds are serialized. The store scan and model fit run on the blocking pool, and
    /// queries keep reading the previous snapshot until the swap. If the build task dies the
    /// current snapshot stays in place and is reported.
    pub async fn rebuild(&self) -> RebuildReport {
        let _gate = self.rebuild_gate.lock().await;
        let generation = self.current.read().await.generation() + 1;
        let source = Arc::clone(&self.source);
        let built =
            tokio::task::spawn_blocking(move || build_snapshot(source.as_ref(), generation)).await;
        let fresh = match built {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                tracing::error!(
                    target: "scarlet::router",
                    generation,
                    "snapshot build task failed, keeping current snapshot: {}",
                    e
                );
                let current = self.snapshot().await;
                return RebuildReport {
                    generation: current.generation(),
                    items: current.len(),
                };
            }
        };
        let report = RebuildReport {
            generation,
            items: fresh.len(),
        };
        *self.current.write().await = fresh;
        tracing::info!(
            target: "scarlet::router",
            generation,
            items = report.items,
            "knowledge snapshot swapped in"
        );
        report
    }

    /// Answers one chat message.
    pub async fn chat(&self, message: &str) -> ChatReply {
        let query = message.trim();
        if query.is_empty() {
            return ChatReply {
                response: EMPTY_QUERY_REPLY.to_string(),
                route: Route::EmptyQuery,
            };
        }

        let snapshot = self.snapshot().await;
        if let Some(found) = best_match(&snapshot, query) {
            tracing::info!(
                target: "scarlet::router",
                generation = snapshot.generation(),
                position = found.position,
                source = found.item.source.as_str(),
                "internal search '{}' -> match {:.2}",
                query,
                found.score
            );
            if is_confident(found.score, self.threshold) {
                return ChatReply {
                    response: found.item.response.clone(),
                    route: Route::Internal {
                        source: found.item.source,
                        position: found.position,
                        score: found.score,
                    },
                };
            }
        }
        drop(snapshot);

        if query.split_whitespace().count() <= MIN_SEARCH_TOKENS {
            return ChatReply {
                response: CLARIFY_REPLY.to_string(),
                route: Route::Clarify,
            };
        }

        tracing::info!(target: "scarlet::router", "searching internet for '{}'", query);
        match self.search.search(query).await {
            SearchOutcome::Results(hits) => ChatReply {
                response: format_results(&hits),
                route: Route::InternetResults(hits.len()),
            },
            SearchOutcome::NoResults => ChatReply {
                response: INTERNET_EMPTY_REPLY.to_string(),
                route: Route::InternetEmpty,
            },
            SearchOutcome::Failed(reason) => {
                tracing::warn!(target: "scarlet::router", "internet search failed: {}", reason);
                ChatReply {
                    response: format!("{} {}", INTERNET_FAILED_PREFIX, reason),
                    route: Route::InternetFailed,
                }
            }
        }
    }
}
