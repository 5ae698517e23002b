//! Knowledge base: record store, snapshot builder, TF-IDF index and similarity matcher.
//!
//! ## Build / query flow
//!
//! ```text
//! RecordSource (catalog + learned) ─┐
//!                                   ├─ build_snapshot ─> KnowledgeSnapshot { items, model, vectors }
//! builtin_items ────────────────────┘
//!
//! query ─ tokenize ─ VectorSpaceModel::encode ─ cosine vs every item ─> MatchResult
//! ```
//!
//! The tokenizer is shared by indexing and query encoding so both land in the same space.

mod builder;
mod index;
mod matcher;
mod snapshot;
mod store;
mod tokenize;

pub use builder::{build_snapshot, builtin_items};
pub use index::{TermVector, VectorSpaceModel};
pub use matcher::{best_match, MatchResult};
pub use snapshot::KnowledgeSnapshot;
pub use store::{CatalogEntry, KnowledgeStore, LearnedTerm};
pub use tokenize::tokenize;

use serde::{Deserialize, Serialize};

use crate::KnowledgeError;

/// Where a knowledge item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSource {
    Catalog,
    Learned,
    Builtin,
}

impl ItemSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemSource::Catalog => "catalog",
            ItemSource::Learned => "learned",
            ItemSource::Builtin => "builtin",
        }
    }
}

/// One indexable unit: `text` is matched, `response` is returned verbatim on a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeItem {
    pub text: String,
    pub response: String,
    pub source: ItemSource,
}

impl KnowledgeItem {
    pub fn new(text: impl Into<String>, response: impl Into<String>, source: ItemSource) -> Self {
        Self {
            text: text.into(),
            response: response.into(),
            source,
        }
    }
}

/// Read side of the record store, consulted only while building a snapshot.
pub trait RecordSource: Send + Sync {
    /// All catalog entries, in store order.
    fn catalog_entries(&self) -> Result<Vec<CatalogEntry>, KnowledgeError>;

    /// All learned term/definition pairs, in store order.
    fn learned_terms(&self) -> Result<Vec<LearnedTerm>, KnowledgeError>;
}
