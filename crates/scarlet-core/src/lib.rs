//! scarlet-core: knowledge snapshot engine (record store, TF-IDF index, matcher) and the
//! query router that decides between an internal answer, a web search, or a generic reply.

mod error;
mod knowledge;
mod router;
mod shared;

pub use error::KnowledgeError;

pub use shared::{CoreConfig, SearchConfig, SearchHit, SearchOutcome};

pub use knowledge::{
    best_match, build_snapshot, builtin_items, tokenize, CatalogEntry, ItemSource, KnowledgeItem,
    KnowledgeSnapshot, KnowledgeStore, LearnedTerm, MatchResult, RecordSource, TermVector,
    VectorSpaceModel,
};

pub use router::{
    is_confident, ChatReply, QueryRouter, RebuildReport, Route, WebSearch, CLARIFY_REPLY,
    EMPTY_QUERY_REPLY, MIN_SEARCH_TOKENS,
};
