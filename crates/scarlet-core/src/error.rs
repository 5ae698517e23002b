use thiserror::Error;

/// Failures reading or writing the record store.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("record store unavailable: {0}")]
    Store(#[from] sled::Error),

    #[error("malformed record in tree '{tree}': {source}")]
    Malformed {
        tree: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid record: {0}")]
    Invalid(String),
}
