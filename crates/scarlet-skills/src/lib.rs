//! External capabilities used by the query router.

pub use scarlet_core::WebSearch;

mod web_search;

pub use web_search::{parse_results, DuckDuckGoSearch, SearchError};
