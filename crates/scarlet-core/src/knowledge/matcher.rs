use super::{KnowledgeItem, KnowledgeSnapshot};

/// Best item for a query within one snapshot. Borrowed from the snapshot it came from.
#[derive(Debug, Clone, Copy)]
pub struct MatchResult<'a> {
    pub item: &'a KnowledgeItem,
    /// Position of `item` in the snapshot.
    pub position: usize,
    /// Cosine similarity in `[0, 1]`.
    pub score: f64,
}

/// Ranks every item against `query` and returns the most similar one.
///
/// `None` only when the snapshot has no model. Ties go to the earliest item. No confidence
/// threshold is applied here.
pub fn best_match<'a>(snapshot: &'a KnowledgeSnapshot, query: &str) -> Option<MatchResult<'a>> {
    let model = snapshot.model()?;
    let query_vector = model.encode(query);

    let mut best: Option<(usize, f64)> = None;
    for (position, vector) in snapshot.vectors().iter().enumerate() {
        let score = query_vector.cosine(vector);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((position, score)),
        }
    }

    let (position, score) = best?;
    Some(MatchResult {
        item: &snapshot.items()[position],
        position,
        score,
    })
}
