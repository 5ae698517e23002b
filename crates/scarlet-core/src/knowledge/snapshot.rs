use super::{ItemSource, KnowledgeItem, TermVector, VectorSpaceModel};

/// Items plus the model and item vectors derived from exactly those items.
struct SnapshotIndex {
    model: VectorSpaceModel,
    vectors: Vec<TermVector>,
}

/// An immutable, wholly-built knowledge base.
///
/// Built once by [`build_snapshot`](super::build_snapshot) and shared behind an `Arc`;
/// a rebuild produces a new snapshot instead of touching this one.
pub struct KnowledgeSnapshot {
    generation: u64,
    items: Vec<KnowledgeItem>,
    index: Option<SnapshotIndex>,
}

impl KnowledgeSnapshot {
    /// Indexes `items`. An empty sequence yields a snapshot without a model.
    pub fn new(generation: u64, items: Vec<KnowledgeItem>) -> Self {
        let index = if items.is_empty() {
            None
        } else {
            let model = VectorSpaceModel::fit(items.iter().map(|i| i.text.as_str()));
            let vectors = items.iter().map(|i| model.encode(&i.text)).collect();
            Some(SnapshotIndex { model, vectors })
        };
        Self {
            generation,
            items,
            index,
        }
    }

    /// A snapshot with no items and no model; nothing can match against it.
    pub fn empty() -> Self {
        Self::new(0, Vec::new())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn items(&self) -> &[KnowledgeItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count_by_source(&self, source: ItemSource) -> usize {
        self.items.iter().filter(|i| i.source == source).count()
    }

    pub fn model(&self) -> Option<&VectorSpaceModel> {
        self.index.as_ref().map(|ix| &ix.model)
    }

    /// Item vectors, parallel to [`items`](Self::items). Empty when there is no model.
    pub fn vectors(&self) -> &[TermVector] {
        self.index.as_ref().map(|ix| ix.vectors.as_slice()).unwrap_or(&[])
    }
}

impl std::fmt::Debug for KnowledgeSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeSnapshot")
            .field("generation", &self.generation)
            .field("items", &self.items.len())
            .field(
                "vocabulary",
                &self.model().map(|m| m.vocabulary_len()).unwrap_or(0),
            )
            .finish()
    }
}
