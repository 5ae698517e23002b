//! Assembles a snapshot from the record source plus the built-in conversational items.

use super::{CatalogEntry, ItemSource, KnowledgeItem, KnowledgeSnapshot, LearnedTerm, RecordSource};

/// Built-in chit-chat as `(text, response)`: greeting, self-identification, help.
const BUILTIN_ITEMS: [(&str, &str); 3] = [
    (
        "oi olá hello hi eai",
        "Olá! Sou a IA Avançada da Scarlet. Como posso ajudar?",
    ),
    (
        "quem é você",
        "Sou uma inteligência artificial baseada em similaridade de texto (TF-IDF).",
    ),
    (
        "ajuda help socorro",
        "Posso ajudar com produtos, erros de instalação ou pesquisar na internet.",
    ),
];

/// The fixed conversational items appended to every snapshot.
pub fn builtin_items() -> Vec<KnowledgeItem> {
    BUILTIN_ITEMS
        .iter()
        .map(|(text, response)| KnowledgeItem::new(*text, *response, ItemSource::Builtin))
        .collect()
}

fn catalog_item(entry: &CatalogEntry) -> KnowledgeItem {
    KnowledgeItem::new(
        format!("{} {} {}", entry.name, entry.description, entry.category),
        format!(
            "Encontrei o produto **{}** ({}). Ele é ótimo para isso. Veja na loja!",
            entry.name, entry.category
        ),
        ItemSource::Catalog,
    )
}

fn learned_item(term: &LearnedTerm) -> KnowledgeItem {
    KnowledgeItem::new(
        term.term.clone(),
        format!("Aprendi que **{}** significa: _{}_.", term.term, term.definition),
        ItemSource::Learned,
    )
}

/// Builds a complete snapshot: catalog items, then learned items, then built-ins.
///
/// Never fails. A source error is logged and that record kind is left out; the built-ins
/// are always present, so the result is never empty.
pub fn build_snapshot(source: &dyn RecordSource, generation: u64) -> KnowledgeSnapshot {
    let mut items = Vec::new();

    match source.catalog_entries() {
        Ok(entries) => items.extend(entries.iter().map(catalog_item)),
        Err(e) => tracing::warn!(
            target: "scarlet::knowledge",
            generation,
            "catalog unavailable, building without it: {}",
            e
        ),
    }
    let catalog = items.len();

    match source.learned_terms() {
        Ok(terms) => items.extend(terms.iter().map(learned_item)),
        Err(e) => tracing::warn!(
            target: "scarlet::knowledge",
            generation,
            "learned terms unavailable, building without them: {}",
            e
        ),
    }
    let learned = items.len() - catalog;

    items.extend(builtin_items());

    let snapshot = KnowledgeSnapshot::new(generation, items);
    tracing::info!(
        target: "scarlet::knowledge",
        generation,
        catalog,
        learned,
        items = snapshot.len(),
        vocabulary = snapshot.model().map(|m| m.vocabulary_len()).unwrap_or(0),
        "knowledge snapshot built: {} items",
        snapshot.len()
    );
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::best_match;
    use crate::KnowledgeError;

    struct FixedSource {
        catalog: Vec<CatalogEntry>,
        learned: Vec<LearnedTerm>,
    }

    impl RecordSource for FixedSource {
        fn catalog_entries(&self) -> Result<Vec<CatalogEntry>, KnowledgeError> {
            Ok(self.catalog.clone())
        }
        fn learned_terms(&self) -> Result<Vec<LearnedTerm>, KnowledgeError> {
            Ok(self.learned.clone())
        }
    }

    struct UnreachableSource;

    impl RecordSource for UnreachableSource {
        fn catalog_entries(&self) -> Result<Vec<CatalogEntry>, KnowledgeError> {
            Err(KnowledgeError::Invalid("connection refused".into()))
        }
        fn learned_terms(&self) -> Result<Vec<LearnedTerm>, KnowledgeError> {
            Err(KnowledgeError::Invalid("connection refused".into()))
        }
    }

    struct CatalogDown;

    impl RecordSource for CatalogDown {
        fn catalog_entries(&self) -> Result<Vec<CatalogEntry>, KnowledgeError> {
            Err(KnowledgeError::Invalid("catalog table missing".into()))
        }
        fn learned_terms(&self) -> Result<Vec<LearnedTerm>, KnowledgeError> {
            Ok(vec![LearnedTerm::new("hwid", "hardware identifier")])
        }
    }

    #[test]
    fn items_are_ordered_catalog_learned_builtin() {
        let source = FixedSource {
            catalog: vec![CatalogEntry::new("Nova", "fps overlay", "utility")],
            learned: vec![LearnedTerm::new("hwid", "hardware identifier")],
        };
        let snapshot = build_snapshot(&source, 3);
        let sources: Vec<ItemSource> = snapshot.items().iter().map(|i| i.source).collect();
        assert_eq!(
            sources,
            vec![
                ItemSource::Catalog,
                ItemSource::Learned,
                ItemSource::Builtin,
                ItemSource::Builtin,
                ItemSource::Builtin
            ]
        );
        assert_eq!(snapshot.generation(), 3);
    }

    #[test]
    fn templates_fill_record_fields() {
        let source = FixedSource {
            catalog: vec![CatalogEntry::new("Nova", "fps overlay", "utility")],
            learned: vec![LearnedTerm::new("hwid", "hardware identifier")],
        };
        let snapshot = build_snapshot(&source, 1);
        let catalog = &snapshot.items()[0];
        assert_eq!(catalog.text, "Nova fps overlay utility");
        assert_eq!(
            catalog.response,
            "Encontrei o produto **Nova** (utility). Ele é ótimo para isso. Veja na loja!"
        );
        let learned = &snapshot.items()[1];
        assert_eq!(learned.text, "hwid");
        assert_eq!(
            learned.response,
            "Aprendi que **hwid** significa: _hardware identifier_."
        );
    }

    #[test]
    fn unreachable_source_still_yields_builtins() {
        let snapshot = build_snapshot(&UnreachableSource, 1);
        assert_eq!(snapshot.items(), builtin_items().as_slice());
        assert!(snapshot.model().is_some());
        let m = best_match(&snapshot, "hello there").unwrap();
        assert_eq!(m.item.source, ItemSource::Builtin);
        assert!(m.score > 0.0);
    }

    #[test]
    fn one_failing_kind_keeps_the_other() {
        let snapshot = build_snapshot(&CatalogDown, 1);
        assert_eq!(snapshot.count_by_source(ItemSource::Catalog), 0);
        assert_eq!(snapshot.count_by_source(ItemSource::Learned), 1);
        assert_eq!(snapshot.count_by_source(ItemSource::Builtin), 3);
    }
}
