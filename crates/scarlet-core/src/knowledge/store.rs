//! Sled-backed record store with one tree per record kind.
//!
//! | Tree            | Key                                  | Value                 |
//! |-----------------|--------------------------------------|-----------------------|
//! | `catalog`       | sled-generated id (big-endian `u64`) | [`CatalogEntry`] JSON |
//! | `learned`       | sled-generated id (big-endian `u64`) | [`LearnedTerm`] JSON  |
//! | `learned_index` | trimmed, lowercased term             | id into `learned`     |
//!
//! Both record trees scan in insertion order. Relearning a term overwrites its row in place,
//! so it keeps its original position.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, IVec, Transactional};
use std::path::Path;

use super::RecordSource;
use crate::KnowledgeError;

const CATALOG_TREE: &str = "catalog";
const LEARNED_TREE: &str = "learned";
const LEARNED_INDEX_TREE: &str = "learned_index";

/// A product in the store catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
}

impl CatalogEntry {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category: category.into(),
        }
    }
}

/// A term the assistant was taught, with its definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedTerm {
    pub term: String,
    pub definition: String,
}

impl LearnedTerm {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
        }
    }
}

fn learned_key(term: &str) -> String {
    term.trim().to_lowercase()
}

fn store_error(e: TransactionError<()>) -> KnowledgeError {
    match e {
        TransactionError::Storage(e) => KnowledgeError::Store(e),
        TransactionError::Abort(()) => KnowledgeError::Invalid("transaction aborted".into()),
    }
}

/// Record store for catalog entries and learned terms.
pub struct KnowledgeStore {
    db: Db,
}

impl KnowledgeStore {
    /// Opens or creates the store at the given path.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, KnowledgeError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Appends a catalog entry. Entries without a name are rejected.
    pub fn insert_catalog_entry(&self, entry: &CatalogEntry) -> Result<(), KnowledgeError> {
        if entry.name.trim().is_empty() {
            return Err(KnowledgeError::Invalid("catalog entry name is empty".into()));
        }
        let tree = self.db.open_tree(CATALOG_TREE)?;
        let id = self.db.generate_id()?;
        let bytes = serde_json::to_vec(entry).map_err(|source| KnowledgeError::Malformed {
            tree: CATALOG_TREE,
            source,
        })?;
        tree.insert(id.to_be_bytes(), bytes)?;
        tracing::info!(
            target: "scarlet::knowledge",
            tree = CATALOG_TREE,
            name = %entry.name,
            category = %entry.category,
            "catalog entry '{}' inserted",
            entry.name
        );
        Ok(())
    }

    /// Stores `term`, replacing any earlier definition of the same term.
    /// Returns the previous definition if there was one.
    pub fn learn_term(&self, term: &LearnedTerm) -> Result<Option<LearnedTerm>, KnowledgeError> {
        let key = learned_key(&term.term);
        if key.is_empty() {
            return Err(KnowledgeError::Invalid("learned term is empty".into()));
        }
        let record = LearnedTerm::new(term.term.trim(), term.definition.trim());
        let bytes = serde_json::to_vec(&record).map_err(|source| KnowledgeError::Malformed {
            tree: LEARNED_TREE,
            source,
        })?;
        let rows = self.db.open_tree(LEARNED_TREE)?;
        let index = self.db.open_tree(LEARNED_INDEX_TREE)?;
        let fresh_id = self.db.generate_id()?.to_be_bytes();

        let prev = (&rows, &index)
            .transaction(|(rows, index)| {
                let id = match index.get(key.as_bytes())? {
                    Some(id) => id,
                    None => {
                        index.insert(key.as_bytes(), &fresh_id[..])?;
                        IVec::from(&fresh_id[..])
                    }
                };
                let prev = rows.insert(id, bytes.as_slice())?;
                Ok::<_, ConflictableTransactionError<()>>(prev)
            })
            .map_err(store_error)?;

        tracing::info!(
            target: "scarlet::knowledge",
            tree = LEARNED_TREE,
            term = %key,
            action = if prev.is_some() { "UPDATE" } else { "INSERT" },
            "learned term '{}' {}",
            key,
            if prev.is_some() { "updated" } else { "inserted" }
        );
        Ok(prev.and_then(|iv| serde_json::from_slice(&iv).ok()))
    }

    /// Removes a learned term. Returns the removed record if present.
    pub fn forget_term(&self, term: &str) -> Result<Option<LearnedTerm>, KnowledgeError> {
        let key = learned_key(term);
        let rows = self.db.open_tree(LEARNED_TREE)?;
        let index = self.db.open_tree(LEARNED_INDEX_TREE)?;
        let prev = (&rows, &index)
            .transaction(|(rows, index)| {
                let prev = match index.remove(key.as_bytes())? {
                    Some(id) => rows.remove(id)?,
                    None => None,
                };
                Ok::<_, ConflictableTransactionError<()>>(prev)
            })
            .map_err(store_error)?;
        if prev.is_some() {
            tracing::info!(target: "scarlet::knowledge", term = %key, action = "REMOVE", "learned term '{}' removed", key);
        }
        Ok(prev.and_then(|iv| serde_json::from_slice(&iv).ok()))
    }

    pub fn catalog_count(&self) -> Result<usize, KnowledgeError> {
        Ok(self.db.open_tree(CATALOG_TREE)?.len())
    }

    pub fn learned_count(&self) -> Result<usize, KnowledgeError> {
        Ok(self.db.open_tree(LEARNED_TREE)?.len())
    }

    /// Deserializes every row of `tree`, skipping rows that do not parse.
    fn scan_rows<T: DeserializeOwned>(&self, tree: &'static str) -> Result<Vec<T>, KnowledgeError> {
        let handle = self.db.open_tree(tree)?;
        let mut out = Vec::new();
        for row in handle.iter() {
            let (key, value) = row?;
            match serde_json::from_slice::<T>(&value) {
                Ok(record) => out.push(record),
                Err(source) => {
                    let err = KnowledgeError::Malformed { tree, source };
                    tracing::warn!(
                        target: "scarlet::knowledge",
                        key = ?key.as_ref(),
                        "skipping row: {}",
                        err
                    );
                }
            }
        }
        Ok(out)
    }

    #[cfg(test)]
    fn insert_raw(&self, tree: &str, key: &[u8], value: &[u8]) -> Result<(), KnowledgeError> {
        self.db.open_tree(tree)?.insert(key, value)?;
        Ok(())
    }
}

impl RecordSource for KnowledgeStore {
    fn catalog_entries(&self) -> Result<Vec<CatalogEntry>, KnowledgeError> {
        self.scan_rows(CATALOG_TREE)
    }

    fn learned_terms(&self) -> Result<Vec<LearnedTerm>, KnowledgeError> {
        self.scan_rows(LEARNED_TREE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, KnowledgeStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::open_path(dir.path().join("kb")).unwrap();
        (dir, store)
    }

    #[test]
    fn catalog_entries_keep_insertion_order() {
        let (_dir, store) = temp_store();
        store
            .insert_catalog_entry(&CatalogEntry::new("Zeta Launcher", "game launcher", "software"))
            .unwrap();
        store
            .insert_catalog_entry(&CatalogEntry::new("Alpha Toolkit", "modding toolkit", "software"))
            .unwrap();
        let names: Vec<String> = store
            .catalog_entries()
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Zeta Launcher", "Alpha Toolkit"]);
        assert_eq!(store.catalog_count().unwrap(), 2);
    }

    #[test]
    fn relearning_a_term_replaces_definition() {
        let (_dir, store) = temp_store();
        assert!(store.learn_term(&LearnedTerm::new("HWID", "hardware id")).unwrap().is_none());
        let prev = store
            .learn_term(&LearnedTerm::new(" hwid ", "hardware identifier"))
            .unwrap();
        assert_eq!(prev.map(|p| p.definition), Some("hardware id".to_string()));
        let terms = store.learned_terms().unwrap();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].definition, "hardware identifier");
    }

    #[test]
    fn learned_terms_keep_insertion_order() {
        let (_dir, store) = temp_store();
        for term in ["zeta", "alpha", "mid"] {
            store.learn_term(&LearnedTerm::new(term, "x")).unwrap();
        }
        store.learn_term(&LearnedTerm::new("ZETA", "updated")).unwrap();
        let terms: Vec<(String, String)> = store
            .learned_terms()
            .unwrap()
            .into_iter()
            .map(|t| (t.term, t.definition))
            .collect();
        assert_eq!(
            terms,
            vec![
                ("ZETA".to_string(), "updated".to_string()),
                ("alpha".to_string(), "x".to_string()),
                ("mid".to_string(), "x".to_string()),
            ]
        );
    }

    #[test]
    fn learned_fields_are_stored_trimmed() {
        let (_dir, store) = temp_store();
        store
            .learn_term(&LearnedTerm::new("  zeta \t", "  last letter \n"))
            .unwrap();
        assert_eq!(
            store.learned_terms().unwrap(),
            vec![LearnedTerm::new("zeta", "last letter")]
        );
    }

    #[test]
    fn forget_term_removes_it() {
        let (_dir, store) = temp_store();
        store.learn_term(&LearnedTerm::new("license", "activation key")).unwrap();
        assert!(store.forget_term("LICENSE").unwrap().is_some());
        assert!(store.forget_term("license").unwrap().is_none());
        assert_eq!(store.learned_count().unwrap(), 0);

        // relearning after forget starts a fresh row
        store.learn_term(&LearnedTerm::new("license", "serial")).unwrap();
        assert_eq!(store.learned_count().unwrap(), 1);
    }

    #[test]
    fn blank_records_are_rejected() {
        let (_dir, store) = temp_store();
        assert!(matches!(
            store.learn_term(&LearnedTerm::new("   ", "nothing")),
            Err(KnowledgeError::Invalid(_))
        ));
        assert!(matches!(
            store.insert_catalog_entry(&CatalogEntry::new("", "x", "y")),
            Err(KnowledgeError::Invalid(_))
        ));
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let (_dir, store) = temp_store();
        store.learn_term(&LearnedTerm::new("loader", "the launcher")).unwrap();
        store.insert_raw(LEARNED_TREE, b"broken", b"not json").unwrap();
        let terms = store.learned_terms().unwrap();
        assert_eq!(terms, vec![LearnedTerm::new("loader", "the launcher")]);
    }
}
