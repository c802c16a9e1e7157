//! In-memory extraction store with duplicate detection.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

use crate::schema::Extraction;

/// Outcome of [`ExtractionStore::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Stored { id: String },
    /// Same document type and unique key as an extraction already stored.
    Duplicate { existing_id: String },
}

/// Shared, cloneable extraction store.
///
/// Records are kept in insertion order so listings can be served newest first.
#[derive(Debug, Clone, Default)]
pub struct ExtractionStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    by_id: HashMap<String, Extraction>,
    order: Vec<String>,
}

impl ExtractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an extraction unless another of the same type carries the same
    /// unique key. Extractions without a key are always stored.
    pub fn insert(&self, extraction: Extraction) -> InsertOutcome {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(key) = extraction.unique_key.as_deref() {
            let existing = inner.by_id.values().find(|e| {
                e.doc_type == extraction.doc_type && e.unique_key.as_deref() == Some(key)
            });
            if let Some(existing) = existing {
                info!(
                    "ExtractionStore: duplicate {} '{}' (existing {})",
                    extraction.doc_type, key, existing.id
                );
                return InsertOutcome::Duplicate {
                    existing_id: existing.id.clone(),
                };
            }
        }

        let id = extraction.id.clone();
        info!(
            "ExtractionStore: stored {} {} ({} fields)",
            extraction.doc_type,
            id,
            extraction.fields.len()
        );
        inner.order.push(id.clone());
        inner.by_id.insert(id.clone(), extraction);
        InsertOutcome::Stored { id }
    }

    pub fn get(&self, id: &str) -> Option<Extraction> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.by_id.get(id).cloned()
    }

    /// All stored extractions, newest first.
    pub fn list(&self) -> Vec<Extraction> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .order
            .iter()
            .rev()
            .filter_map(|id| inner.by_id.get(id).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::DocumentType;
    use crate::fields::{labels, FieldMap};

    fn pan(number: &str) -> Extraction {
        let mut fields = FieldMap::new();
        fields.insert(labels::PAN_NUMBER, number);
        Extraction::new(DocumentType::Pan, fields, number)
    }

    #[test]
    fn test_store_and_get() {
        let store = ExtractionStore::new();
        let e = pan("ABCDE1234F");
        let id = e.id.clone();
        assert_eq!(store.insert(e), InsertOutcome::Stored { id: id.clone() });
        assert_eq!(store.get(&id).map(|e| e.doc_type), Some(DocumentType::Pan));
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_reports_existing_id() {
        let store = ExtractionStore::new();
        let first = pan("ABCDE1234F");
        let first_id = first.id.clone();
        store.insert(first);

        let outcome = store.insert(pan("abcde 1234-f"));
        assert_eq!(outcome, InsertOutcome::Duplicate { existing_id: first_id });
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_same_key_different_type_is_not_duplicate() {
        let store = ExtractionStore::new();
        store.insert(pan("ABCDE1234F"));

        let mut fields = FieldMap::new();
        fields.insert(labels::DL_NUMBER, "ABCDE1234F");
        let dl = Extraction::new(DocumentType::Dl, fields, "");
        assert!(matches!(store.insert(dl), InsertOutcome::Stored { .. }));
    }

    #[test]
    fn test_keyless_always_stored_newest_first() {
        let store = ExtractionStore::new();
        let a = Extraction::new(DocumentType::Unknown, FieldMap::new(), "a");
        let b = Extraction::new(DocumentType::Unknown, FieldMap::new(), "a");
        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        store.insert(a);
        store.insert(b);

        let ids: Vec<String> = store.list().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![b_id, a_id]);
    }
}
