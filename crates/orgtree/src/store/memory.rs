//! In-memory document store.
//!
//! Collections live in RAM behind `Arc<Mutex<..>>`; clones share the same
//! data, so a test can hand one clone to the code under test and inspect the
//! other afterwards. Documents within a collection are kept ordered by id.

use super::{
    merge_fields, validate_collection, validate_document, Document, DocumentPatch, DocumentStore,
};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

type Collection = BTreeMap<String, Map<String, Value>>;

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<String, Collection>,
    writes: usize,
}

/// Thread-safe in-memory store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with one pre-populated collection.
    ///
    /// Seeding does not count as a write.
    pub fn seeded<I>(collection: &str, documents: I) -> Self
    where
        I: IntoIterator<Item = Document>,
    {
        let docs = documents
            .into_iter()
            .map(|doc| (doc.id, doc.fields))
            .collect();
        let mut collections = HashMap::new();
        collections.insert(collection.to_string(), docs);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                collections,
                writes: 0,
            })),
        }
    }

    /// Copy the given collections out of another store.
    ///
    /// The copy is fully detached: writes to it never reach `source`.
    ///
    /// # Errors
    ///
    /// Propagates any read error from `source`.
    pub async fn snapshot_of(source: &dyn DocumentStore, collections: &[&str]) -> StoreResult<Self> {
        let mut copied = HashMap::new();
        for &name in collections {
            let docs = source
                .list(name)
                .await?
                .into_iter()
                .map(|doc| (doc.id, doc.fields))
                .collect();
            copied.insert(name.to_string(), docs);
        }
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                collections: copied,
                writes: 0,
            })),
        })
    }

    /// Number of successful `update`/`set` calls so far.
    pub async fn write_count(&self) -> usize {
        self.inner.lock().await.writes
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        validate_collection(collection)?;
        let inner = self.inner.lock().await;
        Ok(inner
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        validate_collection(collection)?;
        let inner = self.inner.lock().await;
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn update(
        &mut self,
        collection: &str,
        id: &str,
        patch: &DocumentPatch,
    ) -> StoreResult<()> {
        validate_collection(collection)?;
        let mut inner = self.inner.lock().await;
        let fields = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        patch.apply(fields);
        inner.writes += 1;
        Ok(())
    }

    async fn set(&mut self, collection: &str, document: Document, merge: bool) -> StoreResult<()> {
        validate_collection(collection)?;
        validate_document(collection, &document)?;
        let mut inner = self.inner.lock().await;
        let existing = inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .entry(document.id)
            .or_default();
        merge_fields(existing, document.fields, merge);
        inner.writes += 1;
        Ok(())
    }
}
