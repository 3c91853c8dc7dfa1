//! Document store abstraction.
//!
//! Manager records, profiles, and accounts all live in an external document
//! store: named collections of JSON documents keyed by id. The rest of the
//! crate only talks to the [`DocumentStore`] trait, so the hierarchy core can
//! run against a file-backed store in production and an in-memory one in
//! tests and dry runs.
//!
//! # Backends
//!
//! - [`InMemoryStore`]: collections held in RAM, shareable by cloning
//! - [`JsonlStore`]: one `<collection>.jsonl` file per collection
//!
//! # Example
//!
//! ```no_run
//! use orgtree::store::{open_store, Document, DocumentPatch, StoreBackend};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut store = open_store(StoreBackend::Jsonl("data".into())).await?;
//!
//!     store
//!         .set("managers", Document::new("u1").with_field("displayName", "Ada"), false)
//!         .await?;
//!     store
//!         .update("managers", "u1", &DocumentPatch::new().delete("reportsTo"))
//!         .await?;
//!
//!     for doc in store.list("managers").await? {
//!         println!("{}", doc.id);
//!     }
//!     Ok(())
//! }
//! ```

use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlStore;
pub use memory::InMemoryStore;

/// A JSON document: an id plus arbitrary fields.
///
/// Serialized as a single object whose `id` key holds the document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document id, unique within its collection.
    pub id: String,

    /// Every other field of the document.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Create an empty document.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Create a document from a JSON object. Non-object values yield no fields.
    pub fn from_value(id: impl Into<String>, value: Value) -> Self {
        let fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Builder-style field assignment.
    #[must_use]
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Read a string field.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// Field changes applied atomically to one existing document.
///
/// Deletions remove the key entirely; they never leave a `null` behind.
/// Deletions are applied before assignments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    set: Map<String, Value>,
    delete: Vec<String>,
}

impl DocumentPatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a field.
    #[must_use]
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set.insert(name.to_string(), value.into());
        self
    }

    /// Remove a field.
    #[must_use]
    pub fn delete(mut self, name: &str) -> Self {
        self.delete.push(name.to_string());
        self
    }

    /// Apply the patch to a document's fields.
    pub fn apply(&self, fields: &mut Map<String, Value>) {
        for name in &self.delete {
            fields.remove(name);
        }
        for (name, value) in &self.set {
            fields.insert(name.clone(), value.clone());
        }
    }
}

/// Merge or replace `existing` with `incoming`, following [`DocumentStore::set`].
pub(crate) fn merge_fields(existing: &mut Map<String, Value>, incoming: Map<String, Value>, merge: bool) {
    if merge {
        existing.extend(incoming);
    } else {
        *existing = incoming;
    }
}

/// Core document store trait.
///
/// Implementations must be `Send + Sync` so a boxed store can be held by the
/// async CLI runtime. Every write is atomic at the granularity of one
/// document; there are no multi-document transactions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List every document in a collection.
    ///
    /// A collection that has never been written is empty, not an error.
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Get one document by id. Returns `None` if it doesn't exist.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        Ok(self
            .list(collection)
            .await?
            .into_iter()
            .find(|doc| doc.id == id))
    }

    /// Apply a patch to an existing document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentNotFound`] if the document doesn't exist;
    /// update never creates documents.
    async fn update(&mut self, collection: &str, id: &str, patch: &DocumentPatch)
    -> StoreResult<()>;

    /// Create or overwrite a document.
    ///
    /// With `merge`, the given fields are merged into an existing document
    /// and fields not mentioned are kept.
    async fn set(&mut self, collection: &str, document: Document, merge: bool) -> StoreResult<()>;
}

/// Available storage backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-memory storage (ephemeral)
    InMemory,

    /// JSONL files in the given data directory (persistent)
    Jsonl(PathBuf),
}

/// Open a store for the given backend.
///
/// # Errors
///
/// Returns [`StoreError::DataDirMissing`] if a JSONL data directory does not exist.
pub async fn open_store(backend: StoreBackend) -> StoreResult<Box<dyn DocumentStore>> {
    match backend {
        StoreBackend::InMemory => Ok(Box::new(InMemoryStore::new())),
        StoreBackend::Jsonl(root) => Ok(Box::new(JsonlStore::open(root).await?)),
    }
}

/// Check that a collection name is a plain identifier.
///
/// Keeps file-backed stores from escaping their data directory.
pub(crate) fn validate_collection(collection: &str) -> StoreResult<()> {
    let valid = !collection.is_empty()
        && collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection(collection.to_string()))
    }
}

/// Reject documents that can't be keyed: an empty id, or an `id` field
/// shadowing the document id.
pub(crate) fn validate_document(collection: &str, document: &Document) -> StoreResult<()> {
    let message = if document.id.is_empty() {
        "document id must not be empty"
    } else if document.fields.contains_key("id") {
        "document fields must not contain 'id'"
    } else {
        return Ok(());
    };
    Err(StoreError::InvalidDocument {
        collection: collection.to_string(),
        message: message.to_string(),
    })
}
