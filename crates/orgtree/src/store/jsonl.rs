//! JSONL-backed document store.
//!
//! Each collection is a file `<data-dir>/<collection>.jsonl` holding one
//! document per line. A collection file that does not exist is an empty
//! collection.
//!
//! # Read and write paths
//!
//! - **Reads** are resilient: malformed lines, including lines that are not
//!   valid UTF-8, are skipped and logged, so one bad record never hides the
//!   rest of the hierarchy. A read that stops before the end of the file is
//!   an error, never a shorter collection.
//! - **Writes** re-read the collection strictly. If any line is malformed the
//!   write fails instead of rewriting the file without it. The patched
//!   collection is then written to a temp file and renamed into place, so
//!   every write is atomic.
//!
//! If an id appears on more than one line the last occurrence wins, and a
//! write collapses the duplicates.

use super::{
    merge_fields, validate_collection, validate_document, Document, DocumentPatch, DocumentStore,
};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use orgtree_jsonl::{read_jsonl, read_jsonl_resilient, write_jsonl_atomic, WarningKind};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File extension of collection files.
pub const COLLECTION_EXTENSION: &str = "jsonl";

/// Document store persisting collections as JSONL files.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    root: PathBuf,
}

impl JsonlStore {
    /// Open a store rooted at an existing data directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DataDirMissing`] if `root` is not a directory.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        match tokio::fs::metadata(&root).await {
            Ok(meta) if meta.is_dir() => {
                tracing::debug!(root = %root.display(), "Opened JSONL store");
                Ok(Self { root })
            }
            _ => Err(StoreError::DataDirMissing(root)),
        }
    }

    /// The data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing a collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidCollection`] for names that are not plain identifiers.
    pub fn collection_path(&self, collection: &str) -> StoreResult<PathBuf> {
        validate_collection(collection)?;
        Ok(self
            .root
            .join(format!("{collection}.{COLLECTION_EXTENSION}")))
    }

    /// Strictly load a collection for rewriting.
    async fn load_for_write(&self, path: &Path) -> StoreResult<Vec<Document>> {
        if !tokio::fs::try_exists(path).await? {
            return Ok(Vec::new());
        }
        let docs: Vec<Document> = read_jsonl(path).await?;
        Ok(dedupe_last_wins(docs))
    }
}

/// Keep the last occurrence of each id, in first-seen position.
fn dedupe_last_wins(docs: Vec<Document>) -> Vec<Document> {
    let mut position: HashMap<String, usize> = HashMap::with_capacity(docs.len());
    let mut unique: Vec<Document> = Vec::with_capacity(docs.len());
    for doc in docs {
        if let Some(&i) = position.get(&doc.id) {
            tracing::warn!(id = %doc.id, "Duplicate document id; keeping the later record");
            unique[i] = doc;
        } else {
            position.insert(doc.id.clone(), unique.len());
            unique.push(doc);
        }
    }
    unique
}

#[async_trait]
impl DocumentStore for JsonlStore {
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let path = self.collection_path(collection)?;
        if !tokio::fs::try_exists(&path).await? {
            tracing::debug!(collection, "Collection file absent; treating as empty");
            return Ok(Vec::new());
        }

        let (docs, warnings) = read_jsonl_resilient::<Document, _>(&path).await?;
        for warning in &warnings {
            if warning.kind() == WarningKind::ReadFailed {
                return Err(StoreError::IncompleteRead {
                    collection: collection.to_string(),
                    detail: warning.to_string(),
                });
            }
            tracing::warn!(collection, %warning, "Skipped unreadable record");
        }
        Ok(dedupe_last_wins(docs))
    }

    async fn update(
        &mut self,
        collection: &str,
        id: &str,
        patch: &DocumentPatch,
    ) -> StoreResult<()> {
        let path = self.collection_path(collection)?;
        let mut docs = self.load_for_write(&path).await?;

        let doc = docs
            .iter_mut()
            .find(|doc| doc.id == id)
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        patch.apply(&mut doc.fields);

        write_jsonl_atomic(&path, &docs).await?;
        tracing::debug!(collection, id, "Updated document");
        Ok(())
    }

    async fn set(&mut self, collection: &str, document: Document, merge: bool) -> StoreResult<()> {
        let path = self.collection_path(collection)?;
        validate_document(collection, &document)?;
        let mut docs = self.load_for_write(&path).await?;
        let id = document.id.clone();

        match docs.iter_mut().find(|doc| doc.id == document.id) {
            Some(existing) => merge_fields(&mut existing.fields, document.fields, merge),
            None => docs.push(document),
        }

        write_jsonl_atomic(&path, &docs).await?;
        tracing::debug!(collection, id = %id, merge, "Set document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    async fn store_with(collection: &str, contents: &str) -> (TempDir, JsonlStore) {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join(format!("{collection}.jsonl")), contents)
            .await
            .unwrap();
        let store = JsonlStore::open(dir.path()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn open_rejects_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = JsonlStore::open(dir.path().join("nope")).await.unwrap_err();
        assert!(matches!(err, StoreError::DataDirMissing(_)));
    }

    #[tokio::test]
    async fn absent_collection_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::open(dir.path()).await.unwrap();
        assert!(store.list("managers").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_skips_malformed_lines() {
        let (_dir, store) = store_with(
            "managers",
            "{\"id\":\"a\",\"reportsTo\":\"b\"}\nnot json\n{\"id\":\"b\"}\n",
        )
        .await;

        let ids: Vec<String> = store
            .list("managers")
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn list_reads_past_invalid_utf8_line() {
        let dir = TempDir::new().unwrap();
        let mut contents = b"{\"id\":\"a\"}\n".to_vec();
        contents.extend_from_slice(b"\xff\xfe\n");
        contents.extend_from_slice(b"{\"id\":\"x\",\"reportsTo\":\"y\"}\n");
        contents.extend_from_slice(b"{\"id\":\"y\",\"reportsTo\":\"x\"}\n");
        tokio::fs::write(dir.path().join("managers.jsonl"), contents)
            .await
            .unwrap();
        let mut store = JsonlStore::open(dir.path()).await.unwrap();

        let ids: Vec<String> = store
            .list("managers")
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, ["a", "x", "y"]);

        let err = store
            .update("managers", "x", &DocumentPatch::new().delete("reportsTo"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Jsonl(_)));
    }

    #[test]
    fn incomplete_read_names_the_collection() {
        let err = StoreError::IncompleteRead {
            collection: "managers".to_string(),
            detail: "line 3: read failed: broken pipe".to_string(),
        };
        assert!(err.to_string().contains("'managers'"));
    }

    #[tokio::test]
    async fn update_deletes_field_and_keeps_others() {
        let (dir, mut store) = store_with(
            "managers",
            "{\"id\":\"a\",\"displayName\":\"Ada\",\"reportsTo\":\"b\",\"team\":\"core\"}\n{\"id\":\"b\",\"reportsTo\":\"a\"}\n",
        )
        .await;

        store
            .update(
                "managers",
                "a",
                &DocumentPatch::new()
                    .delete("reportsTo")
                    .set("updatedAt", "2026-01-01T00:00:00.000Z"),
            )
            .await
            .unwrap();

        let text = tokio::fs::read_to_string(dir.path().join("managers.jsonl"))
            .await
            .unwrap();
        let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(
            first,
            json!({"id": "a", "displayName": "Ada", "team": "core", "updatedAt": "2026-01-01T00:00:00.000Z"})
        );
        let second: serde_json::Value = serde_json::from_str(text.lines().nth(1).unwrap()).unwrap();
        assert_eq!(second, json!({"id": "b", "reportsTo": "a"}));
    }

    #[tokio::test]
    async fn update_refuses_to_rewrite_corrupt_collection() {
        let (dir, mut store) = store_with("managers", "{\"id\":\"a\",\"reportsTo\":\"a\"}\n{oops\n").await;

        let result = store
            .update("managers", "a", &DocumentPatch::new().delete("reportsTo"))
            .await;

        assert!(matches!(result, Err(StoreError::Jsonl(_))));
        let text = tokio::fs::read_to_string(dir.path().join("managers.jsonl"))
            .await
            .unwrap();
        assert!(text.contains("{oops"));
    }

    #[tokio::test]
    async fn update_missing_document_is_not_found() {
        let (_dir, mut store) = store_with("managers", "{\"id\":\"a\"}\n").await;
        let err = store
            .update("managers", "b", &DocumentPatch::new().delete("reportsTo"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DocumentNotFound { .. }));
    }

    #[tokio::test]
    async fn set_creates_collection_and_merges() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonlStore::open(dir.path()).await.unwrap();

        store
            .set("users", Document::new("p1").with_field("role", "admin").with_field("email", "a@b.io"), false)
            .await
            .unwrap();
        store
            .set("users", Document::new("p1").with_field("role", "owner"), true)
            .await
            .unwrap();

        let doc = store.get("users", "p1").await.unwrap().unwrap();
        assert_eq!(doc.str_field("role"), Some("owner"));
        assert_eq!(doc.str_field("email"), Some("a@b.io"));
    }

    #[tokio::test]
    async fn duplicate_ids_last_wins() {
        let (_dir, store) = store_with(
            "managers",
            "{\"id\":\"a\",\"reportsTo\":\"x\"}\n{\"id\":\"b\"}\n{\"id\":\"a\",\"reportsTo\":\"y\"}\n",
        )
        .await;

        let docs = store.list("managers").await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].str_field("reportsTo"), Some("y"));
    }

    #[tokio::test]
    async fn path_traversal_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::open(dir.path()).await.unwrap();
        assert!(matches!(
            store.list("../secrets").await,
            Err(StoreError::InvalidCollection(_))
        ));
    }
}
