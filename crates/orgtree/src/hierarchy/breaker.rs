//! Breaking a detected cycle.

use super::{Cycle, HierarchyGraph};
use crate::domain::{timestamp, ManagerId, REPORTS_TO_FIELD, UPDATED_AT_FIELD};
use crate::error::{Error, Result};
use crate::store::{DocumentPatch, DocumentStore};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One edge removal performed to break a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repair {
    /// The cycle as detected, entry point first.
    pub cycle: Cycle,

    /// The cycle rendered with display names, e.g. `Ada -> Bob -> Ada`.
    pub path: String,

    /// The node promoted to root.
    pub promoted: ManagerId,

    /// Display name of the promoted node (its uid if it has none).
    pub promoted_name: String,

    /// The manager the promoted node used to report to.
    pub previous_parent: ManagerId,

    /// Timestamp written to the promoted record.
    pub updated_at: DateTime<Utc>,
}

/// Promote the cycle's entry point to a root.
///
/// Deletes the `reportsTo` field of `cycle.entry()` and stamps `updatedAt`
/// in a single document write. No other record is touched, including the
/// other members of the cycle.
///
/// # Errors
///
/// Returns [`Error::StoreWrite`] if the write fails; the store then still
/// contains the cycle.
pub async fn break_cycle(
    store: &mut dyn DocumentStore,
    collection: &str,
    graph: &HierarchyGraph,
    cycle: &Cycle,
    at: DateTime<Utc>,
) -> Result<Repair> {
    let promoted = cycle.entry().clone();
    let previous_parent = cycle.members()[1 % cycle.len()].clone();

    let patch = DocumentPatch::new()
        .delete(REPORTS_TO_FIELD)
        .set(UPDATED_AT_FIELD, timestamp(at));

    store
        .update(collection, promoted.as_str(), &patch)
        .await
        .map_err(|source| Error::StoreWrite {
            collection: collection.to_string(),
            id: promoted.to_string(),
            source,
        })?;

    Ok(Repair {
        path: cycle.display_path(graph),
        promoted_name: graph.display_name(&promoted).to_string(),
        cycle: cycle.clone(),
        promoted,
        previous_parent,
        updated_at: at,
    })
}
