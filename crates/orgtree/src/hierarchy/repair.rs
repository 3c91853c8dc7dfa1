//! The repair loop: load, detect, break, repeat.

use super::{break_cycle, find_cycle, load_graph, Repair};
use crate::error::Result;
use crate::store::DocumentStore;
use chrono::Utc;
use serde::Serialize;

/// Outcome of a completed repair run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    /// Number of edges removed (one per cycle broken).
    pub fixed: usize,

    /// Edge count of the hierarchy when the run started; an upper bound on `fixed`.
    pub initial_edges: usize,

    /// Every repair, in the order performed.
    pub repairs: Vec<Repair>,
}

/// Drives the hierarchy to an acyclic fixed point.
///
/// Each iteration reloads the graph from the store, so detection never sees
/// state that an earlier write has invalidated. The loop ends when a fresh
/// load contains no cycle. Any load or write failure aborts the run; every
/// write already made stays in place, each being a complete edge removal.
///
/// There is no locking between a load and the write that follows it. A
/// concurrent writer changing the same record in between can have its
/// change overwritten.
pub struct RepairLoop<'a> {
    store: &'a mut dyn DocumentStore,
    collection: String,
}

impl<'a> RepairLoop<'a> {
    /// Create a loop over the managers collection of `store`.
    pub fn new(store: &'a mut dyn DocumentStore, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Run to completion.
    ///
    /// # Errors
    ///
    /// Returns the first [`Error::StoreRead`](crate::error::Error::StoreRead) or
    /// [`Error::StoreWrite`](crate::error::Error::StoreWrite) encountered.
    pub async fn run(&mut self) -> Result<RepairReport> {
        self.run_with(|_| {}).await
    }

    /// Run to completion, calling `observer` after each repair is persisted.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub async fn run_with<F>(&mut self, mut observer: F) -> Result<RepairReport>
    where
        F: FnMut(&Repair),
    {
        let mut report = RepairReport::default();

        loop {
            let graph = load_graph(&*self.store, &self.collection).await?;
            if report.repairs.is_empty() {
                report.initial_edges = graph.edge_count();
            }

            let Some(cycle) = find_cycle(&graph.parent) else {
                tracing::info!(fixed = report.fixed, "Hierarchy is acyclic");
                return Ok(report);
            };

            tracing::debug!(length = cycle.len(), entry = %cycle.entry(), "Detected cycle");
            let repair =
                break_cycle(&mut *self.store, &self.collection, &graph, &cycle, Utc::now()).await?;
            report.fixed += 1;

            tracing::info!(
                path = %repair.path,
                promoted = %repair.promoted,
                "Broke cycle"
            );
            observer(&repair);
            report.repairs.push(repair);
        }
    }
}
