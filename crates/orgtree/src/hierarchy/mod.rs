//! The reports-to hierarchy and its cycle repair.
//!
//! # Graph Representation
//!
//! Every manager record may name one manager it reports to, so the hierarchy
//! is a *functional graph*: each node has out-degree at most one. Edges point
//! from a report to its manager (`child -> parent`). The graph is valid only
//! if it is a forest, i.e. every chain of `reportsTo` links ends at a root.
//!
//! A `reportsTo` naming a uid with no record of its own is tolerated: the
//! chain simply ends there, as if it had reached a root.
//!
//! # Repair
//!
//! - [`loader`] reads the managers collection into a [`HierarchyGraph`]
//! - [`detect`] finds one cycle by walking parent chains
//! - [`breaker`] removes the `reportsTo` edge of the cycle's entry node
//! - [`repair`] loops load/detect/break until no cycle is left
//! - [`audit`] reports every cycle at once without writing anything
//!
//! Every repair iteration removes exactly one edge and adds none, so the loop
//! runs at most as many times as the graph initially had edges.

pub mod audit;
pub mod breaker;
pub mod detect;
pub mod loader;
pub mod repair;

use crate::domain::ManagerId;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub use audit::{audit, find_all_cycles, is_forest, AuditReport, AuditedCycle};
pub use breaker::{break_cycle, Repair};
pub use detect::find_cycle;
pub use loader::load_graph;
pub use repair::{RepairLoop, RepairReport};

/// Child -> parent mapping; only nodes with a parent are keys.
///
/// Ordered by uid so traversal order is stable between runs.
pub type ParentMap = BTreeMap<ManagerId, ManagerId>;

/// In-memory view of the hierarchy, rebuilt from the store on every load.
#[derive(Debug, Clone, Default)]
pub struct HierarchyGraph {
    /// Reports-to edges.
    pub parent: ParentMap,

    /// Display names of nodes that have one.
    pub names: HashMap<ManagerId, String>,

    /// Every loaded record, including roots.
    pub nodes: BTreeSet<ManagerId>,
}

impl HierarchyGraph {
    /// Number of records loaded.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of reports-to edges.
    pub fn edge_count(&self) -> usize {
        self.parent.len()
    }

    /// Display name of a node, falling back to its uid.
    pub fn display_name<'a>(&'a self, uid: &'a ManagerId) -> &'a str {
        self.names.get(uid).map_or(uid.as_str(), String::as_str)
    }
}

/// A cycle in the hierarchy.
///
/// Lists each member once, starting at the entry point (the first member
/// reached during detection) and following `reportsTo` edges. The last
/// member reports to the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cycle(Vec<ManagerId>);

impl Cycle {
    /// Wrap a member list. Returns `None` for an empty list.
    pub fn new(members: Vec<ManagerId>) -> Option<Self> {
        if members.is_empty() {
            None
        } else {
            Some(Self(members))
        }
    }

    /// The entry point: the member whose edge gets removed.
    pub fn entry(&self) -> &ManagerId {
        &self.0[0]
    }

    /// Number of members (1 for a self-loop).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; cycles have at least one member.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Members in edge order.
    pub fn members(&self) -> &[ManagerId] {
        &self.0
    }

    /// Render as `Ada -> Bob -> Ada` using display names where known.
    pub fn display_path(&self, graph: &HierarchyGraph) -> String {
        self.0
            .iter()
            .chain(std::iter::once(self.entry()))
            .map(|uid| graph.display_name(uid))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::ParentMap;
    use crate::domain::ManagerId;

    /// Build a parent map from `(child, parent)` pairs.
    pub fn parents(edges: &[(&str, &str)]) -> ParentMap {
        edges
            .iter()
            .map(|&(child, parent)| (ManagerId::from(child), ManagerId::from(parent)))
            .collect()
    }

    /// Uids as owned ids.
    pub fn ids(uids: &[&str]) -> Vec<ManagerId> {
        uids.iter().copied().map(ManagerId::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ids;
    use super::*;

    #[test]
    fn empty_cycle_is_rejected() {
        assert!(Cycle::new(Vec::new()).is_none());
    }

    #[test]
    fn display_path_closes_the_loop_and_falls_back_to_uid() {
        let mut graph = HierarchyGraph::default();
        graph.names.insert(ManagerId::from("a"), "Ada".to_string());
        graph.names.insert(ManagerId::from("c"), "Cy".to_string());

        let cycle = Cycle::new(ids(&["a", "b", "c"])).unwrap();

        assert_eq!(cycle.display_path(&graph), "Ada -> b -> Cy -> Ada");
        assert_eq!(cycle.entry(), &ManagerId::from("a"));
    }

    #[test]
    fn self_loop_path() {
        let cycle = Cycle::new(ids(&["solo"])).unwrap();
        assert_eq!(cycle.display_path(&HierarchyGraph::default()), "solo -> solo");
        assert_eq!(cycle.len(), 1);
    }
}
