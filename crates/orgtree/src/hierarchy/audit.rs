//! Read-only cycle audit.
//!
//! Where the repair loop finds and breaks one cycle at a time, the audit
//! reports every cycle in a single pass and never writes. It builds a
//! `petgraph` graph from the parent mapping and runs Tarjan's strongly
//! connected components over it. In a functional graph each cyclic
//! component is exactly one cycle.

use super::{Cycle, HierarchyGraph, ParentMap};
use crate::domain::ManagerId;
use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::HashMap;

/// Summary of the hierarchy's structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// Records loaded.
    pub managers: usize,

    /// Reports-to edges.
    pub edges: usize,

    /// Records with no `reportsTo`.
    pub roots: usize,

    /// Records whose `reportsTo` names a uid with no record. Informational only.
    pub dangling: Vec<ManagerId>,

    /// Every cycle, ordered by entry uid.
    pub cycles: Vec<AuditedCycle>,
}

/// A cycle as reported by the audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditedCycle {
    /// Members, smallest uid first, in edge order.
    pub members: Cycle,

    /// Members rendered with display names.
    pub path: String,
}

impl AuditReport {
    /// `true` when no cycle was found.
    pub fn is_forest(&self) -> bool {
        self.cycles.is_empty()
    }
}

/// Build a petgraph view of the parent mapping. Edges run child -> parent.
fn to_digraph(parent: &ParentMap) -> DiGraph<&ManagerId, ()> {
    let mut graph = DiGraph::new();
    let mut index: HashMap<&ManagerId, NodeIndex> = HashMap::new();

    for (child, manager) in parent {
        let c = *index.entry(child).or_insert_with(|| graph.add_node(child));
        let m = *index.entry(manager).or_insert_with(|| graph.add_node(manager));
        graph.add_edge(c, m, ());
    }
    graph
}

/// `true` if the parent mapping contains no cycle.
pub fn is_forest(parent: &ParentMap) -> bool {
    !is_cyclic_directed(&to_digraph(parent))
}

/// Every cycle in the parent mapping.
///
/// Each cycle starts at its smallest uid and follows `reportsTo` edges.
/// Cycles are ordered by that first uid.
pub fn find_all_cycles(parent: &ParentMap) -> Vec<Cycle> {
    let graph = to_digraph(parent);
    let mut cycles = Vec::new();

    for component in tarjan_scc(&graph) {
        let cyclic = component.len() > 1
            || component
                .first()
                .is_some_and(|&n| graph.contains_edge(n, n));
        if !cyclic {
            continue;
        }

        let Some(start) = component.iter().map(|&n| graph[n]).min() else {
            continue;
        };

        let mut members = vec![start.clone()];
        let mut cur = start;
        while let Some(next) = parent.get(cur) {
            if next == start {
                break;
            }
            members.push(next.clone());
            cur = next;
        }
        cycles.extend(Cycle::new(members));
    }

    cycles.sort_by(|a, b| a.entry().cmp(b.entry()));
    cycles
}

/// Audit a loaded hierarchy.
pub fn audit(graph: &HierarchyGraph) -> AuditReport {
    let dangling = graph
        .parent
        .iter()
        .filter(|(_, manager)| !graph.nodes.contains(*manager))
        .map(|(child, _)| child.clone())
        .collect();

    let cycles = find_all_cycles(&graph.parent)
        .into_iter()
        .map(|members| AuditedCycle {
            path: members.display_path(graph),
            members,
        })
        .collect();

    AuditReport {
        managers: graph.node_count(),
        edges: graph.edge_count(),
        roots: graph
            .nodes
            .iter()
            .filter(|uid| !graph.parent.contains_key(*uid))
            .count(),
        dangling,
        cycles,
    }
}
