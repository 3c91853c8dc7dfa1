//! Cycle detection over the parent mapping.
//!
//! # Algorithm
//!
//! Because every node has at most one parent, following parents from any
//! node traces a single deterministic path. That path either ends (at a root,
//! or at a uid with no record of its own) or loops back onto itself, and it
//! can only revisit a node that lies on a cycle.
//!
//! For each start node not yet settled:
//!
//! 1. Walk `cur -> parent[cur] -> ...`, recording the walk in order together
//!    with each node's position for O(1) membership tests.
//! 2. If `cur` has no parent, the walk is acyclic: settle all of it.
//! 3. If `cur` is already settled, the walk joined a proven-acyclic chain:
//!    settle all of it.
//! 4. If `cur` is already in the current walk, the walk from its first
//!    position to the end is a cycle: return it.
//!
//! Each node is walked at most once per call, so detection is O(n). The
//! settled set lives only for one call; a graph reloaded after a write must
//! be checked from scratch.

use super::{Cycle, ParentMap};
use crate::domain::ManagerId;
use std::collections::{HashMap, HashSet};

/// Find one cycle in the parent mapping, or `None` if it is a forest.
///
/// The returned cycle starts at the first cycle member reached from the
/// first start node (in uid order) whose walk loops. With several disjoint
/// cycles only one is returned; callers that need all of them should repair
/// and reload, or use [`find_all_cycles`](super::find_all_cycles).
pub fn find_cycle(parent: &ParentMap) -> Option<Cycle> {
    let mut settled: HashSet<&ManagerId> = HashSet::new();

    for start in parent.keys() {
        if settled.contains(start) {
            continue;
        }

        let mut walk: Vec<&ManagerId> = Vec::new();
        let mut position: HashMap<&ManagerId, usize> = HashMap::new();
        let mut cur = start;

        loop {
            if settled.contains(cur) {
                break;
            }
            if let Some(&first) = position.get(cur) {
                let members = walk[first..].iter().map(|&id| id.clone()).collect();
                return Cycle::new(members);
            }

            position.insert(cur, walk.len());
            walk.push(cur);

            match parent.get(cur) {
                Some(next) => cur = next,
                None => break,
            }
        }

        settled.extend(walk);
    }

    None
}
