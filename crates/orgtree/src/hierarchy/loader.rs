//! Loading the hierarchy from the store.

use super::HierarchyGraph;
use crate::domain::ManagerNode;
use crate::error::{Error, Result};
use crate::store::DocumentStore;

/// Read every manager record and build the parent mapping and name lookup.
///
/// Always reads the whole collection; nothing is cached, because the repair
/// loop changes the store between loads.
///
/// # Errors
///
/// Returns [`Error::StoreRead`] if the collection cannot be read. There is
/// no partial result.
pub async fn load_graph(store: &dyn DocumentStore, collection: &str) -> Result<HierarchyGraph> {
    let documents = store
        .list(collection)
        .await
        .map_err(|source| Error::StoreRead {
            collection: collection.to_string(),
            source,
        })?;

    let mut graph = HierarchyGraph::default();

    for doc in &documents {
        let node = ManagerNode::from_document(doc);
        graph.nodes.insert(node.uid.clone());
        if let Some(name) = node.display_name {
            graph.names.insert(node.uid.clone(), name);
        }
        if let Some(parent) = node.reports_to {
            graph.parent.insert(node.uid, parent);
        }
    }

    tracing::debug!(
        collection,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Loaded hierarchy"
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ManagerId;
    use crate::store::{Document, InMemoryStore};

    #[tokio::test]
    async fn builds_parent_map_and_names() {
        let store = InMemoryStore::seeded(
            "managers",
            [
                Document::new("ceo").with_field("displayName", "Grace"),
                Document::new("cto")
                    .with_field("displayName", "Linus")
                    .with_field("reportsTo", "ceo"),
                Document::new("dev").with_field("reportsTo", "cto"),
            ],
        );

        let graph = load_graph(&store, "managers").await.unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.parent[&ManagerId::from("dev")], ManagerId::from("cto"));
        assert!(!graph.parent.contains_key(&ManagerId::from("ceo")));
        assert_eq!(graph.display_name(&ManagerId::from("cto")), "Linus");
        assert_eq!(graph.display_name(&ManagerId::from("dev")), "dev");
    }

    #[tokio::test]
    async fn dangling_reference_is_kept_as_an_edge() {
        let store = InMemoryStore::seeded(
            "managers",
            [Document::new("a").with_field("reportsTo", "ghost")],
        );

        let graph = load_graph(&store, "managers").await.unwrap();

        assert_eq!(graph.parent[&ManagerId::from("a")], ManagerId::from("ghost"));
    }

    #[tokio::test]
    async fn read_failure_is_store_read_error() {
        let store = InMemoryStore::new();
        let err = load_graph(&store, "not a collection").await.unwrap_err();
        assert!(matches!(err, Error::StoreRead { .. }));
    }
}
