//! Repair loop against the file-backed store.

use orgtree::hierarchy::{audit, load_graph, RepairLoop};
use orgtree::store::{DocumentStore, InMemoryStore, JsonlStore};
use rstest::rstest;
use serde_json::json;

mod common;
use common::Workspace;

async fn open(ws: &Workspace) -> JsonlStore {
    JsonlStore::open(ws.data_dir()).await.unwrap()
}

#[tokio::test]
async fn breaks_every_cycle_and_keeps_other_fields() {
    let ws = Workspace::new();
    ws.write_collection(
        "managers",
        &[
            r#"{"id":"a","displayName":"Ann","reportsTo":"b","team":"core"}"#,
            r#"{"id":"b","displayName":"Ben","reportsTo":"a"}"#,
            r#"{"id":"c","displayName":"Cat","reportsTo":"c"}"#,
            r#"{"id":"d","displayName":"Dee","reportsTo":"e"}"#,
            r#"{"id":"e","displayName":"Eve"}"#,
        ],
    );
    let mut store = open(&ws).await;

    let report = RepairLoop::new(&mut store, "managers").run().await.unwrap();

    assert_eq!(report.fixed, 2);
    assert_eq!(report.initial_edges, 4);
    let promoted: Vec<&str> = report.repairs.iter().map(|r| r.promoted.as_str()).collect();
    assert_eq!(promoted, ["a", "c"]);

    let managers = ws.read_collection("managers");
    let ann = managers.iter().find(|m| m["id"] == "a").unwrap();
    assert!(ann.get("reportsTo").is_none(), "field must be removed, not nulled");
    assert_eq!(ann["team"], json!("core"));
    assert_eq!(ann["displayName"], json!("Ann"));

    let dee = managers.iter().find(|m| m["id"] == "d").unwrap();
    assert_eq!(dee["reportsTo"], json!("e"));
    assert!(dee.get("updatedAt").is_none());
}

#[tokio::test]
async fn second_run_changes_nothing() {
    let ws = Workspace::new();
    ws.write_collection(
        "managers",
        &[
            r#"{"id":"x","reportsTo":"y"}"#,
            r#"{"id":"y","reportsTo":"z"}"#,
            r#"{"id":"z","reportsTo":"x"}"#,
        ],
    );
    let mut store = open(&ws).await;
    RepairLoop::new(&mut store, "managers").run().await.unwrap();
    let after_first = std::fs::read(ws.collection_path("managers")).unwrap();

    let report = RepairLoop::new(&mut store, "managers").run().await.unwrap();

    assert_eq!(report.fixed, 0);
    assert_eq!(std::fs::read(ws.collection_path("managers")).unwrap(), after_first);
}

#[tokio::test]
async fn dangling_reference_is_left_alone() {
    let ws = Workspace::new();
    ws.write_collection(
        "managers",
        &[r#"{"id":"a","reportsTo":"ghost"}"#, r#"{"id":"b","reportsTo":"a"}"#],
    );
    let mut store = open(&ws).await;

    let report = RepairLoop::new(&mut store, "managers").run().await.unwrap();

    assert_eq!(report.fixed, 0);
    let graph = load_graph(&store, "managers").await.unwrap();
    assert_eq!(audit(&graph).dangling.len(), 1);
}

#[tokio::test]
async fn malformed_line_is_skipped_on_read_and_blocks_write() {
    let ws = Workspace::new();
    ws.write_collection(
        "managers",
        &[r#"{"id":"a","reportsTo":"b"}"#, "{broken", r#"{"id":"b","reportsTo":"a"}"#],
    );
    let mut store = open(&ws).await;

    let graph = load_graph(&store, "managers").await.unwrap();
    assert_eq!(graph.edge_count(), 2);

    let result = RepairLoop::new(&mut store, "managers").run().await;

    assert!(result.is_err());
    let raw = std::fs::read_to_string(ws.collection_path("managers")).unwrap();
    assert!(raw.contains("{broken"));
}

#[tokio::test]
async fn invalid_utf8_line_does_not_hide_later_cycle() {
    let ws = Workspace::new();
    let mut contents = b"{\"id\":\"a\"}\n".to_vec();
    contents.extend_from_slice(b"\xff\xfe\n");
    contents.extend_from_slice(b"{\"id\":\"x\",\"reportsTo\":\"y\"}\n");
    contents.extend_from_slice(b"{\"id\":\"y\",\"reportsTo\":\"x\"}\n");
    std::fs::write(ws.collection_path("managers"), &contents).unwrap();
    let mut store = open(&ws).await;

    let graph = load_graph(&store, "managers").await.unwrap();
    assert_eq!(graph.node_count(), 3);
    assert_eq!(audit(&graph).cycles.len(), 1);

    let result = RepairLoop::new(&mut store, "managers").run().await;

    assert!(result.is_err(), "repair must not report success over an unreadable line");
    assert_eq!(std::fs::read(ws.collection_path("managers")).unwrap(), contents);
}

#[tokio::test]
async fn snapshot_repair_does_not_touch_source() {
    let ws = Workspace::new();
    ws.write_collection(
        "managers",
        &[r#"{"id":"a","reportsTo":"b"}"#, r#"{"id":"b","reportsTo":"a"}"#],
    );
    let store = open(&ws).await;
    let before = std::fs::read(ws.collection_path("managers")).unwrap();

    let mut snapshot = InMemoryStore::snapshot_of(&store, &["managers"]).await.unwrap();
    let report = RepairLoop::new(&mut snapshot, "managers").run().await.unwrap();

    assert_eq!(report.fixed, 1);
    assert_eq!(snapshot.write_count().await, 1);
    assert_eq!(std::fs::read(ws.collection_path("managers")).unwrap(), before);
    assert_eq!(store.list("managers").await.unwrap().len(), 2);
}

#[rstest]
#[case::chain(&[("a", "b"), ("b", "c")], 0)]
#[case::self_loop(&[("a", "a")], 1)]
#[case::rho(&[("t", "a"), ("a", "b"), ("b", "c"), ("c", "a")], 1)]
#[case::three_loops(&[("a", "a"), ("b", "b"), ("c", "d"), ("d", "c")], 3)]
#[tokio::test]
async fn fixes_one_edge_per_cycle(#[case] edges: &[(&str, &str)], #[case] cycles: usize) {
    let ws = Workspace::new();
    let lines: Vec<String> = edges
        .iter()
        .map(|(id, parent)| json!({ "id": id, "reportsTo": parent }).to_string())
        .collect();
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    ws.write_collection("managers", &lines);
    let mut store = open(&ws).await;

    let report = RepairLoop::new(&mut store, "managers").run().await.unwrap();

    assert_eq!(report.fixed, cycles);
    let graph = load_graph(&store, "managers").await.unwrap();
    assert!(audit(&graph).is_forest());
    assert_eq!(graph.edge_count(), edges.len() - cycles);
}
