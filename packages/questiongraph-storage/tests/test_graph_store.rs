//! Integration tests for GraphStore over the in-memory backend
//!
//! Covers the behavioural contract of the question graph:
//! - Idempotent node creation and cascading deletes
//! - Choice round-trips, typed equality and the default transition
//! - Edge updates and deletes addressed by edgeId
//! - Silent no-ops on missing endpoints

use std::sync::Arc;

use questiongraph_storage::{Choice, ErrorKind, GraphStore, InMemoryBackend, Result, Transition};

fn setup() -> (Arc<InMemoryBackend>, GraphStore) {
    let backend = Arc::new(InMemoryBackend::new());
    let store = GraphStore::from_shared(backend.clone());
    (backend, store)
}

async fn seed(store: &GraphStore, ids: &[&str]) {
    for id in ids {
        store.create_node(id).await.expect("Node creation failed");
    }
}

async fn lookup(store: &GraphStore, id: &str, choice: Choice) -> Result<String> {
    store.find_successor(id, &choice).await
}

#[tokio::test]
async fn test_create_node_is_idempotent() {
    let (backend, store) = setup();

    store.create_node("q1").await.expect("First create failed");
    store.create_node("q1").await.expect("Second create failed");

    assert_eq!(backend.node_count(), 1);
}

#[tokio::test]
async fn test_delete_node_cascades_to_edges() {
    let (backend, store) = setup();
    seed(&store, &["a", "b", "c"]).await;
    store
        .create_edge("a", "b", &Choice::text("yes"), "e1")
        .await
        .unwrap();
    store
        .create_edge("c", "a", &Choice::NoCondition, "e2")
        .await
        .unwrap();

    let msg = store.delete_node("a").await.expect("Delete failed");
    assert_eq!(msg, ">>> Deleted node : a");

    assert_eq!(backend.edge_count(), 0);
    let ids: Vec<String> = backend.nodes().into_iter().map(|n| n.id).collect();
    assert_eq!(ids, vec!["b", "c"]);
}

#[tokio::test]
async fn test_choice_round_trip() {
    let (_, store) = setup();
    seed(&store, &["a", "b"]).await;
    store
        .create_edge("a", "b", &Choice::text("yes"), "e1")
        .await
        .unwrap();

    let next = store
        .find_successor("a", &Choice::text("yes"))
        .await
        .expect("Lookup failed");
    assert_eq!(next, "b");

    let err = store
        .find_successor("a", &Choice::text("no"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_unconditional_edge_wins_over_conditional_ones() {
    let (_, store) = setup();
    seed(&store, &["a", "b", "c", "d"]).await;
    store
        .create_edge("a", "c", &Choice::text("left"), "e-left")
        .await
        .unwrap();
    store
        .create_edge("a", "d", &Choice::Integer(2), "e-two")
        .await
        .unwrap();
    store
        .create_edge("a", "b", &Choice::NoCondition, "e-default")
        .await
        .unwrap();

    let next = lookup(&store, "a", Choice::NoCondition).await.unwrap();
    assert_eq!(next, "b");
}

#[tokio::test]
async fn test_lookup_without_choice_falls_back_to_any_edge() {
    let (_, store) = setup();
    seed(&store, &["a", "b"]).await;
    store
        .create_edge("a", "b", &Choice::text("only"), "e1")
        .await
        .unwrap();

    let next = lookup(&store, "a", Choice::NoCondition).await.unwrap();
    assert_eq!(next, "b");
}

#[tokio::test]
async fn test_update_edge_changes_lookup() {
    let (backend, store) = setup();
    seed(&store, &["a", "b", "c"]).await;
    store
        .create_edge("a", "b", &Choice::text("old"), "e1")
        .await
        .unwrap();
    store
        .create_edge("a", "c", &Choice::text("other"), "e2")
        .await
        .unwrap();

    let msg = store.update_edge("e1", &Choice::text("x")).await.unwrap();
    assert_eq!(msg, ">>> Updated Edge: e1");
    assert_eq!(lookup(&store, "a", Choice::text("x")).await.unwrap(), "b");
    assert!(lookup(&store, "a", Choice::text("old")).await.is_err());

    // Clearing the choice makes e1 the default transition
    store.update_edge("e1", &Choice::NoCondition).await.unwrap();
    assert_eq!(lookup(&store, "a", Choice::NoCondition).await.unwrap(), "b");
    let e1 = backend
        .transitions()
        .into_iter()
        .find(|t| t.edge_id == "e1")
        .unwrap();
    assert_eq!(e1, Transition::new("e1", "a", "b", Choice::NoCondition));
}

#[tokio::test]
async fn test_numeric_and_text_choices_are_distinct() {
    let (_, store) = setup();
    seed(&store, &["a", "num", "txt"]).await;
    store
        .create_edge("a", "num", &Choice::Integer(1), "e-num")
        .await
        .unwrap();

    let err = store
        .find_successor("a", &Choice::text("1"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    store
        .create_edge("a", "txt", &Choice::text("1"), "e-txt")
        .await
        .unwrap();
    assert_eq!(lookup(&store, "a", Choice::text("1")).await.unwrap(), "txt");
    let numeric = lookup(&store, "a", Choice::Integer(1)).await.unwrap();
    assert_eq!(numeric, "num");
    assert!(lookup(&store, "a", Choice::Bool(true)).await.is_err());
}

#[tokio::test]
async fn test_text_edge_does_not_match_integer_lookup() {
    let (_, store) = setup();
    seed(&store, &["a", "txt"]).await;
    store
        .create_edge("a", "txt", &Choice::text("1"), "e-txt")
        .await
        .unwrap();

    let err = lookup(&store, "a", Choice::Integer(1)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(lookup(&store, "a", Choice::text("1")).await.unwrap(), "txt");
}

#[tokio::test]
async fn test_integer_matches_equal_float() {
    let (_, store) = setup();
    seed(&store, &["a", "b"]).await;
    store
        .create_edge("a", "b", &Choice::Integer(3), "e1")
        .await
        .unwrap();

    assert_eq!(lookup(&store, "a", Choice::Float(3.0)).await.unwrap(), "b");
}

#[tokio::test]
async fn test_delete_all_nodes() {
    let (backend, store) = setup();
    seed(&store, &["a", "b"]).await;
    store
        .create_edge("a", "b", &Choice::NoCondition, "e1")
        .await
        .unwrap();

    let msg = store.delete_all_nodes().await.unwrap();
    assert_eq!(msg, ">>> All Nodes Deleted");
    assert_eq!(backend.node_count(), 0);

    for id in ["a", "b"] {
        let err = store
            .find_successor(id, &Choice::NoCondition)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}

#[tokio::test]
async fn test_create_edge_with_missing_endpoint_is_silent() {
    let (backend, store) = setup();
    seed(&store, &["b"]).await;

    let msg = store
        .create_edge("ghost", "b", &Choice::text("yes"), "e1")
        .await
        .expect("Missing endpoint must not fail");

    assert_eq!(msg, ">>> Create Edge Between ghost and b");
    assert_eq!(backend.edge_count(), 0);
}

#[tokio::test]
async fn test_delete_edge_keeps_endpoints() {
    let (backend, store) = setup();
    seed(&store, &["a", "b"]).await;
    store
        .create_edge("a", "b", &Choice::Bool(true), "e1")
        .await
        .unwrap();

    let msg = store.delete_edge("e1").await.unwrap();
    assert_eq!(msg, ">>> Deleted relationship e1");
    assert_eq!(backend.edge_count(), 0);
    assert_eq!(backend.node_count(), 2);

    // Deleting again is a no-op
    store.delete_edge("e1").await.unwrap();
}

#[tokio::test]
async fn test_parallel_edges_between_same_nodes() {
    let (backend, store) = setup();
    seed(&store, &["a", "b"]).await;
    store
        .create_edge("a", "b", &Choice::text("yes"), "e1")
        .await
        .unwrap();
    store
        .create_edge("a", "b", &Choice::text("maybe"), "e2")
        .await
        .unwrap();

    assert_eq!(backend.edge_count(), 2);
    let next = lookup(&store, "a", Choice::text("maybe")).await.unwrap();
    assert_eq!(next, "b");

    store.delete_edge("e1").await.unwrap();
    assert_eq!(backend.edge_count(), 1);
}

#[tokio::test]
async fn test_close_is_idempotent_and_final() {
    let (_, store) = setup();

    store.close().await.unwrap();
    store.close().await.unwrap();

    let err = store.create_node("a").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Connection);
}

#[tokio::test]
async fn test_concurrent_requests_share_one_store() {
    let (backend, store) = setup();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store.create_node(&format!("q{}", i % 4)).await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().expect("Concurrent create failed");
    }

    assert_eq!(backend.node_count(), 4);
}
