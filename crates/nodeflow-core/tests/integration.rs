//! Integration tests for nodeflow-core.
//!
//! Walks the store through the editor workflows end to end: seeding with
//! defaults, distribution, parameter edits, connections, and removal.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use nodeflow_core::{
    Connection, DefaultsCatalog, Dimensions, EdgeChange, EdgeSeed, GraphError, GraphStore, Node,
    NodeChange, NodeData, NodeSeed, PartialPosition, Position, Snapshot, decode_node_changes,
};
use serde_json::{Value, json};

fn data(value: Value) -> NodeData {
    match value {
        Value::Object(m) => m,
        _ => panic!("expected object"),
    }
}

fn catalog() -> HashMap<String, NodeData> {
    HashMap::from([
        (
            "osc".to_string(),
            data(json!({"frequency": 220, "waveform": "sine"})),
        ),
        ("amp".to_string(), data(json!({"gain": 0.5}))),
    ])
}

fn oscillators(n: usize) -> Vec<NodeSeed> {
    (1..=n).map(|i| NodeSeed::new(format!("n{i}"), "osc")).collect()
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

#[test]
fn seeds_merge_defaults_under_overrides() {
    let store = GraphStore::new(
        vec![
            NodeSeed::new("n1", "osc").with_param("frequency", 440),
            NodeSeed::new("n2", "amp"),
            NodeSeed::new("n3", "mystery").with_param("x", 1),
        ],
        vec![],
        &catalog(),
    );

    let n1 = store.node("n1").unwrap();
    assert_eq!(n1.data["frequency"], json!(440));
    assert_eq!(n1.data["waveform"], json!("sine"));

    assert_eq!(store.node("n2").unwrap().data["gain"], json!(0.5));
    assert_eq!(store.node("n3").unwrap().data.len(), 1);
}

#[test]
fn catalog_consulted_once_per_seed() {
    struct Counting(Mutex<Vec<String>>);

    impl DefaultsCatalog for Counting {
        fn defaults(&self, node_type: &str) -> Option<NodeData> {
            self.0.lock().unwrap().push(node_type.to_string());
            None
        }
    }

    let counting = Counting(Mutex::new(Vec::new()));
    let mut store = GraphStore::new(oscillators(3), vec![], &counting);
    store.distribute_nodes(Dimensions::new(900.0, 400.0));
    store
        .insert_node(Node::new("late", "osc"))
        .expect("fresh id inserts");

    assert_eq!(counting.0.lock().unwrap().len(), 3);
}

#[test]
fn seed_positions_are_completed() {
    let store = GraphStore::new(
        vec![
            NodeSeed::new("a", "osc").with_position(PartialPosition {
                x: None,
                y: Some(70.0),
            }),
            NodeSeed::new("b", "osc"),
        ],
        vec![],
        &catalog(),
    );
    assert_eq!(store.node("a").unwrap().position, Position::new(0.0, 70.0));
    assert_eq!(store.node("b").unwrap().position, Position::ORIGIN);
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

#[test]
fn three_oscillators_distributed_evenly() {
    let mut store = GraphStore::new(oscillators(3), vec![], &catalog());
    let snapshot = store.distribute_nodes(Dimensions::new(900.0, 400.0));

    let xs: Vec<f64> = snapshot.nodes().iter().map(|n| n.position.x).collect();
    assert_eq!(xs, vec![96.0, 396.0, 696.0]);
    assert!((xs[1] - xs[0] - (xs[2] - xs[1])).abs() < 1e-9);
    assert!(snapshot.nodes().iter().all(|n| n.position.y == 100.0));
}

#[test]
fn distribution_is_idempotent_and_silent() {
    let mut store = GraphStore::new(oscillators(3), vec![], &catalog());
    let dims = Dimensions::new(900.0, 400.0);
    let first = store.distribute_nodes(dims);
    let version = store.version();

    let second = store.distribute_nodes(dims);
    assert_eq!(first, second);
    assert!(first.content_eq(&second));
    assert_eq!(store.version(), version);
}

#[test]
fn distribution_preserves_other_fields() {
    let mut store = GraphStore::new(oscillators(2), vec![], &catalog());
    store.update_nodes(&[NodeChange::select("n2", true)]);
    store.update_node("n2", data(json!({"frequency": 99})));
    store.distribute_nodes(Dimensions::new(300.0, 80.0));

    let n2 = store.node("n2").unwrap();
    assert!(n2.selected);
    assert_eq!(n2.data["frequency"], json!(99));
    assert_eq!(n2.position, Position::new(96.0, 20.0));
}

#[test]
fn resize_uses_latest_node_set() {
    let mut store = GraphStore::new(oscillators(2), vec![], &catalog());
    store.distribute_nodes(Dimensions::new(900.0, 400.0));
    store.remove_node("n1");
    store.distribute_nodes(Dimensions::new(600.0, 400.0));
    assert_eq!(store.node("n2").unwrap().position, Position::new(46.0, 100.0));
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

#[test]
fn update_node_merges_data_and_keeps_position() {
    let mut store = GraphStore::new(
        vec![
            NodeSeed::new("n1", "custom")
                .with_param("freq", 220)
                .with_param("gain", 1)
                .with_position(Position::new(12.0, 34.0)),
        ],
        vec![],
        &catalog(),
    );

    store.update_node("n1", data(json!({"freq": 440})));

    let n1 = store.node("n1").unwrap();
    assert_eq!(Value::Object(n1.data.clone()), json!({"freq": 440, "gain": 1}));
    assert_eq!(n1.position, Position::new(12.0, 34.0));
}

#[test]
fn connecting_twice_yields_one_edge() {
    let mut store = GraphStore::new(oscillators(2), vec![], &catalog());
    store.on_connect(Connection::new("n1", "n2")).unwrap();
    let err = store.on_connect(Connection::new("n1", "n2")).unwrap_err();

    assert!(matches!(err, GraphError::DuplicateEdge(_)));
    assert_eq!(store.edges().len(), 1);
}

#[test]
fn dotted_node_id_and_target_handle_are_distinct_edges() {
    let seeds = vec![
        NodeSeed::new("a", "osc"),
        NodeSeed::new("b", "osc"),
        NodeSeed::new("b.c", "osc"),
    ];
    let mut store = GraphStore::new(seeds, vec![], &catalog());

    store.on_connect(Connection::new("a", "b.c")).unwrap();
    store
        .on_connect(Connection::new("a", "b").with_handles(None::<&str>, Some("c")))
        .unwrap();

    assert_eq!(store.edges().len(), 2);
    assert!(store.dangling_edges().next().is_none());
}

#[test]
fn removing_node_leaves_dangling_edge() {
    let mut store = GraphStore::new(oscillators(2), vec![EdgeSeed::new("n1", "n2")], &catalog());
    let snapshot = store.remove_node("n1");

    assert_eq!(snapshot.edges().len(), 1);
    assert_eq!(snapshot.edges()[0].source, "n1");
    assert!(snapshot.node("n1").is_none());
    assert_eq!(snapshot.dangling_edges().count(), 1);
    assert_eq!(store.dangling_edges().count(), 1);
}

#[test]
fn old_snapshots_never_change() {
    let mut store = GraphStore::new(oscillators(2), vec![], &catalog());
    let held = store.snapshot();
    let held_json = serde_json::to_value(&held).unwrap();

    store.distribute_nodes(Dimensions::new(900.0, 400.0));
    store.update_node("n1", data(json!({"frequency": 1})));
    store.remove_node("n2");
    store.on_connect(Connection::new("n1", "n2")).unwrap();

    assert_eq!(serde_json::to_value(&held).unwrap(), held_json);
    assert_eq!(held.nodes().len(), 2);
    assert!(held.edges().is_empty());
}

#[test]
fn renderer_changes_round_trip() {
    let mut store = GraphStore::new(oscillators(3), vec![], &catalog());
    let raw = vec![
        json!({"type": "position", "id": "n1", "position": {"x": 5.0, "y": 6.0}, "dragging": true}),
        json!({"type": "select", "id": "n3", "selected": true}),
        json!({"type": "position", "id": "n1", "dragging": false}),
        json!({"type": "remove"}),
        json!({"type": "remove", "id": "n2"}),
    ];
    let decoded = decode_node_changes(&raw);
    assert_eq!(decoded.malformed.len(), 1);

    let snapshot = store.update_nodes(&decoded.changes);
    let ids: Vec<&str> = snapshot.nodes().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["n1", "n3"]);
    assert_eq!(snapshot.nodes()[0].position, Position::new(5.0, 6.0));
    assert!(!snapshot.nodes()[0].dragging);
    assert!(snapshot.nodes()[1].selected);
}

#[test]
fn edge_changes_publish_once() {
    let seen: Arc<Mutex<Vec<Snapshot>>> = Arc::default();
    let mut store = GraphStore::new(oscillators(2), vec![EdgeSeed::new("n1", "n2")], &catalog());
    let sink = Arc::clone(&seen);
    store.subscribe(move |s| sink.lock().unwrap().push(s.clone()));

    let id = store.edges()[0].id.clone();
    store.update_edges(&[EdgeChange::select(id.clone(), true), EdgeChange::remove(id)]);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].edges().is_empty());
}
