//! Change-lists and the pure reducers that apply them.
//!
//! The renderer never touches a snapshot. It describes what the user did as
//! an ordered list of [`NodeChange`] / [`EdgeChange`] items, and the store
//! folds that list over its current collection with [`apply_node_changes`] /
//! [`apply_edge_changes`].
//!
//! Reducer rules:
//!
//! - Items apply in list order.
//! - An unknown id on `remove`, `update`, `position`, `select` or
//!   `dimensions` is a no-op.
//! - An `add` whose id is already present is skipped, so ids stay unique.
//! - A malformed item (empty id, non-finite position) is skipped on its own;
//!   the rest of the list still applies.
//!
//! # Wire format
//!
//! Changes are internally tagged on `type`, matching what a web renderer emits:
//!
//! ```json
//! [
//!   {"type": "position", "id": "osc1", "position": {"x": 40.0, "y": 80.0}, "dragging": true},
//!   {"type": "select", "id": "osc1", "selected": true},
//!   {"type": "remove", "id": "amp2"}
//! ]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GraphError;
use crate::model::{Dimensions, Edge, EdgeId, Node, NodeData, NodeId, Position};

/// Partial node fields carried by [`NodeChange::Update`].
///
/// The node type is deliberately absent: defaults are resolved per type once,
/// at store construction, and a type change would leave the data payload
/// without its new type's default keys.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeUpdate {
    /// New position, replacing the old one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Entries shallow-merged into the node's data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<NodeData>,
}

impl NodeUpdate {
    /// An update that only merges data.
    pub fn data(data: NodeData) -> Self {
        Self {
            position: None,
            data: Some(data),
        }
    }

    fn apply_to(&self, node: &mut Node) {
        if let Some(position) = self.position {
            node.position = position;
        }
        if let Some(data) = &self.data {
            node.data
                .extend(data.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }
}

/// One structural mutation of the node collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeChange {
    /// Append a node.
    Add {
        /// The node to append.
        item: Node,
    },
    /// Remove the node with this id.
    Remove {
        /// Target node.
        id: NodeId,
    },
    /// Merge partial fields into a node.
    Update {
        /// Target node.
        id: NodeId,
        /// Fields to merge.
        #[serde(default)]
        partial: NodeUpdate,
    },
    /// Move a node, or report the end of a drag.
    Position {
        /// Target node.
        id: NodeId,
        /// New top-left corner, absent when only `dragging` changes.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<Position>,
        /// New drag state, if reported.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dragging: Option<bool>,
    },
    /// Set the selection flag.
    Select {
        /// Target node.
        id: NodeId,
        /// New selection state.
        selected: bool,
    },
    /// Record the size the renderer measured for a node.
    Dimensions {
        /// Target node.
        id: NodeId,
        /// Measured size.
        dimensions: Dimensions,
    },
}

impl NodeChange {
    /// `add(node)`.
    pub fn add(item: Node) -> Self {
        NodeChange::Add { item }
    }

    /// `remove(id)`.
    pub fn remove(id: impl Into<NodeId>) -> Self {
        NodeChange::Remove { id: id.into() }
    }

    /// `update(id, {data})`.
    pub fn update_data(id: impl Into<NodeId>, data: NodeData) -> Self {
        NodeChange::Update {
            id: id.into(),
            partial: NodeUpdate::data(data),
        }
    }

    /// `position(id, position)`.
    pub fn position(id: impl Into<NodeId>, position: Position) -> Self {
        NodeChange::Position {
            id: id.into(),
            position: Some(position),
            dragging: None,
        }
    }

    /// `select(id, selected)`.
    pub fn select(id: impl Into<NodeId>, selected: bool) -> Self {
        NodeChange::Select {
            id: id.into(),
            selected,
        }
    }

    /// The id this change targets.
    pub fn id(&self) -> &NodeId {
        match self {
            NodeChange::Add { item } => &item.id,
            NodeChange::Remove { id }
            | NodeChange::Update { id, .. }
            | NodeChange::Position { id, .. }
            | NodeChange::Select { id, .. }
            | NodeChange::Dimensions { id, .. } => id,
        }
    }

    /// Checks the fields every item must carry.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.id().is_empty() {
            return Err(GraphError::MalformedChange("node change without an id".into()));
        }
        match self {
            NodeChange::Add { item } if item.node_type.is_empty() => Err(
                GraphError::MalformedChange(format!("node '{}' added without a type", item.id)),
            ),
            NodeChange::Add { item } if !item.position.is_finite() => Err(
                GraphError::MalformedChange(format!("node '{}' added at a non-finite position", item.id)),
            ),
            NodeChange::Update {
                partial: NodeUpdate {
                    position: Some(p), ..
                },
                id,
            }
            | NodeChange::Position {
                position: Some(p),
                id,
                ..
            } if !p.is_finite() => Err(GraphError::MalformedChange(format!(
                "non-finite position for node '{id}'"
            ))),
            _ => Ok(()),
        }
    }
}

/// One structural mutation of the edge collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EdgeChange {
    /// Append an edge.
    Add {
        /// The edge to append.
        item: Edge,
    },
    /// Remove the edge with this id.
    Remove {
        /// Target edge.
        id: EdgeId,
    },
    /// Shallow-merge connection parameters.
    ///
    /// Endpoints and handles are fixed for an edge's lifetime because its id
    /// is derived from them; re-route by removing and reconnecting.
    Update {
        /// Target edge.
        id: EdgeId,
        /// Entries merged into the edge's params.
        #[serde(default)]
        params: NodeData,
    },
    /// Set the selection flag.
    Select {
        /// Target edge.
        id: EdgeId,
        /// New selection state.
        selected: bool,
    },
}

impl EdgeChange {
    /// `add(edge)`.
    pub fn add(item: Edge) -> Self {
        EdgeChange::Add { item }
    }

    /// `remove(id)`.
    pub fn remove(id: impl Into<EdgeId>) -> Self {
        EdgeChange::Remove { id: id.into() }
    }

    /// `select(id, selected)`.
    pub fn select(id: impl Into<EdgeId>, selected: bool) -> Self {
        EdgeChange::Select {
            id: id.into(),
            selected,
        }
    }

    /// The id this change targets.
    pub fn id(&self) -> &EdgeId {
        match self {
            EdgeChange::Add { item } => &item.id,
            EdgeChange::Remove { id } | EdgeChange::Update { id, .. } | EdgeChange::Select { id, .. } => {
                id
            }
        }
    }

    /// Checks the fields every item must carry.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.id().is_empty() {
            return Err(GraphError::MalformedChange("edge change without an id".into()));
        }
        if let EdgeChange::Add { item } = self
            && (item.source.is_empty() || item.target.is_empty())
        {
            return Err(GraphError::MalformedChange(format!(
                "edge '{}' added without both endpoints",
                item.id
            )));
        }
        Ok(())
    }
}

/// Applies `changes` to `nodes`, returning the new collection.
///
/// `nodes` itself is never modified.
pub fn apply_node_changes(changes: &[NodeChange], nodes: &[Node]) -> Vec<Node> {
    let mut out = nodes.to_vec();
    for change in changes {
        if let Err(err) = change.validate() {
            tracing::warn!(%err, "skipping node change");
            continue;
        }
        apply_node_change(change, &mut out);
    }
    out
}

fn apply_node_change(change: &NodeChange, nodes: &mut Vec<Node>) {
    match change {
        NodeChange::Add { item } => {
            if nodes.iter().any(|n| n.id == item.id) {
                tracing::warn!(id = %item.id, "node add skipped: id already present");
            } else {
                nodes.push(item.clone());
            }
        }
        NodeChange::Remove { id } => {
            let before = nodes.len();
            nodes.retain(|n| &n.id != id);
            if nodes.len() == before {
                tracing::debug!(%id, "remove of unknown node ignored");
            }
        }
        NodeChange::Update { id, partial } => {
            if let Some(node) = find_node(nodes, id) {
                partial.apply_to(node);
            }
        }
        NodeChange::Position {
            id,
            position,
            dragging,
        } => {
            if let Some(node) = find_node(nodes, id) {
                if let Some(p) = position {
                    node.position = *p;
                }
                if let Some(d) = dragging {
                    node.dragging = *d;
                }
            }
        }
        NodeChange::Select { id, selected } => {
            if let Some(node) = find_node(nodes, id) {
                node.selected = *selected;
            }
        }
        NodeChange::Dimensions { id, dimensions } => {
            if let Some(node) = find_node(nodes, id) {
                node.measured = Some(*dimensions);
            }
        }
    }
}

fn find_node<'a>(nodes: &'a mut [Node], id: &NodeId) -> Option<&'a mut Node> {
    let found = nodes.iter_mut().find(|n| &n.id == id);
    if found.is_none() {
        tracing::debug!(%id, "change for unknown node ignored");
    }
    found
}

/// Applies `changes` to `edges`, returning the new collection.
///
/// `edges` itself is never modified.
pub fn apply_edge_changes(changes: &[EdgeChange], edges: &[Edge]) -> Vec<Edge> {
    let mut out = edges.to_vec();
    for change in changes {
        if let Err(err) = change.validate() {
            tracing::warn!(%err, "skipping edge change");
            continue;
        }
        match change {
            EdgeChange::Add { item } => {
                if out.iter().any(|e| e.id == item.id) {
                    tracing::warn!(id = %item.id, "edge add skipped: id already present");
                } else {
                    out.push(item.clone());
                }
            }
            EdgeChange::Remove { id } => out.retain(|e| &e.id != id),
            EdgeChange::Update { id, params } => {
                if let Some(edge) = out.iter_mut().find(|e| &e.id == id) {
                    edge.params
                        .extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
            EdgeChange::Select { id, selected } => {
                if let Some(edge) = out.iter_mut().find(|e| &e.id == id) {
                    edge.selected = *selected;
                }
            }
        }
    }
    out
}

/// Result of decoding a raw change-list.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    /// Items that decoded and validated, in their original order.
    pub changes: Vec<T>,
    /// One error per dropped item.
    pub malformed: Vec<GraphError>,
}

/// Decodes renderer JSON into node changes, dropping malformed items.
pub fn decode_node_changes(raw: &[Value]) -> Decoded<NodeChange> {
    decode(raw, NodeChange::validate)
}

/// Decodes renderer JSON into edge changes, dropping malformed items.
pub fn decode_edge_changes(raw: &[Value]) -> Decoded<EdgeChange> {
    decode(raw, EdgeChange::validate)
}

fn decode<T: serde::de::DeserializeOwned>(
    raw: &[Value],
    validate: fn(&T) -> Result<(), GraphError>,
) -> Decoded<T> {
    let mut changes = Vec::with_capacity(raw.len());
    let mut malformed = Vec::new();
    for (index, value) in raw.iter().enumerate() {
        let decoded = serde_json::from_value::<T>(value.clone())
            .map_err(|e| GraphError::MalformedChange(format!("item {index}: {e}")))
            .and_then(|c| validate(&c).map(|()| c));
        match decoded {
            Ok(change) => changes.push(change),
            Err(err) => {
                tracing::warn!(index, %err, "dropping malformed change");
                malformed.push(err);
            }
        }
    }
    Decoded { changes, malformed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nodes() -> Vec<Node> {
        vec![
            Node::new("a", "osc").with_param("frequency", 220),
            Node::new("b", "amp").with_param("gain", 1),
        ]
    }

    fn data(value: Value) -> NodeData {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn add_appends_in_order() {
        let out = apply_node_changes(&[NodeChange::add(Node::new("c", "out"))], &nodes());
        let ids: Vec<&str> = out.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn add_with_existing_id_is_skipped() {
        let out = apply_node_changes(&[NodeChange::add(Node::new("a", "noise"))], &nodes());
        assert_eq!(out, nodes());
    }

    #[test]
    fn unknown_ids_are_noops() {
        let changes = [
            NodeChange::remove("zz"),
            NodeChange::position("zz", Position::new(1.0, 1.0)),
            NodeChange::select("zz", true),
            NodeChange::update_data("zz", data(json!({"gain": 0}))),
        ];
        assert_eq!(apply_node_changes(&changes, &nodes()), nodes());
    }

    #[test]
    fn input_collection_untouched() {
        let before = nodes();
        let out = apply_node_changes(&[NodeChange::remove("a")], &before);
        assert_eq!(before.len(), 2);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn changes_apply_in_list_order() {
        let changes = [
            NodeChange::position("a", Position::new(1.0, 1.0)),
            NodeChange::position("a", Position::new(2.0, 3.0)),
        ];
        let out = apply_node_changes(&changes, &nodes());
        assert_eq!(out[0].position, Position::new(2.0, 3.0));
    }

    #[test]
    fn update_merges_data_shallowly() {
        let out = apply_node_changes(
            &[NodeChange::update_data("a", data(json!({"detune": 5})))],
            &nodes(),
        );
        assert_eq!(out[0].data["frequency"], json!(220));
        assert_eq!(out[0].data["detune"], json!(5));
    }

    #[test]
    fn position_change_may_only_end_drag() {
        let mut start = nodes();
        start[0].dragging = true;
        start[0].position = Position::new(5.0, 5.0);
        let out = apply_node_changes(
            &[NodeChange::Position {
                id: "a".into(),
                position: None,
                dragging: Some(false),
            }],
            &start,
        );
        assert!(!out[0].dragging);
        assert_eq!(out[0].position, Position::new(5.0, 5.0));
    }

    #[test]
    fn malformed_item_skipped_rest_applied() {
        let changes = [
            NodeChange::position("a", Position::new(f64::NAN, 0.0)),
            NodeChange::select("b", true),
            NodeChange::remove(""),
        ];
        let out = apply_node_changes(&changes, &nodes());
        assert_eq!(out[0].position, Position::ORIGIN);
        assert!(out[1].selected);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn dimensions_recorded() {
        let out = apply_node_changes(
            &[NodeChange::Dimensions {
                id: "b".into(),
                dimensions: Dimensions::new(108.0, 60.0),
            }],
            &nodes(),
        );
        assert_eq!(out[1].measured, Some(Dimensions::new(108.0, 60.0)));
    }

    #[test]
    fn edge_changes() {
        let edges = vec![Edge::new("a", "b")];
        let id = edges[0].id.clone();
        let out = apply_edge_changes(
            &[
                EdgeChange::select(id.clone(), true),
                EdgeChange::Update {
                    id: id.clone(),
                    params: data(json!({"animated": true})),
                },
            ],
            &edges,
        );
        assert!(out[0].selected);
        assert_eq!(out[0].params["animated"], json!(true));

        let out = apply_edge_changes(&[EdgeChange::remove(id)], &out);
        assert!(out.is_empty());
    }

    #[test]
    fn edge_add_duplicate_skipped() {
        let edges = vec![Edge::new("a", "b")];
        let out = apply_edge_changes(&[EdgeChange::add(Edge::new("a", "b"))], &edges);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn decode_keeps_good_items_in_order() {
        let raw = vec![
            json!({"type": "select", "id": "a", "selected": true}),
            json!({"type": "position", "position": {"x": 1.0, "y": 2.0}}),
            json!({"type": "teleport", "id": "a"}),
            json!({"type": "remove", "id": "b"}),
        ];
        let decoded = decode_node_changes(&raw);
        assert_eq!(decoded.changes.len(), 2);
        assert_eq!(decoded.malformed.len(), 2);
        assert_eq!(decoded.changes[0], NodeChange::select("a", true));
        assert_eq!(decoded.changes[1], NodeChange::remove("b"));
    }

    #[test]
    fn decode_update_with_partial() {
        let raw = vec![json!({"type": "update", "id": "a", "partial": {"data": {"gain": 0.2}}})];
        let decoded = decode_node_changes(&raw);
        assert_eq!(
            decoded.changes,
            vec![NodeChange::update_data("a", data(json!({"gain": 0.2})))]
        );
    }

    #[test]
    fn decode_edge_add_requires_endpoints() {
        let raw = vec![
            json!({"type": "add", "item": {"id": "e1", "source": "", "target": "b"}}),
            json!({"type": "select", "id": "e2", "selected": false}),
        ];
        let decoded = decode_edge_changes(&raw);
        assert_eq!(decoded.changes.len(), 1);
        assert!(matches!(decoded.malformed[0], GraphError::MalformedChange(_)));
    }

    #[test]
    fn node_change_round_trips_through_json() {
        let change = NodeChange::Position {
            id: "a".into(),
            position: Some(Position::new(4.0, 8.0)),
            dragging: Some(true),
        };
        let value = serde_json::to_value(&change).unwrap();
        assert_eq!(value["type"], json!("position"));
        let back: NodeChange = serde_json::from_value(value).unwrap();
        assert_eq!(back, change);
    }
}
