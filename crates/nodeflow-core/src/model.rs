//! Node and edge types for the editor graph.
//!
//! A [`Node`] is what the renderer draws and what the signal engine turns into
//! a voice: a typed box with a position and a free-form `data` payload. An
//! [`Edge`] connects two nodes, optionally through named handles.
//!
//! The `*Seed` types are the partial shapes accepted at initialization time.
//! They are completed against a [`DefaultsCatalog`](crate::DefaultsCatalog)
//! exactly once, when the store is built.

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form key/value payload carried by nodes and edges.
pub type NodeData = Map<String, Value>;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns `true` for the empty identifier, which no stored item may carry.
            #[inline]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_id!(
    /// Unique identifier of a node within a snapshot.
    NodeId
);

string_id!(
    /// Unique identifier of an edge within a snapshot.
    ///
    /// Edges created through a connection get an id derived from their
    /// endpoints; see [`edge_id`](crate::edge_id).
    EdgeId
);

/// A point on the editor canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate (left edge of the node).
    pub x: f64,
    /// Vertical coordinate (top edge of the node).
    pub y: f64,
}

impl Position {
    /// The canvas origin, used when a seed supplies no position.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a position.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns `true` if both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A position where either coordinate may be missing.
///
/// Missing coordinates are filled from a base position (normally
/// [`Position::ORIGIN`]) so stored nodes always carry a complete pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialPosition {
    /// Horizontal coordinate, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Vertical coordinate, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl PartialPosition {
    /// Fills the missing coordinates from `base`.
    pub fn resolve(self, base: Position) -> Position {
        Position {
            x: self.x.unwrap_or(base.x),
            y: self.y.unwrap_or(base.y),
        }
    }
}

impl From<Position> for PartialPosition {
    fn from(p: Position) -> Self {
        Self {
            x: Some(p.x),
            y: Some(p.y),
        }
    }
}

/// Width and height of a container or a measured node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in canvas units.
    pub width: f64,
    /// Height in canvas units.
    pub height: f64,
}

impl Dimensions {
    /// Creates a dimension pair.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Clamps negative or non-finite components to zero.
    ///
    /// Measurement callbacks report `0 x 0` (or garbage) before the container
    /// is attached; layout treats all of those as an empty container.
    pub fn sanitized(self) -> Self {
        let clamp = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self {
            width: clamp(self.width),
            height: clamp(self.height),
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A node as stored in a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique id.
    pub id: NodeId,
    /// Node type, used to look up default data and by the signal engine.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Top-left corner on the canvas.
    #[serde(default)]
    pub position: Position,
    /// Parameters: the type's defaults merged with caller overrides.
    #[serde(default)]
    pub data: NodeData,
    /// Selection flag owned by the renderer.
    #[serde(default, skip_serializing_if = "is_false")]
    pub selected: bool,
    /// Whether the renderer is currently dragging the node.
    #[serde(default, skip_serializing_if = "is_false")]
    pub dragging: bool,
    /// Size reported by the renderer after the node was drawn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured: Option<Dimensions>,
}

impl Node {
    /// Creates a node at the origin with empty data.
    pub fn new(id: impl Into<NodeId>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            position: Position::ORIGIN,
            data: NodeData::new(),
            selected: false,
            dragging: false,
            measured: None,
        }
    }

    /// Sets the position.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    /// Replaces the data payload.
    pub fn with_data(mut self, data: NodeData) -> Self {
        self.data = data;
        self
    }

    /// Sets a single data entry.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// A partial node supplied at initialization.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSeed {
    /// Unique id.
    pub id: NodeId,
    /// Node type.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Optional, possibly partial, position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PartialPosition>,
    /// Overrides applied on top of the type's defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<NodeData>,
}

impl NodeSeed {
    /// Creates a seed with no position and no data overrides.
    pub fn new(id: impl Into<NodeId>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            position: None,
            data: None,
        }
    }

    /// Sets a (possibly partial) position.
    pub fn with_position(mut self, position: impl Into<PartialPosition>) -> Self {
        self.position = Some(position.into());
        self
    }

    /// Sets one data override.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data
            .get_or_insert_with(NodeData::new)
            .insert(key.into(), value.into());
        self
    }

    /// Completes the seed into a stored node.
    ///
    /// `defaults` is the payload the catalog returned for this seed's type.
    /// Seed overrides replace default keys one by one; default keys the seed
    /// does not mention are kept.
    pub fn into_node(self, defaults: Option<NodeData>) -> Node {
        let mut data = defaults.unwrap_or_default();
        if let Some(overrides) = self.data {
            data.extend(overrides);
        }
        Node {
            id: self.id,
            node_type: self.node_type,
            position: self
                .position
                .map_or(Position::ORIGIN, |p| p.resolve(Position::ORIGIN)),
            data,
            selected: false,
            dragging: false,
            measured: None,
        }
    }
}

/// An edge as stored in a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique id.
    pub id: EdgeId,
    /// Node the signal leaves.
    pub source: NodeId,
    /// Node the signal enters.
    pub target: NodeId,
    /// Output handle on the source node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    /// Input handle on the target node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    /// Selection flag owned by the renderer.
    #[serde(default, skip_serializing_if = "is_false")]
    pub selected: bool,
    /// Any other connection parameters.
    #[serde(flatten)]
    pub params: NodeData,
}

impl Edge {
    /// Creates a handle-less edge with an id derived from its endpoints.
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: crate::edge_id(&source, None, &target, None),
            source,
            target,
            source_handle: None,
            target_handle: None,
            selected: false,
            params: NodeData::new(),
        }
    }

    /// Returns `true` if both edges join the same endpoints through the same handles.
    pub fn same_endpoints(&self, other: &Edge) -> bool {
        self.source == other.source
            && self.target == other.target
            && self.source_handle == other.source_handle
            && self.target_handle == other.target_handle
    }

    /// Returns `true` if the edge touches `node` at either end.
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }
}

/// A partial edge supplied at initialization.
///
/// When `id` is missing it is derived from the endpoints, the same way
/// [`GraphStore::on_connect`](crate::GraphStore::on_connect) names edges.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeSeed {
    /// Explicit id, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EdgeId>,
    /// Node the signal leaves.
    pub source: NodeId,
    /// Node the signal enters.
    pub target: NodeId,
    /// Output handle on the source node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    /// Input handle on the target node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    /// Any other connection parameters.
    #[serde(flatten)]
    pub params: NodeData,
}

impl EdgeSeed {
    /// Creates a seed between two nodes.
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: None,
            source: source.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    /// Sets an explicit id.
    pub fn with_id(mut self, id: impl Into<EdgeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Completes the seed into a stored edge.
    pub fn into_edge(self) -> Edge {
        let id = self.id.unwrap_or_else(|| {
            crate::edge_id(
                &self.source,
                self.source_handle.as_deref(),
                &self.target,
                self.target_handle.as_deref(),
            )
        });
        Edge {
            id,
            source: self.source,
            target: self.target,
            source_handle: self.source_handle,
            target_handle: self.target_handle,
            selected: false,
            params: self.params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> NodeData {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn seed_overrides_win_and_defaults_survive() {
        let seed = NodeSeed::new("n1", "osc").with_param("frequency", 440);
        let node = seed.into_node(Some(map(json!({"frequency": 220, "waveform": "sine"}))));
        assert_eq!(node.data["frequency"], json!(440));
        assert_eq!(node.data["waveform"], json!("sine"));
    }

    #[test]
    fn seed_without_defaults_keeps_overrides() {
        let node = NodeSeed::new("n1", "custom")
            .with_param("gain", 1)
            .into_node(None);
        assert_eq!(node.data.len(), 1);
        assert_eq!(node.node_type, "custom");
    }

    #[test]
    fn partial_position_fills_from_origin() {
        let seed = NodeSeed::new("n1", "osc").with_position(PartialPosition {
            x: Some(25.0),
            y: None,
        });
        assert_eq!(seed.into_node(None).position, Position::new(25.0, 0.0));
        assert_eq!(
            NodeSeed::new("n2", "osc").into_node(None).position,
            Position::ORIGIN
        );
    }

    #[test]
    fn dimensions_sanitize_garbage() {
        let d = Dimensions::new(f64::NAN, -3.0).sanitized();
        assert_eq!(d, Dimensions::new(0.0, 0.0));
        let d = Dimensions::new(900.0, f64::INFINITY).sanitized();
        assert_eq!(d, Dimensions::new(900.0, 0.0));
    }

    #[test]
    fn edge_seed_derives_id_from_endpoints() {
        let edge = EdgeSeed::new("a", "b").into_edge();
        assert_eq!(edge.id, crate::edge_id(&"a".into(), None, &"b".into(), None));
        let named = EdgeSeed::new("a", "b").with_id("e1").into_edge();
        assert_eq!(named.id, "e1");
    }

    #[test]
    fn node_json_uses_type_key() {
        let node: Node = serde_json::from_value(json!({
            "id": "n1",
            "type": "osc",
            "position": {"x": 1.0, "y": 2.0},
        }))
        .unwrap();
        assert_eq!(node.node_type, "osc");
        assert!(node.data.is_empty());
        assert!(!node.selected);

        let back = serde_json::to_value(&node).unwrap();
        assert_eq!(back["type"], json!("osc"));
        assert!(back.get("selected").is_none());
    }

    #[test]
    fn edge_extra_fields_land_in_params() {
        let edge: Edge = serde_json::from_value(json!({
            "id": "e1",
            "source": "a",
            "target": "b",
            "animated": true,
        }))
        .unwrap();
        assert_eq!(edge.params["animated"], json!(true));
        assert!(edge.touches(&"a".into()));
        assert!(!edge.touches(&"c".into()));
    }
}
