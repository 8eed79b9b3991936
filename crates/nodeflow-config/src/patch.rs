//! Patch file format.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use nodeflow_core::{EdgeSeed, NodeSeed};
use nodeflow_registry::NodeRegistry;

use crate::error::ConfigError;

/// Initial graph for an editor session.
///
/// Patches are read from TOML or JSON; the file extension decides which
/// (`.json` is JSON, anything else TOML). They are seed input only: a
/// running session never writes its graph back out. Node data only needs the keys
/// that differ from the type's defaults.
///
/// # TOML Format
///
/// ```toml
/// name = "Simple Voice"
/// description = "Oscillator into an amp"
///
/// [[nodes]]
/// id = "osc"
/// type = "osc"
/// [nodes.data]
/// frequency = 440.0
///
/// [[nodes]]
/// id = "amp"
/// type = "amp"
///
/// [[edges]]
/// source = "osc"
/// target = "amp"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Patch {
    /// Name of the patch.
    #[serde(default)]
    pub name: String,

    /// Optional description of the patch.
    #[serde(default)]
    pub description: Option<String>,

    /// Node seeds, in order.
    #[serde(default)]
    pub nodes: Vec<NodeSeed>,

    /// Edge seeds, in order.
    #[serde(default)]
    pub edges: Vec<EdgeSeed>,
}

impl Patch {
    /// Create a new empty patch.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a node seed.
    pub fn with_node(mut self, node: NodeSeed) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add an edge seed.
    pub fn with_edge(mut self, edge: EdgeSeed) -> Self {
        self.edges.push(edge);
        self
    }

    /// Load a patch from a TOML or JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        if is_json(path) {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    /// Load a patch from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load a patch from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Check node ids are unique and every node type is registered.
    ///
    /// The store tolerates both (duplicates are dropped, unknown types get no
    /// defaults), so this is for hosts that want to refuse such patches up
    /// front.
    pub fn validate(&self, registry: &NodeRegistry) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(ConfigError::DuplicateNode(node.id.to_string()));
            }
            if !registry.contains(&node.node_type) {
                return Err(ConfigError::UnknownNodeType {
                    id: node.id.to_string(),
                    node_type: node.node_type.clone(),
                });
            }
        }
        Ok(())
    }

    /// Get the number of nodes in the patch.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the patch has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
