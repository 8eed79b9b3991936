//! Node type registry for the nodeflow editor.
//!
//! This crate lists the node types the editor offers and the parameters each
//! one starts with. The store uses it as its
//! [`DefaultsCatalog`]: when the editor is built, every seed node gets its
//! type's defaults merged under whatever the seed itself specified.
//!
//! # Features
//!
//! - **Type Discovery**: List all node types with metadata
//! - **Default Payloads**: Baseline `data` for each type
//! - **Category System**: Types grouped as sources, processors, and destinations
//!
//! # Example
//!
//! ```rust
//! use nodeflow_core::DefaultsCatalog;
//! use nodeflow_registry::{NodeCategory, NodeRegistry};
//!
//! let registry = NodeRegistry::new();
//!
//! for node in registry.all_nodes() {
//!     println!("{}: {}", node.name, node.description);
//! }
//!
//! let osc = registry.defaults("osc").unwrap();
//! assert_eq!(osc["frequency"], 220.0);
//!
//! for node in registry.nodes_in_category(NodeCategory::Source) {
//!     println!("Source: {}", node.name);
//! }
//! ```

use nodeflow_core::{DefaultsCatalog, NodeData};
use serde_json::{Value, json};

/// Role of a node type in the signal chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    /// Produces a signal (oscillators, noise, LFOs)
    Source,
    /// Transforms a signal (gain, filters, delays)
    Processor,
    /// Consumes a signal (speaker output)
    Destination,
}

impl NodeCategory {
    /// Returns a human-readable name for the category.
    pub const fn name(&self) -> &'static str {
        match self {
            NodeCategory::Source => "Source",
            NodeCategory::Processor => "Processor",
            NodeCategory::Destination => "Destination",
        }
    }

    /// Returns a description of the category.
    pub const fn description(&self) -> &'static str {
        match self {
            NodeCategory::Source => "Oscillators, noise generators, and modulators",
            NodeCategory::Processor => "Gain stages, filters, and time-based processors",
            NodeCategory::Destination => "Outputs that send the signal to the speakers",
        }
    }
}

/// Describes a node type in the registry.
#[derive(Debug, Clone)]
pub struct NodeDescriptor {
    /// Type key stored in `Node::node_type` (lowercase, no spaces).
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Brief description of the node.
    pub description: &'static str,
    /// Category for organization.
    pub category: NodeCategory,
}

/// Builds a type's default payload.
type DefaultsFactory = fn() -> Value;

/// Internal entry in the registry.
struct RegistryEntry {
    descriptor: NodeDescriptor,
    defaults: DefaultsFactory,
}

/// Registry of all node types the editor can place.
///
/// All built-in types are registered by [`NodeRegistry::new`]; hosts may add
/// their own with [`NodeRegistry::register`].
pub struct NodeRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeRegistry {
    /// Create a new registry with all built-in node types registered.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(7),
        };
        registry.register_builtin_nodes();
        registry
    }

    /// Create a registry with no entries.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn register_builtin_nodes(&mut self) {
        // Oscillator
        self.register(
            NodeDescriptor {
                id: "osc",
                name: "Oscillator",
                description: "Periodic waveform generator",
                category: NodeCategory::Source,
            },
            || json!({"frequency": 220.0, "detune": 0.0, "waveform": "sine"}),
        );

        // Noise
        self.register(
            NodeDescriptor {
                id: "noise",
                name: "Noise",
                description: "White or pink noise generator",
                category: NodeCategory::Source,
            },
            || json!({"level": 0.5, "color": "white"}),
        );

        // LFO
        self.register(
            NodeDescriptor {
                id: "lfo",
                name: "LFO",
                description: "Low-frequency modulation source",
                category: NodeCategory::Source,
            },
            || json!({"rate": 2.0, "depth": 0.5, "waveform": "triangle"}),
        );

        // Amplifier
        self.register(
            NodeDescriptor {
                id: "amp",
                name: "Amplifier",
                description: "Linear gain stage",
                category: NodeCategory::Processor,
            },
            || json!({"gain": 0.5}),
        );

        // Filter
        self.register(
            NodeDescriptor {
                id: "filter",
                name: "Filter",
                description: "Resonant biquad filter",
                category: NodeCategory::Processor,
            },
            || json!({"frequency": 1000.0, "q": 1.0, "mode": "lowpass"}),
        );

        // Delay
        self.register(
            NodeDescriptor {
                id: "delay",
                name: "Delay",
                description: "Feedback delay line",
                category: NodeCategory::Processor,
            },
            || json!({"time": 0.25, "feedback": 0.3}),
        );

        // Output
        self.register(
            NodeDescriptor {
                id: "out",
                name: "Output",
                description: "Speaker output with master volume",
                category: NodeCategory::Destination,
            },
            || json!({"volume": 0.8, "muted": false}),
        );
    }

    /// Register a node type.
    ///
    /// A later registration for an existing id replaces the earlier one.
    pub fn register(&mut self, descriptor: NodeDescriptor, defaults: DefaultsFactory) {
        self.entries.retain(|e| e.descriptor.id != descriptor.id);
        self.entries.push(RegistryEntry {
            descriptor,
            defaults,
        });
    }

    /// Get all registered node descriptors.
    pub fn all_nodes(&self) -> impl Iterator<Item = &NodeDescriptor> {
        self.entries.iter().map(|e| &e.descriptor)
    }

    /// Get node types in a specific category.
    pub fn nodes_in_category(&self, category: NodeCategory) -> Vec<&NodeDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.descriptor.category == category)
            .map(|e| &e.descriptor)
            .collect()
    }

    /// Get a descriptor by type id.
    pub fn get(&self, id: &str) -> Option<&NodeDescriptor> {
        self.entries
            .iter()
            .find(|e| e.descriptor.id == id)
            .map(|e| &e.descriptor)
    }

    /// Returns true if `id` is a registered type.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Registered type ids, in registration order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.descriptor.id).collect()
    }

    /// Returns the number of registered node types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no node types are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DefaultsCatalog for NodeRegistry {
    fn defaults(&self, node_type: &str) -> Option<NodeData> {
        let entry = self.entries.iter().find(|e| e.descriptor.id == node_type)?;
        match (entry.defaults)() {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }
}
