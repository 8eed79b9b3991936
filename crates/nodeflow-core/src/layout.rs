//! Automatic distribution of nodes across the container.
//!
//! The container's width isn't known until the host measures it, so node
//! positions start at whatever the seeds said and are overwritten once a size
//! arrives (and again on every resize). Nodes are laid out on a single row:
//!
//! - the width is cut into `columns` equal slots and node `i` is centred on
//!   slot `i`;
//! - `x` is shifted left by half a node width so the node's centre, not its
//!   top-left corner, sits on the slot centre;
//! - `y` is a fixed fraction of the height.
//!
//! With more nodes than columns the [`Overflow`] policy decides what happens.
//! The engine is stateless: the same ids and dimensions always give the same
//! positions, which is what makes repeated distribution drift-free.

use serde::{Deserialize, Serialize};

use crate::change::NodeChange;
use crate::geometry::distribute;
use crate::model::{Dimensions, NodeId, Position};

/// What to do when there are more nodes than column slots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    /// Keep the column spacing and carry on past the right edge: node `i`
    /// uses slot `i` of `columns`. Earlier nodes never move when one is added.
    #[default]
    Extend,
    /// Shrink the slots so every node gets its own (`max(columns, n)` slots).
    Scale,
    /// Keep `columns` slots and wrap: node `i` uses slot `i mod columns`.
    Wrap,
}

/// Layout parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Number of column slots across the width.
    pub columns: usize,
    /// Half the rendered node width, subtracted from each slot centre.
    pub node_half_width: f64,
    /// Row position as a fraction of the container height.
    pub row_fraction: f64,
    /// Policy for node counts above `columns`.
    pub overflow: Overflow,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            columns: LayoutEngine::DEFAULT_COLUMNS,
            node_half_width: LayoutEngine::DEFAULT_NODE_HALF_WIDTH,
            row_fraction: LayoutEngine::DEFAULT_ROW_FRACTION,
            overflow: Overflow::Extend,
        }
    }
}

/// Computes node positions from container dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    /// Column slots across the container.
    pub const DEFAULT_COLUMNS: usize = 3;
    /// Half of the renderer's default node width.
    pub const DEFAULT_NODE_HALF_WIDTH: f64 = 54.0;
    /// Nodes sit a quarter of the way down.
    pub const DEFAULT_ROW_FRACTION: f64 = 0.25;

    /// Creates an engine with the given parameters.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Returns the active parameters.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Position of the node at ordinal `index` out of `count`.
    pub fn position_for(&self, index: usize, count: usize, dimensions: Dimensions) -> Position {
        let dims = dimensions.sanitized();
        let columns = self.config.columns.max(1);
        let (slots, slot) = match self.config.overflow {
            Overflow::Extend => (columns, index),
            Overflow::Scale => (columns.max(count), index),
            Overflow::Wrap => (columns, index % columns),
        };
        Position {
            x: distribute(0.0, dims.width, slots, slot) - self.config.node_half_width,
            y: dims.height * self.config.row_fraction,
        }
    }

    /// Positions for `ids`, in order.
    pub fn positions(&self, ids: &[NodeId], dimensions: Dimensions) -> Vec<(NodeId, Position)> {
        let count = ids.len();
        ids.iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), self.position_for(i, count, dimensions)))
            .collect()
    }

    /// The same positions as a change-list of `position` items.
    pub fn position_changes(&self, ids: &[NodeId], dimensions: Dimensions) -> Vec<NodeChange> {
        self.positions(ids, dimensions)
            .into_iter()
            .map(|(id, position)| NodeChange::position(id, position))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<NodeId> {
        (0..n).map(|i| NodeId::new(format!("n{i}"))).collect()
    }

    #[test]
    fn three_nodes_fill_three_columns() {
        let engine = LayoutEngine::default();
        let out = engine.positions(&ids(3), Dimensions::new(900.0, 400.0));
        let xs: Vec<f64> = out.iter().map(|(_, p)| p.x).collect();
        assert_eq!(xs, vec![96.0, 396.0, 696.0]);
        assert!(out.iter().all(|(_, p)| p.y == 100.0));
    }

    #[test]
    fn fewer_nodes_keep_column_spacing() {
        let engine = LayoutEngine::default();
        let out = engine.positions(&ids(2), Dimensions::new(900.0, 400.0));
        assert_eq!(out[0].1.x, 96.0);
        assert_eq!(out[1].1.x, 396.0);
    }

    #[test]
    fn extra_nodes_extend_past_the_width() {
        let engine = LayoutEngine::default();
        let three = engine.positions(&ids(3), Dimensions::new(900.0, 400.0));
        let five = engine.positions(&ids(5), Dimensions::new(900.0, 400.0));
        let xs: Vec<f64> = five.iter().map(|(_, p)| p.x).collect();
        assert_eq!(xs, vec![96.0, 396.0, 696.0, 996.0, 1296.0]);
        assert_eq!(&five[..3], &three[..]);
    }

    #[test]
    fn scale_gives_every_node_a_slot() {
        let engine = LayoutEngine::new(LayoutConfig {
            overflow: Overflow::Scale,
            ..LayoutConfig::default()
        });
        let out = engine.positions(&ids(6), Dimensions::new(600.0, 200.0));
        let xs: Vec<f64> = out.iter().map(|(_, p)| p.x + 54.0).collect();
        assert_eq!(xs, vec![50.0, 150.0, 250.0, 350.0, 450.0, 550.0]);
    }

    #[test]
    fn wrap_reuses_columns() {
        let engine = LayoutEngine::new(LayoutConfig {
            overflow: Overflow::Wrap,
            ..LayoutConfig::default()
        });
        let out = engine.positions(&ids(4), Dimensions::new(900.0, 400.0));
        assert_eq!(out[3].1, out[0].1);
    }

    #[test]
    fn unmeasured_container_collapses_to_offset() {
        let engine = LayoutEngine::default();
        let out = engine.positions(&ids(3), Dimensions::new(0.0, f64::NAN));
        assert!(out.iter().all(|(_, p)| *p == Position::new(-54.0, 0.0)));
    }

    #[test]
    fn zero_columns_treated_as_one() {
        let engine = LayoutEngine::new(LayoutConfig {
            columns: 0,
            overflow: Overflow::Wrap,
            ..LayoutConfig::default()
        });
        let p = engine.position_for(4, 5, Dimensions::new(200.0, 100.0));
        assert_eq!(p, Position::new(46.0, 25.0));
    }

    #[test]
    fn changes_target_each_id() {
        let engine = LayoutEngine::default();
        let changes = engine.position_changes(&ids(2), Dimensions::new(300.0, 100.0));
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1].id().as_str(), "n1");
    }
}
