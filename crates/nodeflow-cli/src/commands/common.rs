//! Shared CLI helpers used across multiple commands.

use std::path::Path;

use anyhow::Context;
use nodeflow_config::{EditorConfig, Patch};
use nodeflow_core::{Connection, NodeData, NodeId};
use nodeflow_registry::NodeRegistry;
use serde_json::Value;

/// Parse a `source[.handle]:target[.handle]` connection for clap's `value_parser`.
pub fn parse_connection(s: &str) -> Result<Connection, String> {
    let (source, target) = s
        .split_once(':')
        .ok_or_else(|| format!("Invalid connection: '{s}' (expected source:target)"))?;
    let (source, source_handle) = parse_endpoint(source)
        .ok_or_else(|| format!("Invalid connection: '{s}' (empty source)"))?;
    let (target, target_handle) = parse_endpoint(target)
        .ok_or_else(|| format!("Invalid connection: '{s}' (empty target)"))?;
    Ok(Connection::new(source, target).with_handles(source_handle, target_handle))
}

/// Split `node[.handle]`. `None` if the node part is empty.
fn parse_endpoint(s: &str) -> Option<(&str, Option<&str>)> {
    let (node, handle) = match s.split_once('.') {
        Some((node, handle)) => (node, Some(handle).filter(|h| !h.is_empty())),
        None => (s, None),
    };
    (!node.is_empty()).then_some((node, handle))
}

/// A parameter edit parsed from `node:key=value`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamEdit {
    /// Target node.
    pub id: NodeId,
    /// Data to merge.
    pub data: NodeData,
}

/// Parse a `node:key=value` parameter edit for clap's `value_parser`.
///
/// The value is read as JSON when it parses (`440`, `true`, `"x"`), and as a
/// plain string otherwise.
pub fn parse_param_edit(s: &str) -> Result<ParamEdit, String> {
    let (id, assignment) = s
        .split_once(':')
        .ok_or_else(|| format!("Invalid parameter: '{s}' (expected node:key=value)"))?;
    let (key, value) = assignment
        .split_once('=')
        .ok_or_else(|| format!("Invalid parameter: '{s}' (expected node:key=value)"))?;
    if id.is_empty() || key.is_empty() {
        return Err(format!("Invalid parameter: '{s}' (empty node or key)"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    let mut data = NodeData::new();
    data.insert(key.to_string(), value);
    Ok(ParamEdit {
        id: id.into(),
        data,
    })
}

/// Load a patch file and check it against the registry.
pub fn load_patch(path: &Path, registry: &NodeRegistry) -> anyhow::Result<Patch> {
    let patch = Patch::load(path).with_context(|| format!("loading {}", path.display()))?;
    patch.validate(registry)?;
    Ok(patch)
}

/// Load editor settings, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EditorConfig> {
    match path {
        Some(path) => {
            EditorConfig::load(path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(EditorConfig::default()),
    }
}
