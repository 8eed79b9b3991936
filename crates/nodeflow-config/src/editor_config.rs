//! Editor settings file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use nodeflow_core::{LayoutConfig, LayoutEngine};

use crate::error::ConfigError;

/// Engine synchronization settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Attach the sync bridge to the store. When `false` the host drives the
    /// engine itself.
    pub enabled: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Settings for an editor session.
///
/// # TOML Format
///
/// ```toml
/// [layout]
/// columns = 4
/// node_half_width = 60.0
/// row_fraction = 0.3
/// overflow = "wrap"
///
/// [sync]
/// enabled = true
/// ```
///
/// Every key is optional; missing keys take their defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Automatic layout parameters.
    pub layout: LayoutConfig,
    /// Engine synchronization.
    pub sync: SyncConfig,
}

impl EditorConfig {
    /// Load settings from a TOML file and validate them.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse settings from a TOML string and validate them.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Convert the settings to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the layout parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let layout = &self.layout;
        if layout.columns == 0 {
            return Err(ConfigError::invalid_layout("columns must be at least 1"));
        }
        if !layout.node_half_width.is_finite() || layout.node_half_width < 0.0 {
            return Err(ConfigError::invalid_layout(format!(
                "node_half_width must be finite and non-negative, got {}",
                layout.node_half_width
            )));
        }
        if !(0.0..=1.0).contains(&layout.row_fraction) {
            return Err(ConfigError::invalid_layout(format!(
                "row_fraction must be within [0, 1], got {}",
                layout.row_fraction
            )));
        }
        Ok(())
    }

    /// A layout engine configured from these settings.
    pub fn layout_engine(&self) -> LayoutEngine {
        LayoutEngine::new(self.layout)
    }
}
