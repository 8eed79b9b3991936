//! Configuration and patch files for the nodeflow editor.
//!
//! # Features
//!
//! - **Editor Settings**: Layout and sync options from a TOML file
//! - **Patches**: Initial graphs read from TOML or JSON
//! - **Validation**: Layout ranges and patch node types checked up front
//!
//! # Example
//!
//! ```rust,no_run
//! use nodeflow_config::{EditorConfig, Patch};
//! use nodeflow_registry::NodeRegistry;
//!
//! let config = EditorConfig::load("nodeflow.toml").unwrap();
//! let patch = Patch::load("voice.toml").unwrap();
//! patch.validate(&NodeRegistry::new()).unwrap();
//! assert!(config.layout.columns >= 1);
//! ```

mod editor_config;
mod error;
mod patch;

pub use editor_config::{EditorConfig, SyncConfig};
pub use error::ConfigError;
pub use patch::Patch;
