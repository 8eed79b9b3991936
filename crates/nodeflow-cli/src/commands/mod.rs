//! CLI command implementations.

pub mod common;
pub mod layout;
pub mod nodes;
pub mod run;
