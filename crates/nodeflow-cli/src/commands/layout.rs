//! Layout preview command.

use std::path::PathBuf;

use clap::Args;
use nodeflow_core::Dimensions;
use nodeflow_editor::EditorSession;
use nodeflow_registry::NodeRegistry;
use serde::Serialize;

use super::common::{load_config, load_patch};

#[derive(Args)]
pub struct LayoutArgs {
    /// Patch file (.toml or .json)
    patch: PathBuf,

    /// Container width
    #[arg(long, default_value_t = 900.0)]
    width: f64,

    /// Container height
    #[arg(long, default_value_t = 400.0)]
    height: f64,

    /// Editor settings file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct Placement<'a> {
    id: &'a str,
    x: f64,
    y: f64,
}

pub fn run(args: LayoutArgs) -> anyhow::Result<()> {
    let registry = NodeRegistry::new();
    let patch = load_patch(&args.patch, &registry)?;
    let config = load_config(args.config.as_deref())?;

    let mut session = EditorSession::new(patch.into(), &registry, config);
    let snapshot = session.on_resize(Dimensions::new(args.width, args.height));

    let placements: Vec<Placement<'_>> = snapshot
        .nodes()
        .iter()
        .map(|n| Placement {
            id: n.id.as_str(),
            x: n.position.x,
            y: n.position.y,
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&placements)?);
    Ok(())
}
