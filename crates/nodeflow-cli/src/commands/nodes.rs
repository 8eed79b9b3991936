//! Node type listing command.

use clap::Args;
use nodeflow_core::DefaultsCatalog;
use nodeflow_registry::{NodeCategory, NodeRegistry};
use serde_json::Value;

#[derive(Args)]
pub struct NodesArgs {
    /// Show details for a specific node type
    #[arg(value_name = "TYPE")]
    node_type: Option<String>,

    /// Print as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: NodesArgs) -> anyhow::Result<()> {
    let registry = NodeRegistry::new();

    if let Some(id) = &args.node_type {
        let descriptor = registry
            .get(id)
            .ok_or_else(|| anyhow::anyhow!("Unknown node type: {}", id))?;
        let defaults = registry.defaults(descriptor.id).unwrap_or_default();

        if args.json {
            println!("{}", serde_json::to_string_pretty(&Value::Object(defaults))?);
            return Ok(());
        }

        println!("{} ({})", descriptor.name, descriptor.id);
        println!("{}", "=".repeat(descriptor.name.len() + descriptor.id.len() + 3));
        println!();
        println!("{}", descriptor.description);
        println!("Category: {}", descriptor.category.name());
        println!();
        println!("Defaults:");
        for (key, value) in &defaults {
            println!("  {key:12}  {value}");
        }
        return Ok(());
    }

    if args.json {
        let listing: serde_json::Map<String, Value> = registry
            .all_nodes()
            .map(|d| {
                let defaults = registry.defaults(d.id).unwrap_or_default();
                (d.id.to_string(), Value::Object(defaults))
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("Node Types");
    println!("==========");
    for category in [
        NodeCategory::Source,
        NodeCategory::Processor,
        NodeCategory::Destination,
    ] {
        println!();
        println!("{} - {}", category.name(), category.description());
        for node in registry.nodes_in_category(category) {
            println!("  {:8} {:12} - {}", node.id, node.name, node.description);
        }
    }
    println!();
    println!("Use 'nodeflow nodes <type>' for default parameters.");

    Ok(())
}
