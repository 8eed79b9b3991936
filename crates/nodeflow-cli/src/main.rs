//! Nodeflow CLI - headless host for the nodeflow editor.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nodeflow")]
#[command(author, version, about = "Nodeflow patch editor CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List node types and their default parameters
    Nodes(commands::nodes::NodesArgs),

    /// Print the distributed node positions for a patch
    Layout(commands::layout::LayoutArgs),

    /// Run a patch through an editor session and print the resulting state
    Run(commands::run::RunArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Nodes(args) => commands::nodes::run(args),
        Commands::Layout(args) => commands::layout::run(args),
        Commands::Run(args) => commands::run::run(args),
    }
}
