//! Headless session command.
//!
//! Loads a patch, runs an editor session against the mirror engine, replays
//! the requested edits as host events, and prints what the store and the
//! engine ended up with.

use std::path::PathBuf;

use clap::Args;
use nodeflow_core::{Connection, Edge, Snapshot};
use nodeflow_editor::{EditorSession, HostEvent, event_channel};
use nodeflow_registry::NodeRegistry;
use nodeflow_sync::{MirrorEngine, MirrorState, SyncStats};
use serde::Serialize;

use super::common::{ParamEdit, load_config, load_patch, parse_connection, parse_param_edit};

#[derive(Args)]
pub struct RunArgs {
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

    /// Connect two nodes: source[.handle]:target[.handle] (repeatable)
    #[arg(long = "connect", value_name = "CONN", value_parser = parse_connection)]
    connections: Vec<Connection>,

    /// Set a node parameter: node:key=value (repeatable)
    #[arg(long = "set", value_name = "PARAM", value_parser = parse_param_edit)]
    params: Vec<ParamEdit>,

    /// Remove a node (repeatable)
    #[arg(long = "remove", value_name = "ID")]
    removals: Vec<String>,

    /// Simulate the first user interaction (resumes the engine)
    #[arg(long)]
    click: bool,

    /// Fail if any edit was refused or the engine reported an error
    #[arg(long)]
    strict: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    name: &'a str,
    snapshot: &'a Snapshot,
    mirror: MirrorState,
    sync: Option<SyncStats>,
    dangling_edges: Vec<&'a Edge>,
    engine_error: Option<String>,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let registry = NodeRegistry::new();
    let patch = load_patch(&args.patch, &registry)?;
    let config = load_config(args.config.as_deref())?;
    let name = patch.name.clone();

    let engine = MirrorEngine::from_registry(&registry);
    let mirror = engine.handle();
    let mut session = EditorSession::with_engine(patch.into(), &registry, config, engine);
    if !config.sync.enabled {
        session.sync();
    }

    let (events, queue) = event_channel();
    events.resize(args.width, args.height);
    for connection in args.connections {
        events.send(HostEvent::Connect(connection));
    }
    for ParamEdit { id, data } in args.params {
        events.send(HostEvent::UpdateNode { id, data });
    }
    for id in args.removals {
        events.send(HostEvent::RemoveNode(id.into()));
    }
    if args.click {
        events.interaction();
    }
    drop(events);

    let mut refused = 0;
    while let Some(event) = queue.try_next() {
        if let Err(err) = session.dispatch(event) {
            tracing::warn!(%err, "edit refused");
            refused += 1;
        }
    }
    if !config.sync.enabled {
        session.sync();
    }

    let engine_error = session
        .bridge()
        .and_then(|b| b.last_error())
        .map(|e| e.to_string());
    if args.strict {
        if refused > 0 {
            anyhow::bail!("{} edit(s) refused", refused);
        }
        if let Some(err) = &engine_error {
            anyhow::bail!("engine error: {}", err);
        }
    }

    let snapshot = session.snapshot();
    let report = Report {
        name: &name,
        snapshot: &snapshot,
        mirror: mirror.state(),
        sync: session.sync_stats(),
        dangling_edges: snapshot.dangling_edges().collect(),
        engine_error,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
