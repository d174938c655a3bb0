//! recordhook replay harness
//!
//! Feeds one serialized event context through the dispatcher and prints the
//! outcome as JSON.
//!
//! Usage:
//!   recordhook-replay --context event.json
//!   cat event.json | recordhook-replay --deny-active-delete
//!
//! Exits non-zero when the dispatch raised a boundary failure.

use anyhow::Result;
use clap::Parser;
use recordhook_host::{Dispatcher, PluginConfig};
use recordhook_replay::{DenyActiveDeletion, TraceAllUpdates, load_event, load_records, replay};
use std::path::PathBuf;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "recordhook-replay")]
#[command(about = "Replays a serialized record event through the recordhook dispatcher")]
struct Args {
    /// Event context JSON file, or `-` for stdin
    #[arg(short, long, default_value = "-")]
    context: String,

    /// Plugin config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of records to seed the organization service with
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Run the active-deletion guard instead of the update tracer
    #[arg(long)]
    deny_active_delete: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let event = load_event(&args.context)?;
    let config = match &args.config {
        Some(path) => PluginConfig::load_from(path)?,
        None => PluginConfig::default(),
    };
    let seed = match &args.seed {
        Some(path) => load_records(path)?,
        None => Vec::new(),
    };
    info!("Loaded {} event with {} seed record(s)", event.message_name, seed.len());

    let outcome = if args.deny_active_delete {
        replay(&Dispatcher::with_config(DenyActiveDeletion, config), event, seed)
    } else {
        replay(&Dispatcher::with_config(TraceAllUpdates, config), event, seed)
    };

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if let Some(failure) = &outcome.failure {
        warn!(expected = failure.expected, code = failure.code, "Dispatch failed");
        std::process::exit(1);
    }
    Ok(())
}
