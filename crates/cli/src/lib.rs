use anyhow::Context;
use clap::Parser;
use flowpath_engine::{Board, EngineConfig, IdSeed, PathController, PathStore};
use flowpath_protocol::{ControllerUpdate, GestureEvent, PathPayload, Puzzle};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use tracing_subscriber::EnvFilter;

/// Replays a recorded gesture script against a puzzle and prints the
/// resulting committed paths as JSON.
#[derive(Debug, Clone, Parser)]
#[command(name = "flowpath-replay", version)]
pub struct Args {
    /// Puzzle description (JSON, or YAML with a .yaml/.yml extension).
    #[arg(long)]
    pub puzzle: PathBuf,
    /// Gesture script: a list of events, or `{ paths, events }`.
    #[arg(long)]
    pub script: PathBuf,
    /// Engine settings. Defaults to `<config dir>/flowpath/config.json` when present.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Segment id seed. Defaults to the wall clock.
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long)]
    pub pretty: bool,
    #[arg(short, long)]
    pub verbose: bool,
}

/// Without `verbose` the level is pinned to `info`; with it, `RUST_LOG`
/// overrides the `debug` default.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Script {
    Events(Vec<GestureEvent>),
    Seeded {
        #[serde(default)]
        paths: Option<PathPayload>,
        events: Vec<GestureEvent>,
    },
}

impl Script {
    pub fn into_parts(self) -> (Option<PathPayload>, Vec<GestureEvent>) {
        match self {
            Script::Events(events) => (None, events),
            Script::Seeded { paths, events } => (paths, events),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub paths: PathPayload,
    pub solved: bool,
    pub segments: usize,
    pub next_segment_id: u64,
    pub updates: Vec<ControllerUpdate>,
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

fn read_document<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if is_yaml(path) {
        serde_yaml::from_str(&raw).with_context(|| format!("invalid YAML in {}", path.display()))
    } else {
        serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("flowpath").join("config.json"))
}

pub fn load_puzzle(path: &Path) -> anyhow::Result<Board> {
    let puzzle: Puzzle = read_document(path)?;
    Board::from_puzzle(&puzzle).with_context(|| format!("bad puzzle {}", path.display()))
}

pub fn load_script(path: &Path) -> anyhow::Result<Script> {
    read_document(path)
}

/// An explicit path must exist; the default location is optional.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let config = match path {
        Some(path) => read_document(path)?,
        None => match default_config_path().filter(|p| p.is_file()) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using default config");
                read_document(&path)?
            }
            None => EngineConfig::default(),
        },
    };
    config.validate()?;
    Ok(config)
}

/// Feeds `events` to a controller from a separate input thread, the way a
/// UI thread would, and collects every update it emits.
pub fn replay(
    board: Board,
    config: EngineConfig,
    seed: IdSeed,
    initial: PathStore,
    events: Vec<GestureEvent>,
) -> anyhow::Result<ReplayReport> {
    let (event_tx, event_rx) = mpsc::channel();
    let (update_tx, update_rx) = mpsc::channel();
    let count = events.len();

    let input = thread::spawn(move || {
        for event in events {
            if event_tx.send(event).is_err() {
                break;
            }
        }
    });

    let mut controller = PathController::new(board, config, seed).with_paths(initial);
    controller.run(&event_rx, &update_tx);
    drop(update_tx);
    input
        .join()
        .map_err(|_| anyhow::anyhow!("gesture input thread panicked"))?;

    let updates: Vec<ControllerUpdate> = update_rx.into_iter().collect();
    let paths = controller.paths();
    tracing::info!(
        events = count,
        updates = updates.len(),
        segments = paths.segment_count(),
        solved = controller.is_solved(),
        "replay finished"
    );
    Ok(ReplayReport {
        paths: paths.to_payload(),
        solved: controller.is_solved(),
        segments: paths.segment_count(),
        next_segment_id: controller.next_segment_id(),
        updates,
    })
}

pub fn replay_files(args: &Args) -> anyhow::Result<ReplayReport> {
    let board = load_puzzle(&args.puzzle)?;
    let config = load_config(args.config.as_deref())?;
    let (paths, events) = load_script(&args.script)?.into_parts();
    let initial = match paths {
        Some(payload) => PathStore::from_payload(&payload)
            .with_context(|| format!("bad starting paths in {}", args.script.display()))?,
        None => PathStore::new(),
    };
    let seed = args.seed.map(IdSeed::new).unwrap_or_else(IdSeed::now);
    replay(board, config, seed, initial, events)
}

pub fn run(args: &Args) -> anyhow::Result<()> {
    let report = replay_files(args)?;
    let out = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{out}");
    Ok(())
}

#[cfg(test)]
mod tests;
