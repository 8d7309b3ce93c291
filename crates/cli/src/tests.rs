use super::*;
use flowpath_protocol::{Cell, Color, SegmentId};
use std::fs;

const LINE_PUZZLE: &str = r#"{
  "width": 3,
  "height": 1,
  "dots": [{ "color": "red", "a": [0, 0], "b": [2, 0] }]
}"#;

const SMALL_CELLS: &str = r#"{ "cell_size": 10.0 }"#;

const DRAG_ACROSS: &str = r#"[
  { "kind": "begin", "x": 5, "y": 5 },
  { "kind": "update", "x": 25, "y": 5 },
  { "kind": "end" }
]"#;

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn args(dir: &Path, puzzle: PathBuf, script: PathBuf) -> Args {
    Args {
        puzzle,
        script,
        config: Some(write(dir, "config.json", SMALL_CELLS)),
        seed: Some(7),
        pretty: false,
        verbose: false,
    }
}

fn red() -> Color {
    Color::from("red")
}

#[test]
fn replays_a_winning_drag() {
    let dir = tempfile::tempdir().unwrap();
    let puzzle = write(dir.path(), "puzzle.json", LINE_PUZZLE);
    let script = write(dir.path(), "script.json", DRAG_ACROSS);

    let report = replay_files(&args(dir.path(), puzzle, script)).unwrap();
    assert!(report.solved);
    assert_eq!(report.segments, 1);
    assert_eq!(report.next_segment_id, 1);
    let red_segments = report.paths.get(&red()).unwrap();
    assert_eq!(red_segments[0].id, SegmentId::new("seg-7-0"));
    assert_eq!(red_segments[0].cells, vec![0, 0, 1, 0, 2, 0]);

    assert!(matches!(
        report.updates.last(),
        Some(ControllerUpdate::Paths { solved: true, .. })
    ));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["paths"]["red"][0]["id"], "seg-7-0");
    assert_eq!(json["solved"], true);
}

#[test]
fn reads_yaml_documents() {
    let dir = tempfile::tempdir().unwrap();
    let puzzle = write(
        dir.path(),
        "puzzle.yaml",
        "width: 3\nheight: 1\ndots:\n  - color: red\n    a: [0, 0]\n    b: [2, 0]\n",
    );
    let script = write(
        dir.path(),
        "script.yml",
        "- kind: begin\n  x: 5\n  y: 5\n- kind: update\n  x: 15\n  y: 5\n- kind: end\n",
    );

    let report = replay_files(&args(dir.path(), puzzle, script)).unwrap();
    assert!(!report.solved);
    assert_eq!(report.paths.get(&red()).unwrap()[0].cells, vec![0, 0, 1, 0]);
}

#[test]
fn script_can_seed_starting_paths() {
    let dir = tempfile::tempdir().unwrap();
    let puzzle = write(dir.path(), "puzzle.json", LINE_PUZZLE);
    let script = write(
        dir.path(),
        "script.json",
        r#"{
  "paths": { "red": [{ "id": "seg-1-0", "cells": [0, 0, 1, 0, 2, 0] }] },
  "events": [{ "kind": "reset" }, { "kind": "undo" }]
}"#,
    );

    let report = replay_files(&args(dir.path(), puzzle, script)).unwrap();
    assert!(report.solved);
    assert_eq!(report.updates.len(), 2);
    assert!(matches!(
        &report.updates[0],
        ControllerUpdate::Paths { payload, solved: false } if payload.is_empty()
    ));
    assert_eq!(report.paths.get(&red()).unwrap()[0].id, SegmentId::new("seg-1-0"));
}

#[test]
fn odd_starting_coordinates_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let puzzle = write(dir.path(), "puzzle.json", LINE_PUZZLE);
    let script = write(
        dir.path(),
        "script.json",
        r#"{ "paths": { "red": [{ "id": "seg-1-0", "cells": [0, 0, 1] }] }, "events": [] }"#,
    );

    let err = replay_files(&args(dir.path(), puzzle, script)).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("bad starting paths"), "{message}");
    assert!(message.contains("seg-1-0"), "{message}");
}

#[test]
fn unfinished_gesture_is_discarded() {
    let board = Board::rect(3, 1).with_dot(Cell::new(0, 0), red());
    let config = EngineConfig {
        cell_size: 10.0,
        ..EngineConfig::default()
    };
    let events = vec![
        GestureEvent::Begin { x: 5.0, y: 5.0 },
        GestureEvent::Update { x: 25.0, y: 5.0 },
    ];

    let report = replay(board, config, IdSeed::new(1), PathStore::new(), events).unwrap();
    assert!(report.paths.is_empty());
    assert_eq!(report.next_segment_id, 0);
    assert_eq!(report.updates.len(), 2);
}

#[test]
fn explicit_config_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(Some(&dir.path().join("missing.json"))).unwrap_err();
    assert!(format!("{err:#}").contains("failed to read"));
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "config.yaml", "cell_size: 0\n");
    let err = load_config(Some(&path)).unwrap_err();
    assert!(format!("{err:#}").contains("cell_size"));
}

#[test]
fn partial_config_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "config.json", SMALL_CELLS);
    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.cell_size, 10.0);
    assert_eq!(config.history_limit, EngineConfig::default().history_limit);
}

#[test]
fn puzzle_with_dot_on_closed_cell_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "puzzle.json",
        r#"{ "width": 2, "height": 1, "open": [[0, 0]], "dots": [{ "color": "red", "a": [0, 0], "b": [1, 0] }] }"#,
    );
    let err = load_puzzle(&path).unwrap_err();
    assert!(format!("{err:#}").contains("bad puzzle"));
}

#[test]
fn script_accepts_bare_event_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "script.json", r#"[{ "kind": "pan", "dx": 3, "dy": -2 }]"#);
    let (paths, events) = load_script(&path).unwrap().into_parts();
    assert!(paths.is_none());
    assert_eq!(events, vec![GestureEvent::Pan { dx: 3.0, dy: -2.0 }]);
}

#[test]
fn args_parse_from_command_line() {
    let args = Args::try_parse_from([
        "flowpath-replay",
        "--puzzle",
        "p.json",
        "--script",
        "s.yaml",
        "--seed",
        "42",
        "--pretty",
        "-v",
    ])
    .unwrap();
    assert_eq!(args.puzzle, PathBuf::from("p.json"));
    assert_eq!(args.seed, Some(42));
    assert!(args.pretty && args.verbose);
    assert!(args.config.is_none());
}

#[test]
fn default_config_lives_under_flowpath() {
    if let Some(path) = default_config_path() {
        assert!(path.ends_with("flowpath/config.json"));
    }
}

