//! Filesystem tests for the `starlog-events` persistence layer.
//!
//! Each test works in its own scratch directory under the system temp dir
//! and removes it when done.

// Integration tests use unwrap extensively for clarity -- panicking on
// failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::missing_panics_doc,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::path::{Path, PathBuf};

use starlog_events::{
    EventRecord, EventsError, LogRecord, Logbook, MigrationError, ParsedLine, ProfilePaths,
    SnapshotStore,
};
use starlog_types::{Action, GameEvent, QuestStatus};

struct Scratch(PathBuf);

impl Scratch {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("starlog-events-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn records(lines: Vec<ParsedLine>) -> Vec<LogRecord> {
    lines
        .into_iter()
        .filter_map(|line| match line {
            ParsedLine::Parsed(record) => Some(record),
            ParsedLine::Skipped { .. } => None,
        })
        .collect()
}

#[test]
fn missing_save_loads_new_game() {
    let scratch = Scratch::new();
    let paths = ProfilePaths::new(scratch.path(), "fresh").unwrap();
    let state = SnapshotStore::for_profile(&paths).load().unwrap();
    assert_eq!(state, starlog_world::default_state());
}

#[test]
fn save_then_load_preserves_state() {
    let scratch = Scratch::new();
    let paths = ProfilePaths::new(scratch.path(), "offline").unwrap();
    let store = SnapshotStore::for_profile(&paths);

    let mut state = starlog_world::default_state();
    state.day = 12;
    state.ship.sector = "AIRI".to_owned();
    state.last_seed = 99;
    store.save(&state).unwrap();

    let body = std::fs::read_to_string(paths.state_file()).unwrap();
    assert!(body.ends_with('\n'));
    assert!(!paths.dir().join("game_state.json.tmp").exists());
    assert_eq!(store.load().unwrap(), state);
}

#[test]
fn v2_save_on_disk_is_migrated_on_load() {
    let scratch = Scratch::new();
    let paths = ProfilePaths::new(scratch.path(), "legacy").unwrap();
    std::fs::create_dir_all(paths.dir()).unwrap();
    std::fs::write(
        paths.state_file(),
        r#"{"schema_version":2,"day":3,"ship":{"sector":"Mostek","hull":97,"power":97},
            "player":{"xp":15,"level":2},"achievements":["First Day"],
            "quests":[{"quest_id":"q_ticks_3","status":"completed","progress":3}]}"#,
    )
    .unwrap();

    let state = SnapshotStore::for_profile(&paths).load().unwrap();
    assert_eq!(state.schema_version, 3);
    assert_eq!(state.last_seed, 0);
    assert_eq!(state.quests.len(), 3);
    assert_eq!(
        state.quest("q_ticks_3").unwrap().status,
        QuestStatus::Completed
    );
}

#[test]
fn unsupported_save_version_is_fatal_to_load() {
    let scratch = Scratch::new();
    let paths = ProfilePaths::new(scratch.path(), "future").unwrap();
    std::fs::create_dir_all(paths.dir()).unwrap();
    std::fs::write(paths.state_file(), r#"{"schema_version":9}"#).unwrap();

    let err = SnapshotStore::for_profile(&paths).load().unwrap_err();
    assert!(matches!(
        err,
        EventsError::Migration(MigrationError::UnsupportedSchemaVersion { found: 9 })
    ));
}

#[test]
fn logbook_appends_in_order() {
    let scratch = Scratch::new();
    let paths = ProfilePaths::new(scratch.path(), "offline").unwrap();
    let log = Logbook::for_profile(&paths);
    let state = starlog_world::default_state();

    log.append_snapshot(&state).unwrap();
    log.append_command(&Action::Tick { seed: Some(123) }).unwrap();
    log.append_events(&[GameEvent::TickDone { amount: 1, day: 1 }])
        .unwrap();
    log.append_event_record(&EventRecord::signal("doctor_ok", 1))
        .unwrap();

    let body = std::fs::read_to_string(log.path()).unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], r#"{"type":"command","action":"tick","seed":123}"#);
    assert_eq!(lines[2], r#"{"type":"tick_done","amount":1,"day":1}"#);

    let parsed = records(log.read().unwrap());
    assert!(matches!(&parsed[0], LogRecord::Snapshot(s) if *s == state));
    assert!(matches!(&parsed[1], LogRecord::Command { action, .. } if action == "tick"));
    assert!(matches!(&parsed[3], LogRecord::Event(e) if e.event_type == "doctor_ok"));
}

#[test]
fn torn_last_line_is_skipped_and_later_appends_still_parse() {
    let scratch = Scratch::new();
    let paths = ProfilePaths::new(scratch.path(), "torn").unwrap();
    let log = Logbook::for_profile(&paths);

    log.append_command(&Action::Tick { seed: Some(1) }).unwrap();
    // Simulate a crash mid-append: half a line, no newline.
    {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(log.path())
            .unwrap();
        file.write_all(br#"{"type":"command","act"#).unwrap();
    }

    let lines = log.read().unwrap();
    assert_eq!(lines.len(), 2);
    assert!(matches!(lines[1], ParsedLine::Skipped { line: 2, .. }));

    // Appends after the crash start on a fresh line; only the fragment is lost.
    log.append_command(&Action::Tick { seed: Some(2) }).unwrap();
    log.append_command(&Action::Tick { seed: Some(3) }).unwrap();
    let lines = log.read().unwrap();
    assert_eq!(lines.len(), 4);
    assert!(matches!(lines[1], ParsedLine::Skipped { line: 2, .. }));
    let parsed = records(lines);
    assert_eq!(parsed.len(), 3);
    assert!(matches!(
        &parsed[1],
        LogRecord::Command { parameters, .. } if parameters["seed"] == 2
    ));
    assert!(matches!(
        &parsed[2],
        LogRecord::Command { parameters, .. } if parameters["seed"] == 3
    ));
}

#[test]
fn append_to_a_fresh_file_adds_no_leading_newline() {
    let scratch = Scratch::new();
    let paths = ProfilePaths::new(scratch.path(), "clean").unwrap();
    let log = Logbook::for_profile(&paths);

    log.append_command(&Action::Tick { seed: Some(1) }).unwrap();
    log.append_command(&Action::Tick { seed: Some(2) }).unwrap();
    let body = std::fs::read_to_string(log.path()).unwrap();
    assert!(!body.starts_with('\n'));
    assert!(!body.contains("\n\n"));
    assert_eq!(body.lines().count(), 2);
}

#[test]
fn duplicate_retry_lines_still_parse() {
    let scratch = Scratch::new();
    let paths = ProfilePaths::new(scratch.path(), "retry").unwrap();
    let log = Logbook::for_profile(&paths);

    let state = starlog_world::default_state();
    log.append_snapshot(&state).unwrap();
    log.append_snapshot(&state).unwrap();
    let parsed = records(log.read().unwrap());
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0], parsed[1]);
}

#[test]
fn missing_logbook_reads_empty() {
    let scratch = Scratch::new();
    let paths = ProfilePaths::new(scratch.path(), "empty").unwrap();
    assert!(Logbook::for_profile(&paths).read().unwrap().is_empty());
}

#[test]
fn invalid_utf8_line_is_skipped() {
    let scratch = Scratch::new();
    let paths = ProfilePaths::new(scratch.path(), "bytes").unwrap();
    std::fs::create_dir_all(paths.dir()).unwrap();
    std::fs::write(
        paths.logbook_file(),
        b"\xff\xfe\n{\"type\":\"command\",\"action\":\"move\",\"sector\":\"AIRI\"}\n",
    )
    .unwrap();

    let lines = Logbook::for_profile(&paths).read().unwrap();
    assert!(matches!(lines[0], ParsedLine::Skipped { line: 1, .. }));
    assert!(matches!(
        &lines[1],
        ParsedLine::Parsed(LogRecord::Command { action, .. }) if action == "move"
    ));
}
