//! End-to-end tests for the engine facade: live play, persistence, and
//! replay against a real profile directory.
//!
//! Each test gets its own data directory under the system temp dir.

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

use starlog_core::runner::{AutopilotEndReason, run_autopilot};
use starlog_core::{CoreError, Engine, StarlogConfig, StubAdvisor};
use starlog_events::{EventsError, Logbook, LogRecord, ParsedLine};
use starlog_types::{Action, BlockReason, GameEvent, QuestStatus};

struct Scratch(PathBuf);

impl Scratch {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("starlog-core-{}", uuid::Uuid::new_v4()));
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

fn engine(scratch: &Scratch) -> Engine {
    let mut config = StarlogConfig::default();
    config.storage.data_dir = scratch.path().to_path_buf();
    Engine::new(config)
}

fn log_records(engine: &Engine, profile: &str) -> Vec<LogRecord> {
    let paths = engine.paths(profile).unwrap();
    Logbook::for_profile(&paths)
        .read()
        .unwrap()
        .into_iter()
        .filter_map(|line| match line {
            ParsedLine::Parsed(record) => Some(record),
            ParsedLine::Skipped { .. } => None,
        })
        .collect()
}

#[test]
fn applied_actions_persist_and_replay_to_the_same_state() {
    let scratch = Scratch::new();
    let engine = engine(&scratch);

    engine.apply("offline", &Action::Tick { seed: Some(123) }).unwrap();
    engine
        .apply(
            "offline",
            &Action::Move {
                sector: "Sektor A-1".to_owned(),
            },
        )
        .unwrap();

    let saved = engine.load("offline").unwrap();
    assert_eq!(saved.day, 1);
    assert_eq!(saved.ship.sector, "Sektor A-1");
    assert_eq!(engine.replay("offline").unwrap(), saved);

    let records = log_records(&engine, "offline");
    assert!(matches!(&records[0], LogRecord::Command { action, .. } if action == "tick"));
    assert!(matches!(&records[1], LogRecord::Event(e) if e.event_type == "tick_done"));
    assert!(matches!(records.last(), Some(LogRecord::Event(e)) if e.event_type == "sector_moved"));
}

#[test]
fn rejected_action_logs_only_its_audit_events() {
    let scratch = Scratch::new();
    let engine = engine(&scratch);

    let result = engine
        .apply(
            "offline",
            &Action::Move {
                sector: "NoSuchPlace".to_owned(),
            },
        )
        .unwrap();
    assert_eq!(result.blocked_reason(), Some(BlockReason::UnknownSector));

    let paths = engine.paths("offline").unwrap();
    assert!(!paths.state_file().exists());
    let records = log_records(&engine, "offline");
    assert_eq!(records.len(), 1);
    assert!(matches!(&records[0], LogRecord::Event(e) if e.event_type == "sector_unknown"));
    assert_eq!(engine.replay("offline").unwrap(), starlog_world::default_state());
}

#[test]
fn compaction_snapshot_every_interval_and_replay_uses_it() {
    let scratch = Scratch::new();
    let mut config = StarlogConfig::default();
    config.storage.data_dir = scratch.path().to_path_buf();
    config.logging.snapshot_interval_days = 5;
    let engine = Engine::new(config);

    for seed in 1..=12 {
        engine.apply("long", &Action::Tick { seed: Some(seed) }).unwrap();
    }

    let snapshots: Vec<i64> = log_records(&engine, "long")
        .into_iter()
        .filter_map(|r| match r {
            LogRecord::Snapshot(state) => Some(state.day),
            _ => None,
        })
        .collect();
    assert_eq!(snapshots, vec![5, 10]);

    let report = engine.replay_report("long").unwrap();
    assert!(report.snapshot_line.is_some());
    assert_eq!(report.applied, 2);
    assert_eq!(report.state, engine.load("long").unwrap());
    assert_eq!(report.state.day, 12);
}

#[test]
fn signal_completes_quest_and_survives_replay() {
    let scratch = Scratch::new();
    let engine = engine(&scratch);

    let state = engine.load("diag").unwrap();
    let transition = engine.record_signal("diag", &state, "doctor_ok").unwrap();
    assert_eq!(
        transition.events,
        vec![GameEvent::QuestCompleted {
            quest_id: "q_doctor_once".to_owned()
        }]
    );

    let replayed = engine.replay("diag").unwrap();
    assert_eq!(
        replayed.quest("q_doctor_once").unwrap().status,
        QuestStatus::Completed
    );
    assert_eq!(replayed, engine.load("diag").unwrap());

    let claimed = engine
        .apply(
            "diag",
            &Action::Claim {
                quest_id: "q_doctor_once".to_owned(),
            },
        )
        .unwrap();
    assert!(claimed.is_ok());
    assert_eq!(claimed.state.player.xp, 10);
    assert_eq!(engine.replay("diag").unwrap(), claimed.state);
}

#[test]
fn autopilot_ticks_claims_and_replays() {
    let scratch = Scratch::new();
    let engine = engine(&scratch);

    let summary = run_autopilot(&engine, "bot", &StubAdvisor::default(), 5).unwrap();
    assert_eq!(summary.end_reason, AutopilotEndReason::MaxSteps);
    assert_eq!(summary.steps, 5);

    let state = &summary.final_state;
    assert_eq!(state.day, 4);
    assert_eq!(
        state.quest("q_ticks_3").unwrap().status,
        QuestStatus::Claimed
    );
    assert_eq!(state.player.xp, 4 * 5 + 15);
    assert_eq!(engine.replay("bot").unwrap(), *state);
    assert_eq!(engine.load("bot").unwrap(), *state);
}

#[test]
fn autopilot_stops_without_power() {
    let scratch = Scratch::new();
    let engine = engine(&scratch);
    let mut state = starlog_world::default_state();
    state.ship.power = 0;
    engine.save("flat", &state).unwrap();

    let summary = run_autopilot(&engine, "flat", &StubAdvisor::default(), 5).unwrap();
    assert_eq!(summary.end_reason, AutopilotEndReason::NoProposals);
    assert_eq!(summary.steps, 0);
}

#[test]
fn profile_config_overrides_gameplay() {
    let scratch = Scratch::new();
    let engine = engine(&scratch);
    let paths = engine.paths("tuned").unwrap();
    std::fs::create_dir_all(paths.dir()).unwrap();
    std::fs::write(
        paths.config_file(),
        "gameplay:\n  xp_per_tick: 7\n  anomaly_chance: 0.0\n",
    )
    .unwrap();

    let result = engine.apply("tuned", &Action::Tick { seed: Some(123) }).unwrap();
    assert_eq!(result.state.player.xp, 7);
    assert_eq!(result.state.ship.hull, 100);
}

#[test]
fn v1_save_is_migrated_through_the_engine() {
    let scratch = Scratch::new();
    let engine = engine(&scratch);
    let paths = engine.paths("old").unwrap();
    std::fs::create_dir_all(paths.dir()).unwrap();
    std::fs::write(
        paths.state_file(),
        r#"{"schema_version":1,"day":2,"ship":{"sector":"AIRI","hull":90,"power":98},
            "player":{"xp":10,"level":2},"achievements":["First Day"],
            "active_quests":["q_ticks_3"]}"#,
    )
    .unwrap();

    let state = engine.load("old").unwrap();
    assert_eq!(state.schema_version, 3);
    assert_eq!(state.last_seed, 0);
    assert_eq!(state.quests.len(), 3);
    assert!(state.quests.iter().all(|q| q.status == QuestStatus::Active));

    let result = engine.execute_action("old", &state, &Action::Tick { seed: None }).unwrap();
    assert!(result.is_ok());
    assert_eq!(result.state.day, 3);
}

#[test]
fn invalid_profile_name_is_refused() {
    let scratch = Scratch::new();
    let engine = engine(&scratch);
    let err = engine.load("../escape").unwrap_err();
    assert!(matches!(
        err,
        CoreError::Events {
            source: EventsError::InvalidProfile(_)
        }
    ));
}

#[test]
fn unparseable_submission_touches_nothing() {
    let scratch = Scratch::new();
    let engine = engine(&scratch);
    let state = engine.load("raw").unwrap();

    let result = engine
        .submit("raw", &state, "warp", &starlog_types::Parameters::new())
        .unwrap();
    assert!(!result.is_ok());
    assert!(!engine.paths("raw").unwrap().logbook_file().exists());
}

#[test]
fn commands_after_a_torn_line_still_replay() {
    use std::io::Write;

    let scratch = Scratch::new();
    let engine = engine(&scratch);
    engine.apply("torn", &Action::Tick { seed: Some(1) }).unwrap();

    let paths = engine.paths("torn").unwrap();
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(paths.logbook_file())
        .unwrap();
    file.write_all(br#"{"type":"command","act"#).unwrap();
    drop(file);

    let moved = engine
        .apply(
            "torn",
            &Action::Move {
                sector: "AIRI".to_owned(),
            },
        )
        .unwrap();
    assert!(moved.is_ok());

    let report = engine.replay_report("torn").unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(report.applied, 2);
    assert_eq!(report.state.ship.sector, "AIRI");
    assert_eq!(report.state, moved.state);
}

#[test]
fn reconcile_restores_a_save_that_lags_the_logbook() {
    let scratch = Scratch::new();
    let engine = engine(&scratch);
    engine.apply("lag", &Action::Tick { seed: Some(123) }).unwrap();

    // Save file as it was before the tick landed.
    engine.save("lag", &starlog_world::default_state()).unwrap();
    assert_eq!(engine.load("lag").unwrap().day, 0);

    let state = engine.reconcile("lag").unwrap();
    assert_eq!(state.day, 1);
    assert_eq!(engine.load("lag").unwrap(), state);
    assert_eq!(engine.replay("lag").unwrap(), state);
}

#[test]
fn reconcile_leaves_an_agreeing_profile_alone() {
    let scratch = Scratch::new();
    let engine = engine(&scratch);
    engine.apply("calm", &Action::Tick { seed: Some(123) }).unwrap();
    let before = log_records(&engine, "calm").len();

    let state = engine.reconcile("calm").unwrap();
    assert_eq!(state, engine.load("calm").unwrap());
    assert_eq!(log_records(&engine, "calm").len(), before);
}

#[test]
fn reconcile_checkpoints_a_save_without_history() {
    let scratch = Scratch::new();
    let engine = engine(&scratch);
    let mut state = starlog_world::default_state();
    state.day = 7;
    state.ship.sector = "AIRI".to_owned();
    engine.save("legacy", &state).unwrap();

    let reconciled = engine.reconcile("legacy").unwrap();
    assert_eq!(reconciled.day, 7);
    assert!(matches!(
        log_records(&engine, "legacy").as_slice(),
        [LogRecord::Snapshot(s)] if s.day == 7
    ));
    assert_eq!(engine.replay("legacy").unwrap(), reconciled);
}

#[test]
fn reconcile_on_a_new_profile_writes_nothing() {
    let scratch = Scratch::new();
    let engine = engine(&scratch);
    let state = engine.reconcile("fresh").unwrap();
    assert_eq!(state, starlog_world::default_state());
    assert!(!engine.paths("fresh").unwrap().logbook_file().exists());
}
