//! State reconstruction from a logbook.
//!
//! Replay starts from the last snapshot in the log (or a new game when
//! there is none) and re-runs every command written after it through the
//! live pipeline. Event lines are discarded because the pipeline re-derives
//! them. Unusable lines are skipped: a best-effort reconstruction is always
//! preferred over refusing to boot.

use starlog_actions::GameplayConfig;
use starlog_events::{LogRecord, ParsedLine};
use starlog_types::GameState;
use tracing::{debug, warn};

use crate::pipeline;

/// What a replay did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    /// The reconstructed state.
    pub state: GameState,
    /// One-based line number of the snapshot replay started from, if any.
    pub snapshot_line: Option<usize>,
    /// Commands that ran successfully.
    pub applied: usize,
    /// Commands the pipeline rejected. Their state change is dropped.
    pub rejected: usize,
    /// Event lines discarded after the snapshot.
    pub events_discarded: usize,
    /// Malformed lines anywhere in the log.
    pub skipped: usize,
}

/// Replay parsed logbook lines.
///
/// `lines` are in file order. Line numbers for the report are taken from
/// positions in `lines` (one-based) for parsed records and from the
/// [`ParsedLine::Skipped`] entries themselves for skipped ones.
pub fn replay_records(lines: &[ParsedLine], config: &GameplayConfig) -> ReplayReport {
    let mut skipped = 0_usize;
    for line in lines {
        if let ParsedLine::Skipped { line, reason } = line {
            warn!(line, reason = %reason, "Skipping malformed logbook line");
            skipped = skipped.saturating_add(1);
        }
    }

    let last_snapshot = lines
        .iter()
        .enumerate()
        .rev()
        .find_map(|(index, line)| match line {
            ParsedLine::Parsed(LogRecord::Snapshot(state)) => Some((index, state)),
            _ => None,
        });

    let (start, initial, snapshot_line) = match last_snapshot {
        Some((index, state)) => (index.saturating_add(1), state.clone(), Some(index.saturating_add(1))),
        None => (0, starlog_world::default_state(), None),
    };

    let mut state = pipeline::rebase_level(&initial, config);
    let mut applied = 0_usize;
    let mut rejected = 0_usize;
    let mut events_discarded = 0_usize;

    for line in lines.iter().skip(start) {
        match line {
            ParsedLine::Parsed(LogRecord::Command { action, parameters }) => {
                let result = pipeline::execute(&state, action, parameters, config);
                if result.is_ok() {
                    applied = applied.saturating_add(1);
                    state = result.state;
                } else {
                    debug!(action = %action, errors = ?result.errors, "Replayed command rejected");
                    rejected = rejected.saturating_add(1);
                }
            }
            ParsedLine::Parsed(LogRecord::Event(_)) => {
                events_discarded = events_discarded.saturating_add(1);
            }
            ParsedLine::Parsed(LogRecord::Snapshot(_)) | ParsedLine::Skipped { .. } => {}
        }
    }

    ReplayReport {
        state,
        snapshot_line,
        applied,
        rejected,
        events_discarded,
        skipped,
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use starlog_events::record;
    use starlog_types::Action;

    use super::*;

    fn line(text: &str) -> ParsedLine {
        record::parse_line(1, text).unwrap()
    }

    fn command(action: &Action) -> ParsedLine {
        line(&record::encode_command(action).unwrap())
    }

    #[test]
    fn empty_log_is_a_new_game() {
        let report = replay_records(&[], &GameplayConfig::default());
        assert_eq!(report.state, starlog_world::default_state());
        assert_eq!(report.snapshot_line, None);
        assert_eq!(report.applied, 0);
    }

    #[test]
    fn tick_then_move_matches_live_play() {
        let cfg = GameplayConfig::default();
        let tick = Action::Tick { seed: Some(123) };
        let mv = Action::Move {
            sector: "Sektor A-1".to_owned(),
        };

        let live = {
            let s0 = starlog_world::default_state();
            let s1 = pipeline::execute_action(&s0, &tick, &cfg).state;
            pipeline::execute_action(&s1, &mv, &cfg).state
        };

        let report = replay_records(&[command(&tick), command(&mv)], &cfg);
        assert_eq!(report.state, live);
        assert_eq!(report.state.ship.sector, "Sektor A-1");
        assert_eq!(report.state.day, 1);
        assert_eq!(report.applied, 2);
    }

    #[test]
    fn starts_from_the_last_snapshot() {
        let cfg = GameplayConfig::default();
        let mut checkpoint = starlog_world::default_state();
        checkpoint.day = 40;
        checkpoint.ship.sector = "AIRI".to_owned();
        checkpoint.last_seed = 5;

        let lines = vec![
            command(&Action::Tick { seed: Some(1) }),
            line(&record::encode_snapshot(&starlog_world::default_state()).unwrap()),
            command(&Action::Tick { seed: Some(2) }),
            line(&record::encode_snapshot(&checkpoint).unwrap()),
            command(&Action::Tick { seed: None }),
        ];
        let report = replay_records(&lines, &cfg);

        assert_eq!(report.snapshot_line, Some(4));
        assert_eq!(report.applied, 1);
        assert_eq!(report.state.day, 41);
        assert_eq!(report.state.last_seed, 5);
        assert_eq!(report.state.ship.sector, "AIRI");
    }

    #[test]
    fn events_are_discarded_and_junk_skipped() {
        let cfg = GameplayConfig::default();
        let lines = vec![
            command(&Action::Tick { seed: Some(9) }),
            line(r#"{"type":"tick_done","amount":1,"day":1}"#),
            line(r#"{"type":"doctor_ok"}"#),
            line("{not json"),
            command(&Action::Move {
                sector: "NoSuchPlace".to_owned(),
            }),
        ];
        let report = replay_records(&lines, &cfg);

        assert_eq!(report.applied, 1);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.events_discarded, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.state.day, 1);
        // The doctor_ok event line was not folded into quests.
        assert_eq!(
            report.state.quest("q_doctor_once").unwrap().progress,
            0
        );
    }

    #[test]
    fn unknown_command_is_rejected_not_fatal() {
        let report = replay_records(
            &[line(r#"{"type":"command","action":"warp","to":"Mars"}"#)],
            &GameplayConfig::default(),
        );
        assert_eq!(report.rejected, 1);
        assert_eq!(report.state, starlog_world::default_state());
    }
}
