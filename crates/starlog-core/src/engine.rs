//! Profile-bound facade over the pipeline and persistence.
//!
//! [`Engine`] owns the engine configuration and knows where each profile's
//! files live. It is the only component in this crate that touches the
//! filesystem; the pipeline and replay stay pure.
//!
//! Write ordering for a successful action is command, events, save file,
//! then (on a compaction day) a snapshot. A crash between any two steps
//! leaves a log that still replays to a consistent state.

use starlog_actions::{GameplayConfig, Transition, handlers, validation};
use starlog_events::{
    EventRecord, EventsError, LogRecord, Logbook, ParsedLine, ProfilePaths, SnapshotStore,
};
use starlog_types::{Action, ActionProposal, ActionResult, GameState, Parameters};
use tracing::{debug, info, warn};

use crate::config::{self, StarlogConfig};
use crate::pipeline;
use crate::replay::{self, ReplayReport};

/// Errors from engine operations that touch disk.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Reading or writing profile files failed.
    #[error("persistence error: {source}")]
    Events {
        /// The underlying persistence error.
        #[from]
        source: EventsError,
    },
}

/// The engine facade.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: StarlogConfig,
}

impl Engine {
    /// Create an engine over the given configuration.
    pub const fn new(config: StarlogConfig) -> Self {
        Self { config }
    }

    /// The engine configuration.
    pub const fn config(&self) -> &StarlogConfig {
        &self.config
    }

    /// Resolve the file layout of `profile`.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::InvalidProfile`] for names outside
    /// `[A-Za-z0-9_-]{1,64}`.
    pub fn paths(&self, profile: &str) -> Result<ProfilePaths, CoreError> {
        Ok(ProfilePaths::new(&self.config.storage.data_dir, profile)?)
    }

    /// Gameplay knobs for `profile`: engine defaults with the profile's
    /// `config.yaml` overrides applied.
    ///
    /// # Errors
    ///
    /// Fails only on an invalid profile name.
    pub fn gameplay(&self, profile: &str) -> Result<GameplayConfig, CoreError> {
        let paths = self.paths(profile)?;
        Ok(config::load_profile_gameplay(
            &paths.config_file(),
            &self.config.gameplay,
        ))
    }

    /// Load the profile's save file, or a new game if there is none.
    ///
    /// The level is re-derived under the profile's current curve.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure, malformed JSON, or a save whose
    /// schema version cannot be migrated.
    pub fn load(&self, profile: &str) -> Result<GameState, CoreError> {
        let paths = self.paths(profile)?;
        let gameplay = self.gameplay(profile)?;
        let state = SnapshotStore::for_profile(&paths).load()?;
        info!(
            profile,
            day = state.day,
            sector = %state.ship.sector,
            "Profile loaded"
        );
        Ok(pipeline::rebase_level(&state, &gameplay))
    }

    /// Write the profile's save file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, profile: &str, state: &GameState) -> Result<(), CoreError> {
        let paths = self.paths(profile)?;
        SnapshotStore::for_profile(&paths).save(state)?;
        Ok(())
    }

    /// Run a raw request against `state` under the profile's gameplay
    /// config. Nothing is written.
    ///
    /// # Errors
    ///
    /// Fails only on an invalid profile name; rejections are reported in
    /// the returned [`ActionResult`].
    pub fn execute(
        &self,
        profile: &str,
        state: &GameState,
        action: &str,
        parameters: &Parameters,
    ) -> Result<ActionResult, CoreError> {
        let gameplay = self.gameplay(profile)?;
        Ok(pipeline::execute(state, action, parameters, &gameplay))
    }

    /// Run a typed action against `state`. Nothing is written.
    ///
    /// # Errors
    ///
    /// Fails only on an invalid profile name.
    pub fn execute_action(
        &self,
        profile: &str,
        state: &GameState,
        action: &Action,
    ) -> Result<ActionResult, CoreError> {
        let gameplay = self.gameplay(profile)?;
        Ok(pipeline::execute_action(state, action, &gameplay))
    }

    /// Persist the outcome of `action`.
    ///
    /// On success: command line, event lines, save file, and on a
    /// compaction day a snapshot. On rejection only the audit events are
    /// appended; the command is not logged and the save file is untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails.
    pub fn commit(
        &self,
        profile: &str,
        action: &Action,
        result: &ActionResult,
    ) -> Result<(), CoreError> {
        let paths = self.paths(profile)?;
        let log = Logbook::for_profile(&paths);

        if !result.is_ok() {
            log.append_events(&result.events)?;
            return Ok(());
        }

        log.append_command(action)?;
        log.append_events(&result.events)?;
        SnapshotStore::for_profile(&paths).save(&result.state)?;

        if matches!(action, Action::Tick { .. }) && self.is_compaction_day(result.state.day) {
            log.append_snapshot(&result.state)?;
            debug!(profile, day = result.state.day, "Compaction snapshot written");
        }
        Ok(())
    }

    fn is_compaction_day(&self, day: i64) -> bool {
        let interval = self.config.logging.snapshot_interval_days;
        if interval == 0 {
            return false;
        }
        u64::try_from(day)
            .ok()
            .and_then(|day| day.checked_rem(interval))
            .is_some_and(|rem| rem == 0)
    }

    /// Parse, run, and commit a raw request.
    ///
    /// A request that does not parse is returned as a rejection without
    /// touching disk.
    ///
    /// # Errors
    ///
    /// Returns an error if committing fails.
    pub fn submit(
        &self,
        profile: &str,
        state: &GameState,
        action: &str,
        parameters: &Parameters,
    ) -> Result<ActionResult, CoreError> {
        let parsed = match validation::parse_action(action, parameters) {
            Ok(parsed) => parsed,
            Err(errors) => {
                debug!(profile, action, "Rejected unparseable request");
                return Ok(ActionResult::rejected(state.clone(), Vec::new(), errors));
            }
        };
        let result = self.execute_action(profile, state, &parsed)?;
        self.commit(profile, &parsed, &result)?;
        Ok(result)
    }

    /// Submit an advisor proposal like any other request.
    ///
    /// # Errors
    ///
    /// Returns an error if committing fails.
    pub fn execute_proposal(
        &self,
        profile: &str,
        state: &GameState,
        proposal: &ActionProposal,
    ) -> Result<ActionResult, CoreError> {
        self.submit(profile, state, &proposal.action, &proposal.parameters)
    }

    /// Load the profile, run `action`, and commit the outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or committing fails.
    pub fn apply(&self, profile: &str, action: &Action) -> Result<ActionResult, CoreError> {
        let state = self.load(profile)?;
        let result = self.execute_action(profile, &state, action)?;
        self.commit(profile, action, &result)?;
        Ok(result)
    }

    /// Append an explicit snapshot of `state` to the logbook.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn checkpoint(&self, profile: &str, state: &GameState) -> Result<(), CoreError> {
        let paths = self.paths(profile)?;
        Logbook::for_profile(&paths).append_snapshot(state)?;
        debug!(profile, day = state.day, "Checkpoint written");
        Ok(())
    }

    /// Fold an external signal (`doctor_ok`, `airi_status`) into quests and
    /// persist it.
    ///
    /// The signal and any completions are appended as events, followed by a
    /// snapshot so that replay, which discards events, still lands on the
    /// same state. The save file is updated last.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails.
    pub fn record_signal(
        &self,
        profile: &str,
        state: &GameState,
        event_type: &str,
    ) -> Result<Transition, CoreError> {
        let paths = self.paths(profile)?;
        let log = Logbook::for_profile(&paths);
        let transition = handlers::apply_signal(state, event_type, 1);

        log.append_event_record(&EventRecord::signal(event_type, 1))?;
        log.append_events(&transition.events)?;
        log.append_snapshot(&transition.state)?;
        SnapshotStore::for_profile(&paths).save(&transition.state)?;

        info!(
            profile,
            event_type,
            completed = transition.events.len(),
            "Signal recorded"
        );
        Ok(transition)
    }

    /// Rebuild the profile's state from its logbook.
    ///
    /// # Errors
    ///
    /// Returns an error if the logbook exists but cannot be read.
    pub fn replay_report(&self, profile: &str) -> Result<ReplayReport, CoreError> {
        let paths = self.paths(profile)?;
        let gameplay = self.gameplay(profile)?;
        let lines = Logbook::for_profile(&paths).read()?;
        let report = replay::replay_records(&lines, &gameplay);
        info!(
            profile,
            applied = report.applied,
            rejected = report.rejected,
            skipped = report.skipped,
            snapshot_line = report.snapshot_line,
            day = report.state.day,
            "Replay finished"
        );
        Ok(report)
    }

    /// Bring the save file and the logbook into agreement before play.
    ///
    /// The logbook is authoritative: when its replay differs from the save
    /// file (a crash between the command append and the save), the replayed
    /// state is written over the save. A logbook with no commands or
    /// snapshots (a new profile, or a save that predates logging) is seeded
    /// with a checkpoint of the save so later replays start from it.
    ///
    /// # Errors
    ///
    /// Returns an error if loading, reading, or writing fails.
    pub fn reconcile(&self, profile: &str) -> Result<GameState, CoreError> {
        let paths = self.paths(profile)?;
        let saved = self.load(profile)?;
        let lines = Logbook::for_profile(&paths).read()?;

        let has_history = lines.iter().any(|line| {
            matches!(
                line,
                ParsedLine::Parsed(LogRecord::Command { .. } | LogRecord::Snapshot(_))
            )
        });
        if !has_history {
            if paths.state_file().exists() {
                self.checkpoint(profile, &saved)?;
            }
            return Ok(saved);
        }

        let gameplay = self.gameplay(profile)?;
        let replayed = replay::replay_records(&lines, &gameplay).state;
        if replayed != saved {
            warn!(
                profile,
                saved_day = saved.day,
                replayed_day = replayed.day,
                "Save file disagrees with logbook, restoring from logbook"
            );
            self.save(profile, &replayed)?;
        }
        Ok(replayed)
    }

    /// Rebuild the profile's state from its logbook and return it.
    ///
    /// # Errors
    ///
    /// Returns an error if the logbook exists but cannot be read.
    pub fn replay(&self, profile: &str) -> Result<GameState, CoreError> {
        Ok(self.replay_report(profile)?.state)
    }
}
