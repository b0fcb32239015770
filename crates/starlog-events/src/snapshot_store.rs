//! Full-state serialization.
//!
//! The same encoding serves the primary save file (`game_state.json`) and
//! the checkpoint records inside the logbook. Every decode goes through
//! migration and quest normalization, so callers only ever see states in
//! the current schema.

use std::path::{Path, PathBuf};

use serde_json::Value;
use starlog_types::GameState;
use starlog_world::normalize_quests;
use tracing::debug;

use crate::error::EventsError;
use crate::migration;
use crate::profile::ProfilePaths;

/// Migrate, deserialize, and normalize a raw saved state.
pub fn decode_state(raw: Value) -> Result<GameState, EventsError> {
    let migrated = migration::migrate_value(raw)?;
    let mut state: GameState = serde_json::from_value(migrated)?;
    state.quests = normalize_quests(&state.quests);
    Ok(state)
}

/// Pretty-printed save file body, newline terminated.
pub fn encode_state_file(state: &GameState) -> Result<String, EventsError> {
    let mut body = serde_json::to_string_pretty(state)?;
    body.push('\n');
    Ok(body)
}

/// The primary save file of one profile.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Store backed by the file at `path`.
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store backed by a profile's `game_state.json`.
    pub fn for_profile(paths: &ProfilePaths) -> Self {
        Self::new(paths.state_file())
    }

    /// Path of the save file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved state. A missing file yields a new game.
    ///
    /// Fails with [`EventsError::Migration`] when the save declares an
    /// unsupported schema version.
    pub fn load(&self) -> Result<GameState, EventsError> {
        let body = match std::fs::read_to_string(&self.path) {
            Ok(body) => body,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No save file, starting new game");
                return Ok(starlog_world::default_state());
            }
            Err(err) => return Err(EventsError::io(&self.path, err)),
        };
        let raw: Value = serde_json::from_str(&body)?;
        decode_state(raw)
    }

    /// Write `state`, replacing the previous save.
    ///
    /// The body goes to a sibling temp file that is then renamed over the
    /// save, so a crash leaves either the old save or the new one.
    pub fn save(&self, state: &GameState) -> Result<(), EventsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| EventsError::io(parent, e))?;
        }
        let body = encode_state_file(state)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, body).map_err(|e| EventsError::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| EventsError::io(&self.path, e))?;
        debug!(path = %self.path.display(), day = state.day, "Saved game state");
        Ok(())
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
    use serde_json::json;
    use starlog_types::{QuestStatus, SCHEMA_VERSION};

    use super::*;
    use crate::migration::MigrationError;

    #[test]
    fn decode_v1_record_fills_catalog_and_seed() {
        let raw = json!({
            "schema_version": 1,
            "day": 0,
            "ship": {"sector": "Mostek", "hull": 100, "power": 100},
            "player": {"xp": 0, "level": 1},
            "achievements": [],
            "active_quests": ["tutorial"]
        });
        let state = decode_state(raw).unwrap();
        assert_eq!(state.schema_version, SCHEMA_VERSION);
        assert_eq!(state.last_seed, 0);
        assert_eq!(state.quests.len(), 3);
        assert!(
            state
                .quests
                .iter()
                .all(|q| q.status == QuestStatus::Active && q.progress == 0)
        );
    }

    #[test]
    fn decode_drops_unknown_quests() {
        let raw = json!({
            "schema_version": 3,
            "day": 5,
            "ship": {"sector": "AIRI", "hull": 90, "power": 80},
            "player": {"xp": 25, "level": 2},
            "quests": [
                {"quest_id": "q_gone", "status": "completed", "progress": 1},
                {"quest_id": "q_ticks_3", "status": "completed", "progress": 3}
            ],
            "last_seed": 17
        });
        let state = decode_state(raw).unwrap();
        assert!(state.quest("q_gone").is_none());
        assert_eq!(
            state.quest("q_ticks_3").unwrap().status,
            QuestStatus::Completed
        );
        assert_eq!(state.last_seed, 17);
    }

    #[test]
    fn decode_refuses_unknown_versions() {
        let err = decode_state(json!({"schema_version": 7})).unwrap_err();
        assert!(matches!(
            err,
            EventsError::Migration(MigrationError::UnsupportedSchemaVersion { found: 7 })
        ));
    }

    #[test]
    fn save_file_is_pretty_with_trailing_newline() {
        let body = encode_state_file(&starlog_world::default_state()).unwrap();
        assert!(body.ends_with("}\n"));
        assert!(body.contains("\n  \"schema_version\": 3,"));
    }
}
