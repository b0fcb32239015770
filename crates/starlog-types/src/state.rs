//! The persisted game state aggregate.
//!
//! A [`GameState`] is a plain value: every transition in the engine builds a
//! new one from the old one plus a delta. Nothing in the workspace mutates a
//! state that another caller still holds.
//!
//! Numeric fields are signed so that a corrupted save file still
//! deserializes and can be reported on field by field by the validator,
//! instead of failing opaquely at the serde layer.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Current on-disk schema version. Migration upgrades older saves to this.
pub const SCHEMA_VERSION: u32 = 3;

/// Upper bound for hull and power.
pub const STAT_MAX: i64 = 100;

/// Lower bound for hull and power.
pub const STAT_MIN: i64 = 0;

/// Lifecycle of a single quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum QuestStatus {
    /// Progress is still being accumulated.
    Active,
    /// Target reached; the reward can be claimed.
    Completed,
    /// Reward granted. Terminal.
    Claimed,
}

impl QuestStatus {
    /// Wire name of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Claimed => "claimed",
        }
    }
}

impl std::fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of one catalog quest inside a [`GameState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuestProgress {
    /// Catalog identifier, e.g. `q_ticks_3`.
    pub quest_id: String,
    /// Current lifecycle status.
    pub status: QuestStatus,
    /// Accumulated progress, capped at the quest's target value.
    pub progress: i64,
}

impl QuestProgress {
    /// Fresh progress entry: active with zero progress.
    pub fn fresh(quest_id: impl Into<String>) -> Self {
        Self {
            quest_id: quest_id.into(),
            status: QuestStatus::Active,
            progress: 0,
        }
    }
}

/// The ship: where it is and how healthy it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShipState {
    /// Name of the sector the ship is in.
    pub sector: String,
    /// Hull integrity, `0..=100`. Zero means game over.
    pub hull: i64,
    /// Power reserve, `0..=100`. Zero disables movement.
    pub power: i64,
}

/// The player's progression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerState {
    /// Accumulated experience.
    pub xp: i64,
    /// Level derived from `xp` through the triangular curve.
    pub level: i64,
}

/// Root aggregate of the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameState {
    /// Format tag; equals [`SCHEMA_VERSION`] after migration.
    pub schema_version: u32,
    /// Simulation day. Never decreases.
    pub day: i64,
    /// Ship location and vitals.
    pub ship: ShipState,
    /// Player progression.
    pub player: PlayerState,
    /// Unlocked achievements in unlock order. Unique by name.
    #[serde(default)]
    pub achievements: Vec<String>,
    /// One entry per catalog quest, in catalog order.
    #[serde(default)]
    pub quests: Vec<QuestProgress>,
    /// Seed consumed by the most recent tick.
    #[serde(default)]
    pub last_seed: i64,
}

impl GameState {
    /// A brand new game positioned in `sector`, with the given quest entries.
    pub fn new_game(sector: impl Into<String>, quests: Vec<QuestProgress>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            day: 0,
            ship: ShipState {
                sector: sector.into(),
                hull: STAT_MAX,
                power: STAT_MAX,
            },
            player: PlayerState { xp: 0, level: 1 },
            achievements: Vec::new(),
            quests,
            last_seed: 0,
        }
    }

    /// Look up the progress entry for `quest_id`.
    pub fn quest(&self, quest_id: &str) -> Option<&QuestProgress> {
        self.quests.iter().find(|q| q.quest_id == quest_id)
    }

    /// Whether `name` is already unlocked.
    pub fn has_achievement(&self, name: &str) -> bool {
        self.achievements.iter().any(|a| a == name)
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
    use super::*;

    #[test]
    fn serialized_shape_matches_save_file_layout() {
        let state = GameState::new_game("Mostek", vec![QuestProgress::fresh("q_ticks_3")]);
        let value = serde_json::to_value(&state).unwrap();

        assert_eq!(value["schema_version"], 3);
        assert_eq!(value["ship"]["sector"], "Mostek");
        assert_eq!(value["ship"]["hull"], 100);
        assert_eq!(value["player"]["level"], 1);
        assert_eq!(value["quests"][0]["status"], "active");
        assert_eq!(value["last_seed"], 0);
    }

    #[test]
    fn negative_stats_still_deserialize() {
        let raw = r#"{"schema_version":3,"day":-1,"ship":{"sector":"X","hull":-5,"power":300},
            "player":{"xp":0,"level":1}}"#;
        let state: GameState = serde_json::from_str(raw).unwrap();
        assert_eq!(state.day, -1);
        assert_eq!(state.ship.hull, -5);
        assert!(state.quests.is_empty());
    }

    #[test]
    fn quest_lookup_and_achievements() {
        let mut state = GameState::new_game("Mostek", vec![QuestProgress::fresh("q_doctor_once")]);
        state.achievements.push("First Day".to_owned());

        assert!(state.quest("q_doctor_once").is_some());
        assert!(state.quest("q_missing").is_none());
        assert!(state.has_achievement("First Day"));
    }
}
