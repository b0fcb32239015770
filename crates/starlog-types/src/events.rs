//! Domain events emitted by the action pipeline.
//!
//! Events are serialized internally tagged on `type`, which is exactly the
//! shape they take as logbook lines: `{"type":"tick_done","amount":1,"day":1}`.

use serde::{Deserialize, Serialize};

use crate::result::BlockReason;

/// Event type name of a completed tick.
pub const TICK_DONE: &str = "tick_done";

/// Event type name of a passed diagnostics run (external signal).
pub const DOCTOR_OK: &str = "doctor_ok";

/// Event type name of a successful advisor status check (external signal).
pub const AIRI_STATUS: &str = "airi_status";

/// Something observable that happened during an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A day passed.
    TickDone {
        /// Number of ticks represented (always 1 for a live tick).
        amount: i64,
        /// Day reached by the tick.
        day: i64,
    },
    /// The ship moved to another sector.
    SectorMoved {
        /// Destination sector.
        sector: String,
    },
    /// An achievement was unlocked for the first time.
    AchievementUnlocked {
        /// Achievement name.
        name: String,
    },
    /// A quest reached its target.
    QuestCompleted {
        /// Catalog id of the quest.
        quest_id: String,
    },
    /// A completed quest's reward was granted.
    QuestClaimed {
        /// Catalog id of the quest.
        quest_id: String,
        /// Experience granted.
        reward_xp: i64,
    },
    /// Hull or power was pulled back into range by the rules pass.
    StatClamped {
        /// Hull before clamping.
        hull_before: i64,
        /// Power before clamping.
        power_before: i64,
        /// Hull after clamping.
        hull: i64,
        /// Power after clamping.
        power: i64,
    },
    /// Power is depleted.
    PowerDown,
    /// Hull is destroyed.
    GameOver,
    /// The policy guard vetoed an action.
    ActionBlocked {
        /// Action name.
        action: String,
        /// Why it was vetoed.
        reason: BlockReason,
    },
    /// The action is not permitted in the ship's current sector.
    ActionNotAllowed {
        /// Action name.
        action: String,
        /// Sector that forbids it.
        sector: String,
    },
    /// A move targeted a sector missing from the registry.
    SectorUnknown {
        /// The requested sector.
        sector: String,
    },
}

impl GameEvent {
    /// The `type` tag this event serializes with.
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::TickDone { .. } => TICK_DONE,
            Self::SectorMoved { .. } => "sector_moved",
            Self::AchievementUnlocked { .. } => "achievement_unlocked",
            Self::QuestCompleted { .. } => "quest_completed",
            Self::QuestClaimed { .. } => "quest_claimed",
            Self::StatClamped { .. } => "stat_clamped",
            Self::PowerDown => "power_down",
            Self::GameOver => "game_over",
            Self::ActionBlocked { .. } => "action_blocked",
            Self::ActionNotAllowed { .. } => "action_not_allowed",
            Self::SectorUnknown { .. } => "sector_unknown",
        }
    }

    /// Quantity carried by the event for quest folding. Events without an
    /// explicit amount count as one occurrence.
    pub const fn amount(&self) -> i64 {
        match self {
            Self::TickDone { amount, .. } => *amount,
            _ => 1,
        }
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
    fn tick_done_wire_shape() {
        let event = GameEvent::TickDone { amount: 1, day: 1 };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"tick_done","amount":1,"day":1}"#);
    }

    #[test]
    fn unit_variants_carry_only_the_tag() {
        let json = serde_json::to_string(&GameEvent::GameOver).unwrap();
        assert_eq!(json, r#"{"type":"game_over"}"#);
    }

    #[test]
    fn event_type_matches_serialized_tag() {
        let events = [
            GameEvent::SectorMoved { sector: "AIRI".to_owned() },
            GameEvent::ActionBlocked {
                action: "tick".to_owned(),
                reason: BlockReason::GameOver,
            },
            GameEvent::PowerDown,
            GameEvent::QuestClaimed {
                quest_id: "q_ticks_3".to_owned(),
                reward_xp: 15,
            },
        ];
        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["type"], event.event_type());
        }
    }

    #[test]
    fn amount_defaults_to_one() {
        assert_eq!(GameEvent::TickDone { amount: 3, day: 9 }.amount(), 3);
        assert_eq!(GameEvent::PowerDown.amount(), 1);
    }
}
