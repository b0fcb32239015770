//! The quest catalog and the new-game state built from it.
//!
//! The catalog is configuration, not engine state: a game state only
//! records each quest's progress, keyed by id, in catalog order.

use starlog_types::{AIRI_STATUS, DOCTOR_OK, GameState, QuestProgress, TICK_DONE};

use crate::error::WorldError;
use crate::sectors::HOME_SECTOR;

/// Static definition of one quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestDef {
    /// Unique identifier.
    pub quest_id: &'static str,
    /// Display title.
    pub title: &'static str,
    /// Display description.
    pub description: &'static str,
    /// Event type that advances this quest.
    pub target_event_type: &'static str,
    /// Progress needed to complete the quest.
    pub target_value: i64,
    /// Experience granted on claim.
    pub reward_xp: i64,
}

static CATALOG: [QuestDef; 3] = [
    QuestDef {
        quest_id: "q_doctor_once",
        title: "Run the diagnostics",
        description: "Pass one ship diagnostics run.",
        target_event_type: DOCTOR_OK,
        target_value: 1,
        reward_xp: 10,
    },
    QuestDef {
        quest_id: "q_ticks_3",
        title: "First three days",
        description: "Advance the clock three days.",
        target_event_type: TICK_DONE,
        target_value: 3,
        reward_xp: 15,
    },
    QuestDef {
        quest_id: "q_airi_status",
        title: "Check advisor status",
        description: "Query the advisor once.",
        target_event_type: AIRI_STATUS,
        target_value: 1,
        reward_xp: 5,
    },
];

/// The full catalog, in display order.
pub fn catalog() -> &'static [QuestDef] {
    &CATALOG
}

/// Look up a quest definition by id.
pub fn get(quest_id: &str) -> Option<&'static QuestDef> {
    CATALOG.iter().find(|q| q.quest_id == quest_id)
}

/// Look up a quest definition, failing with [`WorldError::QuestNotFound`].
pub fn require(quest_id: &str) -> Result<&'static QuestDef, WorldError> {
    get(quest_id).ok_or_else(|| WorldError::QuestNotFound(quest_id.to_owned()))
}

/// Whether `quest_id` is a catalog quest.
pub fn contains(quest_id: &str) -> bool {
    get(quest_id).is_some()
}

/// Reshape a quest list so it holds exactly the catalog: catalog order,
/// unknown ids dropped, missing ids added fresh. When an id appears more
/// than once the first entry wins.
pub fn normalize_quests(existing: &[QuestProgress]) -> Vec<QuestProgress> {
    CATALOG
        .iter()
        .map(|def| {
            existing
                .iter()
                .find(|q| q.quest_id == def.quest_id)
                .cloned()
                .unwrap_or_else(|| QuestProgress::fresh(def.quest_id))
        })
        .collect()
}

/// State of a brand new game: home sector, full catalog at zero progress.
pub fn default_state() -> GameState {
    GameState::new_game(HOME_SECTOR, normalize_quests(&[]))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use starlog_types::QuestStatus;

    use super::*;

    #[test]
    fn catalog_has_the_three_quests() {
        let ticks = require("q_ticks_3").unwrap();
        assert_eq!(ticks.target_event_type, "tick_done");
        assert_eq!(ticks.target_value, 3);
        assert_eq!(ticks.reward_xp, 15);
        assert_eq!(get("q_doctor_once").unwrap().reward_xp, 10);
        assert_eq!(get("q_airi_status").unwrap().target_event_type, "airi_status");
        assert!(!contains("q_unknown"));
    }

    #[test]
    fn normalize_drops_unknown_and_fills_missing() {
        let existing = vec![
            QuestProgress {
                quest_id: "q_legacy".to_owned(),
                status: QuestStatus::Completed,
                progress: 7,
            },
            QuestProgress {
                quest_id: "q_ticks_3".to_owned(),
                status: QuestStatus::Active,
                progress: 2,
            },
        ];
        let quests = normalize_quests(&existing);

        let ids: Vec<&str> = quests.iter().map(|q| q.quest_id.as_str()).collect();
        assert_eq!(ids, vec!["q_doctor_once", "q_ticks_3", "q_airi_status"]);
        assert_eq!(quests[1].progress, 2);
        assert_eq!(quests[0], QuestProgress::fresh("q_doctor_once"));
    }

    #[test]
    fn default_state_starts_home_with_full_catalog() {
        let state = default_state();
        assert_eq!(state.day, 0);
        assert_eq!(state.ship.sector, HOME_SECTOR);
        assert_eq!(state.ship.hull, 100);
        assert_eq!(state.ship.power, 100);
        assert_eq!(state.quests.len(), 3);
        assert!(state.quests.iter().all(|q| q.status == QuestStatus::Active));
    }
}
