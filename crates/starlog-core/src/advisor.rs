//! Advisor trait and stub implementation.
//!
//! An advisor reads a state and suggests actions. It has no authority:
//! its proposals are plain data that must be submitted through
//! [`crate::pipeline::execute`] like any other request, and they can be
//! vetoed there.

use starlog_actions::rng;
use starlog_types::{Action, ActionKind, ActionProposal, GameState, QuestStatus};
use starlog_world::{HOME_SECTOR, sectors};

/// Seed proposed for the very first tick of a game.
pub const OPENING_SEED: i64 = 123;

/// A source of action proposals.
pub trait Advisor {
    /// Suggest actions for `state`, most urgent first. Must not mutate
    /// anything.
    fn propose(&self, state: &GameState) -> Vec<ActionProposal>;
}

/// Rule-based advisor.
///
/// - Hull at or below the threshold away from home: retreat home (0.8).
/// - A completed quest, in a sector that takes claims: claim it (0.7).
/// - Power at zero: nothing else.
/// - Otherwise: advance one day (0.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubAdvisor {
    /// Sector to retreat to.
    pub home_sector: String,
    /// Hull value at or below which a retreat is proposed.
    pub low_hull_threshold: i64,
}

impl Default for StubAdvisor {
    fn default() -> Self {
        Self {
            home_sector: HOME_SECTOR.to_owned(),
            low_hull_threshold: 20,
        }
    }
}

impl StubAdvisor {
    /// Seed for the next tick: the opening seed on a fresh game, else the
    /// generator's successor of the last seed so consecutive days differ.
    pub fn next_tick_seed(state: &GameState) -> i64 {
        if state.last_seed <= 0 {
            return OPENING_SEED;
        }
        i64::try_from(rng::next_seed(state.last_seed.unsigned_abs())).unwrap_or(OPENING_SEED)
    }
}

impl Advisor for StubAdvisor {
    fn propose(&self, state: &GameState) -> Vec<ActionProposal> {
        let mut out = Vec::new();

        if state.ship.hull <= self.low_hull_threshold && state.ship.sector != self.home_sector {
            out.push(ActionProposal::from_action(
                &Action::Move {
                    sector: self.home_sector.clone(),
                },
                format!("Low hull -> retreat to {}.", self.home_sector),
                0.8,
            ));
        }

        let can_claim =
            sectors::get(&state.ship.sector).is_none_or(|s| s.allows(ActionKind::Claim));
        if let Some(quest) = state
            .quests
            .iter()
            .find(|q| q.status == QuestStatus::Completed)
            .filter(|_| can_claim)
        {
            out.push(ActionProposal::from_action(
                &Action::Claim {
                    quest_id: quest.quest_id.clone(),
                },
                format!("Quest {} completed -> claim reward.", quest.quest_id),
                0.7,
            ));
        }

        if state.ship.power == 0 {
            return out;
        }

        out.push(ActionProposal::from_action(
            &Action::Tick {
                seed: Some(Self::next_tick_seed(state)),
            },
            "Advance one day (deterministic).",
            0.6,
        ));
        out
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
    fn fresh_game_proposes_opening_tick() {
        let proposals = StubAdvisor::default().propose(&starlog_world::default_state());
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].action, "tick");
        assert_eq!(proposals[0].parameters["seed"], OPENING_SEED);
        assert!((proposals[0].confidence - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn low_hull_away_from_home_retreats_first() {
        let mut state = starlog_world::default_state();
        state.ship.hull = 20;
        state.ship.sector = "AIRI".to_owned();
        let proposals = StubAdvisor::default().propose(&state);
        assert_eq!(proposals[0].action, "move");
        assert_eq!(proposals[0].parameters["sector"], "Mostek");
        assert_eq!(proposals[1].action, "tick");

        state.ship.sector = "Mostek".to_owned();
        let at_home = StubAdvisor::default().propose(&state);
        assert!(at_home.iter().all(|p| p.action != "move"));
    }

    #[test]
    fn no_power_means_no_tick() {
        let mut state = starlog_world::default_state();
        state.ship.power = 0;
        assert!(StubAdvisor::default().propose(&state).is_empty());
    }

    #[test]
    fn completed_quest_is_claimed() {
        let mut state = starlog_world::default_state();
        if let Some(q) = state.quests.iter_mut().find(|q| q.quest_id == "q_ticks_3") {
            q.status = QuestStatus::Completed;
            q.progress = 3;
        }
        let proposals = StubAdvisor::default().propose(&state);
        assert_eq!(proposals[0].action, "claim");
        assert_eq!(proposals[0].parameters["quest_id"], "q_ticks_3");
    }

    #[test]
    fn no_claim_proposed_where_claims_are_forbidden() {
        let mut state = starlog_world::default_state();
        state.ship.sector = "Sektor A-1".to_owned();
        if let Some(q) = state.quests.iter_mut().find(|q| q.quest_id == "q_ticks_3") {
            q.status = QuestStatus::Completed;
            q.progress = 3;
        }
        let proposals = StubAdvisor::default().propose(&state);
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].action, "tick");
    }

    #[test]
    fn tick_seed_advances_along_the_generator() {
        let mut state = starlog_world::default_state();
        state.last_seed = 123;
        let seed = StubAdvisor::next_tick_seed(&state);
        assert_eq!(seed, 440_917_656);
        assert_ne!(seed, state.last_seed);
    }

    #[test]
    fn proposing_does_not_touch_state() {
        let state = starlog_world::default_state();
        let before = state.clone();
        let _ = StubAdvisor::default().propose(&state);
        assert_eq!(state, before);
    }
}
