//! Contextual admissibility checks.
//!
//! The policy guard runs after structural and parameter validation. It
//! decides whether an otherwise well-formed action is legal given where the
//! ship is and what shape it is in. Rules are evaluated in order and the
//! first match wins:
//!
//! 1. Hull at zero blocks `tick` (`game_over`).
//! 2. An action missing from the current sector's permitted list is blocked
//!    (`action_not_allowed`).
//! 3. Power at zero blocks `move` (`power_down`).
//! 4. A `move` to a sector missing from the registry is blocked
//!    (`unknown_sector`).
//! 5. A `claim` needs a catalog quest (`unknown_quest`) that is completed
//!    (`quest_not_claimable`).
//!
//! Every block also emits an audit event describing it.

use starlog_types::{Action, ActionKind, BlockReason, GameEvent, GameState, QuestStatus};
use starlog_world::quests as catalog;
use starlog_world::sectors;

/// Verdict of the policy guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The action may run.
    Allowed,
    /// The action is vetoed.
    Blocked(BlockReason),
}

impl Decision {
    /// Whether the action may run.
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Verdict plus the audit events emitted while reaching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyOutcome {
    /// The verdict.
    pub decision: Decision,
    /// Events describing a block. Empty when allowed.
    pub events: Vec<GameEvent>,
}

impl PolicyOutcome {
    const fn allowed() -> Self {
        Self {
            decision: Decision::Allowed,
            events: Vec::new(),
        }
    }

    fn blocked(reason: BlockReason, event: GameEvent) -> Self {
        Self {
            decision: Decision::Blocked(reason),
            events: vec![event],
        }
    }

    fn action_blocked(kind: ActionKind, reason: BlockReason) -> Self {
        Self::blocked(
            reason,
            GameEvent::ActionBlocked {
                action: kind.as_str().to_owned(),
                reason,
            },
        )
    }
}

/// Decide whether `action` may run against `state`, using the static
/// sector registry for per-sector restrictions.
pub fn check_allowed(state: &GameState, action: &Action) -> PolicyOutcome {
    check_allowed_with(state, action, sectors::allowed_actions)
}

/// [`check_allowed`] with the per-sector restriction lists supplied by
/// `allowed_in`. A sector for which it returns `None` has no restriction.
pub fn check_allowed_with<'a>(
    state: &GameState,
    action: &Action,
    allowed_in: impl Fn(&str) -> Option<&'a [ActionKind]>,
) -> PolicyOutcome {
    let kind = action.kind();

    if kind == ActionKind::Tick && state.ship.hull == 0 {
        return PolicyOutcome::action_blocked(kind, BlockReason::GameOver);
    }

    if let Some(permitted) = allowed_in(&state.ship.sector)
        && !permitted.contains(&kind)
    {
        return PolicyOutcome::blocked(
            BlockReason::ActionNotAllowed,
            GameEvent::ActionNotAllowed {
                action: kind.as_str().to_owned(),
                sector: state.ship.sector.clone(),
            },
        );
    }

    match action {
        Action::Move { .. } if state.ship.power == 0 => {
            PolicyOutcome::action_blocked(kind, BlockReason::PowerDown)
        }
        Action::Move { sector } if !sectors::contains(sector) => PolicyOutcome::blocked(
            BlockReason::UnknownSector,
            GameEvent::SectorUnknown {
                sector: sector.clone(),
            },
        ),
        Action::Claim { quest_id } if !catalog::contains(quest_id) => {
            PolicyOutcome::action_blocked(kind, BlockReason::UnknownQuest)
        }
        Action::Claim { quest_id }
            if state.quest(quest_id).map(|q| q.status) != Some(QuestStatus::Completed) =>
        {
            PolicyOutcome::action_blocked(kind, BlockReason::QuestNotClaimable)
        }
        _ => PolicyOutcome::allowed(),
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

    fn move_to(sector: &str) -> Action {
        Action::Move {
            sector: sector.to_owned(),
        }
    }

    #[test]
    fn fresh_state_allows_tick_and_known_moves() {
        let state = starlog_world::default_state();
        assert!(check_allowed(&state, &Action::Tick { seed: None }).decision.is_allowed());
        let outcome = check_allowed(&state, &move_to("AIRI"));
        assert!(outcome.decision.is_allowed());
        assert!(outcome.events.is_empty());
    }

    #[test]
    fn tick_blocked_at_zero_hull() {
        let mut state = starlog_world::default_state();
        state.ship.hull = 0;
        let outcome = check_allowed(&state, &Action::Tick { seed: Some(1) });
        assert_eq!(outcome.decision, Decision::Blocked(BlockReason::GameOver));
        assert_eq!(
            outcome.events,
            vec![GameEvent::ActionBlocked {
                action: "tick".to_owned(),
                reason: BlockReason::GameOver
            }]
        );
        // moving is still possible with a wrecked hull
        assert!(check_allowed(&state, &move_to("Mostek")).decision.is_allowed());
    }

    #[test]
    fn move_blocked_without_power() {
        let mut state = starlog_world::default_state();
        state.ship.power = 0;
        let outcome = check_allowed(&state, &move_to("AIRI"));
        assert_eq!(outcome.decision, Decision::Blocked(BlockReason::PowerDown));
        assert!(check_allowed(&state, &Action::Tick { seed: None }).decision.is_allowed());
    }

    #[test]
    fn unknown_target_sector() {
        let state = starlog_world::default_state();
        let outcome = check_allowed(&state, &move_to("NoSuchPlace"));
        assert_eq!(outcome.decision, Decision::Blocked(BlockReason::UnknownSector));
        assert_eq!(
            outcome.events,
            vec![GameEvent::SectorUnknown {
                sector: "NoSuchPlace".to_owned()
            }]
        );
    }

    #[test]
    fn power_check_precedes_registry_check() {
        let mut state = starlog_world::default_state();
        state.ship.power = 0;
        let outcome = check_allowed(&state, &move_to("NoSuchPlace"));
        assert_eq!(outcome.decision, Decision::Blocked(BlockReason::PowerDown));
    }

    #[test]
    fn unregistered_current_sector_imposes_no_restriction() {
        let mut state = starlog_world::default_state();
        state.ship.sector = "Drydock".to_owned();
        assert!(check_allowed(&state, &Action::Tick { seed: None }).decision.is_allowed());
    }

    #[test]
    fn claim_is_not_allowed_in_the_field() {
        let mut state = starlog_world::default_state();
        state.ship.sector = "Sektor A-1".to_owned();
        if let Some(q) = state.quests.iter_mut().find(|q| q.quest_id == "q_ticks_3") {
            q.status = QuestStatus::Completed;
            q.progress = 3;
        }
        let outcome = check_allowed(
            &state,
            &Action::Claim {
                quest_id: "q_ticks_3".to_owned(),
            },
        );
        assert_eq!(
            outcome.decision,
            Decision::Blocked(BlockReason::ActionNotAllowed)
        );
        assert_eq!(
            outcome.events,
            vec![GameEvent::ActionNotAllowed {
                action: "claim".to_owned(),
                sector: "Sektor A-1".to_owned()
            }]
        );
        assert!(check_allowed(&state, &Action::Tick { seed: None }).decision.is_allowed());
    }

    #[test]
    fn sector_restriction_precedes_quest_checks() {
        let mut state = starlog_world::default_state();
        state.ship.sector = "Sektor A-1".to_owned();
        let outcome = check_allowed(
            &state,
            &Action::Claim {
                quest_id: "q_legacy".to_owned(),
            },
        );
        assert_eq!(
            outcome.decision,
            Decision::Blocked(BlockReason::ActionNotAllowed)
        );
    }

    #[test]
    fn sector_restriction_sits_between_game_over_and_power_down() {
        const DOCK_ONLY: &[ActionKind] = &[ActionKind::Claim];
        let registry = |name: &str| (name == "Dock").then_some(DOCK_ONLY);

        let mut state = starlog_world::default_state();
        state.ship.sector = "Dock".to_owned();
        state.ship.hull = 0;
        state.ship.power = 0;

        let tick = check_allowed_with(&state, &Action::Tick { seed: None }, registry);
        assert_eq!(tick.decision, Decision::Blocked(BlockReason::GameOver));

        let mv = check_allowed_with(&state, &move_to("AIRI"), registry);
        assert_eq!(mv.decision, Decision::Blocked(BlockReason::ActionNotAllowed));
        assert_eq!(
            mv.events,
            vec![GameEvent::ActionNotAllowed {
                action: "move".to_owned(),
                sector: "Dock".to_owned()
            }]
        );

        state.ship.sector = "Mostek".to_owned();
        let mv = check_allowed_with(&state, &move_to("AIRI"), registry);
        assert_eq!(mv.decision, Decision::Blocked(BlockReason::PowerDown));
    }

    #[test]
    fn claim_requires_completed_catalog_quest() {
        let mut state = starlog_world::default_state();
        let claim = |id: &str| Action::Claim {
            quest_id: id.to_owned(),
        };

        assert_eq!(
            check_allowed(&state, &claim("q_legacy")).decision,
            Decision::Blocked(BlockReason::UnknownQuest)
        );
        assert_eq!(
            check_allowed(&state, &claim("q_ticks_3")).decision,
            Decision::Blocked(BlockReason::QuestNotClaimable)
        );

        if let Some(q) = state.quests.iter_mut().find(|q| q.quest_id == "q_ticks_3") {
            q.status = QuestStatus::Completed;
            q.progress = 3;
        }
        assert!(check_allowed(&state, &claim("q_ticks_3")).decision.is_allowed());
    }
}
