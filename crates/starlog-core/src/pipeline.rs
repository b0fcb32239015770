//! The action pipeline.
//!
//! Every state change, live or replayed, runs through the same fixed
//! sequence of phases:
//!
//! 1. **Validate state** -- structural invariants of the input state
//! 2. **Validate parameters** -- shape and range of the action's parameters
//! 3. **Policy** -- contextual admissibility (sector, power, hull, quests)
//! 4. **Execute** -- the action's pure executor
//! 5. **Rules** -- clamping and terminal-condition flags
//!
//! A failure in phases 1--3 returns the input state untouched with the
//! errors (and, for policy vetoes, the audit events) as data. The pipeline
//! never panics and never performs I/O.

use starlog_actions::handlers;
use starlog_actions::policy::{self, Decision};
use starlog_actions::{GameplayConfig, progression, rules, validation};
use starlog_types::{Action, ActionError, ActionResult, GameState, Parameters};
use tracing::debug;

/// Run a raw request (action name plus parameter map).
///
/// Unknown action names and mistyped parameters are rejected with
/// [`ActionError::UnknownAction`] / [`ActionError::Param`] before any other
/// phase runs.
pub fn execute(
    state: &GameState,
    action: &str,
    parameters: &Parameters,
    config: &GameplayConfig,
) -> ActionResult {
    match validation::parse_action(action, parameters) {
        Ok(parsed) => execute_action(state, &parsed, config),
        Err(errors) => {
            debug!(action, error_count = errors.len(), "Rejected unparseable request");
            ActionResult::rejected(state.clone(), Vec::new(), errors)
        }
    }
}

/// Run a typed action.
pub fn execute_action(state: &GameState, action: &Action, config: &GameplayConfig) -> ActionResult {
    let kind = action.kind();

    // --- Phase 1: state invariants ---
    let structural = validation::validate_state(state, config);
    if !structural.is_empty() {
        debug!(action = %kind, error_count = structural.len(), "Rejected: invalid state");
        return ActionResult::rejected(
            state.clone(),
            Vec::new(),
            structural.into_iter().map(ActionError::from).collect(),
        );
    }

    // --- Phase 2: parameters ---
    let params = validation::validate_params(action);
    if !params.is_empty() {
        debug!(action = %kind, error_count = params.len(), "Rejected: invalid parameters");
        return ActionResult::rejected(
            state.clone(),
            Vec::new(),
            params.into_iter().map(ActionError::from).collect(),
        );
    }

    // --- Phase 3: policy ---
    let outcome = policy::check_allowed(state, action);
    if let Decision::Blocked(reason) = outcome.decision {
        debug!(action = %kind, %reason, "Rejected: policy");
        return ActionResult::rejected(
            state.clone(),
            outcome.events,
            vec![ActionError::PolicyBlocked {
                action: kind.as_str().to_owned(),
                reason,
            }],
        );
    }

    // --- Phase 4: execute ---
    let executed = match action {
        Action::Tick { seed } => Ok(handlers::execute_tick(state, *seed, config)),
        Action::Move { sector } => handlers::execute_move(state, sector),
        Action::Claim { quest_id } => handlers::execute_claim(state, quest_id, config),
    };
    let transition = match executed {
        Ok(transition) => transition,
        Err(err) => {
            debug!(action = %kind, error = %err, "Rejected: executor");
            return ActionResult::rejected(
                state.clone(),
                Vec::new(),
                vec![ActionError::Execution {
                    message: err.to_string(),
                }],
            );
        }
    };

    // --- Phase 5: rules ---
    let ruled = rules::apply_rules(&transition.state);

    let mut trace_lines = transition.trace_lines;
    trace_lines.extend(ruled.trace_lines);
    let mut events = transition.events;
    events.extend(ruled.events);
    events.extend(outcome.events);

    ActionResult {
        state: ruled.state,
        trace_lines,
        events,
        errors: Vec::new(),
    }
}

/// Re-derive the stored level from experience under `config`.
///
/// Needed when a profile's level curve was retuned after the state was
/// saved; without it the state would fail the level invariant forever.
/// States with negative experience are left for the validator to report.
pub fn rebase_level(state: &GameState, config: &GameplayConfig) -> GameState {
    let mut next = state.clone();
    if next.player.xp >= 0 {
        next.player.level = progression::level_from_xp(next.player.xp, config.xp_level_base);
    }
    next
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
    use starlog_types::{BlockReason, GameEvent, ParamError, StructuralError};

    use super::*;

    fn params(value: serde_json::Value) -> Parameters {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn golden_tick_seed_123() {
        let state = starlog_world::default_state();
        let result = execute(&state, "tick", &params(json!({"seed": 123})), &GameplayConfig::default());

        assert!(result.is_ok());
        assert_eq!(result.state.day, 1);
        assert_eq!(result.state.ship.hull, 99);
        assert_eq!(result.state.ship.power, 99);
        assert_eq!(result.state.player.xp, 5);
        assert_eq!(result.state.player.level, 1);
        assert!(result.events.contains(&GameEvent::TickDone { amount: 1, day: 1 }));
    }

    #[test]
    fn golden_move_to_airi() {
        let state = starlog_world::default_state();
        let result = execute(&state, "move", &params(json!({"sector": "AIRI"})), &GameplayConfig::default());

        assert!(result.is_ok());
        assert_eq!(result.state.ship.sector, "AIRI");
        assert_eq!(result.state.ship.hull, state.ship.hull);
        assert_eq!(result.state.ship.power, state.ship.power);
        assert_eq!(result.state.day, state.day);
        assert!(result.events.contains(&GameEvent::SectorMoved {
            sector: "AIRI".to_owned()
        }));
    }

    #[test]
    fn golden_move_to_unknown_sector_is_blocked() {
        let state = starlog_world::default_state();
        let result = execute(
            &state,
            "move",
            &params(json!({"sector": "NoSuchPlace"})),
            &GameplayConfig::default(),
        );

        assert_eq!(result.state, state);
        assert_eq!(result.blocked_reason(), Some(BlockReason::UnknownSector));
        assert_eq!(
            result.events,
            vec![GameEvent::SectorUnknown {
                sector: "NoSuchPlace".to_owned()
            }]
        );
        assert!(result.trace_lines.is_empty());
    }

    #[test]
    fn tick_is_deterministic_through_the_pipeline() {
        let state = starlog_world::default_state();
        let cfg = GameplayConfig::default();
        let a = execute_action(&state, &Action::Tick { seed: Some(77) }, &cfg);
        let b = execute_action(&state, &Action::Tick { seed: Some(77) }, &cfg);
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_state_is_rejected_before_policy() {
        let mut state = starlog_world::default_state();
        state.ship.hull = 150;
        let result = execute_action(&state, &Action::Tick { seed: None }, &GameplayConfig::default());
        assert_eq!(result.state, state);
        assert_eq!(
            result.errors,
            vec![ActionError::Structural {
                error: StructuralError::InvalidHull { hull: 150 }
            }]
        );
        assert!(result.events.is_empty());
    }

    #[test]
    fn bad_parameters_are_rejected_without_events() {
        let state = starlog_world::default_state();
        let result = execute(&state, "move", &params(json!({"sector": "a/b"})), &GameplayConfig::default());
        assert_eq!(result.state, state);
        assert!(matches!(
            result.errors.as_slice(),
            [ActionError::Param {
                error: ParamError::InvalidSector { .. }
            }]
        ));

        let negative = execute(&state, "tick", &params(json!({"seed": -4})), &GameplayConfig::default());
        assert!(matches!(
            negative.errors.as_slice(),
            [ActionError::Param {
                error: ParamError::InvalidSeed { .. }
            }]
        ));
    }

    #[test]
    fn unknown_action_is_its_own_error() {
        let state = starlog_world::default_state();
        let result = execute(&state, "warp", &Parameters::new(), &GameplayConfig::default());
        assert_eq!(
            result.errors,
            vec![ActionError::UnknownAction {
                action: "warp".to_owned()
            }]
        );
        assert_eq!(result.state, state);
    }

    #[test]
    fn tick_into_zero_power_flags_power_down() {
        let mut state = starlog_world::default_state();
        state.ship.power = 1;
        let result = execute_action(&state, &Action::Tick { seed: Some(123) }, &GameplayConfig::default());
        assert_eq!(result.state.ship.power, 0);
        assert!(result.events.contains(&GameEvent::PowerDown));

        let blocked = execute_action(
            &result.state,
            &Action::Move {
                sector: "AIRI".to_owned(),
            },
            &GameplayConfig::default(),
        );
        assert_eq!(blocked.blocked_reason(), Some(BlockReason::PowerDown));
        assert_eq!(blocked.state, result.state);
    }

    #[test]
    fn large_losses_are_clamped_by_rules() {
        let cfg = GameplayConfig {
            anomaly_chance: 1.0,
            anomaly_hull_loss: 500,
            power_loss_per_tick: 500,
            ..GameplayConfig::default()
        };
        let result = execute_action(
            &starlog_world::default_state(),
            &Action::Tick { seed: Some(1) },
            &cfg,
        );
        assert_eq!(result.state.ship.hull, 0);
        assert_eq!(result.state.ship.power, 0);
        assert!(result.events.contains(&GameEvent::StatClamped {
            hull_before: -400,
            power_before: -400,
            hull: 0,
            power: 0
        }));
        assert!(result.events.contains(&GameEvent::GameOver));
        assert!(result.trace_lines.contains(&"RULE: clamp hull/power -> 0..100".to_owned()));

        let next = execute_action(&result.state, &Action::Tick { seed: Some(2) }, &cfg);
        assert_eq!(next.blocked_reason(), Some(BlockReason::GameOver));
        assert_eq!(next.state, result.state);
    }

    #[test]
    fn claim_runs_as_one_transition() {
        let cfg = GameplayConfig::default();
        let mut state = starlog_world::default_state();
        for seed in 1..=3 {
            state = execute_action(&state, &Action::Tick { seed: Some(seed) }, &cfg).state;
        }
        let xp_before = state.player.xp;
        let result = execute(&state, "claim", &params(json!({"quest_id": "q_ticks_3"})), &cfg);
        assert!(result.is_ok());
        assert_eq!(result.state.player.xp, xp_before + 15);
        assert!(result.events.contains(&GameEvent::QuestClaimed {
            quest_id: "q_ticks_3".to_owned(),
            reward_xp: 15
        }));

        let again = execute(&result.state, "claim", &params(json!({"quest_id": "q_ticks_3"})), &cfg);
        assert_eq!(again.blocked_reason(), Some(BlockReason::QuestNotClaimable));
    }

    #[test]
    fn rebase_level_follows_retuned_curve() {
        let mut state = starlog_world::default_state();
        state.player.xp = 30;
        state.player.level = 3;
        let retuned = GameplayConfig {
            xp_level_base: 30,
            ..GameplayConfig::default()
        };
        assert!(!validation::validate_state(&state, &retuned).is_empty());
        let rebased = rebase_level(&state, &retuned);
        assert_eq!(rebased.player.level, 2);
        assert!(validation::validate_state(&rebased, &retuned).is_empty());
    }
}
