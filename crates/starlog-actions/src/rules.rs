//! Invariant-restoring pass run after every executed action.
//!
//! Clamps hull and power into range and flags terminal conditions. The pass
//! is idempotent: on an already-clamped state it returns the same state and
//! emits no clamp event. The terminal flags (`power_down`, `game_over`) are
//! status reports and are emitted on every pass where they hold.

use starlog_types::{GameEvent, GameState, STAT_MAX, STAT_MIN};

use crate::handlers::Transition;

/// Trace line written when a stat had to be clamped.
pub const CLAMP_TRACE: &str = "RULE: clamp hull/power -> 0..100";

/// Normalize `state` after an action.
pub fn apply_rules(state: &GameState) -> Transition {
    let mut next = state.clone();
    let mut trace_lines = Vec::new();
    let mut events = Vec::new();

    let hull = state.ship.hull.clamp(STAT_MIN, STAT_MAX);
    let power = state.ship.power.clamp(STAT_MIN, STAT_MAX);
    if hull != state.ship.hull || power != state.ship.power {
        trace_lines.push(CLAMP_TRACE.to_owned());
        events.push(GameEvent::StatClamped {
            hull_before: state.ship.hull,
            power_before: state.ship.power,
            hull,
            power,
        });
        next.ship.hull = hull;
        next.ship.power = power;
    }

    if next.ship.power == 0 {
        events.push(GameEvent::PowerDown);
    }
    if next.ship.hull == 0 {
        events.push(GameEvent::GameOver);
    }

    Transition {
        state: next,
        trace_lines,
        events,
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
    fn in_range_state_is_untouched() {
        let state = starlog_world::default_state();
        let t = apply_rules(&state);
        assert_eq!(t.state, state);
        assert!(t.events.is_empty());
        assert!(t.trace_lines.is_empty());
    }

    #[test]
    fn out_of_range_stats_are_clamped_with_event() {
        let mut state = starlog_world::default_state();
        state.ship.hull = -4;
        state.ship.power = 130;
        let t = apply_rules(&state);

        assert_eq!(t.state.ship.hull, 0);
        assert_eq!(t.state.ship.power, 100);
        assert_eq!(t.trace_lines, vec![CLAMP_TRACE.to_owned()]);
        assert_eq!(
            t.events,
            vec![
                GameEvent::StatClamped {
                    hull_before: -4,
                    power_before: 130,
                    hull: 0,
                    power: 100
                },
                GameEvent::GameOver
            ]
        );
    }

    #[test]
    fn second_pass_is_idempotent() {
        let mut state = starlog_world::default_state();
        state.ship.hull = 250;
        state.ship.power = -1;
        let first = apply_rules(&state);
        let second = apply_rules(&first.state);

        assert_eq!(second.state, first.state);
        assert!(
            !second
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::StatClamped { .. }))
        );
        assert_eq!(second.events, vec![GameEvent::PowerDown]);
    }
}
