//! Unattended play.
//!
//! The autopilot loads a profile, then repeatedly asks an advisor for
//! proposals, submits the most confident one, and commits the result until
//! a stop condition is met.

use starlog_types::{ActionProposal, GameState};
use tracing::{info, warn};

use crate::advisor::Advisor;
use crate::engine::{CoreError, Engine};

/// Errors that can occur during an autopilot run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Loading or committing failed.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: CoreError,
    },
}

/// Why an autopilot run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutopilotEndReason {
    /// The step budget was used up.
    MaxSteps,
    /// The advisor had nothing to propose.
    NoProposals,
    /// The hull reached zero.
    GameOver,
    /// The chosen proposal was rejected by the pipeline.
    Rejected,
}

/// Result of an autopilot run.
#[derive(Debug, Clone)]
pub struct AutopilotSummary {
    /// Actions that were applied.
    pub steps: u32,
    /// The reason the run ended.
    pub end_reason: AutopilotEndReason,
    /// State after the last applied action.
    pub final_state: GameState,
}

/// The highest-confidence proposal, earliest on ties.
pub fn pick_proposal(proposals: &[ActionProposal]) -> Option<&ActionProposal> {
    proposals.iter().fold(None, |best, candidate| match best {
        Some(current) if current.confidence >= candidate.confidence => Some(current),
        _ => Some(candidate),
    })
}

/// Play `profile` for at most `max_steps` actions.
///
/// # Errors
///
/// Returns [`RunnerError::Engine`] if the profile cannot be loaded or a
/// result cannot be committed.
pub fn run_autopilot(
    engine: &Engine,
    profile: &str,
    advisor: &dyn Advisor,
    max_steps: u32,
) -> Result<AutopilotSummary, RunnerError> {
    let mut state = engine.load(profile)?;
    let mut steps = 0_u32;

    info!(profile, max_steps, day = state.day, "Autopilot starting");

    let end_reason = loop {
        if state.ship.hull == 0 {
            break AutopilotEndReason::GameOver;
        }
        if steps >= max_steps {
            break AutopilotEndReason::MaxSteps;
        }

        let proposals = advisor.propose(&state);
        let Some(choice) = pick_proposal(&proposals) else {
            break AutopilotEndReason::NoProposals;
        };

        let result = engine.execute_proposal(profile, &state, choice)?;
        if !result.is_ok() {
            warn!(
                profile,
                action = %choice.action,
                errors = ?result.errors,
                "Proposal rejected"
            );
            break AutopilotEndReason::Rejected;
        }

        for line in &result.trace_lines {
            info!(profile, "{line}");
        }
        state = result.state;
        steps = steps.saturating_add(1);
    };

    Ok(AutopilotSummary {
        steps,
        end_reason,
        final_state: state,
    })
}

/// Log the outcome of an autopilot run.
pub fn log_autopilot_end(summary: &AutopilotSummary) {
    info!(
        reason = ?summary.end_reason,
        steps = summary.steps,
        day = summary.final_state.day,
        hull = summary.final_state.ship.hull,
        power = summary.final_state.ship.power,
        xp = summary.final_state.player.xp,
        level = summary.final_state.player.level,
        "Autopilot ended"
    );

    if summary.steps == 0 {
        warn!("Autopilot ended with no actions applied");
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
    use starlog_types::Action;

    use super::*;

    fn proposal(confidence: f64, seed: i64) -> ActionProposal {
        ActionProposal::from_action(&Action::Tick { seed: Some(seed) }, "test", confidence)
    }

    #[test]
    fn picks_highest_confidence() {
        let proposals = vec![proposal(0.6, 1), proposal(0.8, 2), proposal(0.7, 3)];
        assert_eq!(pick_proposal(&proposals).unwrap().parameters["seed"], 2);
    }

    #[test]
    fn ties_go_to_the_first() {
        let proposals = vec![proposal(0.5, 1), proposal(0.5, 2)];
        assert_eq!(pick_proposal(&proposals).unwrap().parameters["seed"], 1);
    }

    #[test]
    fn nothing_to_pick() {
        assert!(pick_proposal(&[]).is_none());
    }
}
