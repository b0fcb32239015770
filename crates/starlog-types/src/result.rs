//! Outcome of running an action through the pipeline.
//!
//! Gating failures are data, not faults: the pipeline always returns an
//! [`ActionResult`], and a non-empty `errors` list means the returned state
//! is the input state unchanged.

use serde::{Deserialize, Serialize};

use crate::events::GameEvent;
use crate::state::GameState;

/// Why the policy guard vetoed an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// Hull is zero; the game cannot advance.
    GameOver,
    /// The current sector does not permit this action.
    ActionNotAllowed,
    /// Power is zero; the ship cannot move.
    PowerDown,
    /// The move target is not in the sector registry.
    UnknownSector,
    /// The quest to claim is not in the catalog.
    UnknownQuest,
    /// The quest to claim has not been completed, or was already claimed.
    QuestNotClaimable,
}

impl BlockReason {
    /// Wire name of the reason.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GameOver => "game_over",
            Self::ActionNotAllowed => "action_not_allowed",
            Self::PowerDown => "power_down",
            Self::UnknownSector => "unknown_sector",
            Self::UnknownQuest => "unknown_quest",
            Self::QuestNotClaimable => "quest_not_claimable",
        }
    }
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state invariant violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum StructuralError {
    /// The state was not migrated to the current schema.
    #[error("invalid_schema_version: expected {expected}, found {found}")]
    InvalidSchemaVersion {
        /// Version found on the state.
        found: u32,
        /// Version the engine runs.
        expected: u32,
    },
    /// Day is negative.
    #[error("invalid_day: {day}")]
    InvalidDay {
        /// Offending value.
        day: i64,
    },
    /// Hull outside `0..=100`.
    #[error("invalid_hull: {hull}")]
    InvalidHull {
        /// Offending value.
        hull: i64,
    },
    /// Power outside `0..=100`.
    #[error("invalid_power: {power}")]
    InvalidPower {
        /// Offending value.
        power: i64,
    },
    /// Experience is negative.
    #[error("invalid_xp: {xp}")]
    InvalidXp {
        /// Offending value.
        xp: i64,
    },
    /// Level is below one or disagrees with the level curve.
    #[error("invalid_level: {level} (expected {expected})")]
    InvalidLevel {
        /// Level stored on the state.
        level: i64,
        /// Level the curve yields for the stored xp.
        expected: i64,
    },
    /// The ship's sector name breaks the sector grammar.
    #[error("invalid_sector: {sector:?}")]
    InvalidSector {
        /// Offending value.
        sector: String,
    },
    /// The carried-forward seed is negative.
    #[error("invalid_last_seed: {last_seed}")]
    InvalidLastSeed {
        /// Offending value.
        last_seed: i64,
    },
    /// A quest entry references an id missing from the catalog.
    #[error("unknown_quest: {quest_id}")]
    UnknownQuest {
        /// Offending id.
        quest_id: String,
    },
    /// A quest entry has negative progress.
    #[error("invalid_quest_progress: {quest_id} = {progress}")]
    InvalidQuestProgress {
        /// Quest id.
        quest_id: String,
        /// Offending value.
        progress: i64,
    },
    /// The same achievement appears twice.
    #[error("duplicate_achievement: {name}")]
    DuplicateAchievement {
        /// Repeated achievement.
        name: String,
    },
}

/// A malformed action parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ParamError {
    /// `sector` is missing, empty, too long, or has forbidden characters.
    #[error("invalid_sector: {detail}")]
    InvalidSector {
        /// What was wrong with it.
        detail: String,
    },
    /// `seed` is present but not a non-negative integer.
    #[error("invalid_seed: {detail}")]
    InvalidSeed {
        /// What was wrong with it.
        detail: String,
    },
    /// `quest_id` is missing or not a non-empty string.
    #[error("invalid_quest_id: {detail}")]
    InvalidQuestId {
        /// What was wrong with it.
        detail: String,
    },
}

/// Any reason an action did not run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionError {
    /// The input state breaks an invariant.
    #[error("structural error: {error}")]
    Structural {
        /// The violation.
        error: StructuralError,
    },
    /// A parameter is malformed.
    #[error("parameter error: {error}")]
    Param {
        /// The violation.
        error: ParamError,
    },
    /// The policy guard vetoed the action.
    #[error("{action} blocked: {reason}")]
    PolicyBlocked {
        /// Action name.
        action: String,
        /// Why.
        reason: BlockReason,
    },
    /// The action name is not one the engine supports.
    #[error("unknown action: {action}")]
    UnknownAction {
        /// The unsupported name.
        action: String,
    },
    /// The executor refused the transition after the gates passed.
    #[error("execution failed: {message}")]
    Execution {
        /// Executor error description.
        message: String,
    },
}

impl From<StructuralError> for ActionError {
    fn from(error: StructuralError) -> Self {
        Self::Structural { error }
    }
}

impl From<ParamError> for ActionError {
    fn from(error: ParamError) -> Self {
        Self::Param { error }
    }
}

/// Everything the pipeline hands back for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    /// The next state, or the input state when `errors` is non-empty.
    pub state: GameState,
    /// Human-readable narration of what happened.
    pub trace_lines: Vec<String>,
    /// Domain events, executor events first, then rule events, then
    /// policy events.
    pub events: Vec<GameEvent>,
    /// Gating errors. Empty on success.
    pub errors: Vec<ActionError>,
}

impl ActionResult {
    /// A rejected request: the state comes back untouched.
    pub const fn rejected(state: GameState, events: Vec<GameEvent>, errors: Vec<ActionError>) -> Self {
        Self {
            state,
            trace_lines: Vec::new(),
            events,
            errors,
        }
    }

    /// Whether the action ran.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The block reason, if the policy guard vetoed the request.
    pub fn blocked_reason(&self) -> Option<BlockReason> {
        self.errors.iter().find_map(|e| match e {
            ActionError::PolicyBlocked { reason, .. } => Some(*reason),
            _ => None,
        })
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
    fn block_reason_is_snake_case_on_the_wire() {
        let json = serde_json::to_string(&BlockReason::UnknownSector).unwrap();
        assert_eq!(json, r#""unknown_sector""#);
        assert_eq!(BlockReason::UnknownSector.as_str(), "unknown_sector");
    }

    #[test]
    fn structural_error_carries_its_code() {
        let err = StructuralError::InvalidHull { hull: 140 };
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["code"], "invalid_hull");
        assert_eq!(err.to_string(), "invalid_hull: 140");
    }

    #[test]
    fn blocked_reason_is_found_among_errors() {
        let state = crate::GameState::new_game("Mostek", Vec::new());
        let result = ActionResult::rejected(
            state,
            Vec::new(),
            vec![ActionError::PolicyBlocked {
                action: "move".to_owned(),
                reason: BlockReason::PowerDown,
            }],
        );
        assert!(!result.is_ok());
        assert_eq!(result.blocked_reason(), Some(BlockReason::PowerDown));
    }
}
