//! Action requests and advisor proposals.
//!
//! [`Action`] is the closed set of state transitions the engine knows how to
//! run. Raw callers (the advisor, a CLI) speak in an action name plus a
//! parameter map; the pipeline parses that into an [`Action`] before any
//! executor sees it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Parameter map of a raw action request.
pub type Parameters = BTreeMap<String, serde_json::Value>;

/// Discriminant of [`Action`], used where only the name matters (sector
/// permission lists, policy events).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Advance one day.
    Tick,
    /// Relocate the ship.
    Move,
    /// Claim a completed quest's reward.
    Claim,
}

impl ActionKind {
    /// Every supported action.
    pub const ALL: [Self; 3] = [Self::Tick, Self::Move, Self::Claim];

    /// Wire name of the action.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::Move => "move",
            Self::Claim => "claim",
        }
    }

    /// Resolve a wire name. Returns `None` for anything unsupported.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed action request.
///
/// Serializes tagged on `action` with the parameters flattened beside it,
/// which is the body of a logbook command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Advance one day. Without a seed the state's `last_seed` is reused.
    Tick {
        /// Explicit RNG seed for this tick.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<i64>,
    },
    /// Move the ship to `sector`.
    Move {
        /// Destination sector name.
        sector: String,
    },
    /// Claim the reward of a completed quest.
    Claim {
        /// Catalog id of the quest.
        quest_id: String,
    },
}

impl Action {
    /// Discriminant of this action.
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Tick { .. } => ActionKind::Tick,
            Self::Move { .. } => ActionKind::Move,
            Self::Claim { .. } => ActionKind::Claim,
        }
    }

    /// The parameter map this action would be submitted with.
    pub fn parameters(&self) -> Parameters {
        let mut params = Parameters::new();
        match self {
            Self::Tick { seed: Some(seed) } => {
                params.insert("seed".to_owned(), serde_json::Value::from(*seed));
            }
            Self::Tick { seed: None } => {}
            Self::Move { sector } => {
                params.insert("sector".to_owned(), serde_json::Value::from(sector.as_str()));
            }
            Self::Claim { quest_id } => {
                params.insert(
                    "quest_id".to_owned(),
                    serde_json::Value::from(quest_id.as_str()),
                );
            }
        }
        params
    }
}

/// A non-binding suggestion produced by an advisor.
///
/// Proposals carry no authority: they go through the same validation and
/// policy gates as any other request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ActionProposal {
    /// Action name, e.g. `tick`.
    pub action: String,
    /// Raw parameters for the action.
    #[ts(type = "Record<string, unknown>")]
    pub parameters: Parameters,
    /// Human-readable justification.
    pub reason: String,
    /// Advisor confidence in `0.0..=1.0`.
    pub confidence: f64,
}

impl ActionProposal {
    /// Build a proposal from a typed action.
    pub fn from_action(action: &Action, reason: impl Into<String>, confidence: f64) -> Self {
        Self {
            action: action.kind().as_str().to_owned(),
            parameters: action.parameters(),
            reason: reason.into(),
            confidence: confidence.clamp(0.0, 1.0),
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
    fn command_body_shape() {
        let tick = serde_json::to_string(&Action::Tick { seed: Some(123) }).unwrap();
        assert_eq!(tick, r#"{"action":"tick","seed":123}"#);

        let bare = serde_json::to_string(&Action::Tick { seed: None }).unwrap();
        assert_eq!(bare, r#"{"action":"tick"}"#);

        let mv = serde_json::to_string(&Action::Move {
            sector: "AIRI".to_owned(),
        })
        .unwrap();
        assert_eq!(mv, r#"{"action":"move","sector":"AIRI"}"#);
    }

    #[test]
    fn command_body_ignores_foreign_keys() {
        let action: Action =
            serde_json::from_str(r#"{"type":"command","action":"claim","quest_id":"q_ticks_3"}"#)
                .unwrap();
        assert_eq!(
            action,
            Action::Claim {
                quest_id: "q_ticks_3".to_owned()
            }
        );
    }

    #[test]
    fn kind_names_round_through_from_name() {
        for kind in ActionKind::ALL {
            assert_eq!(ActionKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(ActionKind::from_name("warp"), None);
    }

    #[test]
    fn proposal_copies_parameters_and_clamps_confidence() {
        let proposal = ActionProposal::from_action(
            &Action::Move {
                sector: "Mostek".to_owned(),
            },
            "hull low",
            1.7,
        );
        assert_eq!(proposal.action, "move");
        assert_eq!(proposal.parameters["sector"], "Mostek");
        assert!((proposal.confidence - 1.0).abs() < f64::EPSILON);
    }
}
