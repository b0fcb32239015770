//! Error types for the `starlog-actions` crate.

use starlog_types::QuestStatus;
use starlog_world::WorldError;

/// Errors raised by executors and configuration checks.
///
/// Gating failures (bad state, bad parameters, policy vetoes) are not
/// errors at this level; they are returned as data by the pipeline. This
/// type covers the cases where an executor is asked for a transition it
/// cannot perform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionsError {
    /// Static content lookup failed.
    #[error("world lookup failed: {source}")]
    World {
        /// The underlying lookup error.
        #[from]
        source: WorldError,
    },

    /// The game state has no progress entry for a catalog quest.
    #[error("quest {quest_id} missing from state")]
    QuestMissing {
        /// The quest id.
        quest_id: String,
    },

    /// A claim was attempted on a quest that is not completed.
    #[error("quest {quest_id} cannot be claimed while {status}")]
    QuestNotClaimable {
        /// The quest id.
        quest_id: String,
        /// Its current status.
        status: QuestStatus,
    },

    /// A gameplay knob is outside its legal range.
    #[error("invalid gameplay config: {field} {reason}")]
    InvalidConfig {
        /// Offending field name.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}
