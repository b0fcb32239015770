//! Shared type definitions for the Starlog engine.
//!
//! Every crate in the workspace speaks in these types: the persisted game
//! state, the closed set of actions, the domain events the pipeline emits,
//! and the result envelope returned by every action request. The persisted
//! shapes flow to `TypeScript` via `ts-rs` for external tooling.
//!
//! # Modules
//!
//! - [`state`] -- The [`GameState`] aggregate and its parts
//! - [`actions`] -- Typed [`Action`] requests and advisor [`ActionProposal`]s
//! - [`events`] -- [`GameEvent`] records emitted by executors, rules, and policy
//! - [`result`] -- [`ActionResult`] and the gating error taxonomy

pub mod actions;
pub mod events;
pub mod result;
pub mod state;

// Re-export all public types at crate root for convenience.
pub use actions::{Action, ActionKind, ActionProposal, Parameters};
pub use events::{AIRI_STATUS, DOCTOR_OK, GameEvent, TICK_DONE};
pub use result::{ActionError, ActionResult, BlockReason, ParamError, StructuralError};
pub use state::{
    GameState, PlayerState, QuestProgress, QuestStatus, SCHEMA_VERSION, STAT_MAX, STAT_MIN,
    ShipState,
};

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    //! `TypeScript` binding generation for the persisted shapes.

    #[test]
    fn export_bindings() {
        // Files are written to the `bindings/` directory relative to the
        // crate root.
        use ts_rs::TS;

        let _ = crate::state::GameState::export_all();
        let _ = crate::state::ShipState::export_all();
        let _ = crate::state::PlayerState::export_all();
        let _ = crate::state::QuestProgress::export_all();
        let _ = crate::state::QuestStatus::export_all();
        let _ = crate::actions::ActionProposal::export_all();
    }
}
