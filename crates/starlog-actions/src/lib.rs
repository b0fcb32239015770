//! Deterministic state transitions for the Starlog engine.
//!
//! Everything in this crate is pure: no I/O, no clock, no global state.
//! The pipeline in `starlog-core` strings these pieces together in a fixed
//! order (validate, police, execute, apply rules).
//!
//! # Modules
//!
//! - [`rng`] -- Seeded 31-bit LCG, the only source of randomness
//! - [`config`] -- Gameplay tuning knobs
//! - [`progression`] -- Triangular level curve
//! - [`validation`] -- State invariants, parameter checks, raw request parsing
//! - [`policy`] -- Contextual admissibility guard
//! - [`handlers`] -- Tick, move, and claim executors
//! - [`rules`] -- Post-action clamping and terminal flags
//! - [`quests`] -- Quest progress folding and claiming
//! - [`error`] -- Executor and config errors

pub mod config;
pub mod error;
pub mod handlers;
pub mod policy;
pub mod progression;
pub mod quests;
pub mod rng;
pub mod rules;
pub mod validation;

pub use config::GameplayConfig;
pub use error::ActionsError;
pub use handlers::{FIRST_DAY_ACHIEVEMENT, Transition};
pub use policy::{Decision, PolicyOutcome, check_allowed};
pub use rng::Rng;
pub use rules::apply_rules;
pub use validation::{parse_action, validate_params, validate_state};
