//! Engine core for Starlog.
//!
//! Ties the pure transition logic in `starlog-actions` to the persistence
//! layer in `starlog-events`:
//!
//! # Modules
//!
//! - [`config`] -- Engine and per-profile configuration
//! - [`pipeline`] -- The five-phase action pipeline (the only path to a new state)
//! - [`replay`] -- State reconstruction from a logbook
//! - [`advisor`] -- Proposal interface and the rule-based stub
//! - [`engine`] -- Profile-bound facade: load, execute, commit, replay
//! - [`runner`] -- Autopilot loop used by the engine binary

pub mod advisor;
pub mod config;
pub mod engine;
pub mod pipeline;
pub mod replay;
pub mod runner;

pub use advisor::{Advisor, StubAdvisor};
pub use config::{ConfigError, StarlogConfig};
pub use engine::{CoreError, Engine};
pub use pipeline::{execute, execute_action};
pub use replay::{ReplayReport, replay_records};
pub use runner::{AutopilotEndReason, AutopilotSummary, RunnerError, run_autopilot};
