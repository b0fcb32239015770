//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that `main` propagates.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: starlog_core::ConfigError,
    },

    /// Loading or replaying the profile failed.
    #[error("engine error: {source}")]
    Core {
        /// The underlying engine error.
        #[from]
        source: starlog_core::CoreError,
    },

    /// The autopilot run failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: starlog_core::RunnerError,
    },
}
