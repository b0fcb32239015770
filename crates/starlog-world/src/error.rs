//! Error types for the `starlog-world` crate.

/// Errors that can occur when resolving static world content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// No sector with this name is registered.
    #[error("sector not found: {0}")]
    SectorNotFound(String),

    /// No quest with this id is in the catalog.
    #[error("quest not found: {0}")]
    QuestNotFound(String),
}
