//! Static world content for the Starlog engine.
//!
//! Nothing here changes at runtime. The sector registry decides where the
//! ship can go and what it can do there; the quest catalog decides which
//! events count toward which rewards.
//!
//! # Modules
//!
//! - [`sectors`] -- Sector registry with per-sector action permissions
//! - [`quests`] -- Quest catalog, quest list normalization, new-game state
//! - [`error`] -- Lookup errors

pub mod error;
pub mod quests;
pub mod sectors;

pub use error::WorldError;
pub use quests::{QuestDef, default_state, normalize_quests};
pub use sectors::{HOME_SECTOR, MAX_SECTOR_NAME_CHARS, SectorDef};
