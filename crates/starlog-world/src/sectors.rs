//! The sector registry.
//!
//! Sectors are static content: a fixed table compiled into the binary. Each
//! entry lists the actions that may be performed while the ship is there.

use starlog_types::ActionKind;

use crate::error::WorldError;

/// Sector a new game starts in, and where the advisor retreats to.
pub const HOME_SECTOR: &str = "Mostek";

/// Maximum length of a sector name, in characters.
pub const MAX_SECTOR_NAME_CHARS: usize = 40;

/// Static definition of one sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorDef {
    /// Unique name; also the identifier stored in the game state.
    pub name: &'static str,
    /// Display description.
    pub description: &'static str,
    /// Free-form classification tags.
    pub tags: &'static [&'static str],
    /// Actions permitted while the ship is in this sector.
    pub actions: &'static [ActionKind],
}

impl SectorDef {
    /// Whether `action` may be performed here.
    pub fn allows(&self, action: ActionKind) -> bool {
        self.actions.contains(&action)
    }
}

const ALL_ACTIONS: &[ActionKind] = &[ActionKind::Tick, ActionKind::Move, ActionKind::Claim];

/// Out in the field there is no terminal to file quest claims from.
const FIELD_ACTIONS: &[ActionKind] = &[ActionKind::Tick, ActionKind::Move];

static SECTORS: [SectorDef; 3] = [
    SectorDef {
        name: HOME_SECTOR,
        description: "Command bridge.",
        tags: &["core"],
        actions: ALL_ACTIONS,
    },
    SectorDef {
        name: "AIRI",
        description: "Advisor interface and AI core.",
        tags: &["ai"],
        actions: ALL_ACTIONS,
    },
    SectorDef {
        name: "Sektor A-1",
        description: "Service corridors of block A-1.",
        tags: &["field"],
        actions: FIELD_ACTIONS,
    },
];

/// Every registered sector, in registry order.
pub fn list() -> &'static [SectorDef] {
    &SECTORS
}

/// Look up a sector by name.
pub fn get(name: &str) -> Option<&'static SectorDef> {
    SECTORS.iter().find(|s| s.name == name)
}

/// Look up a sector by name, failing with [`WorldError::SectorNotFound`].
pub fn require(name: &str) -> Result<&'static SectorDef, WorldError> {
    get(name).ok_or_else(|| WorldError::SectorNotFound(name.to_owned()))
}

/// Whether a sector with this name exists.
pub fn contains(name: &str) -> bool {
    get(name).is_some()
}

/// Actions permitted in `name`, or `None` if the sector imposes no
/// restriction list (unregistered sectors).
pub fn allowed_actions(name: &str) -> Option<&'static [ActionKind]> {
    get(name).map(|s| s.actions)
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
    fn default_sectors_are_registered() {
        let names: Vec<&str> = list().iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Mostek", "AIRI", "Sektor A-1"]);
        assert!(contains("Sektor A-1"));
        assert!(!contains("NoSuchPlace"));
    }

    #[test]
    fn home_sector_allows_every_action() {
        let home = require(HOME_SECTOR).unwrap();
        for kind in ActionKind::ALL {
            assert!(home.allows(kind));
        }
        assert_eq!(home.tags, &["core"]);
    }

    #[test]
    fn field_sector_forbids_claims() {
        let field = require("Sektor A-1").unwrap();
        assert!(field.allows(ActionKind::Tick));
        assert!(field.allows(ActionKind::Move));
        assert!(!field.allows(ActionKind::Claim));
        assert_eq!(
            allowed_actions("Sektor A-1"),
            Some(&[ActionKind::Tick, ActionKind::Move][..])
        );
    }

    #[test]
    fn unknown_sector_has_no_restrictions_and_fails_require() {
        assert!(allowed_actions("Void").is_none());
        assert!(matches!(require("Void"), Err(WorldError::SectorNotFound(name)) if name == "Void"));
    }
}
