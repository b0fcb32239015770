//! Per-profile file layout.
//!
//! Each profile owns one directory under `<data_dir>/profiles/`:
//!
//! ```text
//! <data_dir>/profiles/<profile>/game_state.json
//! <data_dir>/profiles/<profile>/logbook.jsonl
//! <data_dir>/profiles/<profile>/config.yaml
//! ```

use std::path::{Path, PathBuf};

use crate::error::EventsError;

/// Longest accepted profile name.
pub const MAX_PROFILE_NAME_LEN: usize = 64;

/// File name of the primary save.
pub const STATE_FILE: &str = "game_state.json";

/// File name of the append-only log.
pub const LOGBOOK_FILE: &str = "logbook.jsonl";

/// File name of the per-profile config overrides.
pub const CONFIG_FILE: &str = "config.yaml";

/// Check that `name` is `[A-Za-z0-9_-]{1,64}`.
pub fn validate_profile_name(name: &str) -> Result<(), EventsError> {
    let ok = !name.is_empty()
        && name.len() <= MAX_PROFILE_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(EventsError::InvalidProfile(name.to_owned()))
    }
}

/// Resolved file paths of one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePaths {
    name: String,
    dir: PathBuf,
}

impl ProfilePaths {
    /// Resolve the layout of `profile` under `data_dir`.
    pub fn new(data_dir: &Path, profile: &str) -> Result<Self, EventsError> {
        validate_profile_name(profile)?;
        Ok(Self {
            name: profile.to_owned(),
            dir: data_dir.join("profiles").join(profile),
        })
    }

    /// Profile name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Profile directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Primary save file.
    pub fn state_file(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    /// Append-only logbook.
    pub fn logbook_file(&self) -> PathBuf {
        self.dir.join(LOGBOOK_FILE)
    }

    /// Per-profile config overrides.
    pub fn config_file(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
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
    fn layout_under_profiles_dir() {
        let paths = ProfilePaths::new(Path::new("data"), "offline").unwrap();
        assert_eq!(paths.name(), "offline");
        assert_eq!(paths.dir(), Path::new("data/profiles/offline"));
        assert_eq!(
            paths.state_file(),
            PathBuf::from("data/profiles/offline/game_state.json")
        );
        assert_eq!(
            paths.logbook_file(),
            PathBuf::from("data/profiles/offline/logbook.jsonl")
        );
        assert_eq!(
            paths.config_file(),
            PathBuf::from("data/profiles/offline/config.yaml")
        );
    }

    #[test]
    fn rejects_names_that_escape_the_directory() {
        for bad in ["", "..", "a/b", "a\\b", "sp ace", "ź"] {
            assert!(
                matches!(validate_profile_name(bad), Err(EventsError::InvalidProfile(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(validate_profile_name(&"p".repeat(65)).is_err());
        assert!(validate_profile_name("player_1-test").is_ok());
    }
}
