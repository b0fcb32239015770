//! Forward migration of saved states.
//!
//! Saves are migrated at the JSON level, before typed deserialization, so
//! that fields removed from the current schema never reach serde.
//!
//! | version | change to reach current                          |
//! |---------|--------------------------------------------------|
//! | 1       | drop `active_quests`; add `quests`, `last_seed`  |
//! | 2       | add `last_seed`                                  |
//! | 3       | current                                          |
//!
//! Any other version, including a missing one, is refused.

use serde_json::{Map, Value};
use starlog_types::SCHEMA_VERSION;
use tracing::info;

/// Errors raised while migrating a saved state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// The record declares a version this engine cannot read.
    #[error("unsupported schema_version {found} (supported: 1, 2, {current})", current = SCHEMA_VERSION)]
    UnsupportedSchemaVersion {
        /// Version found on the record. Missing or non-integer versions
        /// read as 0.
        found: i64,
    },

    /// The record is not a JSON object.
    #[error("saved state is not a JSON object")]
    NotAnObject,
}

/// Version declared by a raw record. Missing or non-integer reads as 0.
pub fn schema_version_of(raw: &Map<String, Value>) -> i64 {
    raw.get("schema_version")
        .and_then(Value::as_i64)
        .unwrap_or(0)
}

/// Bring a raw record to the current schema.
///
/// Current records are returned unchanged, so migrating twice is the same
/// as migrating once.
pub fn migrate(mut raw: Map<String, Value>) -> Result<Map<String, Value>, MigrationError> {
    let found = schema_version_of(&raw);
    match found {
        v if v == i64::from(SCHEMA_VERSION) => return Ok(raw),
        2 => {}
        1 => {
            raw.remove("active_quests");
            raw.entry("quests").or_insert_with(|| Value::Array(Vec::new()));
        }
        _ => return Err(MigrationError::UnsupportedSchemaVersion { found }),
    }
    raw.entry("last_seed").or_insert_with(|| Value::from(0));
    raw.insert("schema_version".to_owned(), Value::from(SCHEMA_VERSION));
    info!(from = found, to = SCHEMA_VERSION, "Migrated saved state");
    Ok(raw)
}

/// [`migrate`] over an arbitrary JSON value.
pub fn migrate_value(raw: Value) -> Result<Value, MigrationError> {
    match raw {
        Value::Object(map) => migrate(map).map(Value::Object),
        _ => Err(MigrationError::NotAnObject),
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
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn current_version_is_untouched() {
        let raw = object(json!({"schema_version": 3, "day": 4, "last_seed": 9}));
        assert_eq!(migrate(raw.clone()).unwrap(), raw);
    }

    #[test]
    fn v2_gains_last_seed() {
        let out = migrate(object(json!({"schema_version": 2, "day": 1}))).unwrap();
        assert_eq!(out["schema_version"], 3);
        assert_eq!(out["last_seed"], 0);
        assert_eq!(out["day"], 1);
    }

    #[test]
    fn v2_keeps_existing_last_seed() {
        let out = migrate(object(json!({"schema_version": 2, "last_seed": 77}))).unwrap();
        assert_eq!(out["last_seed"], 77);
    }

    #[test]
    fn v1_drops_active_quests_and_adds_defaults() {
        let out = migrate(object(json!({
            "schema_version": 1,
            "day": 2,
            "active_quests": ["old"]
        })))
        .unwrap();
        assert!(!out.contains_key("active_quests"));
        assert_eq!(out["quests"], json!([]));
        assert_eq!(out["last_seed"], 0);
        assert_eq!(out["schema_version"], 3);
    }

    #[test]
    fn migrating_twice_is_a_no_op() {
        for version in [1, 2, 3] {
            let once = migrate(object(json!({"schema_version": version, "active_quests": []}))).unwrap();
            let twice = migrate(once.clone()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn unknown_and_missing_versions_fail_closed() {
        assert_eq!(
            migrate(object(json!({"schema_version": 99}))),
            Err(MigrationError::UnsupportedSchemaVersion { found: 99 })
        );
        assert_eq!(
            migrate(object(json!({"day": 1}))),
            Err(MigrationError::UnsupportedSchemaVersion { found: 0 })
        );
        assert_eq!(migrate_value(json!([1, 2])), Err(MigrationError::NotAnObject));
    }
}
