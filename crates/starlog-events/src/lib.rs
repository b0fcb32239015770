//! Event-sourced persistence for Starlog profiles.
//!
//! A profile is stored as two files: a primary save (`game_state.json`)
//! and an append-only logbook (`logbook.jsonl`) of commands, events, and
//! snapshot checkpoints. The save is a cache; the logbook is the audit
//! trail from which the state can always be rebuilt.
//!
//! # Modules
//!
//! - [`profile`] -- Profile name validation and file layout
//! - [`record`] -- Logbook line format and best-effort parsing
//! - [`logbook`] -- Append-only writer and reader
//! - [`snapshot_store`] -- Save file load/store and state decoding
//! - [`migration`] -- Forward schema migration
//! - [`error`] -- Persistence errors

pub mod error;
pub mod logbook;
pub mod migration;
pub mod profile;
pub mod record;
pub mod snapshot_store;

pub use error::EventsError;
pub use logbook::Logbook;
pub use migration::{MigrationError, migrate};
pub use profile::ProfilePaths;
pub use record::{EventRecord, LogRecord, ParsedLine};
pub use snapshot_store::{SnapshotStore, decode_state};
