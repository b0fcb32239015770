//! Logbook line format.
//!
//! Every line is one JSON object discriminated by its `type` field:
//!
//! - `{"type":"command","action":"tick","seed":123}` -- a request, with its
//!   parameters flattened beside `action`
//! - `{"type":"snapshot","state":{...}}` -- a full state checkpoint
//! - anything else -- a domain event, e.g. `{"type":"tick_done","amount":1,"day":1}`
//!
//! Reading is best effort. A line that does not parse, including a torn
//! final line left by an interrupted append, becomes [`ParsedLine::Skipped`]
//! rather than an error.

use serde_json::{Map, Value};
use starlog_types::{Action, GameEvent, GameState, Parameters};

use crate::error::EventsError;
use crate::snapshot_store;

/// `type` tag of command lines.
pub const COMMAND_TYPE: &str = "command";

/// `type` tag of snapshot lines.
pub const SNAPSHOT_TYPE: &str = "snapshot";

/// An event line, kept in its raw form.
///
/// Event lines are written by the engine and by external collaborators, so
/// they are not restricted to [`GameEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// The `type` tag.
    pub event_type: String,
    /// Optional `amount` field.
    pub amount: Option<i64>,
    /// Every other field.
    pub payload: Map<String, Value>,
}

impl EventRecord {
    /// A signal event carrying only a type and an amount.
    pub fn signal(event_type: impl Into<String>, amount: i64) -> Self {
        Self {
            event_type: event_type.into(),
            amount: Some(amount),
            payload: Map::new(),
        }
    }

    fn to_object(&self) -> Map<String, Value> {
        let mut obj = Map::new();
        obj.insert("type".to_owned(), Value::from(self.event_type.as_str()));
        if let Some(amount) = self.amount {
            obj.insert("amount".to_owned(), Value::from(amount));
        }
        for (key, value) in &self.payload {
            obj.entry(key.as_str()).or_insert_with(|| value.clone());
        }
        obj
    }
}

/// One logical logbook record.
#[derive(Debug, Clone, PartialEq)]
pub enum LogRecord {
    /// A request to replay through the pipeline.
    Command {
        /// Action name as written.
        action: String,
        /// Parameters as written.
        parameters: Parameters,
    },
    /// A domain event. Replay ignores these; they are re-derived.
    Event(EventRecord),
    /// A full state checkpoint, already migrated and normalized.
    Snapshot(GameState),
}

/// Outcome of reading one line.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// The line held a well-formed record.
    Parsed(LogRecord),
    /// The line was unusable and has been dropped.
    Skipped {
        /// One-based line number in the file.
        line: usize,
        /// Why it was dropped.
        reason: String,
    },
}

/// Parse one line. Blank lines yield `None`.
pub fn parse_line(line_no: usize, line: &str) -> Option<ParsedLine> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let skipped = |reason: String| ParsedLine::Skipped {
        line: line_no,
        reason,
    };

    let mut obj = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(obj)) => obj,
        Ok(_) => return Some(skipped("not a JSON object".to_owned())),
        Err(err) => return Some(skipped(format!("invalid JSON: {err}"))),
    };
    let Some(Value::String(record_type)) = obj.remove("type") else {
        return Some(skipped("missing string `type` field".to_owned()));
    };

    let parsed = match record_type.as_str() {
        COMMAND_TYPE => {
            let Some(Value::String(action)) = obj.remove("action") else {
                return Some(skipped("command without string `action`".to_owned()));
            };
            LogRecord::Command {
                action,
                parameters: obj.into_iter().collect(),
            }
        }
        SNAPSHOT_TYPE => {
            let Some(raw) = obj.remove("state") else {
                return Some(skipped("snapshot without `state`".to_owned()));
            };
            match snapshot_store::decode_state(raw) {
                Ok(state) => LogRecord::Snapshot(state),
                Err(err) => return Some(skipped(format!("undecodable snapshot: {err}"))),
            }
        }
        _ => {
            let amount = obj.remove("amount").and_then(|v| v.as_i64());
            LogRecord::Event(EventRecord {
                event_type: record_type,
                amount,
                payload: obj,
            })
        }
    };
    Some(ParsedLine::Parsed(parsed))
}

/// Encode an action as a command line (without the trailing newline).
pub fn encode_command(action: &Action) -> Result<String, EventsError> {
    let mut obj = Map::new();
    obj.insert("type".to_owned(), Value::from(COMMAND_TYPE));
    if let Value::Object(body) = serde_json::to_value(action)? {
        obj.extend(body);
    }
    Ok(serde_json::to_string(&Value::Object(obj))?)
}

/// Encode a domain event as an event line.
pub fn encode_event(event: &GameEvent) -> Result<String, EventsError> {
    Ok(serde_json::to_string(event)?)
}

/// Encode a raw event record as an event line.
pub fn encode_event_record(record: &EventRecord) -> Result<String, EventsError> {
    Ok(serde_json::to_string(&Value::Object(record.to_object()))?)
}

/// Encode a snapshot line.
pub fn encode_snapshot(state: &GameState) -> Result<String, EventsError> {
    let mut obj = Map::new();
    obj.insert("type".to_owned(), Value::from(SNAPSHOT_TYPE));
    obj.insert("state".to_owned(), serde_json::to_value(state)?);
    Ok(serde_json::to_string(&Value::Object(obj))?)
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

    fn parsed(line: &str) -> LogRecord {
        match parse_line(1, line) {
            Some(ParsedLine::Parsed(record)) => record,
            other => panic!("expected a record, got {other:?}"),
        }
    }

    #[test]
    fn command_line_shape() {
        let line = encode_command(&Action::Tick { seed: Some(123) }).unwrap();
        assert_eq!(line, r#"{"type":"command","action":"tick","seed":123}"#);
        let record = parsed(&line);
        assert_eq!(
            record,
            LogRecord::Command {
                action: "tick".to_owned(),
                parameters: [("seed".to_owned(), Value::from(123))].into_iter().collect(),
            }
        );
    }

    #[test]
    fn event_lines_keep_type_amount_and_payload() {
        let line = encode_event(&GameEvent::TickDone { amount: 1, day: 1 }).unwrap();
        assert_eq!(line, r#"{"type":"tick_done","amount":1,"day":1}"#);
        let LogRecord::Event(event) = parsed(&line) else {
            panic!("expected event");
        };
        assert_eq!(event.event_type, "tick_done");
        assert_eq!(event.amount, Some(1));
        assert_eq!(event.payload["day"], 1);
    }

    #[test]
    fn signal_record_round_trips_through_a_line() {
        let line = encode_event_record(&EventRecord::signal("doctor_ok", 1)).unwrap();
        let LogRecord::Event(event) = parsed(&line) else {
            panic!("expected event");
        };
        assert_eq!(event, EventRecord::signal("doctor_ok", 1));
    }

    #[test]
    fn snapshot_line_is_decoded() {
        let state = starlog_world::default_state();
        let line = encode_snapshot(&state).unwrap();
        assert_eq!(parsed(&line), LogRecord::Snapshot(state));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        assert_eq!(parse_line(1, "   "), None);
        for bad in [
            r#"{"type":"command","action":"tick""#,
            "[1,2,3]",
            r#"{"action":"tick"}"#,
            r#"{"type":"command"}"#,
            r#"{"type":"snapshot"}"#,
            r#"{"type":"snapshot","state":{"schema_version":99}}"#,
        ] {
            assert!(
                matches!(parse_line(4, bad), Some(ParsedLine::Skipped { line: 4, .. })),
                "{bad} should be skipped"
            );
        }
    }
}
