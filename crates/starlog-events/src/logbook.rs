//! The append-only logbook of one profile.
//!
//! Lines are only ever appended. Each append call writes its lines with a
//! single `write_all` on a file opened in append mode; the engine does not
//! lock across processes, so callers serialize writers per profile.
//!
//! A crash mid-append can leave a final fragment without a newline. The next
//! append terminates that fragment first, so it stays a single skipped line
//! and the new records land on lines of their own.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use starlog_types::{Action, GameEvent, GameState};
use tracing::debug;

use crate::error::EventsError;
use crate::profile::ProfilePaths;
use crate::record::{self, EventRecord, ParsedLine};

/// Whether the file is non-empty and its last byte is not a newline.
fn ends_with_torn_line(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0_u8; 1];
    file.read_exact(&mut last)?;
    Ok(last != [b'\n'])
}

/// Handle on a logbook file.
#[derive(Debug, Clone)]
pub struct Logbook {
    path: PathBuf,
}

impl Logbook {
    /// Logbook backed by the file at `path`.
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Logbook of a profile.
    pub fn for_profile(paths: &ProfilePaths) -> Self {
        Self::new(paths.logbook_file())
    }

    /// Path of the logbook file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append_lines(&self, lines: &[String]) -> Result<(), EventsError> {
        if lines.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| EventsError::io(parent, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| EventsError::io(&self.path, e))?;

        let mut buf = String::new();
        if ends_with_torn_line(&mut file).map_err(|e| EventsError::io(&self.path, e))? {
            debug!(path = %self.path.display(), "Terminating torn last line");
            buf.push('\n');
        }
        for line in lines {
            buf.push_str(line);
            buf.push('\n');
        }
        file.write_all(buf.as_bytes())
            .map_err(|e| EventsError::io(&self.path, e))?;
        file.flush().map_err(|e| EventsError::io(&self.path, e))
    }

    /// Append one command line.
    pub fn append_command(&self, action: &Action) -> Result<(), EventsError> {
        self.append_lines(&[record::encode_command(action)?])
    }

    /// Append one line per domain event, in order.
    pub fn append_events(&self, events: &[GameEvent]) -> Result<(), EventsError> {
        let lines = events
            .iter()
            .map(record::encode_event)
            .collect::<Result<Vec<_>, _>>()?;
        self.append_lines(&lines)
    }

    /// Append a raw event record, such as an external signal.
    pub fn append_event_record(&self, event: &EventRecord) -> Result<(), EventsError> {
        self.append_lines(&[record::encode_event_record(event)?])
    }

    /// Append a full-state checkpoint.
    pub fn append_snapshot(&self, state: &GameState) -> Result<(), EventsError> {
        self.append_lines(&[record::encode_snapshot(state)?])?;
        debug!(path = %self.path.display(), day = state.day, "Appended snapshot");
        Ok(())
    }

    /// Read every line. A missing file reads as empty.
    ///
    /// Lines that are not valid UTF-8 or not valid records come back as
    /// [`ParsedLine::Skipped`]; blank lines are dropped.
    pub fn read(&self) -> Result<Vec<ParsedLine>, EventsError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(EventsError::io(&self.path, err)),
        };
        Ok(bytes
            .split(|b| *b == b'\n')
            .zip(1_usize..)
            .filter_map(|(raw, line_no)| match std::str::from_utf8(raw) {
                Ok(text) => record::parse_line(line_no, text),
                Err(err) => Some(ParsedLine::Skipped {
                    line: line_no,
                    reason: format!("invalid UTF-8: {err}"),
                }),
            })
            .collect())
    }
}
