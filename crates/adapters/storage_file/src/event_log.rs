//! CSV implementation of the durable event log.
//!
//! [`CsvEventLog`] is both an [`Observer`] (appending one row per
//! state-changing command) and an [`EventLog`] (reading rows back for the
//! report engine).

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};
use smarthub_app::ports::{EventLog, Observer};
use smarthub_domain::error::SmartHubError;
use smarthub_domain::event::{Event, LogRecord};
use smarthub_domain::id::DeviceId;

use crate::error::StorageError;

pub const HEADER: &str = "timestamp,device_id,command,state_before,state_after";
const COLUMNS: usize = 5;

/// Append-only CSV log of state changes.
///
/// Writes are serialized behind an internal mutex, independently of any
/// locking done by the caller. The header is written once, when the file is
/// new or empty.
#[derive(Debug)]
pub struct CsvEventLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvEventLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, creating the file (and its directories) if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the file cannot be written.
    pub fn append(&self, record: &LogRecord) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(StorageError::io(parent))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(StorageError::io(&self.path))?;
        let is_empty = file.metadata().map_err(StorageError::io(&self.path))?.len() == 0;

        let mut buffer = String::new();
        if is_empty {
            buffer.push_str(HEADER);
            buffer.push('\n');
        }
        buffer.push_str(&encode_row(record));
        buffer.push('\n');
        file.write_all(buffer.as_bytes())
            .map_err(StorageError::io(&self.path))
    }

    fn read(&self) -> Result<Vec<LogRecord>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StorageError::io(&self.path)(err)),
        };

        let mut records = Vec::new();
        for (index, row) in split_rows(&text).into_iter().enumerate() {
            if row.len() == 1 && row[0].is_empty() {
                continue;
            }
            if index == 0 && row.join(",") == HEADER {
                continue;
            }
            match decode_row(&row) {
                Ok(record) => records.push(record),
                Err(reason) => tracing::warn!(
                    path = %self.path.display(),
                    row = index + 1,
                    reason = %reason,
                    "skipping malformed event log row"
                ),
            }
        }
        Ok(records)
    }
}

impl Observer for CsvEventLog {
    fn name(&self) -> &str {
        "csv-log"
    }

    fn notify(&self, event: &Event) -> Result<(), SmartHubError> {
        if let Some(record) = event.to_log_record() {
            self.append(&record)?;
        }
        Ok(())
    }
}

impl EventLog for CsvEventLog {
    fn read_all(&self) -> Result<Vec<LogRecord>, SmartHubError> {
        Ok(self.read()?)
    }
}

fn encode_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn encode_row(record: &LogRecord) -> String {
    let timestamp = record.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true);
    [
        timestamp.as_str(),
        record.device_id.as_str(),
        record.command.as_str(),
        record.state_before.as_str(),
        record.state_after.as_str(),
    ]
    .map(encode_field)
    .join(",")
}

fn decode_row(row: &[String]) -> Result<LogRecord, String> {
    let [timestamp, device_id, command, before, after] = row else {
        return Err(format!("expected {COLUMNS} columns, found {}", row.len()));
    };
    let timestamp = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|err| format!("invalid timestamp {timestamp:?}: {err}"))?
        .with_timezone(&Utc);
    if device_id.is_empty() || command.is_empty() {
        return Err("empty device id or command".to_string());
    }
    Ok(LogRecord {
        timestamp,
        device_id: DeviceId::new(device_id.clone()),
        command: command.clone(),
        state_before: before.clone(),
        state_after: after.clone(),
    })
}

/// Split CSV text into rows of unquoted fields. Quoted fields may contain
/// commas, doubled quotes and line breaks.
fn split_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}
