//! JSONL activity log: append-only line-delimited JSON of session events.
//!
//! Each line is a self-contained JSON object written with a single
//! `write_all`, so a log tailed by another process never shows half a line.
//!
//! Degradation chain:
//! 1. Primary file path
//! 2. Fallback path, when configured
//! 3. Silent discard
//!
//! The writer never prints to the terminal: while the tally screen is in raw
//! mode any stray output would corrupt it. Logging failures never affect
//! counting or saving.

#![allow(missing_docs)]

use std::fs::{self, File, OpenOptions, rename};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::config::LogConfig;
use crate::core::errors::{Result, TallyError};
use crate::tally::model::{Sign, Transition};

/// Severity level for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Session event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SessionStart,
    StoreLoaded,
    KeySeeded,
    Relabel,
    RelabelCancelled,
    Adjust,
    AdjustDiscarded,
    StoreSaved,
    SessionAbort,
    Error,
}

/// A single JSONL log entry; all fields optional except `ts`, `event`, `severity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO 8601 UTC timestamp.
    pub ts: String,
    pub event: EventType,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Count after the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Signed adjustment applied by the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<i128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Number of records involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl LogEntry {
    /// Create a new entry stamped with the current UTC time.
    pub fn new(event: EventType, severity: Severity) -> Self {
        Self {
            ts: format_utc_now(),
            event,
            severity,
            key: None,
            label: None,
            count: None,
            delta: None,
            path: None,
            records: None,
            error_code: None,
            error_message: None,
            details: None,
        }
    }

    /// Entry describing a store-changing transition. `None` for transitions
    /// that are not worth logging (plain counts, buffer edits, mode switches).
    pub fn from_transition(transition: &Transition) -> Option<Self> {
        let entry = match transition {
            Transition::RelabelCommitted { key, label, count } => {
                let mut e = Self::new(EventType::Relabel, Severity::Info);
                e.key = Some(*key);
                e.label = Some(label.clone());
                e.count = Some(*count);
                e
            }
            Transition::RelabelCancelled { key, count } => {
                let mut e = Self::new(EventType::RelabelCancelled, Severity::Info);
                e.key = Some(*key);
                e.count = Some(*count);
                e
            }
            Transition::AdjustCommitted {
                key,
                sign,
                amount,
                count,
            } => {
                let mut e = Self::new(EventType::Adjust, Severity::Info);
                e.key = Some(*key);
                e.count = Some(*count);
                e.delta = Some(match sign {
                    Sign::Add => i128::from(*amount),
                    Sign::Subtract => -i128::from(*amount),
                });
                e
            }
            Transition::AdjustDiscarded { key, buffer } => {
                let mut e = Self::new(EventType::AdjustDiscarded, Severity::Warning);
                e.key = Some(*key);
                e.details = Some(format!("unparsable amount {buffer:?}"));
                e
            }
            _ => return None,
        };
        Some(entry)
    }

    /// Entry for a load or save failure.
    pub fn from_error(error: &TallyError) -> Self {
        let mut e = Self::new(EventType::Error, Severity::Critical);
        e.error_code = Some(error.code().to_string());
        e.error_message = Some(error.to_string());
        e
    }

    #[must_use]
    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.display().to_string());
        self
    }

    #[must_use]
    pub fn with_records(mut self, records: usize) -> Self {
        self.records = Some(records);
        self
    }

    #[must_use]
    pub fn with_key(mut self, key: char, label: &str) -> Self {
        self.key = Some(key);
        self.label = Some(label.to_string());
        self
    }
}

/// Degradation state of the JSONL writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    /// Writing to primary path.
    Normal,
    /// Primary failed, writing to fallback path.
    Fallback,
    /// Nothing writable (or logging disabled); entries are dropped.
    Discard,
}

/// Configuration for the JSONL writer.
#[derive(Debug, Clone)]
pub struct JsonlConfig {
    /// Primary log file path. `None` disables logging.
    pub path: Option<PathBuf>,
    /// Optional fallback path.
    pub fallback_path: Option<PathBuf>,
    /// Maximum file size before rotation (bytes).
    pub max_size_bytes: u64,
    /// Number of rotated files to keep.
    pub max_rotated_files: u32,
}

impl From<&LogConfig> for JsonlConfig {
    fn from(config: &LogConfig) -> Self {
        Self {
            path: config.activity_file.clone(),
            fallback_path: config.fallback_file.clone(),
            max_size_bytes: config.max_size_bytes,
            max_rotated_files: config.max_rotated_files,
        }
    }
}

/// Append-only JSONL log writer with rotation and fallback.
pub struct JsonlWriter {
    config: JsonlConfig,
    writer: Option<BufWriter<File>>,
    state: WriterState,
    bytes_written: u64,
}

impl JsonlWriter {
    /// Open the log. Falls through the degradation chain on failure.
    pub fn open(config: JsonlConfig) -> Self {
        let mut w = Self {
            config,
            writer: None,
            state: WriterState::Discard,
            bytes_written: 0,
        };
        w.try_open_primary();
        w
    }

    /// A writer that drops every entry.
    pub fn disabled() -> Self {
        Self::open(JsonlConfig {
            path: None,
            fallback_path: None,
            max_size_bytes: u64::MAX,
            max_rotated_files: 1,
        })
    }

    /// Write a single log entry as one JSONL line.
    pub fn write_entry(&mut self, entry: &LogEntry) {
        if self.state == WriterState::Discard {
            return;
        }
        let Ok(json) = serde_json::to_string(entry) else {
            return;
        };
        self.write_line(&format!("{json}\n"));
    }

    /// Log the transition if it changed the store in a noteworthy way.
    pub fn record_transition(&mut self, transition: &Transition) {
        if let Some(entry) = LogEntry::from_transition(transition) {
            self.write_entry(&entry);
        }
    }

    /// Flush buffers and sync to disk.
    pub fn flush(&mut self) {
        if let Some(w) = self.writer.as_mut() {
            let _ = w.flush();
            let _ = w.get_ref().sync_data();
        }
    }

    /// Current degradation state.
    pub fn state(&self) -> &str {
        match self.state {
            WriterState::Normal => "normal",
            WriterState::Fallback => "fallback",
            WriterState::Discard => "discard",
        }
    }

    // ──────────────────────── internals ────────────────────────

    fn write_line(&mut self, line: &str) {
        if self.bytes_written + line.len() as u64 > self.config.max_size_bytes {
            self.rotate();
        }

        let Some(w) = self.writer.as_mut() else {
            self.degrade();
            return;
        };
        if w.write_all(line.as_bytes()).is_err() {
            self.degrade();
            if let Some(w) = self.writer.as_mut()
                && w.write_all(line.as_bytes()).is_ok()
            {
                self.bytes_written += line.len() as u64;
            }
            return;
        }
        self.bytes_written += line.len() as u64;
    }

    fn try_open_primary(&mut self) {
        let opened = self.config.path.as_deref().map(open_append);
        match opened {
            Some(Ok((file, size))) => {
                self.writer = Some(BufWriter::new(file));
                self.state = WriterState::Normal;
                self.bytes_written = size;
            }
            Some(Err(_)) => self.try_open_fallback(),
            None => self.state = WriterState::Discard,
        }
    }

    fn try_open_fallback(&mut self) {
        self.writer = None;
        self.state = WriterState::Discard;
        if let Some(fb) = &self.config.fallback_path
            && let Ok((file, size)) = open_append(fb)
        {
            self.writer = Some(BufWriter::new(file));
            self.state = WriterState::Fallback;
            self.bytes_written = size;
        }
    }

    fn degrade(&mut self) {
        match self.state {
            WriterState::Normal => self.try_open_fallback(),
            WriterState::Fallback | WriterState::Discard => {
                self.writer = None;
                self.state = WriterState::Discard;
            }
        }
    }

    fn active_path(&self) -> Option<&Path> {
        match self.state {
            WriterState::Normal => self.config.path.as_deref(),
            WriterState::Fallback => self.config.fallback_path.as_deref(),
            WriterState::Discard => None,
        }
    }

    fn rotate(&mut self) {
        let Some(base) = self.active_path().map(Path::to_path_buf) else {
            return;
        };
        if let Some(w) = self.writer.as_mut() {
            let _ = w.flush();
        }
        self.writer = None;

        // Shift existing rotations: .N-1→.N, …, .1→.2, current→.1
        for i in (1..self.config.max_rotated_files).rev() {
            let _ = rename(rotated_name(&base, i), rotated_name(&base, i + 1));
        }
        let _ = rename(&base, rotated_name(&base, 1));

        match open_append(&base) {
            Ok((file, _)) => {
                self.writer = Some(BufWriter::new(file));
                self.bytes_written = 0;
            }
            Err(_) => self.degrade(),
        }
    }
}

impl Drop for JsonlWriter {
    fn drop(&mut self) {
        self.flush();
    }
}

// ──────────────────────── helpers ────────────────────────

/// Open or create a file for appending. Returns `(File, current_size)`.
fn open_append(path: &Path) -> Result<(File, u64)> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| TallyError::io(parent, source))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| TallyError::io(path, source))?;
    let size = file.metadata().map(|m| m.len()).unwrap_or(0);
    Ok((file, size))
}

/// Build a rotated filename: `foo.jsonl` → `foo.jsonl.3`.
fn rotated_name(base: &Path, index: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// Format current UTC time as ISO 8601.
fn format_utc_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// ──────────────────────── tests ────────────────────────
