//! Append-only JSONL activity log with graceful degradation.

pub mod jsonl;

pub use jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};
