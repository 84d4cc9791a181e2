//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use keytally::prelude::*;
//! ```

// Core
pub use crate::core::config::{Config, RenderConfig};
pub use crate::core::errors::{Result, TallyError};

// Store
pub use crate::store::codec::{load, save};
pub use crate::store::{Record, RecordStore};

// Tally
pub use crate::tally::{Mode, SessionOutcome, Sign, TallyModel, Transition, render, update};

// Logging
pub use crate::logger::{JsonlWriter, LogEntry};
