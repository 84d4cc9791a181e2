#![forbid(unsafe_code)]

//! keytally: count keystrokes per key, relabel keys, adjust counts by hand,
//! and keep the tally in a JSON file between sessions.
//!
//! The core is a pure modal input machine:
//! 1. **Record store** ([`store`]): one record per key, saturating counts
//! 2. **Tally machine** ([`tally`]): normal, relabel and number entry modes
//! 3. **Codec** ([`store::codec`]): JSON load and atomic save
//!
//! # Library usage
//!
//! ```rust,no_run
//! use keytally::prelude::*;
//!
//! let mut model = TallyModel::default();
//! for c in "aaa+5\r".chars() {
//!     update(&mut model, c);
//! }
//! print!("{}", render(&model, &RenderConfig::default()));
//! ```

pub mod prelude;

pub mod core;
pub mod logger;
pub mod store;
pub mod tally;
#[cfg(feature = "tui")]
pub mod tui;
