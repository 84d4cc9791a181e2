//! Interactive terminal shell around the tally machine.
//!
//! Seams: [`input`] resolves key events, [`runtime`] owns the read/update/draw
//! loop, and [`terminal_guard`] restores the terminal however the loop ends.

#![allow(missing_docs)]

pub mod input;
pub mod runtime;
pub mod terminal_guard;

pub use runtime::{SessionState, run_session};
