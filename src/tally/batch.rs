//! Non-interactive input: a whole keystroke stream applied in one pass.
//!
//! Used when stdin is not a terminal. Line feeds stand in for the Enter key,
//! ETX (Ctrl-C) stops without saving and EOT (Ctrl-D) or end of input stops
//! with a save.

use super::model::{COMMIT, TallyModel, Transition};
use super::update::update;

/// End-of-input marker that abandons the session.
pub const ABORT: char = '\u{3}';
/// End-of-input marker that saves the session.
pub const FINISH: char = '\u{4}';

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Persist the store.
    Save,
    /// Leave the saved file untouched.
    Abort,
}

/// Feed `input` through the machine, calling `observe` with every transition.
pub fn feed_batch(
    model: &mut TallyModel,
    input: &str,
    mut observe: impl FnMut(&Transition),
) -> SessionOutcome {
    for c in input.chars() {
        let c = match c {
            ABORT => return SessionOutcome::Abort,
            FINISH => return SessionOutcome::Save,
            '\n' => COMMIT,
            other => other,
        };
        let transition = update(model, c);
        observe(&transition);
    }
    SessionOutcome::Save
}
