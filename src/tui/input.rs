//! Input routing for the interactive tally screen.
//!
//! Terminal key events resolve to an [`InputAction`] with deterministic
//! precedence: session keys (Ctrl-C, Ctrl-D) first, then the help overlay,
//! then plain characters fed to the tally machine.

#![allow(missing_docs)]

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::tally::model::{CANCEL, COMMIT};

/// Key that toggles the help overlay while in normal mode.
pub const HELP_KEY: char = '?';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputContext {
    /// Help overlay currently shown.
    pub help_open: bool,
    /// Tally machine in normal mode (no entry in progress).
    pub normal_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Leave without saving.
    Abort,
    /// Save the store and leave.
    SaveAndQuit,
    ToggleHelp,
    /// Pass the character to the tally machine.
    Feed(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpBinding {
    pub keys: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextualHelp {
    pub title: &'static str,
    pub hint: &'static str,
    pub bindings: Vec<HelpBinding>,
}

/// Resolve a key event against the current context. `None` leaves the key
/// unhandled.
#[must_use]
pub fn resolve_key_event(key: &KeyEvent, context: InputContext) -> Option<InputAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(InputAction::Abort),
            KeyCode::Char('d') => Some(InputAction::SaveAndQuit),
            _ => None,
        };
    }
    if context.help_open {
        // Any key dismisses the overlay and goes no further.
        return Some(InputAction::ToggleHelp);
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        return None;
    }

    match key.code {
        KeyCode::Char(HELP_KEY) if context.normal_mode => Some(InputAction::ToggleHelp),
        KeyCode::Char(c) => Some(InputAction::Feed(c)),
        KeyCode::Esc => Some(InputAction::Feed(CANCEL)),
        KeyCode::Enter => Some(InputAction::Feed(COMMIT)),
        _ => None,
    }
}

/// Help entries for the overlay.
#[must_use]
pub fn contextual_help(context: InputContext) -> ContextualHelp {
    let hint = if context.normal_mode {
        "Each keystroke adds one to that key's count."
    } else {
        "Finish or abandon the entry in progress."
    };
    ContextualHelp {
        title: "keytally help",
        hint,
        bindings: vec![
            HelpBinding {
                keys: "<key>",
                description: "Count the key and select it",
            },
            HelpBinding {
                keys: "=",
                description: "Relabel the selected key",
            },
            HelpBinding {
                keys: "+ / -",
                description: "Add to or subtract from the selected key",
            },
            HelpBinding {
                keys: "Enter",
                description: "Commit the label or amount",
            },
            HelpBinding {
                keys: "Esc",
                description: "Cancel the entry in progress",
            },
            HelpBinding {
                keys: "?",
                description: "Toggle this help",
            },
            HelpBinding {
                keys: "Ctrl-D",
                description: "Save and quit",
            },
            HelpBinding {
                keys: "Ctrl-C",
                description: "Quit without saving",
            },
        ],
    }
}
