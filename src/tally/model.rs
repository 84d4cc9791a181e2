//! Explicit state for the tally input machine.
//!
//! All session state lives in [`TallyModel`]: the record store, the input
//! mode with its pending buffer, and the selected key. Characters are applied
//! by [`super::update::update`], which reports what happened as a
//! [`Transition`].
//!
//! **Design invariant:** no I/O happens here.

use unicode_general_category::{GeneralCategory, get_general_category};

use crate::store::{Record, RecordStore};

/// Escape: abandon the entry in progress.
pub const CANCEL: char = '\u{1b}';
/// Carriage return: commit the entry in progress.
pub const COMMIT: char = '\r';
/// Start relabeling the selected key.
pub const RELABEL_START: char = '=';
/// Start an addition to the selected key.
pub const ADD_START: char = '+';
/// Start a subtraction from the selected key.
pub const SUBTRACT_START: char = '-';

/// Direction of a numeric adjustment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sign {
    /// Amount is added to the count.
    #[default]
    Add,
    /// Amount is subtracted, clamping at zero.
    Subtract,
}

impl Sign {
    /// Operator shown in the entry header.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
        }
    }
}

/// Input mode with its pending text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Mode {
    /// Keystrokes count toward their key.
    #[default]
    Normal,
    /// Typing a new label for the selected key.
    RelabelEntry {
        /// Label typed so far.
        buffer: String,
    },
    /// Typing an amount to add to or subtract from the selected key.
    NumberEntry {
        /// Digits typed so far.
        buffer: String,
        /// Direction applied on commit.
        sign: Sign,
    },
}

/// Effect of one input character. `count` fields carry the key's count after
/// the transition.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Not handled by the core.
    Ignored,
    /// Key counted once and selected.
    Counted { key: char, count: u64 },
    /// Relabel entry opened for the selected key.
    RelabelStarted { key: char },
    /// Number entry opened (or restarted) for the selected key.
    NumberStarted { key: char, sign: Sign },
    /// Character appended to the pending buffer.
    BufferEdited,
    /// New label applied and the selecting keystroke undone.
    RelabelCommitted { key: char, label: String, count: u64 },
    /// Relabel abandoned; the selecting keystroke undone.
    RelabelCancelled { key: char, count: u64 },
    /// Amount applied after undoing the selecting keystroke.
    AdjustCommitted {
        key: char,
        sign: Sign,
        amount: u64,
        count: u64,
    },
    /// Buffer was not a number; nothing applied.
    AdjustDiscarded { key: char, buffer: String },
    /// Number entry abandoned; counts untouched.
    NumberCancelled,
}

/// Complete state of a tally session.
#[derive(Debug, Clone, Default)]
pub struct TallyModel {
    /// All records of the session.
    pub store: RecordStore,
    /// Current input mode.
    pub mode: Mode,
    /// Key most recently counted; target of relabel and number entry.
    pub selected: Option<char>,
}

impl TallyModel {
    /// Session over an existing store, in normal mode with nothing selected.
    #[must_use]
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            mode: Mode::Normal,
            selected: None,
        }
    }

    /// Record for the selected key, if any.
    #[must_use]
    pub fn selected_record(&self) -> Option<&Record> {
        self.selected.and_then(|key| self.store.get(key))
    }

    /// No entry in progress.
    #[must_use]
    pub fn is_normal(&self) -> bool {
        matches!(self.mode, Mode::Normal)
    }

    /// Count for `key`, zero when the key has no record.
    #[must_use]
    pub fn count_of(&self, key: char) -> u64 {
        self.store.get(key).map_or(0, |r| r.count)
    }
}

/// Whether a character can be tallied or typed into a buffer.
///
/// Letters, marks, numbers, punctuation, symbols and the ASCII space.
/// Other separators, control, format, private-use and unassigned code points
/// are not printable.
#[must_use]
pub fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    !matches!(
        get_general_category(c),
        GeneralCategory::SpaceSeparator
            | GeneralCategory::LineSeparator
            | GeneralCategory::ParagraphSeparator
            | GeneralCategory::Control
            | GeneralCategory::Format
            | GeneralCategory::PrivateUse
            | GeneralCategory::Unassigned
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_starts_normal_without_selection() {
        let model = TallyModel::default();
        assert!(model.is_normal());
        assert!(model.selected.is_none());
        assert!(model.selected_record().is_none());
        assert!(model.store.is_empty());
    }

    #[test]
    fn printable_classification() {
        assert!(is_printable('a'));
        assert!(is_printable(' '));
        assert!(is_printable('?'));
        assert!(is_printable('ß'));
        assert!(!is_printable('\t'));
        assert!(!is_printable('\n'));
        assert!(!is_printable(CANCEL));
        assert!(!is_printable(COMMIT));
        assert!(!is_printable('\u{a0}'));
        assert!(!is_printable('\u{2028}'));
    }

    #[test]
    fn invisible_code_points_are_not_printable() {
        for c in ['\u{200b}', '\u{ad}', '\u{feff}', '\u{e000}', '\u{10ffff}'] {
            assert!(!is_printable(c), "{c:?}");
        }
        assert!(is_printable('\u{301}'), "combining marks print");
        assert!(is_printable('€'));
        assert!(is_printable('٣'));
    }

    #[test]
    fn sign_symbols() {
        assert_eq!(Sign::Add.symbol(), '+');
        assert_eq!(Sign::Subtract.symbol(), '-');
    }
}
