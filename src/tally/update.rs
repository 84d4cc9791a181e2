//! Transition function for the tally input machine.
//!
//! `update()` applies one character to the model, mutating the store where a
//! rule calls for it, and returns the resulting [`Transition`]. The keystroke
//! that selects a key has already been counted by the time relabel or number
//! entry commits, so commits (and relabel cancels) undo it with a
//! decrement of one. Cancelling number entry does not undo it and keeps the
//! selection; a commit whose buffer is not a number also skips the undo.

use std::mem;

use super::model::{
    ADD_START, CANCEL, COMMIT, Mode, RELABEL_START, SUBTRACT_START, Sign, TallyModel, Transition,
    is_printable,
};

/// Apply one input character to the model.
pub fn update(model: &mut TallyModel, c: char) -> Transition {
    match c {
        CANCEL => cancel(model),
        COMMIT => commit(model),
        RELABEL_START => start_relabel(model),
        ADD_START => start_number(model, Sign::Add),
        SUBTRACT_START => start_number(model, Sign::Subtract),
        c if is_printable(c) => printable(model, c),
        _ => Transition::Ignored,
    }
}

/// Apply every character of `input` in order.
pub fn update_all(model: &mut TallyModel, input: &str) -> Vec<Transition> {
    input.chars().map(|c| update(model, c)).collect()
}

fn cancel(model: &mut TallyModel) -> Transition {
    match mem::take(&mut model.mode) {
        Mode::Normal => Transition::Ignored,
        Mode::RelabelEntry { .. } => match model.selected.take() {
            Some(key) => {
                model.store.decrement(key, 1);
                Transition::RelabelCancelled {
                    key,
                    count: model.count_of(key),
                }
            }
            None => Transition::Ignored,
        },
        Mode::NumberEntry { .. } => Transition::NumberCancelled,
    }
}

fn commit(model: &mut TallyModel) -> Transition {
    match mem::take(&mut model.mode) {
        Mode::Normal => Transition::Ignored,
        Mode::RelabelEntry { buffer } => match model.selected.take() {
            Some(key) => {
                model.store.relabel(key, buffer.clone());
                model.store.decrement(key, 1);
                Transition::RelabelCommitted {
                    key,
                    label: buffer,
                    count: model.count_of(key),
                }
            }
            None => Transition::Ignored,
        },
        Mode::NumberEntry { buffer, sign } => {
            let Some(key) = model.selected else {
                return Transition::Ignored;
            };
            let Ok(amount) = buffer.parse::<u64>() else {
                return Transition::AdjustDiscarded { key, buffer };
            };
            model.store.decrement(key, 1);
            match sign {
                Sign::Add => model.store.increment(key, amount),
                Sign::Subtract => model.store.decrement(key, amount),
            }
            Transition::AdjustCommitted {
                key,
                sign,
                amount,
                count: model.count_of(key),
            }
        }
    }
}

fn start_relabel(model: &mut TallyModel) -> Transition {
    let Some(key) = model.selected else {
        return Transition::Ignored;
    };
    if !model.is_normal() {
        return Transition::Ignored;
    }
    model.mode = Mode::RelabelEntry {
        buffer: String::new(),
    };
    Transition::RelabelStarted { key }
}

fn start_number(model: &mut TallyModel, sign: Sign) -> Transition {
    let Some(key) = model.selected else {
        return Transition::Ignored;
    };
    if matches!(model.mode, Mode::RelabelEntry { .. }) {
        return Transition::Ignored;
    }
    model.mode = Mode::NumberEntry {
        buffer: String::new(),
        sign,
    };
    Transition::NumberStarted { key, sign }
}

fn printable(model: &mut TallyModel, c: char) -> Transition {
    match &mut model.mode {
        Mode::Normal => {}
        Mode::RelabelEntry { buffer } => {
            buffer.push(c);
            return Transition::BufferEdited;
        }
        Mode::NumberEntry { buffer, .. } if c.is_ascii_digit() => {
            buffer.push(c);
            return Transition::BufferEdited;
        }
        Mode::NumberEntry { .. } => return Transition::Ignored,
    }

    model.store.increment(c, 1);
    model.selected = Some(c);
    Transition::Counted {
        key: c,
        count: model.count_of(c),
    }
}
