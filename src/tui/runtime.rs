//! Interactive session loop: read keys, update the model, redraw.

#![allow(missing_docs)]

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};

use super::input::{InputAction, InputContext, contextual_help, resolve_key_event};
use super::terminal_guard::TerminalGuard;
use crate::core::config::RenderConfig;
use crate::logger::JsonlWriter;
use crate::tally::{SessionOutcome, TallyModel, render, update};

/// Screen state that lives outside the tally model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    pub help_open: bool,
}

impl SessionState {
    #[must_use]
    pub fn context(self, model: &TallyModel) -> InputContext {
        InputContext {
            help_open: self.help_open,
            normal_mode: model.is_normal(),
        }
    }

    /// Apply a resolved action. Returns the outcome once the session ends.
    pub fn apply(
        &mut self,
        model: &mut TallyModel,
        action: InputAction,
        log: &mut JsonlWriter,
    ) -> Option<SessionOutcome> {
        match action {
            InputAction::Abort => Some(SessionOutcome::Abort),
            InputAction::SaveAndQuit => Some(SessionOutcome::Save),
            InputAction::ToggleHelp => {
                self.help_open = !self.help_open;
                None
            }
            InputAction::Feed(c) => {
                let transition = update(model, c);
                log.record_transition(&transition);
                None
            }
        }
    }
}

/// Lines to draw for the current frame.
#[must_use]
pub fn frame_lines(model: &TallyModel, state: SessionState, config: &RenderConfig) -> Vec<String> {
    if !state.help_open {
        return render(model, config).lines().map(str::to_owned).collect();
    }

    let help = contextual_help(state.context(model));
    let width = help
        .bindings
        .iter()
        .map(|b| b.keys.chars().count())
        .max()
        .unwrap_or(0);
    let mut lines = vec![help.title.to_string(), String::new()];
    lines.extend(
        help.bindings
            .iter()
            .map(|b| format!("  {:<width$}  {}", b.keys, b.description)),
    );
    lines.push(String::new());
    lines.push(help.hint.to_string());
    lines.push("Press any key to return.".to_string());
    lines
}

/// Run the interactive session until the user saves or aborts.
///
/// # Errors
/// Returns I/O errors from the terminal or event layers. The terminal is
/// restored before returning either way.
pub fn run_session(
    model: &mut TallyModel,
    config: &RenderConfig,
    log: &mut JsonlWriter,
) -> io::Result<SessionOutcome> {
    let _guard = TerminalGuard::new()?;
    let mut stdout = io::stdout();
    let mut state = SessionState::default();

    draw(&mut stdout, &frame_lines(model, state, config))?;
    loop {
        match event::read()? {
            Event::Key(key) => {
                let Some(action) = resolve_key_event(&key, state.context(model)) else {
                    continue;
                };
                if let Some(outcome) = state.apply(model, action, log) {
                    return Ok(outcome);
                }
            }
            Event::Resize(..) => {}
            _ => continue,
        }
        draw(&mut stdout, &frame_lines(model, state, config))?;
    }
}

fn draw(stdout: &mut io::Stdout, lines: &[String]) -> io::Result<()> {
    let (_, rows) = TerminalGuard::terminal_size();
    queue!(stdout, MoveTo(0, 0), Clear(ClearType::All))?;
    for (row, line) in (0..rows).zip(lines) {
        queue!(stdout, MoveTo(0, row), Print(line))?;
    }
    stdout.flush()
}
