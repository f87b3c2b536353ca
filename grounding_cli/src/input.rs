//! Keyboard input for a running session.

use grounding_core::{Action, Progress, SessionState};

/// One line of user input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Enter / `n` / `d`: next step, next tap, or finish
    Next,
    Previous,
    Reset,
    Quit,
    /// Tap item `n` (zero-based) of the current group
    Tap(usize),
}

/// Parse a line typed at the session prompt
pub fn parse(line: &str) -> Option<Command> {
    let line = line.trim().to_lowercase();
    match line.as_str() {
        "" | "n" | "d" => Some(Command::Next),
        "p" => Some(Command::Previous),
        "r" => Some(Command::Reset),
        "q" => Some(Command::Quit),
        other => match other.parse::<usize>() {
            Ok(n) if n >= 1 => Some(Command::Tap(n - 1)),
            _ => None,
        },
    }
}

/// Map a command onto the engine action it stands for in the current state
///
/// Returns None when the command has no meaning here (e.g. a number typed on
/// a guided step).
pub fn to_action(command: Command, state: &SessionState) -> Option<Action> {
    let progress = state.progress()?;

    match command {
        Command::Quit => Some(Action::Exit),
        Command::Reset => Some(Action::Reset),
        Command::Next if state.is_terminal() => Some(Action::Complete),
        Command::Next => match progress {
            Progress::Linear { .. } => Some(Action::Advance),
            Progress::Grouped { group_progress, .. } => Some(Action::Confirm(group_progress)),
        },
        Command::Previous => match progress {
            Progress::Linear { .. } => Some(Action::Retreat),
            Progress::Grouped { .. } => None,
        },
        Command::Tap(n) => match progress {
            Progress::Grouped { .. } => Some(Action::Confirm(n)),
            Progress::Linear { .. } => None,
        },
    }
}
