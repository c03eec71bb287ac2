use packet_rush_core::{Command, JunctionId, Phase};

/// Key press captured by a backend, independent of its input library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyPress {
    /// Printable character key.
    Char(char),
    /// Space bar.
    Space,
    /// Enter or return.
    Enter,
    /// Escape.
    Escape,
    /// Ctrl-C.
    Interrupt,
}

/// Translates a key press into the command it requests in the given phase.
///
/// `r` restarts after a game over and advances after a completed level; in
/// other phases it does nothing. Any other character switches the junction
/// bound to it.
#[must_use]
pub fn command_for_key(key: KeyPress, phase: Phase) -> Option<Command> {
    match key {
        KeyPress::Escape | KeyPress::Interrupt => Some(Command::Quit),
        KeyPress::Space => Some(Command::TogglePause),
        KeyPress::Enter => advance(phase),
        KeyPress::Char(symbol) => match symbol.to_ascii_lowercase() {
            'q' => Some(Command::Quit),
            ' ' => Some(Command::TogglePause),
            'r' => match phase {
                Phase::GameOver => Some(Command::Restart),
                Phase::LevelComplete => Some(Command::AdvanceLevel),
                Phase::Playing | Phase::Paused => None,
            },
            'n' if phase == Phase::LevelComplete => Some(Command::AdvanceLevel),
            key if key.is_ascii_alphanumeric() => Some(Command::SwitchJunction {
                id: JunctionId::new(key),
            }),
            _ => None,
        },
    }
}

fn advance(phase: Phase) -> Option<Command> {
    (phase == Phase::LevelComplete).then_some(Command::AdvanceLevel)
}
