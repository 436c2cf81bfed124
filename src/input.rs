use crate::clock::*;
use crate::control::Command;

/// A key on the keyboard.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Key {
    /// The space bar.
    Space,
    /// Any other character key.
    Char(char),
}

/// A raw input from the user.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Input {
    /// A key press.
    Key(Key),
    /// A pointer activation on the clock of a side.
    Pointer(Side),
}

/// Maps user input to turn switches.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct InputDispatcher {
    switch_key: Key,
}

impl InputDispatcher {
    /// Constructs a dispatcher switching turns on a key.
    pub fn new(switch_key: Key) -> InputDispatcher {
        InputDispatcher { switch_key }
    }

    /// Returns the command for an input, if any.
    ///
    /// The switch key ends the active player's turn. A pointer only does so
    /// on the active player's own clock. Nothing is dispatched while idle.
    pub fn dispatch(&self, input: Input, state: &GameState) -> Option<Command> {
        let active = state.active_player()?;
        match input {
            Input::Key(k) if k == self.switch_key => Some(Command::SwitchTurn),
            Input::Pointer(side) if side == active => Some(Command::SwitchTurn),
            _ => None,
        }
    }
}

impl Default for InputDispatcher {
    fn default() -> Self {
        InputDispatcher::new(Key::Space)
    }
}
