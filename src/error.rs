use std::io;

use thiserror::Error;

/// An error from the clock or its control loop.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ClockError {
    /// The time control cannot change while a game is in progress.
    #[error("cannot configure the time control while a game is in progress")]
    GameActive,
    /// A time control failed to parse.
    #[error("invalid time control {0}")]
    InvalidTimeControl(String),
    /// The control loop is gone.
    #[error("the clock control loop has shut down")]
    ChannelClosed,
}

/// An error loading or saving preferences.
#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("preferences I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed preferences: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no configuration directory, pass --prefs <PATH>")]
    NoConfigDir,
}
