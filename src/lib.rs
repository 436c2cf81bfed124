/// The clock data model.
pub mod clock;
/// The clock state machine.
pub mod engine;
/// The error types.
pub mod error;

/// The control loop driving the engine.
pub mod control;
/// Input dispatching.
pub mod input;
/// Persisted preferences and time control selection.
pub mod prefs;
/// Sound and warning settings.
pub mod settings;
/// Sound cues.
pub mod sound;

/// The console components.
pub mod console;

#[cfg(test)]
mod tests;
