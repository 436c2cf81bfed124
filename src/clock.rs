/// Time controls and their presets.
pub mod time_control;

pub use time_control::*;

use std::fmt;

/// The side of a player.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Side {
    First,
    Second,
}

impl Side {
    /// Both sides, in turn order.
    pub const BOTH: [Side; 2] = [Side::First, Side::Second];

    /// Returns the opposite side.
    pub fn opposite(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    /// Returns the ordinal of the side, 0 for `First` and 1 for `Second`.
    pub fn ord(self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }

    /// Returns the player number of the side, 1 for `First` and 2 for `Second`.
    pub fn number(self) -> u8 {
        self.ord() as u8 + 1
    }

    /// Returns the side with a player number, if any.
    pub fn from_number(n: u8) -> Option<Side> {
        match n {
            1 => Some(Side::First),
            2 => Some(Side::Second),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Side::First => "Player 1",
            Side::Second => "Player 2",
        }
        .fmt(f)
    }
}

/// The countdown clock of one player.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PlayerClock {
    initial_ms: u64,
    remaining_ms: u64,
    increment_ms: u64,
    running: bool,
}

impl PlayerClock {
    /// Constructs a stopped clock with full time from a time control.
    pub fn new(tc: TimeControl) -> PlayerClock {
        let initial_ms = tc.initial_ms();
        PlayerClock {
            initial_ms,
            remaining_ms: initial_ms,
            increment_ms: tc.increment_ms(),
            running: false,
        }
    }

    /// Returns the time allotted at the start of the time control.
    pub fn initial_ms(&self) -> u64 {
        self.initial_ms
    }

    /// Returns the time left on the clock.
    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    /// Returns the time added each time the owner completes a turn.
    pub fn increment_ms(&self) -> u64 {
        self.increment_ms
    }

    /// Returns `true` if the clock is counting down.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns `true` if the clock has no time left.
    pub fn is_expired(&self) -> bool {
        self.remaining_ms == 0
    }

    /// Returns `true` if the remaining time is strictly below the threshold.
    pub fn is_low_time(&self, threshold_ms: u64) -> bool {
        self.remaining_ms < threshold_ms
    }

    pub(crate) fn configure(&mut self, tc: TimeControl) {
        *self = PlayerClock::new(tc);
    }

    pub(crate) fn restore(&mut self) {
        self.remaining_ms = self.initial_ms;
        self.running = false;
    }

    pub(crate) fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub(crate) fn add_increment(&mut self) {
        self.remaining_ms = self.remaining_ms.saturating_add(self.increment_ms);
    }

    /// Decrements the clock, flooring at zero. Returns the time actually taken.
    pub(crate) fn consume(&mut self, elapsed_ms: u64) -> u64 {
        let taken = elapsed_ms.min(self.remaining_ms);
        self.remaining_ms -= taken;
        taken
    }
}

/// The state of a game: two clocks and the player whose clock is running.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GameState {
    clocks: [PlayerClock; 2],
    active_player: Option<Side>,
}

impl GameState {
    /// Constructs an idle state with both clocks set from a time control.
    pub fn new(tc: TimeControl) -> GameState {
        GameState {
            clocks: [PlayerClock::new(tc); 2],
            active_player: None,
        }
    }

    /// Returns the clock of a side.
    pub fn clock(&self, side: Side) -> &PlayerClock {
        &self.clocks[side.ord()]
    }

    pub(crate) fn clock_mut(&mut self, side: Side) -> &mut PlayerClock {
        &mut self.clocks[side.ord()]
    }

    /// Returns both clocks, first then second.
    pub fn clocks(&self) -> &[PlayerClock; 2] {
        &self.clocks
    }

    /// Returns the side whose clock is running, or `None` when idle.
    pub fn active_player(&self) -> Option<Side> {
        self.active_player
    }

    pub(crate) fn set_active_player(&mut self, side: Option<Side>) {
        self.active_player = side;
        for s in Side::BOTH {
            self.clocks[s.ord()].set_running(side == Some(s));
        }
    }

    /// Returns `true` if a game is in progress.
    pub fn is_active(&self) -> bool {
        self.active_player.is_some()
    }

    /// Returns the running clock together with its owner, if any.
    pub fn running_clock(&self) -> Option<(Side, &PlayerClock)> {
        self.active_player.map(|s| (s, self.clock(s)))
    }

    /// Checks that the running flags agree with the active player.
    ///
    /// Returns a description of the first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        let running: Vec<Side> = Side::BOTH
            .into_iter()
            .filter(|&s| self.clock(s).is_running())
            .collect();
        match (self.active_player, running.as_slice()) {
            (None, []) => Ok(()),
            (Some(a), [r]) if a == *r => Ok(()),
            (active, running) => Err(format!(
                "active player {:?} disagrees with running clocks {:?}",
                active, running
            )),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new(TimeControl::default())
    }
}

/// A duration in milliseconds displayed as `m:ss.t`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Millis(pub u64);

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.0 / 1000;
        let tenths = self.0 % 1000 / 100;
        write!(f, "{}:{:02}.{}", total_secs / 60, total_secs % 60, tenths)
    }
}
