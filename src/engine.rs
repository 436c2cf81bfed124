use crate::clock::*;
use crate::error::ClockError;

use log::{debug, warn};

/// The reason a game was stopped.
#[derive(displaydoc::Display, Debug, Copy, Clone, Eq, PartialEq)]
pub enum StopReason {
    /// stopped on request
    Manual,
    /// {0} ran out of time
    Expired(Side),
}

/// An event of the clock.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Event {
    /// Both clocks were set from a time control.
    Configured(TimeControl),
    /// Game started with the first player's clock running.
    Started,
    /// Turn ended by a side, whose increment has been applied.
    TurnSwitch(Side),
    /// The running clock of a side reached zero.
    Expired(Side),
    /// The remaining time of a side fell below the warning threshold.
    LowTime(Side),
    /// Game stopped with a reason.
    Stopped(StopReason),
    /// Clocks restored to their initial time.
    Reset,
    /// A command was rejected.
    Error(ClockError),
}

/// The outcome of advancing the clock.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Advance {
    /// No clock is running.
    Idle,
    /// The running clock of a side was decremented and has time left.
    Ticked(Side),
    /// The running clock of a side is at zero and the game should be stopped.
    Expired(Side),
}

/// The two-player clock state machine.
///
/// The engine is the only writer of its [`GameState`]. Every command queues
/// the events it caused, which the owner collects with [`take_events`].
/// The engine never stops itself: an [`Advance::Expired`] outcome tells the
/// caller to invoke [`stop_with`] with [`StopReason::Expired`].
///
/// [`take_events`]: ClockEngine::take_events
/// [`stop_with`]: ClockEngine::stop_with
#[derive(Debug, Clone)]
pub struct ClockEngine {
    state: GameState,
    time_control: TimeControl,
    events: Vec<Event>,
}

impl ClockEngine {
    /// Constructs an idle engine with both clocks set from a time control.
    pub fn new(tc: TimeControl) -> ClockEngine {
        ClockEngine {
            state: GameState::new(tc),
            time_control: tc,
            events: Vec::new(),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Returns the configured time control.
    pub fn time_control(&self) -> TimeControl {
        self.time_control
    }

    /// Returns `true` if the remaining time of a side is strictly below the threshold.
    pub fn is_low_time(&self, side: Side, threshold_ms: u64) -> bool {
        self.state.clock(side).is_low_time(threshold_ms)
    }

    /// Takes the events queued since the last call.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn event(&mut self, e: Event) {
        self.events.push(e);
    }

    /// Sets both clocks from a time control.
    ///
    /// Rejected with [`ClockError::GameActive`] while a game is in progress,
    /// leaving the state untouched.
    pub fn configure(&mut self, tc: TimeControl) -> Result<(), ClockError> {
        if self.state.is_active() {
            warn!("time control {} rejected: game in progress", tc);
            return Err(ClockError::GameActive);
        }
        for side in Side::BOTH {
            self.state.clock_mut(side).configure(tc);
        }
        self.time_control = tc;
        debug!("configured {}", tc);
        self.event(Event::Configured(tc));
        Ok(())
    }

    /// Starts the game with the first player's clock running.
    ///
    /// Ignored while a game is already in progress.
    pub fn start(&mut self) {
        if self.state.is_active() {
            debug!("start ignored: game in progress");
            return;
        }
        self.state.set_active_player(Some(Side::First));
        debug!("started");
        self.event(Event::Started);
    }

    /// Stops the game on request, keeping the remaining times.
    pub fn stop(&mut self) {
        self.stop_with(StopReason::Manual)
    }

    /// Stops the game with a reason. Does nothing if no game is in progress.
    pub fn stop_with(&mut self, reason: StopReason) {
        if !self.state.is_active() {
            return;
        }
        self.state.set_active_player(None);
        debug!("stopped: {}", reason);
        self.event(Event::Stopped(reason));
    }

    /// Ends the turn of the active player, adding their increment and
    /// starting the opponent's clock. Returns the side now to move.
    ///
    /// Does nothing if no game is in progress.
    pub fn switch_turn(&mut self) -> Option<Side> {
        let side = self.state.active_player()?;
        self.state.clock_mut(side).add_increment();
        let next = side.opposite();
        self.state.set_active_player(Some(next));
        debug!(
            "{} ended turn with {}",
            side,
            Millis(self.state.clock(side).remaining_ms())
        );
        self.event(Event::TurnSwitch(side));
        Some(next)
    }

    /// Decrements the running clock by the elapsed time, flooring at zero.
    pub fn advance(&mut self, elapsed_ms: u64) -> Advance {
        let side = match self.state.active_player() {
            Some(side) => side,
            None => return Advance::Idle,
        };
        let clock = self.state.clock_mut(side);
        let taken = clock.consume(elapsed_ms);
        if !clock.is_expired() {
            return Advance::Ticked(side);
        }
        // Only the tick that reaches zero reports the expiry.
        if taken != 0 {
            debug!("{} expired", side);
            self.event(Event::Expired(side));
        }
        Advance::Expired(side)
    }

    /// Stops the game and restores both clocks to their initial time.
    pub fn reset(&mut self) {
        self.state.set_active_player(None);
        for side in Side::BOTH {
            self.state.clock_mut(side).restore();
        }
        debug!("reset");
        self.event(Event::Reset);
    }
}

impl Default for ClockEngine {
    fn default() -> Self {
        ClockEngine::new(TimeControl::default())
    }
}
