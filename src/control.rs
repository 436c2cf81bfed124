/// The ticker driving the running clock.
pub mod ticker;

use crate::clock::*;
use crate::engine::*;
use crate::error::ClockError;
use crate::input::*;
use crate::settings::*;
use crate::sound::*;

use ticker::Ticker;

use std::time::Duration;

use log::{debug, info};
use tokio::sync::{mpsc, watch};

/// A command sent to the control loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Sets both clocks from a time control. Rejected during a game.
    Configure(TimeControl),
    /// Starts the game with the first player's clock running.
    Start,
    /// Stops the game, keeping the remaining times.
    Stop,
    /// Ends the turn of the active player.
    SwitchTurn,
    /// Stops the game and restores both clocks.
    Reset,
    /// A raw input, dispatched against the current state.
    Input(Input),
    /// Replaces the sound and warning settings.
    Settings(Settings),
    /// Ends the control loop.
    Shutdown,
}

/// A command sender for the control loop.
///
/// The loop ends once every sender is dropped.
#[derive(Debug, Clone)]
pub struct CommandSender(mpsc::UnboundedSender<Command>);

impl CommandSender {
    /// Sets both clocks from a time control.
    pub fn configure(&self, tc: TimeControl) -> Result<(), ClockError> {
        self.send(Command::Configure(tc))
    }

    /// Starts the game.
    pub fn start(&self) -> Result<(), ClockError> {
        self.send(Command::Start)
    }

    /// Stops the game.
    pub fn stop(&self) -> Result<(), ClockError> {
        self.send(Command::Stop)
    }

    /// Ends the turn of the active player.
    pub fn switch_turn(&self) -> Result<(), ClockError> {
        self.send(Command::SwitchTurn)
    }

    /// Resets the clocks.
    pub fn reset(&self) -> Result<(), ClockError> {
        self.send(Command::Reset)
    }

    /// Sends a raw input.
    pub fn input(&self, input: Input) -> Result<(), ClockError> {
        self.send(Command::Input(input))
    }

    /// Replaces the settings.
    pub fn settings(&self, settings: Settings) -> Result<(), ClockError> {
        self.send(Command::Settings(settings))
    }

    /// Ends the control loop.
    pub fn shutdown(&self) -> Result<(), ClockError> {
        self.send(Command::Shutdown)
    }

    /// Sends a command.
    pub fn send(&self, cmd: Command) -> Result<(), ClockError> {
        self.0.send(cmd).map_err(|_| ClockError::ChannelClosed)
    }
}

/// The shortest interval between ticks.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// A builder for a clock.
pub struct Builder {
    time_control: TimeControl,
    tick_interval: Duration,
    settings: Settings,
    dispatcher: InputDispatcher,
    notifier: Option<Box<dyn SoundNotifier + Send>>,
}

impl Builder {
    /// Sets the time control.
    pub fn with_time_control(tc: TimeControl) -> Self {
        Builder {
            time_control: tc,
            tick_interval: Duration::from_millis(100),
            settings: Settings::default(),
            dispatcher: InputDispatcher::default(),
            notifier: None,
        }
    }

    /// Sets the interval between ticks, at least one millisecond.
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(MIN_TICK_INTERVAL);
        self
    }

    /// Sets the sound and warning settings.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the key that ends a turn.
    pub fn switch_key(mut self, key: Key) -> Self {
        self.dispatcher = InputDispatcher::new(key);
        self
    }

    /// Sets the notifier playing sound cues.
    pub fn notifier(mut self, notifier: impl SoundNotifier + Send + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    /// Builds the clock, returning a handle with the control loop to run.
    pub fn build(self) -> Handle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let engine = ClockEngine::new(self.time_control);
        let (state_tx, state_rx) = watch::channel(*engine.state());

        let ctrl = Control {
            cmd_rx,
            event_tx,
            state_tx,
            engine,
            ticker: Ticker::new(self.tick_interval),
            settings: self.settings,
            monitor: LowTimeMonitor::default(),
            dispatcher: self.dispatcher,
            mixer: self.notifier.map(Mixer::new),
        };

        Handle {
            cmd_tx: CommandSender(cmd_tx),
            event_rx,
            state_rx,
            ctrl,
        }
    }
}

/// A handle of a clock.
pub struct Handle {
    /// A sender of commands.
    pub cmd_tx: CommandSender,
    /// A receiver of events.
    pub event_rx: mpsc::UnboundedReceiver<Event>,
    /// A receiver of the state, updated after every command and tick.
    pub state_rx: watch::Receiver<GameState>,
    /// The control loop, to be run on a Tokio runtime.
    pub ctrl: Control,
}

/// Builds a clock with a time control and default settings.
pub fn build_with_time_control(tc: TimeControl) -> Handle {
    Builder::with_time_control(tc).build()
}

/// The control loop: the single owner of the engine.
///
/// Commands and ticks are processed one at a time, so readers of the state
/// never observe a partial update.
pub struct Control {
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    event_tx: mpsc::UnboundedSender<Event>,
    state_tx: watch::Sender<GameState>,

    engine: ClockEngine,
    ticker: Ticker,

    settings: Settings,
    monitor: LowTimeMonitor,
    dispatcher: InputDispatcher,
    mixer: Option<Mixer<Box<dyn SoundNotifier + Send>>>,
}

impl Control {
    /// Runs the loop until shut down, returning the final state.
    pub async fn start(mut self) -> GameState {
        loop {
            let active = self.engine.state().is_active();
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.process(cmd),
                },
                elapsed = self.ticker.tick(), if active => self.advance(elapsed),
            }
            self.publish();
        }
        debug!("control loop ended");
        *self.engine.state()
    }

    /// Processes a command.
    fn process(&mut self, cmd: Command) {
        match cmd {
            Command::Configure(tc) => {
                if let Err(e) = self.engine.configure(tc) {
                    self.emit(Event::Error(e));
                }
            }
            Command::Start => {
                if !self.engine.state().is_active() {
                    self.ticker.restart();
                }
                self.engine.start();
            }
            Command::Stop => {
                self.catch_up();
                self.engine.stop();
            }
            Command::SwitchTurn => {
                // Charge the time since the last tick before the increment.
                self.catch_up();
                self.engine.switch_turn();
            }
            Command::Reset => self.engine.reset(),
            Command::Input(input) => {
                if let Some(cmd) = self.dispatcher.dispatch(input, self.engine.state()) {
                    return self.process(cmd);
                }
            }
            Command::Settings(settings) => self.settings = settings,
            Command::Shutdown => {}
        }
        self.forward();
    }

    /// Advances the running clock to now.
    fn catch_up(&mut self) {
        if self.engine.state().is_active() {
            let elapsed = self.ticker.take_elapsed_ms();
            self.advance(elapsed);
        }
    }

    /// Advances the running clock, stopping the game on expiry.
    fn advance(&mut self, elapsed_ms: u64) {
        if let Advance::Expired(side) = self.engine.advance(elapsed_ms) {
            info!("{} ran out of time", side);
            self.engine.stop_with(StopReason::Expired(side));
        }
        self.forward();
        if let Some(side) = self.monitor.observe(self.engine.state(), &self.settings) {
            self.emit(Event::LowTime(side));
        }
    }

    /// Forwards the events queued by the engine.
    fn forward(&mut self) {
        for e in self.engine.take_events() {
            match e {
                Event::TurnSwitch(side) => self.monitor.rearm(side),
                Event::Stopped(_) | Event::Reset => self.monitor.rearm_all(),
                _ => (),
            }
            self.emit(e);
        }
    }

    /// Sends an event, playing its cue.
    fn emit(&mut self, e: Event) {
        if let Some(mixer) = &mut self.mixer {
            mixer.notify(&e, &self.settings);
        }
        let res = self.event_tx.send(e);
        // Ignore if event receiver is dropped.
        drop(res);
    }

    /// Publishes the state to readers.
    fn publish(&self) {
        self.state_tx.send_replace(*self.engine.state());
    }
}
