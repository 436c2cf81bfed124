use crate::engine::*;
use crate::settings::Settings;

use log::info;

/// A sound cue.
#[derive(displaydoc::Display, Debug, Copy, Clone, Eq, PartialEq)]
pub enum Cue {
    /// click
    Click,
    /// switch
    Switch,
    /// low time
    LowTime,
    /// time up
    TimeUp,
    /// game start
    GameStart,
    /// game end
    GameEnd,
}

impl Cue {
    /// Returns the cue for an event, if any.
    pub fn for_event(e: &Event) -> Option<Cue> {
        match e {
            Event::Started => Some(Cue::GameStart),
            Event::TurnSwitch(_) => Some(Cue::Switch),
            Event::LowTime(_) => Some(Cue::LowTime),
            Event::Stopped(StopReason::Expired(_)) => Some(Cue::TimeUp),
            Event::Stopped(StopReason::Manual) => Some(Cue::Click),
            Event::Reset => Some(Cue::GameEnd),
            Event::Configured(_) | Event::Expired(_) | Event::Error(_) => None,
        }
    }
}

/// Plays sound cues.
pub trait SoundNotifier {
    /// Plays a cue at a volume in `[0, 1]`.
    fn play(&mut self, cue: Cue, volume: f32);
}

impl<N: SoundNotifier + ?Sized> SoundNotifier for Box<N> {
    fn play(&mut self, cue: Cue, volume: f32) {
        (**self).play(cue, volume)
    }
}

/// Forwards cues for events to a notifier, honoring mute and volume.
pub struct Mixer<N> {
    notifier: N,
}

impl<N: SoundNotifier> Mixer<N> {
    /// Constructs a new `Mixer`.
    pub fn new(notifier: N) -> Mixer<N> {
        Mixer { notifier }
    }

    /// Plays the cue for an event, if any. Returns the cue played.
    pub fn notify(&mut self, e: &Event, settings: &Settings) -> Option<Cue> {
        if settings.muted {
            return None;
        }
        let cue = Cue::for_event(e)?;
        self.notifier.play(cue, settings.volume());
        Some(cue)
    }

    /// Returns the inner notifier.
    pub fn into_inner(self) -> N {
        self.notifier
    }
}

/// A notifier that logs the cues it is asked to play.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl SoundNotifier for LogNotifier {
    fn play(&mut self, cue: Cue, volume: f32) {
        info!("cue: {} (volume {:.2})", cue, volume);
    }
}
