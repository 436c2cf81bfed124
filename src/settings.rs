use crate::clock::*;

use serde::{Deserialize, Deserializer, Serialize};

/// Sound and warning settings.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether cues are silenced.
    pub muted: bool,
    #[serde(deserialize_with = "deserialize_volume")]
    volume: f32,
    /// Whether the low time cue is enabled.
    pub low_time_warning: bool,
    /// Remaining time below which a clock counts as low, in milliseconds.
    pub low_time_threshold_ms: u64,
}

impl Settings {
    /// Returns the cue volume in `[0, 1]`.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Sets the cue volume, clamped to `[0, 1]`. `NaN` is treated as silence.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
    }

    /// Toggles mute.
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Toggles the low time cue.
    pub fn toggle_low_time_warning(&mut self) {
        self.low_time_warning = !self.low_time_warning;
    }

    /// Sets the low time threshold in milliseconds.
    pub fn set_low_time_threshold(&mut self, threshold_ms: u64) {
        self.low_time_threshold_ms = threshold_ms;
    }
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

fn deserialize_volume<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    f32::deserialize(deserializer).map(clamp_volume)
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            muted: false,
            volume: 0.7,
            low_time_warning: true,
            low_time_threshold_ms: 30_000,
        }
    }
}

/// Detects the running clock crossing the low time threshold.
///
/// Each side warns at most once until it is re-armed: a side is re-armed
/// when it ends a turn (the increment may lift it back above the threshold),
/// and both sides are re-armed when the game stops or resets.
#[derive(Debug, Default, Clone)]
pub struct LowTimeMonitor {
    warned: [bool; 2],
}

impl LowTimeMonitor {
    /// Checks the running clock, returning the side to warn, if any.
    ///
    /// An expired clock never warns.
    pub fn observe(&mut self, state: &GameState, settings: &Settings) -> Option<Side> {
        if !settings.low_time_warning {
            return None;
        }
        let (side, clock) = state.running_clock()?;
        let warned = &mut self.warned[side.ord()];
        if *warned || clock.is_expired() || !clock.is_low_time(settings.low_time_threshold_ms) {
            return None;
        }
        *warned = true;
        Some(side)
    }

    /// Re-arms a side.
    pub fn rearm(&mut self, side: Side) {
        self.warned[side.ord()] = false;
    }

    /// Re-arms both sides.
    pub fn rearm_all(&mut self) {
        self.warned = [false; 2];
    }
}
