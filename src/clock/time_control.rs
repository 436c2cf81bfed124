use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ClockError;

/// The starting time and increment applied to both clocks.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TimeControl {
    /// Starting minutes.
    pub minutes: u32,
    /// Starting seconds, added to the minutes.
    pub seconds: u32,
    /// Seconds added to a player's clock each time they complete a turn.
    pub increment: u32,
}

impl TimeControl {
    /// Constructs a new `TimeControl`.
    pub const fn new(minutes: u32, seconds: u32, increment: u32) -> TimeControl {
        TimeControl {
            minutes,
            seconds,
            increment,
        }
    }

    /// Returns the starting time in milliseconds.
    pub fn initial_ms(&self) -> u64 {
        (self.minutes as u64 * 60 + self.seconds as u64) * 1000
    }

    /// Returns the increment in milliseconds.
    pub fn increment_ms(&self) -> u64 {
        self.increment as u64 * 1000
    }
}

impl Default for TimeControl {
    /// 5 minutes with a 3 second increment.
    fn default() -> Self {
        TimeControl::new(5, 0, 3)
    }
}

impl fmt::Display for TimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.seconds == 0 {
            write!(f, "{}+{}", self.minutes, self.increment)
        } else {
            write!(f, "{}:{:02}+{}", self.minutes, self.seconds, self.increment)
        }
    }
}

impl FromStr for TimeControl {
    type Err = ClockError;

    /// Parses `M+I` or `M:SS+I`, where the increment is in seconds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ClockError::InvalidTimeControl(format!("{:?}: {}", s, reason));
        let num = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| invalid("not a non-negative integer"))
        };

        let (base, increment) = s.split_once('+').ok_or_else(|| invalid("missing '+'"))?;
        let (minutes, seconds) = match base.split_once(':') {
            Some((m, s)) => (num(m)?, num(s)?),
            None => (num(base)?, 0),
        };
        if seconds >= 60 {
            return Err(invalid("seconds out of range"));
        }
        Ok(TimeControl::new(minutes, seconds, num(increment)?))
    }
}

/// The standard presets, in the order they are offered.
pub const PRESETS: [TimeControl; 8] = [
    TimeControl::new(1, 0, 0),
    TimeControl::new(1, 0, 1),
    TimeControl::new(3, 0, 0),
    TimeControl::new(3, 0, 2),
    TimeControl::new(5, 0, 0),
    TimeControl::new(5, 0, 3),
    TimeControl::new(10, 0, 0),
    TimeControl::new(15, 0, 10),
];

/// A selectable time format: one of the presets, or a custom entry.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum TimeFormat {
    /// A standard preset.
    Preset(TimeControl),
    /// A free-form entry.
    Custom(TimeControl),
}

impl TimeFormat {
    /// Returns the time control of the format.
    pub fn time_control(self) -> TimeControl {
        match self {
            TimeFormat::Preset(tc) | TimeFormat::Custom(tc) => tc,
        }
    }

    /// Returns the format for a time control, matching it against the presets.
    pub fn classify(tc: TimeControl) -> TimeFormat {
        if PRESETS.contains(&tc) {
            TimeFormat::Preset(tc)
        } else {
            TimeFormat::Custom(tc)
        }
    }
}

impl Default for TimeFormat {
    fn default() -> Self {
        TimeFormat::Preset(TimeControl::default())
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFormat::Preset(tc) => tc.fmt(f),
            TimeFormat::Custom(tc) => write!(f, "custom ({})", tc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millisecond_conversion() {
        let tc = TimeControl::new(5, 0, 3);
        assert_eq!(tc.initial_ms(), 300_000);
        assert_eq!(tc.increment_ms(), 3000);
        assert_eq!(TimeControl::new(1, 30, 0).initial_ms(), 90_000);
    }

    #[test]
    fn parse() {
        assert_eq!("5+3".parse::<TimeControl>().unwrap(), TimeControl::new(5, 0, 3));
        assert_eq!(
            "2:30+1".parse::<TimeControl>().unwrap(),
            TimeControl::new(2, 30, 1)
        );
        assert!("5".parse::<TimeControl>().is_err());
        assert!("5+-1".parse::<TimeControl>().is_err());
        assert!("1:75+0".parse::<TimeControl>().is_err());
    }

    #[test]
    fn display_parses_back() {
        for tc in PRESETS.iter().chain(&[TimeControl::new(0, 45, 2)]) {
            assert_eq!(tc.to_string().parse::<TimeControl>().unwrap(), *tc);
        }
        assert_eq!(TimeControl::new(15, 0, 10).to_string(), "15+10");
        assert_eq!(TimeControl::new(0, 5, 0).to_string(), "0:05+0");
    }

    #[test]
    fn classify_presets() {
        assert_eq!(
            TimeFormat::classify(TimeControl::new(3, 0, 2)),
            TimeFormat::Preset(TimeControl::new(3, 0, 2))
        );
        assert_eq!(
            TimeFormat::classify(TimeControl::new(7, 0, 5)),
            TimeFormat::Custom(TimeControl::new(7, 0, 5))
        );
    }
}
