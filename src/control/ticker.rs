use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// A periodic source of elapsed time.
///
/// Elapsed time is measured between readings rather than assumed from the
/// period, and sub-millisecond remainders are carried to the next reading,
/// so the readings sum to the real time passed.
///
/// The interval is created on first use, so a ticker can be constructed
/// outside of a runtime.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    interval: Option<Interval>,
    last: Instant,
    carry: Duration,
}

impl Ticker {
    /// Constructs a ticker firing every `period`.
    pub fn new(period: Duration) -> Ticker {
        Ticker {
            period,
            interval: None,
            last: Instant::now(),
            carry: Duration::ZERO,
        }
    }

    fn interval(now: Instant, period: Duration) -> Interval {
        let mut interval = time::interval_at(now + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }

    /// Restarts measuring from now, discarding any time not yet read.
    pub fn restart(&mut self) {
        let now = Instant::now();
        self.interval = Some(Self::interval(now, self.period));
        self.last = now;
        self.carry = Duration::ZERO;
    }

    /// Reads the whole milliseconds elapsed since the last reading.
    pub fn take_elapsed_ms(&mut self) -> u64 {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last) + self.carry;
        self.last = now;
        let ms = elapsed.as_millis() as u64;
        self.carry = elapsed - Duration::from_millis(ms);
        ms
    }

    /// Waits for the next tick and reads the elapsed milliseconds.
    ///
    /// The first tick is one period after the first call or the last restart.
    pub async fn tick(&mut self) -> u64 {
        let period = self.period;
        self.interval
            .get_or_insert_with(|| Self::interval(Instant::now(), period))
            .tick()
            .await;
        self.take_elapsed_ms()
    }
}
