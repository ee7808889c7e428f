//! Frame pacing and rate measurement.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Number of recent frame intervals averaged into the measured rate.
const SAMPLES: usize = 10;

/// Paces the loop to a fixed tick rate and measures the rate achieved.
#[derive(Debug, Clone)]
pub struct TickClock {
    period: Option<Duration>,
    last: Option<Instant>,
    intervals: VecDeque<Duration>,
}

impl TickClock {
    /// A clock targeting `rate` ticks per second; `0` disables pacing.
    #[must_use]
    pub fn new(rate: u32) -> Self {
        Self {
            period: (rate > 0).then(|| Duration::from_secs(1) / rate),
            last: None,
            intervals: VecDeque::with_capacity(SAMPLES),
        }
    }

    /// Waits out the rest of the current period, then records the interval.
    ///
    /// Returns the time since the previous call.
    pub fn tick(&mut self) -> Duration {
        if let (Some(period), Some(last)) = (self.period, self.last) {
            let elapsed = last.elapsed();
            if elapsed < period {
                std::thread::sleep(period - elapsed);
            }
        }

        let now = Instant::now();
        let interval = self.last.map_or(Duration::ZERO, |last| now - last);
        if self.last.is_some() {
            if self.intervals.len() == SAMPLES {
                self.intervals.pop_front();
            }
            self.intervals.push_back(interval);
        }
        self.last = Some(now);
        interval
    }

    /// Measured ticks per second over the recent intervals; `0` until measurable.
    #[must_use]
    pub fn fps(&self) -> u32 {
        let total: Duration = self.intervals.iter().sum();
        if self.intervals.is_empty() || total.is_zero() {
            return 0;
        }
        let average = total.as_secs_f64() / self.intervals.len() as f64;
        let rate = (1.0 / average).round();
        if rate >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            rate as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paces_to_the_configured_rate() {
        let mut clock = TickClock::new(100);
        clock.tick();
        let interval = clock.tick();
        assert!(interval >= Duration::from_millis(10));
    }

    #[test]
    fn unmeasured_rate_is_zero() {
        let mut clock = TickClock::new(0);
        assert_eq!(clock.fps(), 0);
        clock.tick();
        assert_eq!(clock.fps(), 0);
    }

    #[test]
    fn measures_a_plausible_rate() {
        let mut clock = TickClock::new(50);
        for _ in 0..4 {
            clock.tick();
        }
        let fps = clock.fps();
        assert!(fps > 0 && fps <= 50, "fps = {fps}");
    }
}
