use bevy_ecs::prelude::Resource;

use crate::error::{Result, SimError};

/// Fixed-interval simulated clock.
///
/// Time is derived from the tick count (`ticks * interval`) rather than accumulated,
/// so long runs with fractional intervals do not drift.
#[derive(Debug, Clone, Copy, PartialEq, Resource)]
pub struct SimulationClock {
    ticks: u64,
    interval: f64,
    duration: f64,
}

impl SimulationClock {
    /// Fails unless `interval` is finite and positive and `duration` is finite and
    /// non-negative; otherwise the clock could never finish.
    pub fn new(duration: f64, interval: f64) -> Result<Self> {
        if !interval.is_finite() || interval <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "tick interval must be positive, got {interval}"
            )));
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "duration must be non-negative, got {duration}"
            )));
        }
        Ok(Self {
            ticks: 0,
            interval,
            duration,
        })
    }

    /// Number of ticks a clock runs before [SimulationClock::is_finished] holds: the
    /// smallest `n` with `n * interval >= duration`, evaluated in the same floating
    /// point as `now`. Zero for a non-positive duration or an unusable interval.
    pub fn ticks_to_finish(duration: f64, interval: f64) -> u64 {
        if !interval.is_finite() || interval <= 0.0 || duration.is_nan() || duration <= 0.0 {
            return 0;
        }
        if !duration.is_finite() {
            return u64::MAX;
        }
        // The quotient can round either way; nudge it onto the clock's own rule.
        let mut ticks = (duration / interval).ceil() as u64;
        while ticks < u64::MAX && (ticks as f64) * interval < duration {
            ticks += 1;
        }
        while ticks > 0 && ((ticks - 1) as f64) * interval >= duration {
            ticks -= 1;
        }
        ticks
    }

    pub fn now(&self) -> f64 {
        self.ticks as f64 * self.interval
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// True once simulated time has reached or passed the duration.
    pub fn is_finished(&self) -> bool {
        self.now() >= self.duration
    }

    pub fn advance(&mut self) {
        self.ticks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_advances_by_interval() {
        let mut clock = SimulationClock::new(3.0, 1.0).expect("clock");
        assert_eq!(clock.now(), 0.0);
        assert!(!clock.is_finished());

        clock.advance();
        clock.advance();
        assert_eq!(clock.now(), 2.0);
        assert_eq!(clock.ticks(), 2);
        assert!(!clock.is_finished());

        clock.advance();
        assert!(clock.is_finished());
    }

    #[test]
    fn fractional_interval_finishes_on_exact_tick_count() {
        let mut clock = SimulationClock::new(1.0, 0.1).expect("clock");
        let mut ticks = 0;
        while !clock.is_finished() {
            clock.advance();
            ticks += 1;
        }
        assert_eq!(ticks, 10);
    }

    #[test]
    fn zero_duration_is_finished_immediately() {
        assert!(SimulationClock::new(0.0, 1.0).expect("clock").is_finished());
    }

    #[test]
    fn tick_count_matches_the_stopping_rule_under_rounding() {
        // 0.9 / 0.3 rounds to 3.0, but 3 * 0.3 falls just short of 0.9.
        for (duration, interval, expected) in [(0.9, 0.3, 4), (1.8, 0.3, 7), (28.8, 0.3, 97)] {
            assert_eq!(SimulationClock::ticks_to_finish(duration, interval), expected);

            let mut clock = SimulationClock::new(duration, interval).expect("clock");
            let mut ticks = 0;
            while !clock.is_finished() {
                clock.advance();
                ticks += 1;
            }
            assert_eq!(ticks, expected, "duration {duration}, interval {interval}");
        }
        assert_eq!(SimulationClock::ticks_to_finish(1.0, 0.1), 10);
        assert_eq!(SimulationClock::ticks_to_finish(100.0, 1.0), 100);
        assert_eq!(SimulationClock::ticks_to_finish(0.0, 1.0), 0);
    }

    #[test]
    fn rejects_intervals_that_never_finish() {
        for interval in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                SimulationClock::new(10.0, interval),
                Err(SimError::InvalidConfig(_))
            ));
            assert_eq!(SimulationClock::ticks_to_finish(10.0, interval), 0);
        }
        assert!(SimulationClock::new(-1.0, 1.0).is_err());
        assert!(SimulationClock::new(f64::INFINITY, 1.0).is_err());
    }
}
