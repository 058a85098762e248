//! Simulation clock
//!
//! The clinic runs in continuous time measured in minutes. The clock only
//! moves forward, jumping from one event timestamp to the next. The horizon
//! bounds arrival generation and busy-time accounting, but not the event loop
//! itself: departures and reneging timers scheduled before the horizon may
//! still fire after it.

/// Continuous simulation clock with a fixed horizon
///
/// # Example
/// ```
/// use clinic_simulator_core_rs::SimClock;
///
/// let mut clock = SimClock::new(480.0);
/// clock.advance_to(12.5);
/// assert_eq!(clock.now(), 12.5);
/// assert_eq!(clock.clamp_to_horizon(500.0), 480.0);
/// ```
#[derive(Debug, Clone)]
pub struct SimClock {
    /// Current simulation time (minutes)
    now: f64,
    /// Horizon of the run (minutes)
    horizon: f64,
}

impl SimClock {
    /// Create a clock at t = 0
    ///
    /// # Panics
    /// Panics if `horizon` is not strictly positive and finite
    pub fn new(horizon: f64) -> Self {
        assert!(
            horizon.is_finite() && horizon > 0.0,
            "horizon must be positive"
        );
        Self { now: 0.0, horizon }
    }

    /// Jump to the timestamp of the event being processed
    ///
    /// # Panics
    /// Panics if `time` lies before the current time
    pub fn advance_to(&mut self, time: f64) {
        assert!(
            time >= self.now,
            "simulation time cannot move backwards ({} < {})",
            time,
            self.now
        );
        self.now = time;
    }

    /// Current simulation time
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Configured horizon
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Cap a timestamp at the horizon
    pub fn clamp_to_horizon(&self, time: f64) -> f64 {
        time.min(self.horizon)
    }

    /// Portion of `[start, end]` that lies inside `[0, horizon]`
    ///
    /// Never negative: a span that starts after the horizon contributes zero.
    pub fn span_within_horizon(&self, start: f64, end: f64) -> f64 {
        (self.clamp_to_horizon(end) - self.clamp_to_horizon(start)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "horizon must be positive")]
    fn test_zero_horizon_panics() {
        SimClock::new(0.0);
    }

    #[test]
    #[should_panic(expected = "cannot move backwards")]
    fn test_clock_never_moves_backwards() {
        let mut clock = SimClock::new(100.0);
        clock.advance_to(10.0);
        clock.advance_to(9.0);
    }

    #[test]
    fn test_span_straddling_horizon_is_truncated() {
        let clock = SimClock::new(100.0);
        assert_eq!(clock.span_within_horizon(90.0, 120.0), 10.0);
        assert_eq!(clock.span_within_horizon(110.0, 130.0), 0.0);
        assert_eq!(clock.span_within_horizon(10.0, 25.0), 15.0);
    }
}
