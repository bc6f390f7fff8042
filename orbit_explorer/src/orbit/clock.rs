//! Simulated clock: wall-clock deltas scaled by a speed multiplier.

use bevy::prelude::*;
use chrono::{DateTime, Utc};

pub const DEFAULT_MAX_SPEED: f64 = 1000.0;

/// Simulated time shared by every pipeline stage.
#[derive(Resource, Clone, Debug)]
pub struct SimClock {
    time: DateTime<Utc>,
    epoch: DateTime<Utc>,
    speed: f64,
    paused: bool,
    max_speed: f64,
}

impl SimClock {
    pub fn new(epoch: DateTime<Utc>) -> Self {
        Self {
            time: epoch,
            epoch,
            speed: 1.0,
            paused: false,
            max_speed: DEFAULT_MAX_SPEED,
        }
    }

    pub fn with_max_speed(mut self, max_speed: f64) -> Self {
        self.max_speed = max_speed.abs().max(1.0);
        self
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Move simulated time forward by `real_secs * speed`. No-op while paused.
    pub fn advance(&mut self, real_secs: f64) {
        if self.paused || !real_secs.is_finite() {
            return;
        }
        let micros = (real_secs * self.speed * 1_000_000.0).round() as i64;
        self.time += chrono::Duration::microseconds(micros);
    }

    /// Negative speeds run time backwards. Clamped to `±max_speed`.
    pub fn set_speed(&mut self, speed: f64) {
        if speed.is_finite() {
            self.speed = speed.clamp(-self.max_speed, self.max_speed);
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Back to the session epoch at real-time speed.
    pub fn reset(&mut self) {
        self.time = self.epoch;
        self.speed = 1.0;
        self.paused = false;
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn advance_scales_by_speed() {
        let mut clock = SimClock::new(epoch());
        clock.set_speed(60.0);
        clock.advance(1.0);
        assert_eq!(clock.time(), epoch() + chrono::Duration::seconds(60));
    }

    #[test]
    fn paused_clock_does_not_move() {
        let mut clock = SimClock::new(epoch());
        clock.pause();
        clock.advance(10.0);
        assert_eq!(clock.time(), epoch());
        clock.resume();
        clock.advance(0.5);
        assert_eq!(clock.time(), epoch() + chrono::Duration::milliseconds(500));
    }

    #[test]
    fn speed_is_clamped_and_reset_restores_epoch() {
        let mut clock = SimClock::new(epoch()).with_max_speed(100.0);
        clock.set_speed(1e9);
        assert_eq!(clock.speed(), 100.0);
        clock.set_speed(f64::NAN);
        assert_eq!(clock.speed(), 100.0);
        clock.advance(1.0);
        clock.pause();
        clock.reset();
        assert_eq!(clock.time(), epoch());
        assert_eq!(clock.speed(), 1.0);
        assert!(!clock.is_paused());
    }
}
