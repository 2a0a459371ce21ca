//! Simulation clock: owns tick state, speed control, and pause.
//!
//! Also home of the wall-clock abstraction. Real time only matters for
//! flag scheduling and flag lifetime; everything else runs on ticks.

use crate::types::{RunId, Tick};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

pub const MIN_SPEED: f64 = 0.1;
pub const MAX_SPEED: f64 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub run_id:       RunId,
    pub current_tick: Tick,
    /// Tick-rate multiplier. 1.0 = one tick per real second.
    pub speed:        f64,
    pub paused:       bool,
}

impl SimClock {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            current_tick: 0,
            speed: 1.0,
            paused: true,
        }
    }

    /// Advance one tick. Returns the new tick number, or None while paused.
    pub fn advance(&mut self) -> Option<Tick> {
        if self.paused {
            return None;
        }
        self.current_tick += 1;
        Some(self.current_tick)
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = if speed.is_finite() {
            speed.clamp(MIN_SPEED, MAX_SPEED)
        } else {
            1.0
        };
    }

    pub fn speed_up(&mut self)    { self.set_speed(self.speed * 1.2); }
    pub fn slow_down(&mut self)   { self.set_speed(self.speed * 0.8); }
    pub fn reset_speed(&mut self) { self.set_speed(1.0); }

    /// Real time between two ticks when the driver paces itself.
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.speed)
    }

    pub fn speed_label(&self) -> String {
        if (self.speed - 1.0).abs() < f64::EPSILON {
            "Normal".to_string()
        } else if self.speed > 1.0 {
            format!("{:.1}x Fast", self.speed)
        } else {
            format!("{:.1}x Slow", 1.0 / self.speed)
        }
    }
}

/// Source of real-world time. Injected into the engine so tests can
/// simulate time passing without sleeping.
pub trait WallClock: Send {
    fn now(&self) -> DateTime<Utc>;
}

/// The process clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A virtual clock that only moves when told to. Clones share the same
/// instant, so a test can keep one handle and give another to the engine.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { millis: Arc::new(AtomicI64::new(start.timestamp_millis())) }
    }

    /// A clock pinned to the Unix epoch.
    pub fn at_epoch() -> Self {
        Self { millis: Arc::new(AtomicI64::new(0)) }
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(Duration::seconds(secs));
    }
}

impl WallClock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.millis.load(Ordering::SeqCst);
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_clock_does_not_advance() {
        let mut clock = SimClock::new("c".into());
        assert_eq!(clock.advance(), None);
        clock.resume();
        assert_eq!(clock.advance(), Some(1));
        assert_eq!(clock.current_tick, 1);
    }

    #[test]
    fn speed_is_clamped() {
        let mut clock = SimClock::new("c".into());
        for _ in 0..50 {
            clock.speed_up();
        }
        assert_eq!(clock.speed, MAX_SPEED);
        for _ in 0..100 {
            clock.slow_down();
        }
        assert_eq!(clock.speed, MIN_SPEED);
        clock.reset_speed();
        assert_eq!(clock.speed_label(), "Normal");
        assert_eq!(clock.tick_interval(), std::time::Duration::from_secs(1));
    }

    #[test]
    fn manual_clock_handles_share_time() {
        let a = ManualClock::at_epoch();
        let b = a.clone();
        a.advance_secs(7);
        assert_eq!((b.now() - DateTime::<Utc>::UNIX_EPOCH).num_seconds(), 7);
    }
}
