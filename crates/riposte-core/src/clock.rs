//! Simulation clock.
//!
//! Two time bases advance together on every host frame:
//!
//! - **Simulation time** drives every gameplay timer (timelines, cooldowns,
//!   invulnerability, combo and hit windows). It is scaled by `time_scale`
//!   and stops completely while paused.
//! - **Wall time** is the sum of raw frame deltas. It never stops and is only
//!   used for presentation that must run while the duel is frozen (the intro
//!   panel).
//!
//! Pausing is a property of the clock, not something each timer polls.
//!
//! # Example
//!
//! ```
//! use riposte_core::clock::SimClock;
//!
//! let mut clock = SimClock::new();
//! assert_eq!(clock.advance(0.5), 0.5);
//!
//! clock.pause();
//! assert_eq!(clock.advance(0.5), 0.0);
//! assert!((clock.now() - 0.5).abs() < 1e-9);
//! assert!((clock.wall_time() - 1.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

/// Pausable, scalable simulation clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    sim_time: f64,
    wall_time: f64,
    time_scale: f32,
    paused: bool,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimClock {
    /// Creates a running clock at time zero with unit scale.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sim_time: 0.0,
            wall_time: 0.0,
            time_scale: 1.0,
            paused: false,
        }
    }

    /// Advances both time bases by one host frame.
    ///
    /// Negative or non-finite deltas count as zero.
    ///
    /// # Returns
    ///
    /// The simulation delta for this frame: `real_dt * time_scale`, or zero
    /// while paused.
    pub fn advance(&mut self, real_dt: f32) -> f32 {
        let real_dt = sanitize(real_dt);
        self.wall_time += f64::from(real_dt);
        if self.paused {
            return 0.0;
        }
        let dt = real_dt * self.time_scale;
        self.sim_time += f64::from(dt);
        dt
    }

    /// Current simulation time in seconds.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.sim_time
    }

    /// Unpausable elapsed time in seconds.
    #[must_use]
    pub fn wall_time(&self) -> f64 {
        self.wall_time
    }

    /// Stops simulation time.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Restarts simulation time.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Returns true while simulation time is stopped, either explicitly or
    /// through a zero time scale.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused || self.time_scale == 0.0
    }

    /// Returns the simulation speed multiplier.
    #[must_use]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Sets the simulation speed multiplier (negative values clamp to zero).
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = sanitize(scale);
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates_both_bases() {
        let mut clock = SimClock::new();
        clock.advance(0.25);
        clock.advance(0.25);
        assert!((clock.now() - 0.5).abs() < 1e-9);
        assert!((clock.wall_time() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn pause_freezes_sim_time_only() {
        let mut clock = SimClock::new();
        clock.advance(1.0);
        clock.pause();
        assert_eq!(clock.advance(3.0), 0.0);
        assert!((clock.now() - 1.0).abs() < 1e-9);
        assert!((clock.wall_time() - 4.0).abs() < 1e-9);

        clock.resume();
        assert_eq!(clock.advance(1.0), 1.0);
        assert!((clock.now() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn time_scale_scales_sim_delta() {
        let mut clock = SimClock::new();
        clock.set_time_scale(0.5);
        assert!((clock.advance(1.0) - 0.5).abs() < f32::EPSILON);
        assert!((clock.wall_time() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_time_scale_reads_as_paused() {
        let mut clock = SimClock::new();
        clock.set_time_scale(0.0);
        assert!(clock.is_paused());
        assert_eq!(clock.advance(1.0), 0.0);
    }

    #[test]
    fn bad_deltas_are_ignored() {
        let mut clock = SimClock::new();
        assert_eq!(clock.advance(-1.0), 0.0);
        assert_eq!(clock.advance(f32::NAN), 0.0);
        assert_eq!(clock.now(), 0.0);
        assert_eq!(clock.wall_time(), 0.0);
    }
}
