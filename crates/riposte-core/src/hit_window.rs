//! Hit-spam detection for the opponent.
//!
//! Every landed hit registers with the victim's [`HitWindowTracker`]. Hits that
//! arrive within `window` seconds of each other accumulate; once
//! `hits_to_trigger_defense` have accumulated, a forced defense is armed. The
//! decision engine consumes it on its next cycle, which also resets the count.

use serde::{Deserialize, Serialize};

use crate::actor::Side;
use crate::config::HitWindowConfig;

/// A consumed forced-defense request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ForcedDefense {
    /// Side of the most recent hit, which the defense should cover.
    pub guard: Option<Side>,
}

/// Recent-hit counter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitWindowTracker {
    recent_hits: u32,
    last_hit: Option<f64>,
    last_side: Option<Side>,
    forced_defense_pending: bool,
}

impl HitWindowTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a landed hit.
    ///
    /// A gap longer than the window restarts the count, and the new hit is
    /// the first of the fresh run.
    ///
    /// # Returns
    ///
    /// True if this hit armed the forced defense.
    pub fn register_hit(&mut self, now: f64, side: Side, config: &HitWindowConfig) -> bool {
        let within_window = self
            .last_hit
            .is_some_and(|last| now - last <= f64::from(config.window));
        self.recent_hits = if within_window {
            self.recent_hits.saturating_add(1)
        } else {
            1
        };
        self.last_hit = Some(now);
        self.last_side = Some(side);

        if !self.forced_defense_pending && self.recent_hits >= config.hits_to_trigger_defense {
            self.forced_defense_pending = true;
            return true;
        }
        false
    }

    /// Consumes a pending forced defense, resetting the hit count.
    pub fn take_forced_defense(&mut self) -> Option<ForcedDefense> {
        if !self.forced_defense_pending {
            return None;
        }
        self.forced_defense_pending = false;
        self.recent_hits = 0;
        self.last_hit = None;
        Some(ForcedDefense {
            guard: self.last_side,
        })
    }

    /// Hits in the current run.
    #[must_use]
    pub fn recent_hits(&self) -> u32 {
        self.recent_hits
    }

    /// Time of the last registered hit.
    #[must_use]
    pub fn last_hit(&self) -> Option<f64> {
        self.last_hit
    }

    /// Returns true while a forced defense waits for the next decision.
    #[must_use]
    pub fn forced_defense_pending(&self) -> bool {
        self.forced_defense_pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> HitWindowConfig {
        HitWindowConfig {
            hits_to_trigger_defense: 3,
            window: 1.5,
        }
    }

    #[test]
    fn third_quick_hit_arms_defense() {
        let mut tracker = HitWindowTracker::new();
        assert!(!tracker.register_hit(0.0, Side::Left, &config()));
        assert!(!tracker.register_hit(0.5, Side::Left, &config()));
        assert!(tracker.register_hit(1.0, Side::Right, &config()));
        assert!(tracker.forced_defense_pending());
    }

    #[test]
    fn slow_hits_never_arm() {
        let mut tracker = HitWindowTracker::new();
        for i in 0..10 {
            assert!(!tracker.register_hit(f64::from(i) * 2.0, Side::Left, &config()));
            assert_eq!(tracker.recent_hits(), 1);
        }
        assert!(!tracker.forced_defense_pending());
    }

    #[test]
    fn take_consumes_exactly_once() {
        let mut tracker = HitWindowTracker::new();
        for t in [0.0, 0.1, 0.2] {
            tracker.register_hit(t, Side::Right, &config());
        }
        let forced = tracker.take_forced_defense().unwrap();
        assert_eq!(forced.guard, Some(Side::Right));
        assert_eq!(tracker.recent_hits(), 0);
        assert!(tracker.take_forced_defense().is_none());
    }

    #[test]
    fn hits_while_pending_do_not_rearm() {
        let mut tracker = HitWindowTracker::new();
        for t in [0.0, 0.1, 0.2] {
            tracker.register_hit(t, Side::Left, &config());
        }
        assert!(!tracker.register_hit(0.3, Side::Left, &config()));
        assert_eq!(tracker.recent_hits(), 4);
    }

    #[test]
    fn count_restarts_after_consumption() {
        let mut tracker = HitWindowTracker::new();
        for t in [0.0, 0.1, 0.2] {
            tracker.register_hit(t, Side::Left, &config());
        }
        tracker.take_forced_defense();
        assert!(!tracker.register_hit(0.3, Side::Left, &config()));
        assert_eq!(tracker.recent_hits(), 1);
    }
}
