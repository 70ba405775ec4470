//! Consecutive-attack tracking.
//!
//! Each accepted attack registers with the attacker's [`ComboTracker`]. Attacks
//! chained within `reset_window` seconds of the previous one raise the count;
//! a longer gap restarts it at 1. The count only shortens the attack
//! animation (see [`effective_duration`]); it does not change damage.

use serde::{Deserialize, Serialize};

use crate::actor::Side;
use crate::config::ComboConfig;

/// Combo counter of one actor.
///
/// `count` is always at least 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboTracker {
    count: u32,
    last_action: Option<f64>,
    last_side: Option<Side>,
}

impl Default for ComboTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ComboTracker {
    /// Creates a tracker that has not seen an attack yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            count: 1,
            last_action: None,
            last_side: None,
        }
    }

    /// Registers an attack at `now` and returns the updated count.
    pub fn register(&mut self, now: f64, side: Side, reset_window: f32) -> u32 {
        let chained = self
            .last_action
            .is_some_and(|last| now - last <= f64::from(reset_window));
        self.count = if chained { self.count.saturating_add(1) } else { 1 };
        self.last_action = Some(now);
        self.last_side = Some(side);
        self.count
    }

    /// Current count.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Time of the last registered attack.
    #[must_use]
    pub fn last_action(&self) -> Option<f64> {
        self.last_action
    }

    /// Side of the last registered attack.
    #[must_use]
    pub fn last_side(&self) -> Option<Side> {
        self.last_side
    }
}

/// Scales an attack duration by combo count.
///
/// # Example
///
/// ```
/// use riposte_core::combo::effective_duration;
/// use riposte_core::config::ComboConfig;
///
/// let config = ComboConfig::default(); // factor 0.1, floor 0.4
/// assert!((effective_duration(0.8, 1, &config) - 0.8).abs() < 1e-6);
/// assert!((effective_duration(0.8, 3, &config) - 0.64).abs() < 1e-6);
/// assert!((effective_duration(0.8, 9, &config) - 0.4).abs() < 1e-6);
/// ```
#[must_use]
pub fn effective_duration(base: f32, count: u32, config: &ComboConfig) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let steps = count.saturating_sub(1) as f32;
    let scaled = base * (1.0 - steps * config.speed_factor);
    scaled.max(config.min_attack_duration)
}
