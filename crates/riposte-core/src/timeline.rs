//! Per-actor timelines of timed steps.
//!
//! A [`Timeline`] replaces engine coroutine waits: an action is scheduled as a
//! FIFO of [`Step`]s, each a tagged [`StepKind`] plus its remaining duration.
//! The session advances every actor's timeline once per tick and reacts to the
//! steps that completed.
//!
//! # Leftover time
//!
//! When a step finishes partway through a tick, the unused part of the delta
//! flows into the next step. Large frame deltas therefore complete several
//! steps in one call, in order, and the outcome does not depend on frame rate.
//!
//! # Example
//!
//! ```
//! use riposte_core::timeline::{StepKind, Timeline};
//!
//! let mut timeline = Timeline::new();
//! timeline.push(StepKind::Guard, 0.5);
//! timeline.push(StepKind::Rest, 1.0);
//!
//! assert!(timeline.advance(0.25).is_empty());
//! assert_eq!(timeline.advance(0.5), vec![StepKind::Guard]);
//! assert!((timeline.front().unwrap().remaining - 0.75).abs() < 1e-6);
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::actor::Side;

/// What a timed step is waiting for.
///
/// The completion of each step is a resumption point: the session checks that
/// the owner is still alive before acting on anything but the death steps.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
    /// Warning phase before an attack cue fires.
    Telegraph {
        /// Lane of the coming attack.
        side: Side,
    },
    /// Attack cue fired; waiting for the impact instant.
    Windup {
        /// Lane of the attack.
        side: Side,
    },
    /// Rest of the attack animation after impact.
    Recovery,
    /// Defense window.
    Guard,
    /// Idle action (taunt/breather).
    Rest,
    /// Hurt animation.
    Stagger,
    /// Death animation.
    DeathFall,
    /// Outcome panel reveal; the actor is removed when it ends.
    DeathReveal,
}

impl StepKind {
    /// Returns true for the steps of the death sequence.
    #[must_use]
    pub const fn is_death_sequence(self) -> bool {
        matches!(self, Self::DeathFall | Self::DeathReveal)
    }
}

/// A step and its remaining duration in simulation seconds.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// The tagged state.
    pub kind: StepKind,
    /// Seconds left before completion.
    pub remaining: f32,
}

/// FIFO of timed steps owned by one actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    steps: VecDeque<Step>,
}

impl Timeline {
    /// Creates an empty timeline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            steps: VecDeque::new(),
        }
    }

    /// Appends a step. Negative durations are treated as zero.
    pub fn push(&mut self, kind: StepKind, duration: f32) {
        self.steps.push_back(Step {
            kind,
            remaining: duration.max(0.0),
        });
    }

    /// Advances the head of the timeline by `dt` seconds.
    ///
    /// # Returns
    ///
    /// The kinds of all steps that completed, in completion order.
    pub fn advance(&mut self, dt: f32) -> Vec<StepKind> {
        let mut budget = dt.max(0.0);
        let mut completed = Vec::new();
        while let Some(front) = self.steps.front_mut() {
            if front.remaining <= budget {
                budget -= front.remaining;
                completed.push(front.kind);
                self.steps.pop_front();
            } else {
                front.remaining -= budget;
                break;
            }
        }
        completed
    }

    /// Drops every pending step, returning how many were cancelled.
    pub fn clear(&mut self) -> usize {
        let cancelled = self.steps.len();
        self.steps.clear();
        cancelled
    }

    /// Returns the step currently running.
    #[must_use]
    pub fn front(&self) -> Option<&Step> {
        self.steps.front()
    }

    /// Returns true if nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns the number of pending steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns the total time until the timeline drains.
    #[must_use]
    pub fn remaining_total(&self) -> f32 {
        self.steps.iter().map(|step| step.remaining).sum()
    }

    /// Iterates pending steps in order.
    pub fn iter(&self) -> impl Iterator<Item = &Step> + '_ {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_timeline_completes_nothing() {
        let mut timeline = Timeline::new();
        assert!(timeline.advance(10.0).is_empty());
    }

    #[test]
    fn leftover_time_carries_into_next_step() {
        let mut timeline = Timeline::new();
        timeline.push(StepKind::Telegraph { side: Side::Left }, 0.5);
        timeline.push(StepKind::Windup { side: Side::Left }, 0.3);
        timeline.push(StepKind::Recovery, 0.5);

        let completed = timeline.advance(0.9);
        assert_eq!(
            completed,
            vec![
                StepKind::Telegraph { side: Side::Left },
                StepKind::Windup { side: Side::Left },
            ]
        );
        let head = timeline.front().unwrap();
        assert_eq!(head.kind, StepKind::Recovery);
        assert!((head.remaining - 0.4).abs() < 1e-5);
    }

    #[test]
    fn zero_duration_step_completes_on_zero_delta() {
        let mut timeline = Timeline::new();
        timeline.push(StepKind::Recovery, 0.0);
        assert_eq!(timeline.advance(0.0), vec![StepKind::Recovery]);
        assert!(timeline.is_empty());
    }

    #[test]
    fn negative_duration_is_clamped() {
        let mut timeline = Timeline::new();
        timeline.push(StepKind::Guard, -3.0);
        assert_eq!(timeline.front().unwrap().remaining, 0.0);
    }

    #[test]
    fn clear_reports_cancelled_steps() {
        let mut timeline = Timeline::new();
        timeline.push(StepKind::Rest, 1.0);
        timeline.push(StepKind::Stagger, 1.0);
        assert_eq!(timeline.clear(), 2);
        assert!(timeline.is_empty());
    }

    #[test]
    fn remaining_total_sums_steps() {
        let mut timeline = Timeline::new();
        timeline.push(StepKind::DeathFall, 1.0);
        timeline.push(StepKind::DeathReveal, 0.3);
        assert!((timeline.remaining_total() - 1.3).abs() < 1e-6);
        assert_eq!(timeline.len(), 2);
    }

    #[test]
    fn death_steps_are_flagged() {
        assert!(StepKind::DeathFall.is_death_sequence());
        assert!(StepKind::DeathReveal.is_death_sequence());
        assert!(!StepKind::Stagger.is_death_sequence());
    }
}
