//! Opponent decision engine.
//!
//! The engine runs a repeating cycle while the opponent lives:
//!
//! ```text
//! Ready ──choose + begin──▶ Acting(choice) ──action_finished──▶ Cooling ──tick──▶ Ready
//!   any ──halt──▶ Halted (terminal)
//! ```
//!
//! Only one cycle is ever in flight: a new action can be chosen only from
//! `Ready`. Execution of the chosen action (timelines, damage, presentation)
//! belongs to the session; the engine only decides and waits.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::actor::Side;
use crate::config::OpponentAiConfig;
use crate::hit_window::HitWindowTracker;
use crate::presentation::ActionKind;

/// A decided opponent action.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionChoice {
    /// Attack from a side.
    Attack(Side),
    /// Guard a side.
    Defend {
        /// Guarded lane.
        side: Side,
        /// Forced by hit spam rather than drawn.
        forced: bool,
    },
    /// Idle action.
    Idle,
}

impl ActionChoice {
    /// The action kind, used for duration and cooldown lookups.
    #[must_use]
    pub const fn kind(self) -> ActionKind {
        match self {
            Self::Attack(_) => ActionKind::Attack,
            Self::Defend { .. } => ActionKind::Defend,
            Self::Idle => ActionKind::Idle,
        }
    }
}

/// Where the decision cycle currently is.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum CyclePhase {
    /// Free to choose.
    Ready,
    /// The chosen action is playing.
    Acting(ActionChoice),
    /// Waiting out a post-action cooldown.
    Cooling {
        /// Seconds left.
        remaining: f32,
    },
    /// The opponent died; the cycle never resumes.
    Halted,
}

/// Maps a roll in `0..total_weight` onto an action kind.
///
/// `roll < attack` is an attack, `roll < attack + defend` a defense, anything
/// else idle.
#[must_use]
pub fn choose_weighted(config: &OpponentAiConfig, roll: u64) -> ActionKind {
    let attack = u64::from(config.attack.weight);
    let defend = attack + u64::from(config.defend.weight);
    if roll < attack {
        ActionKind::Attack
    } else if roll < defend {
        ActionKind::Defend
    } else {
        ActionKind::Idle
    }
}

/// The opponent's weighted, hit-reactive action selector.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionEngine {
    config: OpponentAiConfig,
    phase: CyclePhase,
}

impl DecisionEngine {
    /// Creates an engine ready to choose.
    #[must_use]
    pub fn new(config: OpponentAiConfig) -> Self {
        Self {
            config,
            phase: CyclePhase::Ready,
        }
    }

    /// Returns the action table.
    #[must_use]
    pub const fn config(&self) -> &OpponentAiConfig {
        &self.config
    }

    /// Returns the cycle phase.
    #[must_use]
    pub const fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Returns true if a new action may be chosen now.
    #[must_use]
    pub fn can_act(&self) -> bool {
        self.phase == CyclePhase::Ready
    }

    /// Returns true once the cycle has been stopped for good.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.phase == CyclePhase::Halted
    }

    /// Picks the next action.
    ///
    /// A pending forced defense wins over the weighted draw and is consumed,
    /// guarding the side of the most recent hit. Otherwise a weight roll
    /// picks the kind and a coin flip picks the side.
    pub fn choose_next_action<R: Rng + ?Sized>(
        &self,
        hit_window: Option<&mut HitWindowTracker>,
        rng: &mut R,
    ) -> ActionChoice {
        if let Some(forced) = hit_window.and_then(HitWindowTracker::take_forced_defense) {
            let side = forced
                .guard
                .unwrap_or_else(|| Side::from_coin(rng.gen_bool(0.5)));
            return ActionChoice::Defend { side, forced: true };
        }

        let total = self.config.total_weight();
        if total == 0 {
            return ActionChoice::Idle;
        }
        match choose_weighted(&self.config, rng.gen_range(0..total)) {
            ActionKind::Attack => ActionChoice::Attack(Side::from_coin(rng.gen_bool(0.5))),
            ActionKind::Defend => ActionChoice::Defend {
                side: Side::from_coin(rng.gen_bool(0.5)),
                forced: false,
            },
            _ => ActionChoice::Idle,
        }
    }

    /// Marks `choice` as playing. Ignored unless the engine is ready.
    pub fn begin(&mut self, choice: ActionChoice) {
        if self.can_act() {
            self.phase = CyclePhase::Acting(choice);
        }
    }

    /// Ends the playing action and starts its cooldown.
    ///
    /// # Returns
    ///
    /// The sampled cooldown, or `None` if no action was playing.
    pub fn action_finished<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<f32> {
        let CyclePhase::Acting(choice) = self.phase else {
            return None;
        };
        let range = match choice.kind() {
            ActionKind::Attack => self.config.attack.cooldown,
            ActionKind::Defend => self.config.defend.cooldown,
            _ => self.config.idle.cooldown,
        };
        let remaining = range.sample(rng);
        self.phase = CyclePhase::Cooling { remaining };
        Some(remaining)
    }

    /// Advances the cooldown.
    pub fn tick(&mut self, dt: f32) {
        if let CyclePhase::Cooling { remaining } = self.phase {
            let left = remaining - dt.max(0.0);
            self.phase = if left <= 0.0 {
                CyclePhase::Ready
            } else {
                CyclePhase::Cooling { remaining: left }
            };
        }
    }

    /// Stops the cycle permanently.
    pub fn halt(&mut self) {
        self.phase = CyclePhase::Halted;
    }
}
