//! Combat actors: the two duelists and their per-actor state.
//!
//! This module provides the core actor types for Riposte's duel simulation:
//! - [`ActorId`]: Which of the two duelists an actor is
//! - [`Side`]: The left/right lane an attack or guard occupies
//! - [`ActionState`]: The actor state machine (`Idle`, `Attacking`, `Defending`, `Hurt`, `Dead`)
//! - [`StatusFlags`]: Terminal and presentation flags (death sequence guard, focus)
//! - [`CombatActor`]: The complete actor container
//!
//! # Ownership
//!
//! Each actor owns its own [`ComboTracker`], [`HitWindowTracker`] and
//! [`Timeline`]. Nothing is shared between the two actors; the session is the
//! single owner that mutates both.
//!
//! # Example
//!
//! ```
//! use riposte_core::actor::{ActionState, ActorId, CombatActor, Side};
//! use glam::Vec2;
//!
//! let mut actor = CombatActor::new(ActorId::Player, 100.0, Vec2::ZERO);
//! assert_eq!(actor.state(), ActionState::Idle);
//! assert_eq!(actor.facing_defense(), None);
//!
//! actor.set_state(ActionState::Defending(Side::Left));
//! assert_eq!(actor.facing_defense(), Some(Side::Left));
//! ```

use std::fmt;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::combo::ComboTracker;
use crate::hit_window::HitWindowTracker;
use crate::timeline::Timeline;

// =============================================================================
// Identification
// =============================================================================

/// Identifies one of the two duelists.
///
/// The duel always has exactly two actors. Iteration over [`ActorId::ALL`]
/// is the fixed processing order used by the session every tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActorId {
    /// The human-controlled duelist.
    Player,
    /// The AI-controlled duelist.
    Opponent,
}

impl ActorId {
    /// Both actors, in per-tick processing order.
    pub const ALL: [ActorId; 2] = [ActorId::Player, ActorId::Opponent];

    /// Returns the other duelist.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Opponent,
            Self::Opponent => Self::Player,
        }
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Opponent => write!(f, "opponent"),
        }
    }
}

/// The lane an attack comes from or a guard covers.
///
/// An unguarded actor has no side; that is modelled as `Option<Side>::None`
/// rather than a third variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Left lane.
    Left,
    /// Right lane.
    Right,
}

impl Side {
    /// Returns the other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Maps a fair coin flip onto a side (`true` is left).
    #[must_use]
    pub const fn from_coin(heads: bool) -> Self {
        if heads {
            Self::Left
        } else {
            Self::Right
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

// =============================================================================
// State machine
// =============================================================================

/// The actor state machine.
///
/// Exactly one state is active at a time. `Dead` is terminal.
///
/// ```text
/// Idle ──attack──▶ Attacking(side) ──recovery──▶ Idle
/// Idle ──defend──▶ Defending(side) ──guard ends─▶ Idle
/// Idle ──hit─────▶ Hurt ──────────stagger ends─▶ Idle
/// any  ──health 0─▶ Dead
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ActionState {
    /// Accepting new actions.
    #[default]
    Idle,
    /// Playing an attack from the given side.
    Attacking(Side),
    /// Guarding the given side.
    Defending(Side),
    /// Staggered by a hit taken while idle.
    Hurt,
    /// Terminal.
    Dead,
}

impl ActionState {
    /// Returns true for [`ActionState::Idle`].
    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns true while an attack is playing.
    #[must_use]
    pub const fn is_attacking(self) -> bool {
        matches!(self, Self::Attacking(_))
    }

    /// Returns the guarded side; only `Some` while defending.
    #[must_use]
    pub const fn facing_defense(self) -> Option<Side> {
        match self {
            Self::Defending(side) => Some(side),
            _ => None,
        }
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Attacking(side) => write!(f, "attacking-{side}"),
            Self::Defending(side) => write!(f, "defending-{side}"),
            Self::Hurt => write!(f, "hurt"),
            Self::Dead => write!(f, "dead"),
        }
    }
}

bitflags! {
    /// Lifecycle and presentation flags of an actor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct StatusFlags: u8 {
        /// Health reached zero. Damage and commands are no-ops from here on.
        const DEAD = 1 << 0;
        /// The one-shot death sequence has been queued.
        const DEATH_SEQUENCE_STARTED = 1 << 1;
        /// The death sequence finished; the actor is out of the simulation.
        const REMOVED = 1 << 2;
        /// Focus stance (the player's special overlay) is held.
        const FOCUSED = 1 << 3;
    }
}

// =============================================================================
// CombatActor
// =============================================================================

/// One duelist.
///
/// Invariants maintained by every mutator in this crate:
/// - `0 <= health <= max_health`
/// - `state == Dead` if and only if `flags` contains [`StatusFlags::DEAD`]
/// - `facing_defense()` is `Some` only while `state` is `Defending`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatActor {
    id: ActorId,
    health: f32,
    max_health: f32,
    state: ActionState,
    position: Vec2,
    /// Simulation time before which hits are absorbed.
    pub invulnerable_until: f64,
    /// Lifecycle flags.
    pub flags: StatusFlags,
    /// Consecutive-attack counter, when this actor scales attacks by combo.
    pub combo: Option<ComboTracker>,
    /// Recent-hit counter, when this actor reacts to hit spam.
    pub hit_window: Option<HitWindowTracker>,
    /// Pending timed steps.
    pub timeline: Timeline,
}

impl CombatActor {
    /// Creates an idle actor at full health.
    #[must_use]
    pub fn new(id: ActorId, max_health: f32, position: Vec2) -> Self {
        Self {
            id,
            health: max_health,
            max_health,
            state: ActionState::Idle,
            position,
            invulnerable_until: 0.0,
            flags: StatusFlags::empty(),
            combo: None,
            hit_window: None,
            timeline: Timeline::new(),
        }
    }

    /// Attaches a combo tracker.
    #[must_use]
    pub fn with_combo(mut self) -> Self {
        self.combo = Some(ComboTracker::new());
        self
    }

    /// Attaches a hit window tracker.
    #[must_use]
    pub fn with_hit_window(mut self) -> Self {
        self.hit_window = Some(HitWindowTracker::new());
        self
    }

    /// Sets the initial grace period.
    #[must_use]
    pub fn with_invulnerability_until(mut self, until: f64) -> Self {
        self.invulnerable_until = until;
        self
    }

    /// Returns which duelist this is.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Returns current health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Returns maximum health.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Returns health as a fraction of maximum, for health bars.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    /// Sets health, clamped to `0..=max_health`.
    pub fn set_health(&mut self, health: f32) {
        self.health = health.clamp(0.0, self.max_health);
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> ActionState {
        self.state
    }

    /// Moves the state machine, returning the previous state.
    ///
    /// Entering `Dead` also sets [`StatusFlags::DEAD`]. Leaving `Dead` is not
    /// possible; such requests are ignored.
    pub fn set_state(&mut self, to: ActionState) -> ActionState {
        let from = self.state;
        if from == ActionState::Dead {
            return from;
        }
        if to == ActionState::Dead {
            self.flags.insert(StatusFlags::DEAD);
        }
        self.state = to;
        from
    }

    /// Returns the guarded side, if defending.
    #[must_use]
    pub const fn facing_defense(&self) -> Option<Side> {
        self.state.facing_defense()
    }

    /// Returns the actor position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves the actor.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Returns true once health has reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.flags.contains(StatusFlags::DEAD)
    }

    /// Returns true after the death sequence completed.
    #[must_use]
    pub const fn is_removed(&self) -> bool {
        self.flags.contains(StatusFlags::REMOVED)
    }

    /// Returns true if hits at `now` are absorbed by invulnerability.
    #[must_use]
    pub fn is_invulnerable(&self, now: f64) -> bool {
        now < self.invulnerable_until
    }

    /// Returns true if a new command can start right now.
    #[must_use]
    pub fn accepts_commands(&self) -> bool {
        !self.is_dead() && self.state.is_idle() && self.timeline.is_empty()
    }
}
