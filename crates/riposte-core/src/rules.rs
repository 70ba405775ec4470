//! Damage resolution.
//!
//! [`DamageRules`] is the combat arbiter's rulebook, applied identically to
//! both duelists. A [`Hit`] arrives at the impact instant of an attack (or
//! from a direct [`take_damage`](crate::session::CombatSession::take_damage)
//! call) and is resolved in a fixed order:
//!
//! 1. Dead or invulnerable targets absorb the hit silently.
//! 2. A target guarding the hit's side blocks it according to [`BlockPolicy`].
//! 3. An unguarded hit rolls the attacker's bypass chance; success doubles it.
//! 4. Health is clamped to `0..=max_health`.
//! 5. Zero health kills the target. A surviving target that was idle is
//!    staggered into `Hurt`; any other state is left alone.
//!
//! Side effects toward presentation (audio, health bars, hit-window
//! bookkeeping) are the session's job; this module only mutates the target.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::actor::{ActionState, ActorId, CombatActor, Side};

/// Multiplier applied to heavy hits.
pub const HEAVY_HIT_MULTIPLIER: f32 = 2.0;

/// How a guarded hit is treated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockPolicy {
    /// A matching guard negates all damage.
    #[default]
    Perfect,
    /// A matching guard lets `fraction` of the damage through, floored to whole points.
    Reduce {
        /// Share of base damage that still applies, in `0..=1`.
        fraction: f32,
    },
}

impl BlockPolicy {
    /// Damage that passes a matching guard.
    #[must_use]
    pub fn blocked_damage(self, base_damage: f32) -> f32 {
        match self {
            Self::Perfect => 0.0,
            Self::Reduce { fraction } => (base_damage * fraction).floor().max(0.0),
        }
    }
}

/// A single damage instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Who dealt it.
    pub source: ActorId,
    /// Lane it came from.
    pub side: Side,
    /// Damage before blocking and heavy-hit scaling.
    pub base_damage: f32,
    /// Attacker's heavy-hit chance, in percent.
    pub bypass_chance: f32,
}

/// Why a hit was absorbed without effect.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreReason {
    /// The target was already dead.
    Dead,
    /// The target was inside an invulnerability window.
    Invulnerable,
    /// The base damage was negative or not finite.
    InvalidDamage,
}

/// Result of resolving one [`Hit`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum HitOutcome {
    /// Absorbed; nothing changed.
    Ignored(IgnoreReason),
    /// Met a matching guard. `damage` is whatever the block policy let through.
    Blocked {
        /// Damage applied despite the guard.
        damage: f32,
        /// The leak-through damage was lethal.
        killed: bool,
    },
    /// Unguarded.
    Landed {
        /// Damage applied.
        damage: f32,
        /// The bypass roll succeeded.
        heavy: bool,
        /// The target was idle and is now `Hurt`.
        interrupted: bool,
        /// The hit was lethal.
        killed: bool,
    },
}

impl HitOutcome {
    /// Damage applied to health.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        match self {
            Self::Ignored(_) => 0.0,
            Self::Blocked { damage, .. } | Self::Landed { damage, .. } => *damage,
        }
    }

    /// Returns true if the target died from this hit.
    #[must_use]
    pub const fn killed(&self) -> bool {
        match self {
            Self::Ignored(_) => false,
            Self::Blocked { killed, .. } | Self::Landed { killed, .. } => *killed,
        }
    }

    /// Returns true for unguarded hits.
    #[must_use]
    pub const fn is_landed(&self) -> bool {
        matches!(self, Self::Landed { .. })
    }
}

/// The shared damage rulebook.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DamageRules {
    /// Guard treatment.
    pub block_policy: BlockPolicy,
    /// Invulnerability granted after a landed hit, in seconds.
    pub hit_invulnerability: f32,
}

impl DamageRules {
    /// Creates a rulebook.
    #[must_use]
    pub const fn new(block_policy: BlockPolicy, hit_invulnerability: f32) -> Self {
        Self {
            block_policy,
            hit_invulnerability,
        }
    }

    /// Resolves `hit` against `target` at simulation time `now`.
    ///
    /// The RNG is consumed only for unguarded hits with a bypass chance
    /// strictly between 0 and 100, so guaranteed outcomes do not perturb the
    /// stream. Negative or non-finite base damage is ignored outright.
    pub fn apply_hit<R: Rng + ?Sized>(
        &self,
        target: &mut CombatActor,
        hit: Hit,
        now: f64,
        rng: &mut R,
    ) -> HitOutcome {
        if target.is_dead() {
            return HitOutcome::Ignored(IgnoreReason::Dead);
        }
        if target.is_invulnerable(now) {
            return HitOutcome::Ignored(IgnoreReason::Invulnerable);
        }
        if !hit.base_damage.is_finite() || hit.base_damage < 0.0 {
            return HitOutcome::Ignored(IgnoreReason::InvalidDamage);
        }

        if target.facing_defense() == Some(hit.side) {
            let damage = self.block_policy.blocked_damage(hit.base_damage);
            let killed = Self::subtract(target, damage);
            if killed {
                target.set_state(ActionState::Dead);
            }
            return HitOutcome::Blocked { damage, killed };
        }

        let heavy = roll_heavy(hit.bypass_chance, rng);
        let damage = if heavy {
            hit.base_damage * HEAVY_HIT_MULTIPLIER
        } else {
            hit.base_damage
        };
        let killed = Self::subtract(target, damage);

        let mut interrupted = false;
        if killed {
            target.set_state(ActionState::Dead);
        } else if target.state().is_idle() {
            target.set_state(ActionState::Hurt);
            interrupted = true;
        }

        if !killed && self.hit_invulnerability > 0.0 {
            target.invulnerable_until = now + f64::from(self.hit_invulnerability);
        }

        HitOutcome::Landed {
            damage,
            heavy,
            interrupted,
            killed,
        }
    }

    fn subtract(target: &mut CombatActor, damage: f32) -> bool {
        target.set_health(target.health() - damage);
        target.health() <= 0.0
    }
}

/// Rolls `uniform(0, 100) < chance`.
fn roll_heavy<R: Rng + ?Sized>(chance: f32, rng: &mut R) -> bool {
    if chance <= 0.0 {
        false
    } else if chance >= 100.0 {
        true
    } else {
        rng.gen_range(0.0_f32..100.0) < chance
    }
}
