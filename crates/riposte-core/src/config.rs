//! Session configuration.
//!
//! All tunables of a duel live in [`SessionConfig`]. Every struct carries the
//! game's shipped values in its `Default` impl and deserializes with
//! `#[serde(default)]`, so a JSON file only needs the keys it overrides.
//!
//! Note that [`ActorConfig`]'s `Default` is the *player* profile. A partial
//! `"opponent"` object therefore fills missing keys from the player profile;
//! spell out opponent-specific values (range, bypass chance) when overriding.
//!
//! # Example
//!
//! ```
//! use riposte_core::config::SessionConfig;
//!
//! let config = SessionConfig::from_json_str(r#"{ "seed": 7, "player": { "attack_damage": 25 } }"#)
//!     .unwrap();
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.player.attack_damage, 25.0);
//! assert_eq!(config.player.max_health, 100.0);
//! ```

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::actor::ActorId;
use crate::error::ConfigError;
use crate::presentation::ActionKind;
use crate::rules::BlockPolicy;

// =============================================================================
// Actor
// =============================================================================

/// Per-actor combat tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Starting and maximum health.
    pub max_health: f32,
    /// Base damage of one attack.
    pub attack_damage: f32,
    /// Maximum attacker-to-target distance at the impact instant.
    pub attack_range: f32,
    /// Seconds from the attack cue to the impact instant.
    pub attack_impact_delay: f32,
    /// Percent chance (0-100) that an unguarded hit lands as a double-damage heavy hit.
    pub defense_bypass_chance: f32,
    /// Grace period from combat start during which hits are absorbed.
    pub start_invulnerability: f32,
    /// Position in the arena.
    pub position: Vec2,
    /// Combo scaling; `None` disables combos for this actor.
    pub combo: Option<ComboConfig>,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self::player()
    }
}

impl ActorConfig {
    /// The player's shipped profile.
    #[must_use]
    pub fn player() -> Self {
        Self {
            max_health: 100.0,
            attack_damage: 10.0,
            attack_range: 1.5,
            attack_impact_delay: 0.3,
            defense_bypass_chance: 0.0,
            start_invulnerability: 5.0,
            position: Vec2::ZERO,
            combo: Some(ComboConfig::default()),
        }
    }

    /// The opponent's shipped profile.
    #[must_use]
    pub fn opponent() -> Self {
        Self {
            max_health: 100.0,
            attack_damage: 10.0,
            attack_range: 2.0,
            attack_impact_delay: 0.3,
            defense_bypass_chance: 5.0,
            start_invulnerability: 0.0,
            position: Vec2::new(1.2, 0.0),
            combo: None,
        }
    }

    fn validate(&self, who: &'static str) -> Result<(), ConfigError> {
        positive(who, "max_health", self.max_health)?;
        non_negative(who, "attack_damage", self.attack_damage)?;
        non_negative(who, "attack_range", self.attack_range)?;
        non_negative(who, "attack_impact_delay", self.attack_impact_delay)?;
        non_negative(who, "start_invulnerability", self.start_invulnerability)?;
        percent(who, "defense_bypass_chance", self.defense_bypass_chance)?;
        if let Some(combo) = &self.combo {
            combo.validate(who)?;
        }
        Ok(())
    }
}

/// Combo scaling of attack duration.
///
/// `effective = max(min_attack_duration, base * (1 - (count - 1) * speed_factor))`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    /// A gap longer than this between attacks restarts the combo at 1.
    pub reset_window: f32,
    /// Fraction of the base duration removed per combo step.
    pub speed_factor: f32,
    /// Floor for the scaled attack duration.
    pub min_attack_duration: f32,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            reset_window: 1.0,
            speed_factor: 0.1,
            min_attack_duration: 0.4,
        }
    }
}

impl ComboConfig {
    fn validate(&self, who: &'static str) -> Result<(), ConfigError> {
        non_negative(who, "combo.reset_window", self.reset_window)?;
        non_negative(who, "combo.speed_factor", self.speed_factor)?;
        non_negative(who, "combo.min_attack_duration", self.min_attack_duration)
    }
}

// =============================================================================
// Opponent AI
// =============================================================================

/// Inclusive range of seconds, sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationRange {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl DurationRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// A degenerate range that always yields `secs`.
    #[must_use]
    pub const fn fixed(secs: f32) -> Self {
        Self::new(secs, secs)
    }

    /// Draws a duration from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        non_negative("opponent_ai", field, self.min)?;
        non_negative("opponent_ai", field, self.max)?;
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Selection weight and post-action cooldown of one opponent action kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Relative selection probability.
    pub weight: u32,
    /// Pause after the action completes before the next decision.
    pub cooldown: DurationRange,
}

impl ActionConfig {
    /// Creates an action config.
    #[must_use]
    pub const fn new(weight: u32, cooldown: DurationRange) -> Self {
        Self { weight, cooldown }
    }
}

/// Weighted action table of the opponent decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentAiConfig {
    /// Attack from a coin-flipped side.
    pub attack: ActionConfig,
    /// Guard a coin-flipped side.
    pub defend: ActionConfig,
    /// Idle animation.
    pub idle: ActionConfig,
}

impl Default for OpponentAiConfig {
    fn default() -> Self {
        Self {
            attack: ActionConfig::new(50, DurationRange::new(1.0, 3.0)),
            defend: ActionConfig::new(30, DurationRange::new(1.0, 3.0)),
            idle: ActionConfig::new(20, DurationRange::new(1.0, 3.0)),
        }
    }
}

impl OpponentAiConfig {
    /// Sum of all weights. Widened so that no combination of `u32` weights
    /// can overflow.
    #[must_use]
    pub fn total_weight(&self) -> u64 {
        u64::from(self.attack.weight) + u64::from(self.defend.weight) + u64::from(self.idle.weight)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.total_weight() == 0 {
            return Err(ConfigError::NoActionWeight);
        }
        self.attack.cooldown.validate("attack.cooldown")?;
        self.defend.cooldown.validate("defend.cooldown")?;
        self.idle.cooldown.validate("idle.cooldown")
    }
}

/// Forced-defense escalation after rapid repeated hits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitWindowConfig {
    /// Hits within the window that arm a forced defense.
    pub hits_to_trigger_defense: u32,
    /// A gap longer than this between hits restarts the count.
    pub window: f32,
}

impl Default for HitWindowConfig {
    fn default() -> Self {
        Self {
            hits_to_trigger_defense: 3,
            window: 1.5,
        }
    }
}

// =============================================================================
// Presentation timings
// =============================================================================

/// Durations used when the timing provider has no clip for an action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackDurations {
    /// Full attack animation.
    pub attack: f32,
    /// Defense window.
    pub defend: f32,
    /// Idle action.
    pub idle: f32,
    /// Hurt stagger.
    pub hurt: f32,
    /// Death animation.
    pub death: f32,
}

impl Default for FallbackDurations {
    fn default() -> Self {
        Self {
            attack: 0.8,
            defend: 0.5,
            idle: 1.0,
            hurt: 0.4,
            death: 1.0,
        }
    }
}

impl FallbackDurations {
    /// Returns the fallback for an action kind.
    #[must_use]
    pub const fn get(&self, kind: ActionKind) -> f32 {
        match kind {
            ActionKind::Attack => self.attack,
            ActionKind::Defend => self.defend,
            ActionKind::Idle => self.idle,
            ActionKind::Hurt => self.hurt,
            ActionKind::Death => self.death,
        }
    }
}

/// UI timings of the presentation side effects the core drives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiTimings {
    /// Fade of the victory/defeat panel during the death sequence.
    pub reveal_fade: f32,
    /// Fade of the focus overlay.
    pub focus_fade: f32,
    /// How long the damage flash stays up.
    pub damage_flash: f32,
    /// Fade-in of the damage flash while focused.
    pub damage_flash_fade_in: f32,
    /// Fade-out of the damage flash while focused.
    pub damage_flash_fade_out: f32,
    /// How long a combo marker stays up.
    pub combo_marker: f32,
    /// Number of combo marker slots.
    pub combo_markers: u8,
}

impl Default for UiTimings {
    fn default() -> Self {
        Self {
            reveal_fade: 0.3,
            focus_fade: 0.3,
            damage_flash: 1.5,
            damage_flash_fade_in: 0.2,
            damage_flash_fade_out: 0.3,
            combo_marker: 1.0,
            combo_markers: 4,
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Everything needed to start a duel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed of the session RNG.
    pub seed: u64,
    /// Player tunables.
    pub player: ActorConfig,
    /// Opponent tunables.
    pub opponent: ActorConfig,
    /// Opponent action table.
    pub opponent_ai: OpponentAiConfig,
    /// Opponent forced-defense rule.
    pub hit_window: HitWindowConfig,
    /// Warning phase before each opponent attack.
    pub telegraph_duration: f32,
    /// How a guarded hit is treated (applies to both actors).
    pub block_policy: BlockPolicy,
    /// Invulnerability granted after each landed hit.
    pub hit_invulnerability: f32,
    /// Player impacts only connect while focus is held.
    pub require_focus_to_hit: bool,
    /// Wall-clock seconds the intro panel holds the duel paused.
    pub intro_duration: f32,
    /// Fallback animation durations.
    pub fallback_durations: FallbackDurations,
    /// UI timings.
    pub ui: UiTimings,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            player: ActorConfig::player(),
            opponent: ActorConfig::opponent(),
            opponent_ai: OpponentAiConfig::default(),
            hit_window: HitWindowConfig::default(),
            telegraph_duration: 0.5,
            block_policy: BlockPolicy::Perfect,
            hit_invulnerability: 0.0,
            require_focus_to_hit: false,
            intro_duration: 0.0,
            fallback_durations: FallbackDurations::default(),
            ui: UiTimings::default(),
        }
    }
}

impl SessionConfig {
    /// Parses and validates a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on malformed input and any validation
    /// error from [`SessionConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the tunables of one actor.
    #[must_use]
    pub const fn actor(&self, id: ActorId) -> &ActorConfig {
        match id {
            ActorId::Player => &self.player,
            ActorId::Opponent => &self.opponent,
        }
    }

    /// Checks every numeric range.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.player.validate("player")?;
        self.opponent.validate("opponent")?;
        self.opponent_ai.validate()?;
        if self.hit_window.hits_to_trigger_defense == 0 {
            return Err(ConfigError::OutOfRange {
                scope: "session",
                field: "hit_window.hits_to_trigger_defense",
                expected: ">= 1",
                value: 0.0,
            });
        }
        non_negative("session", "hit_window.window", self.hit_window.window)?;
        non_negative("session", "telegraph_duration", self.telegraph_duration)?;
        non_negative("session", "hit_invulnerability", self.hit_invulnerability)?;
        non_negative("session", "intro_duration", self.intro_duration)?;
        if let BlockPolicy::Reduce { fraction } = self.block_policy {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(ConfigError::OutOfRange {
                    scope: "session",
                    field: "block_policy.fraction",
                    expected: "within 0..=1",
                    value: fraction,
                });
            }
        }
        let fallback = &self.fallback_durations;
        for (field, value) in [
            ("fallback_durations.attack", fallback.attack),
            ("fallback_durations.defend", fallback.defend),
            ("fallback_durations.idle", fallback.idle),
            ("fallback_durations.hurt", fallback.hurt),
            ("fallback_durations.death", fallback.death),
        ] {
            non_negative("session", field, value)?;
        }
        Ok(())
    }
}

// =============================================================================
// Range checks
// =============================================================================

fn positive(scope: &'static str, field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            scope,
            field,
            expected: "> 0",
            value,
        })
    }
}

fn non_negative(scope: &'static str, field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            scope,
            field,
            expected: ">= 0",
            value,
        })
    }
}

fn percent(scope: &'static str, field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            scope,
            field,
            expected: "within 0..=100",
            value,
        })
    }
}
