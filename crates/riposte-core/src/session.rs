//! The duel session: combat arbiter and single advance function.
//!
//! A [`CombatSession`] owns both [`CombatActor`]s, the opponent's
//! [`DecisionEngine`], the shared [`DamageRules`], the session RNG and the
//! bound presentation collaborators. The host drives it with
//! [`CombatSession::step`] once per frame and feeds player input through
//! [`CombatSession::command`].
//!
//! # Tick phases
//!
//! Each call to `step` runs, in order:
//!
//! 1. **Intro**: the intro panel consumes wall time; the clock stays paused
//!    until it is done.
//! 2. **Clock**: simulation time advances (zero while paused).
//! 3. **Overlays**: timed panels (damage flash, combo markers) count down.
//! 4. **Timelines**: each actor's timeline advances in [`ActorId::ALL`] order
//!    and completed steps are acted on. A dead actor only acts on its death
//!    steps.
//! 5. **Decision**: the opponent's cooldown advances; if it is ready and
//!    free, the next action is chosen and started.
//!
//! # Determinism
//!
//! All randomness comes from one `ChaCha8Rng` seeded from the config and is
//! consumed in tick-phase order, so the same seed, config and input sequence
//! always produce the same event log.
//!
//! # Example
//!
//! ```
//! use riposte_core::actor::{ActorId, Side};
//! use riposte_core::config::SessionConfig;
//! use riposte_core::presentation::{FixedTimings, NullPresentation};
//! use riposte_core::session::{CommandOutcome, SessionBuilder};
//!
//! let mut session = SessionBuilder::new()
//!     .config(SessionConfig { seed: 7, ..SessionConfig::default() })
//!     .timings(FixedTimings::standard())
//!     .presentation(NullPresentation)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(session.player_attack(Side::Left), CommandOutcome::Accepted);
//! for _ in 0..60 {
//!     session.step(1.0 / 60.0);
//! }
//! assert!(session.player().state().is_idle());
//! assert!(!session.take_events().is_empty());
//! ```

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info, warn};

use crate::actor::{ActionState, ActorId, CombatActor, Side, StatusFlags};
use crate::clock::SimClock;
use crate::combo::effective_duration;
use crate::config::{ActorConfig, SessionConfig};
use crate::decision::{ActionChoice, DecisionEngine};
use crate::error::SetupError;
use crate::event::{CombatEvent, EventLog, EventRecord, WhiffReason};
use crate::presentation::{ActionKind, AudioCategory, Cue, Panel, Presentation, TimingProvider};
use crate::rules::{DamageRules, Hit, HitOutcome};
use crate::timeline::StepKind;

// =============================================================================
// Commands and outcomes
// =============================================================================

/// An action request for one actor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActorCommand {
    /// Attack from a side.
    Attack(Side),
    /// Guard a side.
    Defend(Side),
}

/// Why a command was refused.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The actor is dead.
    Dead,
    /// The duel already has a winner.
    Finished,
    /// The simulation clock is stopped.
    Paused,
    /// The actor is not idle.
    Busy,
}

/// Result of [`CombatSession::command`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The action started.
    Accepted,
    /// Nothing changed.
    Rejected(RejectReason),
}

/// Who won, if anyone yet.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SessionOutcome {
    /// Both duelists stand.
    #[default]
    Ongoing,
    /// The opponent died.
    Victory,
    /// The player died.
    Defeat,
}

/// A panel that hides itself after a delay.
#[derive(Debug, Copy, Clone, PartialEq)]
struct OverlayTimer {
    panel: Panel,
    remaining: f32,
    fade_out: Option<f32>,
}

// =============================================================================
// Builder
// =============================================================================

/// Binds collaborators and configuration into a [`CombatSession`].
///
/// Both collaborators are required; they are resolved once here and never
/// looked up again.
#[derive(Default)]
pub struct SessionBuilder {
    config: SessionConfig,
    timings: Option<Box<dyn TimingProvider>>,
    presentation: Option<Box<dyn Presentation>>,
}

impl SessionBuilder {
    /// Starts a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the timing provider.
    #[must_use]
    pub fn timings(mut self, timings: impl TimingProvider + 'static) -> Self {
        self.timings = Some(Box::new(timings));
        self
    }

    /// Binds the presentation sink.
    #[must_use]
    pub fn presentation(mut self, presentation: impl Presentation + 'static) -> Self {
        self.presentation = Some(Box::new(presentation));
        self
    }

    /// Validates and assembles the session.
    ///
    /// # Errors
    ///
    /// - [`SetupError::InvalidActorReference`] if a collaborator was not bound
    /// - [`SetupError::Config`] if the configuration fails validation
    pub fn build(self) -> Result<CombatSession, SetupError> {
        let Some(timings) = self.timings else {
            error!(binding = "timings", "session setup failed: no timing provider bound");
            return Err(SetupError::InvalidActorReference { binding: "timings" });
        };
        let Some(presentation) = self.presentation else {
            error!(binding = "presentation", "session setup failed: no presentation bound");
            return Err(SetupError::InvalidActorReference {
                binding: "presentation",
            });
        };
        if let Err(err) = self.config.validate() {
            warn!(%err, "rejected session configuration");
            return Err(err.into());
        }
        Ok(CombatSession::new(self.config, timings, presentation))
    }
}

// =============================================================================
// Session
// =============================================================================

/// A running duel.
pub struct CombatSession {
    config: SessionConfig,
    clock: SimClock,
    tick: u64,
    player: CombatActor,
    opponent: CombatActor,
    engine: DecisionEngine,
    rules: DamageRules,
    rng: ChaCha8Rng,
    timings: Box<dyn TimingProvider>,
    presentation: Box<dyn Presentation>,
    events: EventLog,
    overlays: Vec<OverlayTimer>,
    intro_remaining: f32,
    menu_paused: bool,
    outcome: SessionOutcome,
}

impl CombatSession {
    fn new(
        config: SessionConfig,
        timings: Box<dyn TimingProvider>,
        presentation: Box<dyn Presentation>,
    ) -> Self {
        let mut session = Self {
            clock: SimClock::new(),
            tick: 0,
            player: spawn_actor(ActorId::Player, &config.player),
            opponent: spawn_actor(ActorId::Opponent, &config.opponent),
            engine: DecisionEngine::new(config.opponent_ai),
            rules: DamageRules::new(config.block_policy, config.hit_invulnerability),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            timings,
            presentation,
            events: EventLog::new(),
            overlays: Vec::new(),
            intro_remaining: config.intro_duration,
            menu_paused: false,
            outcome: SessionOutcome::Ongoing,
            config,
        };
        session.sync_clock();
        session.init_presentation();
        info!(seed = session.config.seed, "duel started");
        session
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the clock.
    #[must_use]
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Current simulation time.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Number of `step` calls since start or restart.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Returns one actor.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> &CombatActor {
        match id {
            ActorId::Player => &self.player,
            ActorId::Opponent => &self.opponent,
        }
    }

    /// Returns the player.
    #[must_use]
    pub fn player(&self) -> &CombatActor {
        &self.player
    }

    /// Returns the opponent.
    #[must_use]
    pub fn opponent(&self) -> &CombatActor {
        &self.opponent
    }

    /// Returns the opponent's decision engine.
    #[must_use]
    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    /// Returns who has won so far.
    #[must_use]
    pub fn outcome(&self) -> SessionOutcome {
        self.outcome
    }

    /// Returns true once either duelist has died.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.outcome != SessionOutcome::Ongoing
    }

    /// Returns the buffered events.
    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Drains the buffered events.
    pub fn take_events(&mut self) -> Vec<EventRecord> {
        self.events.take_events()
    }

    /// Side of an attack by `attacker` that has not reached its impact yet.
    ///
    /// During the opponent's telegraph this is what the warning panel shows.
    #[must_use]
    pub fn pending_impact(&self, attacker: ActorId) -> Option<Side> {
        self.actor(attacker)
            .timeline
            .iter()
            .find_map(|step| match step.kind {
                StepKind::Telegraph { side } | StepKind::Windup { side } => Some(side),
                _ => None,
            })
    }

    fn actor_mut(&mut self, id: ActorId) -> &mut CombatActor {
        match id {
            ActorId::Player => &mut self.player,
            ActorId::Opponent => &mut self.opponent,
        }
    }

    // -------------------------------------------------------------------------
    // Advance
    // -------------------------------------------------------------------------

    /// Advances the duel by one host frame of `real_dt` seconds.
    pub fn step(&mut self, real_dt: f32) {
        self.tick += 1;
        let real_dt = if real_dt.is_finite() { real_dt.max(0.0) } else { 0.0 };
        let real_dt = self.advance_intro(real_dt);

        let dt = self.clock.advance(real_dt);
        if self.clock.is_paused() {
            return;
        }

        self.advance_overlays(dt);
        for id in ActorId::ALL {
            self.advance_actor(id, dt);
        }
        self.advance_decision(dt);
    }

    /// Consumes intro time, returning the part of `real_dt` left after it.
    fn advance_intro(&mut self, real_dt: f32) -> f32 {
        if self.intro_remaining <= 0.0 {
            return real_dt;
        }
        let consumed = real_dt.min(self.intro_remaining);
        self.intro_remaining -= consumed;
        self.clock.advance(consumed);
        if self.intro_remaining > 0.0 {
            return 0.0;
        }
        self.intro_remaining = 0.0;
        self.presentation.set_ui_visible(Panel::Intro, false);
        self.sync_clock();
        debug!(wall_time = self.clock.wall_time(), "intro finished");
        real_dt - consumed
    }

    fn advance_overlays(&mut self, dt: f32) {
        let mut expired = Vec::new();
        self.overlays.retain_mut(|timer| {
            timer.remaining -= dt;
            if timer.remaining <= 0.0 {
                expired.push(*timer);
                false
            } else {
                true
            }
        });
        for timer in expired {
            match timer.fade_out {
                Some(duration) => self.presentation.fade_ui(timer.panel, 0.0, duration),
                None => self.presentation.set_ui_visible(timer.panel, false),
            }
        }
    }

    fn advance_actor(&mut self, id: ActorId, dt: f32) {
        let completed = self.actor_mut(id).timeline.advance(dt);
        for kind in completed {
            let actor = self.actor(id);
            if actor.is_removed() {
                break;
            }
            // Cancellation point: a dead actor only finishes dying.
            if actor.is_dead() && !kind.is_death_sequence() {
                continue;
            }
            self.complete_step(id, kind);
        }
    }

    fn complete_step(&mut self, id: ActorId, kind: StepKind) {
        debug!(actor = %id, step = ?kind, time = self.clock.now(), "step completed");
        match kind {
            StepKind::Telegraph { side } => {
                self.presentation.set_ui_visible(Panel::Warning(side), false);
                self.presentation.play_cue(id, Cue::Attack(side));
                self.presentation.play_audio(id, AudioCategory::Attack);
            }
            StepKind::Windup { side } => self.resolve_impact(id, side),
            StepKind::Recovery | StepKind::Guard | StepKind::Rest | StepKind::Stagger => {
                self.finish_action(id);
            }
            StepKind::DeathFall => {
                let panel = outcome_panel(id);
                self.presentation
                    .fade_ui(panel, 1.0, self.config.ui.reveal_fade);
            }
            StepKind::DeathReveal => {
                self.actor_mut(id).flags.insert(StatusFlags::REMOVED);
                self.emit(CombatEvent::ActorRemoved { actor: id });
                info!(actor = %id, "actor removed");
            }
        }
    }

    fn advance_decision(&mut self, dt: f32) {
        self.engine.tick(dt);
        if self.is_finished() || !self.engine.can_act() || !self.opponent.accepts_commands() {
            return;
        }
        let choice = self
            .engine
            .choose_next_action(self.opponent.hit_window.as_mut(), &mut self.rng);
        self.engine.begin(choice);
        debug!(choice = ?choice, time = self.clock.now(), "opponent decided");

        match choice {
            ActionChoice::Attack(side) => self.start_attack(ActorId::Opponent, side),
            ActionChoice::Defend { side, forced } => {
                self.start_defense(ActorId::Opponent, side, forced);
            }
            ActionChoice::Idle => self.start_idle_action(ActorId::Opponent),
        }
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Requests an action for `id`.
    ///
    /// Only a living, idle actor with nothing scheduled accepts commands, and
    /// only while the clock runs and the duel is undecided.
    pub fn command(&mut self, id: ActorId, command: ActorCommand) -> CommandOutcome {
        if let Some(reason) = self.reject_reason(id) {
            debug!(actor = %id, ?command, ?reason, "command rejected");
            return CommandOutcome::Rejected(reason);
        }
        match command {
            ActorCommand::Attack(side) => self.start_attack(id, side),
            ActorCommand::Defend(side) => self.start_defense(id, side, false),
        }
        CommandOutcome::Accepted
    }

    /// Player attack input.
    pub fn player_attack(&mut self, side: Side) -> CommandOutcome {
        self.command(ActorId::Player, ActorCommand::Attack(side))
    }

    /// Player defense input.
    pub fn player_defend(&mut self, side: Side) -> CommandOutcome {
        self.command(ActorId::Player, ActorCommand::Defend(side))
    }

    fn reject_reason(&self, id: ActorId) -> Option<RejectReason> {
        let actor = self.actor(id);
        if actor.is_dead() {
            Some(RejectReason::Dead)
        } else if self.is_finished() {
            Some(RejectReason::Finished)
        } else if self.clock.is_paused() {
            Some(RejectReason::Paused)
        } else if !actor.accepts_commands() {
            Some(RejectReason::Busy)
        } else {
            None
        }
    }

    /// Holds or releases the player's focus stance.
    ///
    /// # Returns
    ///
    /// True if the stance changed.
    pub fn set_focus(&mut self, focused: bool) -> bool {
        if self.player.is_dead() || self.player.flags.contains(StatusFlags::FOCUSED) == focused {
            return false;
        }
        self.player.flags.set(StatusFlags::FOCUSED, focused);
        let target = if focused { 1.0 } else { 0.0 };
        self.presentation
            .fade_ui(Panel::Focus, target, self.config.ui.focus_fade);
        debug!(focused, "focus stance changed");
        true
    }

    /// Returns true while the player holds focus.
    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.player.flags.contains(StatusFlags::FOCUSED)
    }

    /// Applies `amount` damage to `target` from `side`, as if the other
    /// duelist's attack connected.
    ///
    /// The heavy-hit roll uses the other duelist's bypass chance.
    pub fn take_damage(&mut self, target: ActorId, amount: f32, side: Side) -> HitOutcome {
        let source = target.opponent();
        let hit = Hit {
            source,
            side,
            base_damage: amount,
            bypass_chance: self.config.actor(source).defense_bypass_chance,
        };
        self.deliver_hit(target, hit)
    }

    // -------------------------------------------------------------------------
    // Pause menu
    // -------------------------------------------------------------------------

    /// Opens the pause menu and stops the clock.
    ///
    /// # Returns
    ///
    /// False if the menu was already open.
    pub fn pause(&mut self) -> bool {
        if self.menu_paused {
            return false;
        }
        self.menu_paused = true;
        self.sync_clock();
        self.presentation.set_ui_visible(Panel::Pause, true);
        self.emit(CombatEvent::Paused);
        info!("paused");
        true
    }

    /// Closes the pause menu.
    ///
    /// # Returns
    ///
    /// False if the menu was not open.
    pub fn resume(&mut self) -> bool {
        if !self.menu_paused {
            return false;
        }
        self.menu_paused = false;
        self.sync_clock();
        self.presentation.set_ui_visible(Panel::Pause, false);
        self.emit(CombatEvent::Resumed);
        info!("resumed");
        true
    }

    /// Flips the pause menu, returning whether it is now open.
    pub fn toggle_pause(&mut self) -> bool {
        if self.menu_paused {
            self.resume();
        } else {
            self.pause();
        }
        self.menu_paused
    }

    /// Returns true while the simulation clock is stopped for any reason.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Returns true while the pause menu is open.
    #[must_use]
    pub fn is_menu_open(&self) -> bool {
        self.menu_paused
    }

    /// Returns true while the intro panel holds the duel.
    #[must_use]
    pub fn is_intro_playing(&self) -> bool {
        self.intro_remaining > 0.0
    }

    /// Sets the simulation speed multiplier. Zero freezes the duel.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.clock.set_time_scale(scale);
    }

    /// Rebuilds the duel from its configuration and seed.
    ///
    /// Only available from the pause menu; the new duel starts unpaused
    /// (apart from its intro, if configured). Undrained events are kept.
    ///
    /// # Returns
    ///
    /// False if the pause menu was not open.
    pub fn restart(&mut self) -> bool {
        if !self.menu_paused {
            return false;
        }
        let config = &self.config;
        self.clock = SimClock::new();
        self.tick = 0;
        self.player = spawn_actor(ActorId::Player, &config.player);
        self.opponent = spawn_actor(ActorId::Opponent, &config.opponent);
        self.engine = DecisionEngine::new(config.opponent_ai);
        self.rng = ChaCha8Rng::seed_from_u64(config.seed);
        self.intro_remaining = config.intro_duration;
        self.overlays.clear();
        self.menu_paused = false;
        self.outcome = SessionOutcome::Ongoing;
        self.sync_clock();
        self.init_presentation();
        self.emit(CombatEvent::Restarted);
        info!(seed = self.config.seed, "duel restarted");
        true
    }

    fn sync_clock(&mut self) {
        if self.menu_paused || self.intro_remaining > 0.0 {
            self.clock.pause();
        } else {
            self.clock.resume();
        }
    }

    // -------------------------------------------------------------------------
    // Actions
    // -------------------------------------------------------------------------

    fn start_attack(&mut self, id: ActorId, side: Side) {
        let now = self.clock.now();
        let base = self.action_duration(id, ActionKind::Attack);
        let actor_config = *self.config.actor(id);

        let actor = self.actor_mut(id);
        let (combo, duration) = match (actor.combo.as_mut(), actor_config.combo) {
            (Some(tracker), Some(combo_config)) => {
                let count = tracker.register(now, side, combo_config.reset_window);
                (count, effective_duration(base, count, &combo_config))
            }
            _ => (1, base),
        };
        self.transition(id, ActionState::Attacking(side));

        let telegraph = self.config.telegraph_duration;
        let impact_delay = actor_config.attack_impact_delay;
        let timeline = &mut self.actor_mut(id).timeline;
        let telegraphed = id == ActorId::Opponent && telegraph > 0.0;
        if telegraphed {
            timeline.push(StepKind::Telegraph { side }, telegraph);
        }
        timeline.push(StepKind::Windup { side }, impact_delay);
        timeline.push(StepKind::Recovery, (duration - impact_delay).max(0.0));

        if telegraphed {
            self.presentation.set_ui_visible(Panel::Warning(side), true);
        } else {
            self.presentation.play_cue(id, Cue::Attack(side));
            self.presentation.play_audio(id, AudioCategory::Attack);
        }
        if id == ActorId::Player {
            self.show_combo_marker(combo);
        }

        self.emit(CombatEvent::AttackStarted {
            actor: id,
            side,
            combo,
            duration,
        });
    }

    fn start_defense(&mut self, id: ActorId, side: Side, forced: bool) {
        let duration = self.action_duration(id, ActionKind::Defend);
        self.transition(id, ActionState::Defending(side));
        self.actor_mut(id).timeline.push(StepKind::Guard, duration);
        self.presentation.play_cue(id, Cue::Defend(side));
        self.emit(CombatEvent::DefenseStarted {
            actor: id,
            side,
            forced,
        });
        if forced {
            info!(actor = %id, %side, "forced defense raised");
        }
    }

    fn start_idle_action(&mut self, id: ActorId) {
        let duration = self.action_duration(id, ActionKind::Idle);
        self.actor_mut(id).timeline.push(StepKind::Rest, duration);
        self.presentation.play_cue(id, Cue::Idle);
        self.presentation.play_audio(id, AudioCategory::Idle);
    }

    fn finish_action(&mut self, id: ActorId) {
        self.transition(id, ActionState::Idle);
        if id == ActorId::Opponent {
            if let Some(cooldown) = self.engine.action_finished(&mut self.rng) {
                debug!(cooldown, "opponent cooling down");
            }
        }
    }

    /// Looks up a clip length, falling back to the configured duration.
    fn action_duration(&self, id: ActorId, kind: ActionKind) -> f32 {
        match self.timings.action_duration(id, kind) {
            Some(secs) if secs.is_finite() && secs >= 0.0 => secs,
            _ => {
                let fallback = self.config.fallback_durations.get(kind);
                warn!(actor = %id, action = %kind, fallback, "missing animation clip, using fallback duration");
                fallback
            }
        }
    }

    // -------------------------------------------------------------------------
    // Damage
    // -------------------------------------------------------------------------

    fn resolve_impact(&mut self, attacker: ActorId, side: Side) {
        let target = attacker.opponent();
        let actor_config = *self.config.actor(attacker);

        let distance = self
            .actor(attacker)
            .position()
            .distance(self.actor(target).position());
        if distance > actor_config.attack_range {
            debug!(actor = %attacker, distance, range = actor_config.attack_range, "attack out of range");
            self.emit(CombatEvent::Whiffed {
                actor: attacker,
                side,
                reason: WhiffReason::OutOfRange,
            });
            return;
        }
        if attacker == ActorId::Player && self.config.require_focus_to_hit && !self.is_focused() {
            self.emit(CombatEvent::Whiffed {
                actor: attacker,
                side,
                reason: WhiffReason::Unfocused,
            });
            return;
        }

        self.deliver_hit(
            target,
            Hit {
                source: attacker,
                side,
                base_damage: actor_config.attack_damage,
                bypass_chance: actor_config.defense_bypass_chance,
            },
        );
    }

    fn deliver_hit(&mut self, target: ActorId, hit: Hit) -> HitOutcome {
        let now = self.clock.now();
        let rules = self.rules;
        let victim = match target {
            ActorId::Player => &mut self.player,
            ActorId::Opponent => &mut self.opponent,
        };
        let before = victim.state();
        let outcome = rules.apply_hit(victim, hit, now, &mut self.rng);

        match outcome {
            HitOutcome::Ignored(reason) => {
                debug!(target = %target, ?reason, "hit absorbed");
                self.emit(CombatEvent::HitIgnored { target, reason });
            }
            HitOutcome::Blocked { damage, killed } => {
                debug!(target = %target, side = %hit.side, damage, "hit blocked");
                self.emit(CombatEvent::HitBlocked {
                    target,
                    side: hit.side,
                    damage,
                });
                if damage > 0.0 {
                    self.health_changed(target);
                }
                if killed {
                    self.on_death(target, before);
                }
            }
            HitOutcome::Landed {
                damage,
                heavy,
                interrupted,
                killed,
            } => {
                self.presentation.play_audio(target, AudioCategory::Damage);
                self.emit(CombatEvent::DamageApplied {
                    source: hit.source,
                    target,
                    side: hit.side,
                    damage,
                    heavy,
                });
                self.health_changed(target);
                self.register_hit(target, now, hit.side);
                if target == ActorId::Player {
                    self.show_damage_flash();
                }

                if killed {
                    self.on_death(target, before);
                } else if interrupted {
                    self.emit(CombatEvent::StateChanged {
                        actor: target,
                        from: before,
                        to: ActionState::Hurt,
                    });
                    let stagger = self.action_duration(target, ActionKind::Hurt);
                    self.cancel_timeline(target);
                    self.actor_mut(target).timeline.push(StepKind::Stagger, stagger);
                    self.presentation.play_cue(target, Cue::Hurt);
                }
            }
        }
        outcome
    }

    fn register_hit(&mut self, target: ActorId, now: f64, side: Side) {
        let config = self.config.hit_window;
        let armed = self
            .actor_mut(target)
            .hit_window
            .as_mut()
            .is_some_and(|tracker| tracker.register_hit(now, side, &config));
        if armed {
            info!(actor = %target, "forced defense armed");
            self.emit(CombatEvent::ForcedDefenseArmed { actor: target });
        }
    }

    fn health_changed(&mut self, id: ActorId) {
        let actor = self.actor(id);
        let (health, max_health, fraction) =
            (actor.health(), actor.max_health(), actor.health_fraction());
        self.presentation.update_health_display(id, fraction);
        self.emit(CombatEvent::HealthChanged {
            actor: id,
            health,
            max_health,
        });
    }

    /// Runs the one-shot death sequence.
    fn on_death(&mut self, id: ActorId, from: ActionState) {
        if self
            .actor(id)
            .flags
            .contains(StatusFlags::DEATH_SEQUENCE_STARTED)
        {
            return;
        }
        self.actor_mut(id)
            .flags
            .insert(StatusFlags::DEATH_SEQUENCE_STARTED);
        self.emit(CombatEvent::StateChanged {
            actor: id,
            from,
            to: ActionState::Dead,
        });
        self.emit(CombatEvent::Died { actor: id });
        info!(actor = %id, time = self.clock.now(), "actor died");

        self.cancel_timeline(id);
        self.engine.halt();

        if self.player.flags.contains(StatusFlags::FOCUSED) {
            self.player.flags.remove(StatusFlags::FOCUSED);
            self.presentation
                .fade_ui(Panel::Focus, 0.0, self.config.ui.focus_fade);
        }
        self.presentation.play_cue(id, Cue::Death);
        if id == ActorId::Player {
            self.presentation
                .play_audio(ActorId::Opponent, AudioCategory::Win);
        }

        let fall = self.action_duration(id, ActionKind::Death);
        let reveal = self.config.ui.reveal_fade;
        let timeline = &mut self.actor_mut(id).timeline;
        timeline.push(StepKind::DeathFall, fall);
        timeline.push(StepKind::DeathReveal, reveal);

        if self.outcome == SessionOutcome::Ongoing {
            self.outcome = match id {
                ActorId::Opponent => SessionOutcome::Victory,
                ActorId::Player => SessionOutcome::Defeat,
            };
            info!(outcome = ?self.outcome, "duel decided");
        }
    }

    /// Drops an actor's pending steps, hiding any telegraph they had raised.
    fn cancel_timeline(&mut self, id: ActorId) {
        let warning = self
            .actor(id)
            .timeline
            .iter()
            .find_map(|step| match step.kind {
                StepKind::Telegraph { side } => Some(side),
                _ => None,
            });
        let cancelled = self.actor_mut(id).timeline.clear();
        if let Some(side) = warning {
            self.presentation.set_ui_visible(Panel::Warning(side), false);
        }
        if cancelled > 0 {
            debug!(actor = %id, cancelled, "timeline cancelled");
        }
    }

    // -------------------------------------------------------------------------
    // Presentation helpers
    // -------------------------------------------------------------------------

    fn init_presentation(&mut self) {
        let presentation = &mut self.presentation;
        for panel in [
            Panel::Warning(Side::Left),
            Panel::Warning(Side::Right),
            Panel::Focus,
            Panel::DamageFlash,
            Panel::Victory,
            Panel::Defeat,
            Panel::Pause,
        ] {
            presentation.set_ui_visible(panel, false);
        }
        for index in 0..self.config.ui.combo_markers {
            presentation.set_ui_visible(Panel::ComboMarker(index), false);
        }
        presentation.set_ui_visible(Panel::Intro, self.intro_remaining > 0.0);
        for id in ActorId::ALL {
            let fraction = self.actor(id).health_fraction();
            self.presentation.update_health_display(id, fraction);
        }
    }

    fn show_timed(&mut self, panel: Panel, secs: f32, fade_out: Option<f32>) {
        self.overlays.retain(|timer| timer.panel != panel);
        self.overlays.push(OverlayTimer {
            panel,
            remaining: secs,
            fade_out,
        });
    }

    fn show_damage_flash(&mut self) {
        let ui = self.config.ui;
        if self.is_focused() {
            self.presentation
                .fade_ui(Panel::DamageFlash, 1.0, ui.damage_flash_fade_in);
            self.show_timed(Panel::DamageFlash, ui.damage_flash, Some(ui.damage_flash_fade_out));
        } else {
            self.presentation.set_ui_visible(Panel::DamageFlash, true);
            self.show_timed(Panel::DamageFlash, ui.damage_flash, None);
        }
    }

    fn show_combo_marker(&mut self, combo: u32) {
        let Ok(index) = u8::try_from(combo.saturating_sub(1)) else {
            return;
        };
        if index >= self.config.ui.combo_markers {
            return;
        }
        let panel = Panel::ComboMarker(index);
        self.presentation.set_ui_visible(panel, true);
        self.show_timed(panel, self.config.ui.combo_marker, None);
    }

    fn transition(&mut self, id: ActorId, to: ActionState) {
        let from = self.actor_mut(id).set_state(to);
        if from != to {
            debug!(actor = %id, %from, %to, "state changed");
            self.emit(CombatEvent::StateChanged { actor: id, from, to });
        }
    }

    fn emit(&mut self, event: CombatEvent) {
        self.events.push(self.tick, self.clock.now(), event);
    }
}

fn spawn_actor(id: ActorId, config: &ActorConfig) -> CombatActor {
    let mut actor = CombatActor::new(id, config.max_health, config.position)
        .with_invulnerability_until(f64::from(config.start_invulnerability));
    if config.combo.is_some() {
        actor = actor.with_combo();
    }
    if id == ActorId::Opponent {
        actor = actor.with_hit_window();
    }
    actor
}

const fn outcome_panel(dead: ActorId) -> Panel {
    match dead {
        ActorId::Opponent => Panel::Victory,
        ActorId::Player => Panel::Defeat,
    }
}
