//! Test helpers for building sessions and driving them through time.

use crate::actor::ActorId;
use crate::config::{ActionConfig, DurationRange, SessionConfig};
use crate::event::{CombatEvent, EventRecord};
use crate::presentation::{FixedTimings, NullPresentation, RecordingPresentation};
use crate::session::{CombatSession, SessionBuilder};

/// One 60 Hz host frame.
pub const FRAME: f32 = 1.0 / 60.0;

/// Upper bound on frames any helper will step before giving up.
const MAX_FRAMES: usize = 100_000;

// =============================================================================
// Configs
// =============================================================================

/// Shipped defaults with a fixed seed and no player grace period.
pub fn base_config() -> SessionConfig {
    let mut config = SessionConfig {
        seed: 7,
        ..SessionConfig::default()
    };
    config.player.start_invulnerability = 0.0;
    config
}

/// Replaces the opponent's action table. Every action gets the same fixed cooldown.
pub fn with_weights(
    mut config: SessionConfig,
    attack: u32,
    defend: u32,
    idle: u32,
    cooldown: f32,
) -> SessionConfig {
    let cooldown = DurationRange::fixed(cooldown);
    config.opponent_ai.attack = ActionConfig::new(attack, cooldown);
    config.opponent_ai.defend = ActionConfig::new(defend, cooldown);
    config.opponent_ai.idle = ActionConfig::new(idle, cooldown);
    config
}

/// An opponent that only ever idles, then waits a long time.
pub fn passive_config() -> SessionConfig {
    with_weights(base_config(), 0, 0, 1, 100.0)
}

// =============================================================================
// Sessions
// =============================================================================

/// Session with standard timings and no presentation.
pub fn session(config: SessionConfig) -> CombatSession {
    SessionBuilder::new()
        .config(config)
        .timings(FixedTimings::standard())
        .presentation(NullPresentation)
        .build()
        .expect("test config is valid")
}

/// Session whose presentation calls are recorded.
pub fn recorded_session(
    config: SessionConfig,
    timings: FixedTimings,
) -> (CombatSession, RecordingPresentation) {
    let recorder = RecordingPresentation::new();
    let session = SessionBuilder::new()
        .config(config)
        .timings(timings)
        .presentation(recorder.clone())
        .build()
        .expect("test config is valid");
    (session, recorder)
}

// =============================================================================
// Stepping
// =============================================================================

/// Steps `n` frames.
pub fn step_frames(session: &mut CombatSession, n: usize) {
    for _ in 0..n {
        session.step(FRAME);
    }
}

/// Steps frames until simulation time reaches `t`.
pub fn step_until(session: &mut CombatSession, t: f64) {
    for _ in 0..MAX_FRAMES {
        if session.now() >= t {
            return;
        }
        session.step(FRAME);
    }
    panic!("simulation time never reached {t}");
}

/// Steps frames until `id` is idle with nothing scheduled.
pub fn step_until_ready(session: &mut CombatSession, id: ActorId) {
    for _ in 0..MAX_FRAMES {
        if session.actor(id).accepts_commands() {
            return;
        }
        session.step(FRAME);
    }
    panic!("{id} never became ready");
}

// =============================================================================
// Events
// =============================================================================

/// Strips tick and time stamps.
pub fn events_of(records: &[EventRecord]) -> Vec<CombatEvent> {
    records.iter().map(|record| record.event.clone()).collect()
}

/// Counts events matching `pred`.
pub fn count_events(records: &[EventRecord], pred: impl Fn(&CombatEvent) -> bool) -> usize {
    records.iter().filter(|record| pred(&record.event)).count()
}
