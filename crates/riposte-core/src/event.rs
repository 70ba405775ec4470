//! Combat events exposed to collaborators.
//!
//! The session appends a [`CombatEvent`] for every observable change (damage,
//! health, death, state transitions, pause) to its [`EventLog`]. Hosts drain
//! the log with `take_events()` after each step, typically to drive telemetry,
//! replays or effects the core does not know about.

use serde::{Deserialize, Serialize};

use crate::actor::{ActionState, ActorId, Side};
use crate::rules::IgnoreReason;

/// Why an attack reached its impact instant without dealing damage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WhiffReason {
    /// The target was farther than the attack range.
    OutOfRange,
    /// The player attacked without holding focus while focus is required.
    Unfocused,
}

/// Something that happened during a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// An actor's state machine moved.
    StateChanged {
        /// Actor.
        actor: ActorId,
        /// Previous state.
        from: ActionState,
        /// New state.
        to: ActionState,
    },
    /// An attack was accepted.
    AttackStarted {
        /// Attacker.
        actor: ActorId,
        /// Lane.
        side: Side,
        /// Combo count after registering this attack (1 without a tracker).
        combo: u32,
        /// Full attack duration after combo scaling.
        duration: f32,
    },
    /// A defense was raised.
    DefenseStarted {
        /// Defender.
        actor: ActorId,
        /// Guarded lane.
        side: Side,
        /// Raised in response to hit spam.
        forced: bool,
    },
    /// An attack's impact dealt nothing.
    Whiffed {
        /// Attacker.
        actor: ActorId,
        /// Lane.
        side: Side,
        /// Cause.
        reason: WhiffReason,
    },
    /// A hit was absorbed by death or invulnerability.
    HitIgnored {
        /// Target.
        target: ActorId,
        /// Cause.
        reason: IgnoreReason,
    },
    /// A hit met a matching guard.
    HitBlocked {
        /// Target.
        target: ActorId,
        /// Lane.
        side: Side,
        /// Damage the block policy let through.
        damage: f32,
    },
    /// An unguarded hit landed.
    DamageApplied {
        /// Attacker.
        source: ActorId,
        /// Target.
        target: ActorId,
        /// Lane.
        side: Side,
        /// Damage after heavy-hit scaling.
        damage: f32,
        /// The bypass roll succeeded.
        heavy: bool,
    },
    /// Health changed.
    HealthChanged {
        /// Actor.
        actor: ActorId,
        /// New health.
        health: f32,
        /// Maximum health.
        max_health: f32,
    },
    /// Enough rapid hits arrived to force the opponent's next decision.
    ForcedDefenseArmed {
        /// The actor that will defend.
        actor: ActorId,
    },
    /// Health reached zero. Emitted exactly once per actor.
    Died {
        /// Actor.
        actor: ActorId,
    },
    /// The death sequence finished.
    ActorRemoved {
        /// Actor.
        actor: ActorId,
    },
    /// The simulation clock stopped.
    Paused,
    /// The simulation clock resumed.
    Resumed,
    /// The duel was rebuilt from its configuration.
    Restarted,
}

/// An event stamped with the tick and simulation time it happened at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Tick counter at emission.
    pub tick: u64,
    /// Simulation time at emission.
    ///
    /// This is the end of the frame the event happened in. A timed step that
    /// completed partway through the frame is stamped up to one frame late;
    /// its leftover time has already been carried into the next step.
    pub time: f64,
    /// The event.
    pub event: CombatEvent,
}

/// Append-only event buffer, drained by the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn push(&mut self, tick: u64, time: f64, event: CombatEvent) {
        self.records.push(EventRecord { tick, time, event });
    }

    /// Drains all recorded events in emission order.
    pub fn take_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }

    /// Number of buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates buffered events.
    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> + '_ {
        self.records.iter()
    }

    /// Drops buffered events.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_events_drains_in_order() {
        let mut log = EventLog::new();
        log.push(1, 0.1, CombatEvent::Paused);
        log.push(2, 0.1, CombatEvent::Resumed);
        assert_eq!(log.len(), 2);

        let events = log.take_events();
        assert_eq!(events[0].event, CombatEvent::Paused);
        assert_eq!(events[1].tick, 2);
        assert!(log.is_empty());
    }

    #[test]
    fn records_serialize() {
        let record = EventRecord {
            tick: 3,
            time: 0.05,
            event: CombatEvent::DamageApplied {
                source: ActorId::Player,
                target: ActorId::Opponent,
                side: Side::Left,
                damage: 10.0,
                heavy: false,
            },
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: EventRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
