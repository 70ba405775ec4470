//! # Riposte Core
//!
//! Real-time duel combat core for Riposte.
//!
//! This crate implements the combat arbitration between two duelists: timed
//! attacks with a single impact instant, directional guard, combo scaling,
//! invulnerability windows and an opponent that picks actions by weighted
//! chance and reacts to hit spam with a forced defense.
//!
//! ## Architecture
//!
//! - **Actors**: [`CombatActor`] state machines for the player and opponent
//! - **Timelines**: per-actor queues of timed steps instead of engine waits
//! - **Rules**: [`DamageRules`], applied identically to both actors
//! - **Decision**: [`DecisionEngine`], the opponent's action selector
//! - **Session**: [`CombatSession`], which owns everything and advances it
//!   once per host frame
//!
//! Rendering, audio, animation and UI stay outside the crate behind the
//! [`TimingProvider`] and [`Presentation`] traits.
//!
//! ## Usage
//!
//! ```
//! use riposte_core::{ActorId, FixedTimings, NullPresentation, SessionBuilder, SessionConfig, Side};
//!
//! let mut session = SessionBuilder::new()
//!     .config(SessionConfig::default())
//!     .timings(FixedTimings::standard())
//!     .presentation(NullPresentation)
//!     .build()?;
//!
//! session.player_defend(Side::Left);
//! for _ in 0..120 {
//!     session.step(1.0 / 60.0);
//! }
//! assert!(session.actor(ActorId::Player).health() > 0.0);
//! # Ok::<(), riposte_core::SetupError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod actor;
pub mod clock;
pub mod combo;
pub mod config;
pub mod decision;
pub mod error;
pub mod event;
pub mod hit_window;
pub mod presentation;
pub mod progress;
pub mod rules;
pub mod session;
pub mod timeline;

pub use actor::{ActionState, ActorId, CombatActor, Side, StatusFlags};
pub use clock::SimClock;
pub use combo::ComboTracker;
pub use config::SessionConfig;
pub use decision::{ActionChoice, DecisionEngine};
pub use error::{ConfigError, ProgressError, SetupError};
pub use event::{CombatEvent, EventRecord};
pub use hit_window::HitWindowTracker;
pub use presentation::{
    FixedTimings, NullPresentation, Presentation, RecordingPresentation, TimingProvider,
};
pub use progress::{JsonFileProgress, LevelSelect, MemoryProgress, ProgressStore};
pub use rules::{BlockPolicy, DamageRules, HitOutcome};
pub use session::{CombatSession, CommandOutcome, SessionBuilder, SessionOutcome};

#[cfg(test)]
mod tests;
