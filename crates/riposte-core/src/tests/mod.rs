//! Cross-module tests for the duel session.
//!
//! - `determinism.rs`: same seed and inputs produce identical event logs
//! - `integration.rs`: end-to-end duel scenarios through `CombatSession`
//! - `properties.rs`: property tests for the health invariants
//! - `helpers.rs`: configs, session factories and stepping utilities

mod determinism;
mod helpers;
mod properties;
