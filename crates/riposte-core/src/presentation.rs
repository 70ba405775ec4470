//! Boundary to the presentation layer.
//!
//! The core never renders, animates or plays sound. It asks a
//! [`TimingProvider`] how long each action lasts and tells a [`Presentation`]
//! what to show. Both are bound once at session setup.
//!
//! Three adapters ship with the crate:
//! - [`FixedTimings`]: a table of clip lengths, for headless runs and tests
//! - [`NullPresentation`]: discards every call
//! - [`RecordingPresentation`]: records calls for later inspection

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::actor::{ActorId, Side};

// =============================================================================
// Value types
// =============================================================================

/// Kinds of action whose duration comes from the timing provider.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Full attack animation.
    Attack,
    /// Defense window.
    Defend,
    /// Idle action.
    Idle,
    /// Hurt stagger.
    Hurt,
    /// Death animation.
    Death,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Attack => "attack",
            Self::Defend => "defend",
            Self::Idle => "idle",
            Self::Hurt => "hurt",
            Self::Death => "death",
        };
        f.write_str(name)
    }
}

/// Animation triggers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// Attack from a side.
    Attack(Side),
    /// Guard a side.
    Defend(Side),
    /// Idle action.
    Idle,
    /// Hurt stagger.
    Hurt,
    /// Death.
    Death,
}

/// Audio categories.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCategory {
    /// Attack swing.
    Attack,
    /// Landed hit.
    Damage,
    /// Idle action.
    Idle,
    /// Opponent's victory clip.
    Win,
}

/// UI panels the core toggles.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Panel {
    /// Opponent attack telegraph for one side.
    Warning(Side),
    /// Focus stance overlay.
    Focus,
    /// Red flash after the player is hit.
    DamageFlash,
    /// Combo marker slot.
    ComboMarker(u8),
    /// Opponent defeated.
    Victory,
    /// Player defeated.
    Defeat,
    /// Pause menu.
    Pause,
    /// Pre-fight intro.
    Intro,
}

// =============================================================================
// Traits
// =============================================================================

/// Supplies action durations.
pub trait TimingProvider: Send {
    /// Length of `kind` for `actor` in seconds, or `None` if the clip is missing.
    ///
    /// Queried once per action. A missing clip is logged and replaced by the
    /// configured fallback.
    fn action_duration(&self, actor: ActorId, kind: ActionKind) -> Option<f32>;
}

/// Receives fire-and-forget presentation commands.
pub trait Presentation: Send {
    /// Fires an animation trigger.
    fn play_cue(&mut self, actor: ActorId, cue: Cue);

    /// Plays a sound.
    fn play_audio(&mut self, actor: ActorId, category: AudioCategory);

    /// Shows or hides a panel instantly.
    fn set_ui_visible(&mut self, panel: Panel, visible: bool);

    /// Fades a panel to `target` opacity over `duration` seconds.
    fn fade_ui(&mut self, panel: Panel, target: f32, duration: f32);

    /// Updates a health bar.
    fn update_health_display(&mut self, actor: ActorId, fraction: f32);
}

// =============================================================================
// Adapters
// =============================================================================

/// Timing table keyed by action kind, shared by both actors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixedTimings {
    durations: BTreeMap<ActionKind, f32>,
}

impl FixedTimings {
    /// Creates a table with no clips.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds a clip length.
    #[must_use]
    pub fn with(mut self, kind: ActionKind, secs: f32) -> Self {
        self.durations.insert(kind, secs);
        self
    }

    /// A table of typical clip lengths.
    #[must_use]
    pub fn standard() -> Self {
        Self::empty()
            .with(ActionKind::Attack, 0.8)
            .with(ActionKind::Defend, 0.5)
            .with(ActionKind::Idle, 1.0)
            .with(ActionKind::Hurt, 0.4)
            .with(ActionKind::Death, 1.0)
    }
}

impl TimingProvider for FixedTimings {
    fn action_duration(&self, _actor: ActorId, kind: ActionKind) -> Option<f32> {
        self.durations.get(&kind).copied()
    }
}

/// Discards every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresentation;

impl Presentation for NullPresentation {
    fn play_cue(&mut self, _actor: ActorId, _cue: Cue) {}
    fn play_audio(&mut self, _actor: ActorId, _category: AudioCategory) {}
    fn set_ui_visible(&mut self, _panel: Panel, _visible: bool) {}
    fn fade_ui(&mut self, _panel: Panel, _target: f32, _duration: f32) {}
    fn update_health_display(&mut self, _actor: ActorId, _fraction: f32) {}
}

/// One recorded [`Presentation`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PresentationCall {
    /// [`Presentation::play_cue`].
    Cue(ActorId, Cue),
    /// [`Presentation::play_audio`].
    Audio(ActorId, AudioCategory),
    /// [`Presentation::set_ui_visible`].
    Visible(Panel, bool),
    /// [`Presentation::fade_ui`].
    Fade(Panel, f32, f32),
    /// [`Presentation::update_health_display`].
    Health(ActorId, f32),
}

/// Records calls into a shared log.
///
/// Clones share the log, so a test keeps one handle and gives the other to
/// the session.
///
/// # Example
///
/// ```
/// use riposte_core::actor::ActorId;
/// use riposte_core::presentation::{Cue, Presentation, PresentationCall, RecordingPresentation};
///
/// let recorder = RecordingPresentation::new();
/// let mut bound = recorder.clone();
/// bound.play_cue(ActorId::Player, Cue::Idle);
///
/// assert_eq!(recorder.take_calls(), vec![PresentationCall::Cue(ActorId::Player, Cue::Idle)]);
/// assert!(recorder.take_calls().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingPresentation {
    calls: Arc<Mutex<Vec<PresentationCall>>>,
}

impl RecordingPresentation {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains the recorded calls in order.
    pub fn take_calls(&self) -> Vec<PresentationCall> {
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *calls)
    }

    /// Returns a copy of the recorded calls without draining them.
    #[must_use]
    pub fn calls(&self) -> Vec<PresentationCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: PresentationCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl Presentation for RecordingPresentation {
    fn play_cue(&mut self, actor: ActorId, cue: Cue) {
        self.record(PresentationCall::Cue(actor, cue));
    }

    fn play_audio(&mut self, actor: ActorId, category: AudioCategory) {
        self.record(PresentationCall::Audio(actor, category));
    }

    fn set_ui_visible(&mut self, panel: Panel, visible: bool) {
        self.record(PresentationCall::Visible(panel, visible));
    }

    fn fade_ui(&mut self, panel: Panel, target: f32, duration: f32) {
        self.record(PresentationCall::Fade(panel, target, duration));
    }

    fn update_health_display(&mut self, actor: ActorId, fraction: f32) {
        self.record(PresentationCall::Health(actor, fraction));
    }
}
