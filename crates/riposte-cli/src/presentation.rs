//! Presentation binding that writes every call to the log.

use riposte_core::presentation::{AudioCategory, Cue, Panel};
use riposte_core::{ActorId, Presentation};
use tracing::{debug, trace};

/// Logs cues and panel changes instead of rendering them.
#[derive(Debug, Default)]
pub struct TracingPresentation;

impl Presentation for TracingPresentation {
    fn play_cue(&mut self, actor: ActorId, cue: Cue) {
        debug!(actor = %actor, cue = ?cue, "cue");
    }

    fn play_audio(&mut self, actor: ActorId, category: AudioCategory) {
        debug!(actor = %actor, category = ?category, "audio");
    }

    fn set_ui_visible(&mut self, panel: Panel, visible: bool) {
        trace!(panel = ?panel, visible, "panel");
    }

    fn fade_ui(&mut self, panel: Panel, target: f32, duration: f32) {
        trace!(panel = ?panel, target, duration, "fade");
    }

    fn update_health_display(&mut self, actor: ActorId, fraction: f32) {
        debug!(actor = %actor, fraction, "health bar");
    }
}
