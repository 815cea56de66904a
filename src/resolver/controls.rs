//! Play/pause, seek and mute. Only meaningful once `Real` is committed;
//! under `Fallback` play/pause goes to the speech fallback, and while the
//! decision is pending every control is a no-op.

use crate::audio::playback::volume_for;
use crate::error::CueError;
use crate::state::{CueEvent, Decision};
use super::SourceResolver;

impl SourceResolver {
    pub fn toggle_play(&mut self) {
        let Some(session) = self.session.as_mut() else { return };

        match session.decision() {
            Decision::Pending => {
                tracing::debug!("Play toggled before {:?} resolved; ignored", session.id());
            }
            Decision::Real if session.playing => {
                if let Some(media) = session.media.as_mut() {
                    media.pause();
                }
                session.playing = false;
                session.stop_sampling();
            }
            Decision::Real => self.start_real_playback(),
            Decision::Fallback if session.speaking => self.speech.toggle_play(),
            Decision::Fallback => {}
        }
    }

    /// Jump to `percent` (0..=100) of the known duration. The published
    /// position moves immediately instead of waiting for the next sample.
    pub fn seek(&mut self, percent: f64) {
        let Some(session) = self.session.as_mut() else { return };
        if session.decision() != Decision::Real || !percent.is_finite() {
            return;
        }
        if session.duration <= 0.0 {
            tracing::debug!("Seek before duration is known; ignored");
            return;
        }
        let Some(media) = session.media.as_mut() else { return };

        let fraction = percent.clamp(0.0, 100.0) / 100.0;
        media.set_current_time(session.duration * fraction);
        session.position = fraction;
        self.emit(CueEvent::Progress { position_fraction: fraction });
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if let Some(media) = self.session.as_mut().and_then(|s| s.media.as_mut()) {
            media.set_volume(volume_for(muted));
        }
        self.speech.set_muted(muted);
    }

    /// Best effort. A refused start is logged and leaves the decision alone.
    pub(super) fn start_real_playback(&mut self) {
        let Some(session) = self.session.as_mut() else { return };
        let Some(media) = session.media.as_mut() else { return };

        match media.play() {
            Ok(()) => {
                session.playing = true;
                session.rearm_ended();
                session.progress.start(session.id, &self.queue);
            }
            Err(e) => {
                tracing::warn!("{} ({:?})", CueError::PlaybackStart(e), session.id());
            }
        }
    }
}
