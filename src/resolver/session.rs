use std::time::Duration;
use tokio::task::AbortHandle;

use crate::audio::MediaHandle;
use crate::state::Decision;
use super::latch::DecisionLatch;
use super::progress::ProgressReporter;

/// Liveness token for one session. Async work is tagged with it and the
/// resolver drops anything whose tag no longer matches the live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// One (asset reference, mount lifetime) pair.
///
/// Exclusively owns the media handle, the sampling task and the in-flight
/// probe and metadata timer. Everything is released by `teardown`, which
/// also runs on drop.
pub struct PlaybackSession {
    pub(super) id: SessionId,
    pub(super) asset_ref: Option<String>,
    pub(super) latch: DecisionLatch,
    pub(super) media: Option<Box<dyn MediaHandle>>,
    pub(super) playing: bool,
    pub(super) loading: bool,
    pub(super) duration: f64,
    pub(super) position: f64,
    /// The speech fallback has been handed text for this session.
    pub(super) speaking: bool,
    /// Bumped on every render; completions from older renders are stale.
    pub(super) speech_generation: u64,
    pub(super) progress: ProgressReporter,
    pub(super) probe_task: Option<AbortHandle>,
    pub(super) metadata_timer: Option<AbortHandle>,
    error_reported: bool,
    ended_reported: bool,
    alive: bool,
}

impl PlaybackSession {
    pub fn new(id: SessionId, asset_ref: Option<String>, sample_interval: Duration) -> Self {
        Self {
            id,
            asset_ref,
            latch: DecisionLatch::new(),
            media: None,
            playing: false,
            loading: false,
            duration: 0.0,
            position: 0.0,
            speaking: false,
            speech_generation: 0,
            progress: ProgressReporter::new(sample_interval),
            probe_task: None,
            metadata_timer: None,
            error_reported: false,
            ended_reported: false,
            alive: true,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn asset_ref(&self) -> Option<&str> {
        self.asset_ref.as_deref()
    }

    pub fn decision(&self) -> Decision {
        self.latch.decision()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn has_media(&self) -> bool {
        self.media.is_some()
    }

    pub fn is_sampling(&self) -> bool {
        self.progress.is_running()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration
    }

    pub fn position_fraction(&self) -> f64 {
        self.position
    }

    /// True the first time only; `onError` fires at most once per session.
    pub(super) fn take_error_report(&mut self) -> bool {
        !std::mem::replace(&mut self.error_reported, true)
    }

    /// True once per playback run; `rearm_ended` starts a new run.
    pub(super) fn take_ended_report(&mut self) -> bool {
        !std::mem::replace(&mut self.ended_reported, true)
    }

    pub(super) fn rearm_ended(&mut self) {
        self.ended_reported = false;
    }

    pub(super) fn cancel_metadata_timer(&mut self) {
        if let Some(timer) = self.metadata_timer.take() {
            timer.abort();
        }
    }

    pub(super) fn stop_sampling(&mut self) {
        self.progress.stop();
    }

    /// Stop and detach the media handle. After this no real audio can play.
    pub(super) fn release_media(&mut self) {
        self.progress.stop();
        self.cancel_metadata_timer();
        if let Some(mut media) = self.media.take() {
            media.release();
            tracing::debug!("Released media handle for {:?}", self.id);
        }
        self.playing = false;
        self.loading = false;
    }

    /// Release every owned resource. Returns false when already torn down.
    pub fn teardown(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        if let Some(probe) = self.probe_task.take() {
            probe.abort();
        }
        self.release_media();
        tracing::debug!("Session {:?} torn down", self.id);
        true
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
