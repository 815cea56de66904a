//! Playback source resolution.
//!
//! A [`SourceResolver`] decides, per session, whether the recorded asset or
//! the synthesized-speech fallback owns playback. The load path and the
//! existence probe race; whichever failure lands first while the decision is
//! still pending commits `Fallback`, and metadata arriving with no failure on
//! record commits `Real`. Every signal arrives as a [`Message`] on one queue
//! and is checked against the live [`SessionId`] before it has any effect.

mod controls;
pub mod latch;
pub mod progress;
pub mod session;

use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

use crate::audio::playback::volume_for;
use crate::audio::{MediaEvent, MediaEvents, MediaFactory};
use crate::engine::{SpeechCompletion, SpeechFallback, SpeechRequest};
use crate::error::{CueError, MediaError, ProbeError, LOAD_FAILED_MESSAGE};
use crate::hub::ExistenceProbe;
use crate::state::{CueEvent, CueSnapshot, CueSource, CueStatus, Decision, Settings};

pub use session::{PlaybackSession, SessionId};

/// Everything the cue loop reacts to, from the caller or from async work.
#[derive(Debug)]
pub enum Message {
    SetSource(CueSource),
    TogglePlay,
    /// Position in percent, 0..=100.
    Seek(f64),
    SetMuted(bool),
    Snapshot(oneshot::Sender<CueSnapshot>),
    Shutdown,
    Media { session: SessionId, event: MediaEvent },
    ProbeFinished { session: SessionId, result: Result<(), ProbeError> },
    MetadataTimeout { session: SessionId },
    SampleTick { session: SessionId },
    SpeechFinished { session: SessionId, generation: u64 },
}

pub struct SourceResolver {
    settings: Settings,
    media_factory: Arc<dyn MediaFactory>,
    probe: Arc<dyn ExistenceProbe>,
    speech: Box<dyn SpeechFallback>,
    queue: UnboundedSender<Message>,
    events: UnboundedSender<CueEvent>,
    source: CueSource,
    /// Caller-owned; survives session replacement.
    muted: bool,
    session: Option<PlaybackSession>,
    next_session: u64,
    last_status: Option<CueStatus>,
}

impl SourceResolver {
    pub fn new(
        settings: Settings,
        media_factory: Arc<dyn MediaFactory>,
        probe: Arc<dyn ExistenceProbe>,
        speech: Box<dyn SpeechFallback>,
        queue: UnboundedSender<Message>,
        events: UnboundedSender<CueEvent>,
    ) -> Self {
        let muted = settings.start_muted;
        Self {
            settings,
            media_factory,
            probe,
            speech,
            queue,
            events,
            source: CueSource::default(),
            muted,
            session: None,
            next_session: 1,
            last_status: None,
        }
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn decision(&self) -> Decision {
        self.session
            .as_ref()
            .map(PlaybackSession::decision)
            .unwrap_or_default()
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn status(&self) -> CueStatus {
        let Some(session) = self.session.as_ref() else {
            return CueStatus::Resolving;
        };
        match session.decision() {
            Decision::Pending => CueStatus::Resolving,
            Decision::Real if session.is_playing() => CueStatus::Playing,
            Decision::Real => CueStatus::Ready,
            Decision::Fallback if session.speaking => CueStatus::Speaking,
            Decision::Fallback => CueStatus::Unavailable,
        }
    }

    pub fn snapshot(&self) -> CueSnapshot {
        let session = self.session.as_ref();
        CueSnapshot {
            status: self.status(),
            decision: self.decision(),
            playing: session.map_or(false, PlaybackSession::is_playing),
            muted: self.muted,
            loading: session.map_or(false, PlaybackSession::is_loading),
            position_fraction: session.map_or(0.0, PlaybackSession::position_fraction),
            duration_seconds: session.map_or(0.0, PlaybackSession::duration_seconds),
            show_controls: self.source.show_controls,
        }
    }

    /// Apply one message. Breaks on `Shutdown`.
    pub fn handle(&mut self, message: Message) -> ControlFlow<()> {
        match message {
            Message::SetSource(source) => self.set_source(source),
            Message::TogglePlay => self.toggle_play(),
            Message::Seek(percent) => self.seek(percent),
            Message::SetMuted(muted) => self.set_muted(muted),
            Message::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            Message::Shutdown => {
                self.teardown();
                return ControlFlow::Break(());
            }
            Message::Media { session, event } => self.on_media_event(session, event),
            Message::ProbeFinished { session, result } => self.on_probe_finished(session, result),
            Message::MetadataTimeout { session } => self.on_metadata_timeout(session),
            Message::SampleTick { session } => self.on_sample_tick(session),
            Message::SpeechFinished { session, generation } => self.on_speech_finished(session, generation),
        }
        self.publish_status();
        ControlFlow::Continue(())
    }

    /// Replace the session when the asset reference changed; otherwise keep
    /// it and only refresh what the speech fallback says.
    pub fn set_source(&mut self, source: CueSource) {
        let ref_changed = self.session.is_none() || source.asset_ref() != self.source.asset_ref();
        let speech_changed = source.fallback_text() != self.source.fallback_text()
            || source.accent != self.source.accent;
        self.source = source;

        if ref_changed {
            self.end_session();
            self.resolve();
        } else if speech_changed && self.decision() == Decision::Fallback {
            if self.session.as_ref().map_or(false, |s| s.speaking) {
                self.speech.cancel();
            }
            self.start_speech();
        }
    }

    /// Tear down the live session. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        self.end_session();
        self.publish_status();
    }

    fn end_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            if session.speaking {
                self.speech.cancel();
            }
            session.teardown();
        }
    }

    fn resolve(&mut self) {
        let id = SessionId::new(self.next_session);
        self.next_session += 1;

        let asset_ref = self.source.asset_ref().map(str::to_owned);
        let mut session = PlaybackSession::new(id, asset_ref.clone(), self.settings.sample_interval());

        let Some(url) = asset_ref else {
            self.session = Some(session);
            self.commit_fallback(CueError::NoAssetOffered);
            return;
        };

        tracing::info!("Resolving audio asset {} ({:?})", url, id);

        let mut media = self.media_factory.create(&url, MediaEvents::new(id, self.queue.clone()));
        media.set_volume(volume_for(self.muted));
        media.load();
        session.media = Some(media);
        session.loading = true;

        let check = self.probe.check(&url);
        let queue = self.queue.clone();
        let probe_task = tokio::spawn(async move {
            let result = check.await;
            let _ = queue.send(Message::ProbeFinished { session: id, result });
        });
        session.probe_task = Some(probe_task.abort_handle());

        let timeout = self.settings.metadata_timeout();
        let queue = self.queue.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = queue.send(Message::MetadataTimeout { session: id });
        });
        session.metadata_timer = Some(timer.abort_handle());

        self.session = Some(session);
    }

    /// The live session, if `id` still names it.
    fn live_session(&mut self, id: SessionId) -> Option<&mut PlaybackSession> {
        match self.session.as_mut() {
            Some(session) if session.id() == id && session.is_alive() => Some(session),
            _ => {
                tracing::debug!("Dropping signal for stale {:?}", id);
                None
            }
        }
    }

    fn on_media_event(&mut self, id: SessionId, event: MediaEvent) {
        match event {
            MediaEvent::MetadataLoaded { duration_seconds } => self.on_metadata_loaded(id, duration_seconds),
            MediaEvent::Error(error) => self.on_media_error(id, error),
            MediaEvent::Ended => self.on_ended(id),
        }
    }

    fn on_metadata_loaded(&mut self, id: SessionId, duration_seconds: f64) {
        let auto_play = self.source.auto_play;
        let Some(session) = self.live_session(id) else { return };

        if session.decision() == Decision::Fallback {
            tracing::debug!("Metadata for {:?} arrived after fallback; ignored", id);
            return;
        }

        session.cancel_metadata_timer();
        session.loading = false;
        session.duration = if duration_seconds.is_finite() && duration_seconds > 0.0 {
            duration_seconds
        } else {
            0.0
        };

        if session.latch.commit_real() {
            tracing::info!("Recorded audio ready ({:.1}s, {:?})", session.duration, id);
            self.emit(CueEvent::DecisionChanged { decision: Decision::Real });
            if auto_play {
                self.start_real_playback();
            }
        }
    }

    fn on_media_error(&mut self, id: SessionId, error: MediaError) {
        if self.live_session(id).is_none() {
            return;
        }
        self.commit_fallback(CueError::MediaDecode(error));
    }

    fn on_ended(&mut self, id: SessionId) {
        let Some(session) = self.live_session(id) else { return };
        if session.decision() != Decision::Real {
            return;
        }

        session.playing = false;
        session.stop_sampling();
        session.position = if session.duration > 0.0 { 1.0 } else { 0.0 };
        let position_fraction = session.position;
        let first = session.take_ended_report();

        tracing::info!("Recorded audio finished ({:?})", id);
        self.emit(CueEvent::Progress { position_fraction });
        if first {
            self.emit(CueEvent::Ended);
        }
    }

    fn on_probe_finished(&mut self, id: SessionId, result: Result<(), ProbeError>) {
        let Some(session) = self.live_session(id) else { return };
        session.probe_task = None;

        match result {
            Ok(()) => tracing::debug!("Existence probe passed for {:?}", id),
            Err(e) if session.decision() == Decision::Real => {
                tracing::debug!("Ignoring late probe failure for {:?}: {}", id, e);
            }
            Err(e) => self.commit_fallback(CueError::ProbeFailure(e)),
        }
    }

    fn on_metadata_timeout(&mut self, id: SessionId) {
        let timeout_ms = self.settings.metadata_timeout_ms;
        let Some(session) = self.live_session(id) else { return };
        session.metadata_timer = None;

        if session.decision() == Decision::Pending {
            self.commit_fallback(CueError::MetadataTimeout(timeout_ms));
        }
    }

    fn on_sample_tick(&mut self, id: SessionId) {
        let Some(session) = self.live_session(id) else { return };
        if session.decision() != Decision::Real || !session.playing || !session.is_sampling() {
            return;
        }
        let Some(media) = session.media.as_ref() else { return };

        let fraction = progress::position_fraction(media.current_time(), session.duration);
        session.position = fraction;
        self.emit(CueEvent::Progress { position_fraction: fraction });
    }

    fn on_speech_finished(&mut self, id: SessionId, generation: u64) {
        let Some(session) = self.live_session(id) else { return };
        if session.decision() != Decision::Fallback || !session.speaking {
            return;
        }
        if generation != session.speech_generation {
            tracing::debug!("Dropping completion of superseded speech render ({:?})", id);
            return;
        }
        if session.take_ended_report() {
            tracing::info!("Synthesized speech finished ({:?})", id);
            self.emit(CueEvent::Ended);
        }
    }

    /// Route the live session to the speech fallback. No-op when the
    /// decision was already made the other way and cannot be demoted.
    fn commit_fallback(&mut self, cause: CueError) {
        let Some(session) = self.session.as_mut() else { return };

        let committed = match cause {
            CueError::MediaDecode(_) => session.latch.demote(),
            _ => session.latch.commit_fallback(),
        };
        if !committed {
            tracing::debug!("Ignoring '{}' for {:?}: decision already {:?}", cause, session.id(), session.decision());
            return;
        }

        // Real audio must be silent before speech starts.
        session.release_media();

        let report = cause.is_reported() && session.take_error_report();
        if cause.is_reported() {
            tracing::warn!("Audio asset failed ({:?}): {}. Falling back to synthesized speech", session.id(), cause);
        } else {
            tracing::info!("{} ({:?}); using synthesized speech", cause, session.id());
        }

        self.emit(CueEvent::DecisionChanged { decision: Decision::Fallback });
        if report {
            self.emit(CueEvent::Error { message: LOAD_FAILED_MESSAGE.to_string() });
        }
        self.start_speech();
    }

    fn start_speech(&mut self) {
        let Some(session) = self.session.as_mut() else { return };

        match self.source.fallback_text() {
            Some(text) => {
                let request = SpeechRequest {
                    text: text.to_string(),
                    accent: self.source.accent,
                };
                tracing::debug!("Rendering speech fallback {:?}", request);
                session.speaking = true;
                session.speech_generation += 1;
                session.rearm_ended();
                let completion =
                    SpeechCompletion::new(session.id(), session.speech_generation, self.queue.clone());
                self.speech.set_muted(self.muted);
                self.speech.render(request, completion);
            }
            None => {
                session.speaking = false;
                tracing::info!("{}; showing unavailable indicator", CueError::NoFallbackAvailable);
            }
        }
    }

    fn publish_status(&mut self) {
        let status = self.status();
        if self.last_status != Some(status) {
            self.last_status = Some(status);
            self.emit(CueEvent::Status { status });
        }
    }

    fn emit(&self, event: CueEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("No listener for cue events");
        }
    }
}

impl Drop for SourceResolver {
    fn drop(&mut self) {
        self.end_session();
    }
}
