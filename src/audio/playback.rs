use tokio::sync::mpsc::UnboundedSender;

use crate::error::MediaError;
use crate::resolver::{Message, SessionId};

pub const FULL_VOLUME: f32 = 1.0;

/// Signals a media handle raises while loading or playing.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    MetadataLoaded { duration_seconds: f64 },
    Error(MediaError),
    Ended,
}

/// Sender a media handle uses to report back to the session that created it.
///
/// Every event is tagged with the owning session, so events from a handle
/// whose session has already been replaced are dropped by the resolver.
#[derive(Debug, Clone)]
pub struct MediaEvents {
    session: SessionId,
    queue: UnboundedSender<Message>,
}

impl MediaEvents {
    pub(crate) fn new(session: SessionId, queue: UnboundedSender<Message>) -> Self {
        Self { session, queue }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn metadata_loaded(&self, duration_seconds: f64) {
        self.send(MediaEvent::MetadataLoaded { duration_seconds });
    }

    pub fn error(&self, error: MediaError) {
        self.send(MediaEvent::Error(error));
    }

    pub fn ended(&self) {
        self.send(MediaEvent::Ended);
    }

    fn send(&self, event: MediaEvent) {
        if self.queue.send(Message::Media { session: self.session, event }).is_err() {
            tracing::debug!("Cue loop gone, dropping media event for {:?}", self.session);
        }
    }
}

/// A media element playing one recorded asset.
///
/// Implementations report metadata, errors and the natural end through the
/// `MediaEvents` they were created with.
pub trait MediaHandle: Send {
    fn set_volume(&mut self, volume: f32);

    /// Start fetching the asset. Completion arrives as `MediaEvent::MetadataLoaded`.
    fn load(&mut self);

    /// Best effort; the host may refuse (e.g. autoplay restrictions).
    fn play(&mut self) -> Result<(), MediaError>;

    fn pause(&mut self);

    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, seconds: f64);

    /// Stop playback, abandon any in-flight load and detach the source.
    /// Called exactly once, after which the handle is dropped.
    fn release(&mut self);
}

/// Builds media handles for asset references.
pub trait MediaFactory: Send + Sync {
    fn create(&self, asset_ref: &str, events: MediaEvents) -> Box<dyn MediaHandle>;
}

pub(crate) fn volume_for(muted: bool) -> f32 {
    if muted {
        0.0
    } else {
        FULL_VOLUME
    }
}
