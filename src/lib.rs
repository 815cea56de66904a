pub mod audio;
pub mod engine;
pub mod error;
pub mod hub;
pub mod persistence;
pub mod player;
pub mod resolver;
pub mod state;

pub use audio::{MediaEvent, MediaEvents, MediaFactory, MediaHandle};
pub use engine::{SpeechCompletion, SpeechFallback, SpeechRequest};
pub use error::{CueError, MediaError, ProbeError, LOAD_FAILED_MESSAGE};
pub use hub::{ExistenceProbe, HttpProbe};
pub use player::{spawn_cue, CueHandle};
pub use resolver::{Message, SessionId, SourceResolver};
pub use state::{Accent, CueEvent, CueSnapshot, CueSource, CueStatus, Decision, Settings};

/// Install the default `tracing` subscriber. Safe to call more than once.
pub fn init_logging() {
    if tracing_subscriber::fmt().try_init().is_ok() {
        tracing::info!("Listening cue v{}", env!("CARGO_PKG_VERSION"));
    }
}
