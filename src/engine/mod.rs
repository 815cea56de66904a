use tokio::sync::mpsc::UnboundedSender;

use crate::resolver::{Message, SessionId};
use crate::state::Accent;

/// What the speech fallback should say.
#[derive(Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    pub accent: Accent,
}

impl std::fmt::Debug for SpeechRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechRequest")
            .field("chars", &self.text.chars().count())
            .field("accent", &self.accent)
            .finish()
    }
}

/// Completion signal handed to the speech fallback with each render.
///
/// Consumed on use, so a render can finish at most once.
#[derive(Debug)]
pub struct SpeechCompletion {
    session: SessionId,
    generation: u64,
    queue: UnboundedSender<Message>,
}

impl SpeechCompletion {
    pub(crate) fn new(session: SessionId, generation: u64, queue: UnboundedSender<Message>) -> Self {
        Self { session, generation, queue }
    }

    pub fn complete(self) {
        let _ = self.queue.send(Message::SpeechFinished {
            session: self.session,
            generation: self.generation,
        });
    }
}

/// Synthesized-speech playback provider used when the recorded asset is
/// not available. It owns its own autoplay and play/pause behavior.
pub trait SpeechFallback: Send {
    fn render(&mut self, request: SpeechRequest, on_complete: SpeechCompletion);

    fn toggle_play(&mut self);

    fn set_muted(&mut self, _muted: bool) {}

    /// Stop speaking and forget the current render.
    fn cancel(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn debug_never_prints_the_text() {
        let request = SpeechRequest { text: "hidden answer".into(), accent: Accent::Au };
        let printed = format!("{:?}", request);
        assert!(!printed.contains("hidden"));
        assert!(printed.contains("chars: 13"));
    }

    #[test]
    fn completion_posts_tagged_message() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        SpeechCompletion::new(SessionId::new(3), 2, tx).complete();
        assert!(matches!(
            rx.try_recv().unwrap(),
            Message::SpeechFinished { session, generation } if session == SessionId::new(3) && generation == 2
        ));
    }
}
