use std::ops::ControlFlow;
use std::sync::Arc;
use anyhow::{anyhow, Result};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::audio::MediaFactory;
use crate::engine::SpeechFallback;
use crate::hub::ExistenceProbe;
use crate::resolver::{Message, SourceResolver};
use crate::state::{CueEvent, CueSnapshot, CueSource, Settings};

/// Start a cue loop for `source`. Must be called inside a tokio runtime.
///
/// Hosts normally pass [`Settings::load_default`], which reads the JSON file
/// managed by [`crate::persistence`].
///
/// Every handler runs to completion on the loop task, one message at a
/// time. Returns the control handle and the stream of caller notifications.
pub fn spawn_cue(
    settings: Settings,
    media: Arc<dyn MediaFactory>,
    probe: Arc<dyn ExistenceProbe>,
    speech: Box<dyn SpeechFallback>,
    source: CueSource,
) -> (CueHandle, UnboundedReceiver<CueEvent>) {
    let (queue_tx, mut queue_rx) = mpsc::unbounded_channel();
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let mut resolver = SourceResolver::new(settings, media, probe, speech, queue_tx.clone(), events_tx);
    let task = tokio::spawn(async move {
        let _ = resolver.handle(Message::SetSource(source));
        while let Some(message) = queue_rx.recv().await {
            if let ControlFlow::Break(()) = resolver.handle(message) {
                break;
            }
        }
        tracing::debug!("Cue loop stopped");
    });

    let handle = CueHandle {
        queue: queue_tx,
        task: Some(task),
    };
    (handle, events_rx)
}

/// Caller-facing control surface for one mounted cue.
///
/// Dropping the handle unmounts the cue.
pub struct CueHandle {
    queue: UnboundedSender<Message>,
    task: Option<JoinHandle<()>>,
}

impl CueHandle {
    /// Swap in new caller input. A different asset reference starts a new session.
    pub fn set_source(&self, source: CueSource) -> Result<()> {
        self.send(Message::SetSource(source))
    }

    pub fn toggle_play(&self) -> Result<()> {
        self.send(Message::TogglePlay)
    }

    /// Seek to `percent` of the duration (0..=100).
    pub fn seek(&self, percent: f64) -> Result<()> {
        self.send(Message::Seek(percent))
    }

    pub fn set_muted(&self, muted: bool) -> Result<()> {
        self.send(Message::SetMuted(muted))
    }

    pub async fn snapshot(&self) -> Result<CueSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Message::Snapshot(reply_tx))?;
        reply_rx.await.map_err(|_| anyhow!("Audio cue stopped before answering"))
    }

    /// Tear the cue down and wait for the loop to finish.
    pub async fn shutdown(mut self) -> Result<()> {
        let _ = self.queue.send(Message::Shutdown);
        if let Some(task) = self.task.take() {
            task.await?;
        }
        Ok(())
    }

    fn send(&self, message: Message) -> Result<()> {
        self.queue
            .send(message)
            .map_err(|_| anyhow!("Audio cue has shut down"))
    }
}

impl Drop for CueHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.queue.send(Message::Shutdown);
        }
    }
}
