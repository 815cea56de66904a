use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::{Message, SessionId};

/// Fixed-cadence sampler that posts `SampleTick`s while recorded audio plays.
///
/// At most one sampling task exists per reporter; `start` on a running
/// reporter is a no-op and `stop` aborts the task before returning.
#[derive(Debug)]
pub struct ProgressReporter {
    interval: Duration,
    task: Option<AbortHandle>,
}

impl ProgressReporter {
    pub fn new(interval: Duration) -> Self {
        Self { interval, task: None }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn start(&mut self, session: SessionId, queue: &UnboundedSender<Message>) {
        if self.task.is_some() {
            return;
        }

        let queue = queue.clone();
        let period = self.interval;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if queue.send(Message::SampleTick { session }).is_err() {
                    break;
                }
            }
        });
        self.task = Some(task.abort_handle());
        tracing::debug!("Progress sampling started for {:?}", session);
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Progress sampling stopped");
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Normalized position, 0 when the duration is unknown.
pub fn position_fraction(current_seconds: f64, duration_seconds: f64) -> f64 {
    if !duration_seconds.is_finite() || duration_seconds <= 0.0 || !current_seconds.is_finite() {
        return 0.0;
    }
    (current_seconds / duration_seconds).clamp(0.0, 1.0)
}
