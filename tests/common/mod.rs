//! Fake collaborators shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use listening_cue::{
    ExistenceProbe, MediaError, MediaEvents, MediaFactory, MediaHandle, ProbeError,
    SpeechCompletion, SpeechFallback, SpeechRequest,
};

pub fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[derive(Default)]
pub struct MediaLog {
    pub created: Vec<String>,
    pub events: Vec<MediaEvents>,
    pub volumes: Vec<f32>,
    pub plays: usize,
    pub pauses: usize,
    pub released: usize,
    pub current_time: f64,
    pub seeks: Vec<f64>,
}

#[derive(Clone, Default)]
pub struct FakeMedia {
    pub log: Arc<Mutex<MediaLog>>,
}

impl FakeMedia {
    pub fn events(&self) -> MediaEvents {
        self.log.lock().unwrap().events.last().cloned().expect("no media handle created")
    }

    pub fn set_current_time(&self, seconds: f64) {
        self.log.lock().unwrap().current_time = seconds;
    }

    pub fn calls(&self) -> usize {
        let log = self.log.lock().unwrap();
        log.created.len() + log.plays + log.pauses + log.seeks.len()
    }
}

struct Handle(Arc<Mutex<MediaLog>>);

impl MediaHandle for Handle {
    fn set_volume(&mut self, volume: f32) {
        self.0.lock().unwrap().volumes.push(volume);
    }
    fn load(&mut self) {}
    fn play(&mut self) -> Result<(), MediaError> {
        self.0.lock().unwrap().plays += 1;
        Ok(())
    }
    fn pause(&mut self) {
        self.0.lock().unwrap().pauses += 1;
    }
    fn current_time(&self) -> f64 {
        self.0.lock().unwrap().current_time
    }
    fn set_current_time(&mut self, seconds: f64) {
        let mut log = self.0.lock().unwrap();
        log.seeks.push(seconds);
        log.current_time = seconds;
    }
    fn release(&mut self) {
        self.0.lock().unwrap().released += 1;
    }
}

impl MediaFactory for FakeMedia {
    fn create(&self, asset_ref: &str, events: MediaEvents) -> Box<dyn MediaHandle> {
        let mut log = self.log.lock().unwrap();
        log.created.push(asset_ref.to_string());
        log.events.push(events);
        Box::new(Handle(self.log.clone()))
    }
}

/// Answers every check with `outcome` after `delay`.
#[derive(Clone)]
pub struct ScriptedProbe {
    pub outcome: Result<(), ProbeError>,
    pub delay: Duration,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedProbe {
    pub fn new(outcome: Result<(), ProbeError>, delay: Duration) -> Self {
        Self { outcome, delay, calls: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn ok() -> Self {
        Self::new(Ok(()), Duration::ZERO)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ExistenceProbe for ScriptedProbe {
    fn check(&self, _asset_ref: &str) -> BoxFuture<'static, Result<(), ProbeError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcome.clone();
        let delay = self.delay;
        async move {
            tokio::time::sleep(delay).await;
            outcome
        }
        .boxed()
    }
}

#[derive(Default)]
pub struct SpeechLog {
    pub renders: Vec<SpeechRequest>,
    pub completions: Vec<SpeechCompletion>,
    pub toggles: usize,
    pub cancels: usize,
}

#[derive(Clone, Default)]
pub struct FakeSpeech {
    pub log: Arc<Mutex<SpeechLog>>,
}

impl FakeSpeech {
    pub fn rendered_texts(&self) -> Vec<String> {
        self.log.lock().unwrap().renders.iter().map(|r| r.text.clone()).collect()
    }
}

impl SpeechFallback for FakeSpeech {
    fn render(&mut self, request: SpeechRequest, on_complete: SpeechCompletion) {
        let mut log = self.log.lock().unwrap();
        log.renders.push(request);
        log.completions.push(on_complete);
    }
    fn toggle_play(&mut self) {
        self.log.lock().unwrap().toggles += 1;
    }
    fn cancel(&mut self) {
        self.log.lock().unwrap().cancels += 1;
    }
}
