//! Scripted tiers for pipeline tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::fetch::{PageFetcher, RawFetchOutcome};
use crate::render::{PageRenderer, RenderOutcome};

/// Shared record of tier calls, in the order they started and finished.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub struct FakeFetcher {
    outcome: RawFetchOutcome,
    calls: AtomicUsize,
    timeouts: Mutex<Vec<Duration>>,
    log: Option<EventLog>,
}

impl FakeFetcher {
    pub fn new(outcome: RawFetchOutcome) -> Arc<Self> {
        Arc::new(Self { outcome, calls: AtomicUsize::new(0), timeouts: Mutex::new(Vec::new()), log: None })
    }

    pub fn html(html: &str) -> Arc<Self> {
        Self::new(RawFetchOutcome::ok(200, html.to_string()))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::new(RawFetchOutcome::failed(None, message))
    }

    pub fn logged(outcome: RawFetchOutcome, log: EventLog) -> Arc<Self> {
        Arc::new(Self { outcome, calls: AtomicUsize::new(0), timeouts: Mutex::new(Vec::new()), log: Some(log) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn timeouts(&self) -> Vec<Duration> {
        self.timeouts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> RawFetchOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.timeouts.lock().unwrap().push(timeout);
        if let Some(log) = &self.log {
            log.lock().unwrap().push(format!("fetch:{url}"));
        }
        self.outcome.clone()
    }
}

pub struct FakeRenderer {
    outcome: RenderOutcome,
    calls: AtomicUsize,
    log: Option<EventLog>,
}

impl FakeRenderer {
    pub fn new(outcome: RenderOutcome) -> Arc<Self> {
        Arc::new(Self { outcome, calls: AtomicUsize::new(0), log: None })
    }

    pub fn text(html: &str, text: &str) -> Arc<Self> {
        Self::new(RenderOutcome::ok(html.to_string(), text.to_string()))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::new(RenderOutcome::failed(message))
    }

    pub fn logged(outcome: RenderOutcome, log: EventLog) -> Arc<Self> {
        Arc::new(Self { outcome, calls: AtomicUsize::new(0), log: Some(log) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PageRenderer for FakeRenderer {
    async fn render(&self, url: &str) -> RenderOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.log {
            log.lock().unwrap().push(format!("render:start:{url}"));
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        if let Some(log) = &self.log {
            log.lock().unwrap().push(format!("render:end:{url}"));
        }
        self.outcome.clone()
    }
}
