//! In-memory fetcher and notifier for watcher tests.

use crate::notifier::Notifier;
use crate::scrapers::browser::run_exclusive;
use crate::scrapers::{Page, PageFetcher, PageKind};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub fn page(url: &str, html: &str, text: &str) -> Page {
    Page::new(url, html.to_string(), text.to_string()).unwrap()
}

/// Serves canned pages and records every requested URL
#[derive(Default)]
pub struct FakeFetcher {
    pages: Mutex<HashMap<String, std::result::Result<Page, String>>>,
    delays: Mutex<HashMap<String, Duration>>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: &str, page: Page) {
        self.pages.lock().unwrap().insert(url.to_string(), Ok(page));
    }

    pub fn fail(&self, url: &str, error: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(error.to_string()));
    }

    pub fn delay(&self, url: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(url.to_string(), delay);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, _kind: PageKind) -> Result<Page> {
        self.requests.lock().unwrap().push(url.to_string());

        let delay = self.delays.lock().unwrap().get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let response = self.pages.lock().unwrap().get(url).cloned();
        match response {
            Some(Ok(page)) => Ok(page),
            Some(Err(e)) => Err(anyhow!("{}", e)),
            None => Err(anyhow!("no page for {}", url)),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Serves canned pages from a blocking render job behind a gate, the way the
/// browser fetcher does, and records how many renders ever overlapped
pub struct BlockingFetcher {
    pages: FakeFetcher,
    deadline: Duration,
    render_time: Mutex<HashMap<String, Duration>>,
    gate: Arc<tokio::sync::Mutex<()>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl BlockingFetcher {
    pub fn new(deadline: Duration) -> Self {
        Self {
            pages: FakeFetcher::new(),
            deadline,
            render_time: Mutex::new(HashMap::new()),
            gate: Arc::new(tokio::sync::Mutex::new(())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn insert(&self, url: &str, page: Page, render_time: Duration) {
        self.pages.insert(url, page);
        self.render_time
            .lock()
            .unwrap()
            .insert(url.to_string(), render_time);
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for BlockingFetcher {
    async fn fetch(&self, url: &str, kind: PageKind) -> Result<Page> {
        let page = self.pages.fetch(url, kind).await;
        let render_time = self
            .render_time
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or_default();
        let in_flight = self.in_flight.clone();
        let max_in_flight = self.max_in_flight.clone();

        run_exclusive(&self.gate, self.deadline, move || {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            max_in_flight.fetch_max(now, Ordering::SeqCst);
            thread::sleep(render_time);
            in_flight.fetch_sub(1, Ordering::SeqCst);
            page
        })
        .await
    }

    fn name(&self) -> &'static str {
        "blocking"
    }
}

/// Keeps every delivered message; optionally fails every send
#[derive(Default)]
pub struct RecordingNotifier {
    fail: bool,
    attempts: Mutex<usize>,
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        *self.attempts.lock().unwrap() += 1;
        if self.fail {
            return Err(anyhow!("chat not found"));
        }
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
