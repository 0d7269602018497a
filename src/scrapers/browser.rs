use crate::scrapers::traits::PageFetcher;
use crate::scrapers::types::{FetchOptions, Page, PageKind};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const OUTER_HTML_JS: &str = "document.documentElement.outerHTML";
const BODY_TEXT_JS: &str = "document.body ? document.body.innerText : ''";

/// Page fetcher driving headless Chrome, for sites that only render their
/// results client-side.
///
/// One browser is shared across fetches; every fetch gets a fresh tab. When
/// a fetch fails the browser is dropped and relaunched on the next call, so a
/// crashed Chrome costs one listing rather than the rest of the process.
///
/// Renders run one at a time. A render that outlives its deadline keeps the
/// gate until its thread returns, so the next fetch waits for it instead of
/// driving Chrome alongside it.
pub struct BrowserFetcher {
    options: FetchOptions,
    idle_timeout: Duration,
    browser: Arc<Mutex<Option<Browser>>>,
    gate: Arc<tokio::sync::Mutex<()>>,
}

impl BrowserFetcher {
    /// `idle_timeout` must outlast the pause between cycles, otherwise the
    /// DevTools connection is closed while the watcher sleeps.
    pub fn new(options: FetchOptions, idle_timeout: Duration) -> Self {
        Self {
            options,
            idle_timeout,
            browser: Arc::new(Mutex::new(None)),
            gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}

fn launch(idle_timeout: Duration) -> Result<Browser> {
    info!("Launching headless Chrome...");

    let launch_options = LaunchOptions::default_builder()
        .headless(true)
        .idle_browser_timeout(idle_timeout)
        .build()
        .context("Failed to build launch options")?;

    Browser::new(launch_options).context("Failed to launch Chrome browser")
}

/// The shared browser, launched on first use or after a discard
fn shared_browser(slot: &Mutex<Option<Browser>>, idle_timeout: Duration) -> Result<Browser> {
    let mut slot = slot
        .lock()
        .map_err(|_| anyhow!("Browser slot lock poisoned"))?;

    if let Some(browser) = slot.as_ref() {
        return Ok(browser.clone());
    }

    let browser = launch(idle_timeout)?;
    *slot = Some(browser.clone());
    Ok(browser)
}

fn discard_browser(slot: &Mutex<Option<Browser>>) {
    if let Ok(mut slot) = slot.lock() {
        if slot.take().is_some() {
            debug!("Dropped browser after failed fetch");
        }
    }
}

/// Run a blocking job on the blocking pool, one at a time, bounded by
/// `deadline`.
///
/// Waiting for the gate counts against the deadline. On expiry the caller gets
/// an error right away while the job keeps the gate until it returns.
pub(crate) async fn run_exclusive<T, F>(
    gate: &Arc<tokio::sync::Mutex<()>>,
    deadline: Duration,
    job: F,
) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let started = Instant::now();

    let permit = tokio::time::timeout(deadline, gate.clone().lock_owned())
        .await
        .map_err(|_| anyhow!("Previous render still running after {:?}", deadline))?;

    let handle = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        job()
    });

    let remaining = deadline.saturating_sub(started.elapsed());
    match tokio::time::timeout(remaining, handle).await {
        Ok(joined) => joined.context("Browser task panicked")?,
        Err(_) => Err(anyhow!("Timed out after {:?}", deadline)),
    }
}

/// Open `url` in a new tab, wait for it to settle, read HTML and body text.
fn render(browser: &Browser, url: &str, options: &FetchOptions, settle: Duration) -> Result<Page> {
    let tab = browser.new_tab().context("Failed to open tab")?;
    tab.set_default_timeout(
        options
            .timeout
            .saturating_sub(settle)
            .max(Duration::from_secs(1)),
    );
    tab.set_user_agent(&options.user_agent, None, None)
        .context("Failed to set user agent")?;

    let result = (|| {
        tab.navigate_to(url)?;
        tab.wait_until_navigated()?;

        thread::sleep(settle);

        let html = evaluate_string(&tab, OUTER_HTML_JS)?;
        let text = evaluate_string(&tab, BODY_TEXT_JS)?;
        debug!("Rendered {} ({} bytes of HTML)", url, html.len());

        Page::new(url, html, text)
    })();

    if let Err(e) = tab.close(true) {
        debug!("Failed to close tab for {}: {:#}", url, e);
    }

    result.with_context(|| format!("Failed to render {}", url))
}

fn evaluate_string(tab: &headless_chrome::Tab, expression: &str) -> Result<String> {
    let remote = tab.evaluate(expression, false)?;
    Ok(remote
        .value
        .as_ref()
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string())
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str, kind: PageKind) -> Result<Page> {
        let options = self.options.clone();
        let deadline = options.timeout;
        let settle = options.settle_for(kind);
        let idle_timeout = self.idle_timeout;
        let target = url.to_string();
        let slot = self.browser.clone();

        let result = run_exclusive(&self.gate, deadline, move || {
            let rendered = shared_browser(&slot, idle_timeout)
                .and_then(|browser| render(&browser, &target, &options, settle));
            if rendered.is_err() {
                discard_browser(&slot);
            }
            rendered
        })
        .await;

        if let Err(e) = &result {
            debug!("Browser fetch failed for {}: {:#}", url, e);
            discard_browser(&self.browser);
        }

        result
    }

    fn name(&self) -> &'static str {
        "headless-chrome"
    }
}
