//! One discovery-and-check pass over the search page.
//!
//! ```text
//! FETCH_SEARCH ─┬─ blocked ──> notify once ──────────────────────────> DONE
//!               └─ CLASSIFY ─> for each new link (capped):
//!                     mark seen → fetch → [blocked: skip] → extract
//!                     → [filter fails: skip] → notify → record   ──> DONE
//! ```
//!
//! Errors on a single listing are logged and the pass moves on. Only a
//! failure to load the search page itself ends the pass with an error.

use crate::dedup::DedupStore;
use crate::filter::matches;
use crate::models::{CycleResult, Listing, MatchCriteria};
use crate::notifier::{messages, Notifier};
use crate::parsing::{extract_page_fields, is_blocked, LinkClassifier};
use crate::scrapers::{Page, PageFetcher, PageKind};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Outcome of checking a single listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingOutcome {
    Blocked,
    Rejected,
    Notified,
    NotifyFailed,
}

/// Cycle settings that do not change over the process lifetime
#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub search_url: Url,
    pub criteria: MatchCriteria,
    pub max_listings_per_cycle: usize,
    pub fetch_timeout: Duration,
    pub label: Option<String>,
}

/// Drives discovery cycles. Owns the dedup store, so a URL attempted in one
/// cycle is never attempted again by this watcher.
pub struct Watcher {
    fetcher: Arc<dyn PageFetcher>,
    notifier: Arc<dyn Notifier>,
    classifier: LinkClassifier,
    seen: DedupStore,
    settings: WatchSettings,
}

impl Watcher {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        notifier: Arc<dyn Notifier>,
        classifier: LinkClassifier,
        settings: WatchSettings,
    ) -> Self {
        Self {
            fetcher,
            notifier,
            classifier,
            seen: DedupStore::new(),
            settings,
        }
    }

    #[cfg(test)]
    pub fn seen(&self) -> &DedupStore {
        &self.seen
    }

    /// Run one full pass: search page, then every new listing on it
    pub async fn run_cycle(&mut self) -> Result<CycleResult> {
        let mut result = CycleResult::new(Utc::now());
        let search_url = self.settings.search_url.to_string();

        info!(url = %search_url, fetcher = self.fetcher.name(), "Cycle start");

        let search = self
            .fetch(&search_url, PageKind::Search)
            .await
            .context("Search page fetch failed")?;

        if is_blocked(&search.html) {
            warn!("Blocked by anti-bot protection on the search page (captcha)");
            result.blocked = true;
            let site = self.settings.search_url.host_str().unwrap_or("site");
            self.notify(&messages::blocked_message(site)).await;
            return Ok(result);
        }

        let links = self.classifier.classify(&search.links);
        result.links_found = links.len();
        info!(links_found = links.len(), "Links found");

        let mut attempted = 0;
        for link in &links {
            if attempted >= self.settings.max_listings_per_cycle {
                debug!(
                    limit = self.settings.max_listings_per_cycle,
                    "Listing cap reached, leaving the rest for the next cycle"
                );
                break;
            }
            if !self.seen.check_and_mark(link) {
                continue;
            }
            attempted += 1;

            match self.check_listing(link).await {
                Ok(ListingOutcome::Blocked) => result.listings_blocked += 1,
                Ok(ListingOutcome::Rejected | ListingOutcome::NotifyFailed) => {
                    result.listings_checked += 1
                }
                Ok(ListingOutcome::Notified) => {
                    result.listings_checked += 1;
                    result.matches_notified += 1;
                }
                Err(e) => {
                    warn!(url = %link, "Listing failed: {:#}", e);
                    result.listings_failed += 1;
                }
            }
        }

        info!(
            checked = result.listings_checked,
            notified = result.matches_notified,
            failed = result.listings_failed,
            blocked = result.listings_blocked,
            seen_total = self.seen.len(),
            took_ms = (Utc::now() - result.started_at).num_milliseconds(),
            "Cycle done"
        );

        Ok(result)
    }

    /// Fetch, extract, filter and notify for one listing already marked seen
    async fn check_listing(&self, url: &str) -> Result<ListingOutcome> {
        let page = self.fetch(url, PageKind::Detail).await?;

        if is_blocked(&page.html) {
            warn!(url = %url, "Blocked (captcha) on listing page");
            return Ok(ListingOutcome::Blocked);
        }

        let fields = extract_page_fields(&page.text, &page.html);
        let listing = Listing::new(url, fields);

        info!(
            id = %listing.id,
            price = ?fields.price,
            plot = ?fields.plot_area,
            url = %url,
            "Listing"
        );
        debug!(
            "Listing record: {}",
            serde_json::to_string(&listing).unwrap_or_default()
        );

        if !matches(&fields, &self.settings.criteria) {
            return Ok(ListingOutcome::Rejected);
        }

        let message =
            messages::match_message(&listing, &self.settings.criteria, self.settings.label.as_deref());

        if self.notify(&message).await {
            info!(id = %listing.id, "Match notified");
            Ok(ListingOutcome::Notified)
        } else {
            Ok(ListingOutcome::NotifyFailed)
        }
    }

    /// Fetch bounded by the configured deadline
    async fn fetch(&self, url: &str, kind: PageKind) -> Result<Page> {
        let timeout = self.settings.fetch_timeout;

        tokio::time::timeout(timeout, self.fetcher.fetch(url, kind))
            .await
            .map_err(|_| anyhow!("Timed out after {:?} fetching {}", timeout, url))?
    }

    /// Deliver a message; failures are logged, never propagated
    pub async fn notify(&self, text: &str) -> bool {
        match self.notifier.send(text).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Notification failed: {:#}", e);
                false
            }
        }
    }
}
