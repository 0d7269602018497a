use crate::watcher::cycle::Watcher;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Runs the watcher on a fixed interval. A failed cycle is logged and the
/// loop sleeps the same interval as after a good one: no backoff, no
/// retry limit.
pub struct Scheduler {
    watcher: Watcher,
    interval: Duration,
}

impl Scheduler {
    pub fn new(watcher: Watcher, interval: Duration) -> Self {
        Self { watcher, interval }
    }

    #[cfg(test)]
    pub fn watcher(&self) -> &Watcher {
        &self.watcher
    }

    /// Loop until the process is stopped
    pub async fn run_forever(&mut self) {
        loop {
            self.tick().await;
            self.sleep().await;
        }
    }

    /// Run `cycles` cycles, sleeping between them but not after the last
    pub async fn run_cycles(&mut self, cycles: usize) {
        for n in 0..cycles {
            if n > 0 {
                self.sleep().await;
            }
            self.tick().await;
        }
    }

    async fn tick(&mut self) {
        match self.watcher.run_cycle().await {
            Ok(result) => {
                debug!(
                    "Cycle summary: {}",
                    serde_json::to_string(&result).unwrap_or_default()
                );
                if result.blocked {
                    warn!("Cycle ended early: search page blocked");
                }
            }
            Err(e) => warn!("Cycle failed: {:#}", e),
        }
    }

    async fn sleep(&self) {
        info!("Sleeping {}s until next cycle", self.interval.as_secs());
        tokio::time::sleep(self.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchCriteria;
    use crate::parsing::LinkClassifier;
    use crate::testing::{page, FakeFetcher, RecordingNotifier};
    use crate::watcher::cycle::WatchSettings;
    use std::sync::Arc;
    use url::Url;

    const SEARCH: &str = "https://www.spitogatos.gr/en/for_sale-houses/corinthia";
    const A: &str = "https://www.spitogatos.gr/en/property/1001";

    fn scheduler(fetcher: &Arc<FakeFetcher>, notifier: &Arc<RecordingNotifier>) -> Scheduler {
        let settings = WatchSettings {
            search_url: Url::parse(SEARCH).unwrap(),
            criteria: MatchCriteria {
                max_price: 150_000,
                min_plot_area: 1000,
            },
            max_listings_per_cycle: 40,
            fetch_timeout: Duration::from_secs(5),
            label: None,
        };
        let classifier = LinkClassifier::new(&settings.search_url, vec!["property".to_string()]);
        let watcher = Watcher::new(fetcher.clone(), notifier.clone(), classifier, settings);
        Scheduler::new(watcher, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_failed_cycles_do_not_stop_the_loop() {
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.fail(SEARCH, "connection refused");
        let notifier = Arc::new(RecordingNotifier::new());

        let mut scheduler = scheduler(&fetcher, &notifier);
        scheduler.run_cycles(3).await;

        assert_eq!(fetcher.requests(), vec![SEARCH, SEARCH, SEARCH]);
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_listing_notified_once_across_cycles() {
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.insert(
            SEARCH,
            page(SEARCH, &format!(r#"<a href="{}">house</a>"#, A), "house"),
        );
        fetcher.insert(A, page(A, "<p>€ 99.000 plot 1.5 stremma</p>", "€ 99.000 plot 1.5 stremma"));
        let notifier = Arc::new(RecordingNotifier::new());

        let mut scheduler = scheduler(&fetcher, &notifier);
        scheduler.run_cycles(3).await;

        assert_eq!(notifier.messages().len(), 1);
        assert!(notifier.messages()[0].contains("1500 m²"));
        assert_eq!(fetcher.requests(), vec![SEARCH, A, SEARCH, SEARCH]);
        assert!(scheduler.watcher().seen().has_seen(A));
    }
}
