mod config;
mod dedup;
mod filter;
mod models;
mod notifier;
mod parsing;
mod scrapers;
mod watcher;

#[cfg(test)]
mod testing;

use config::{Config, FetcherKind};
use notifier::{messages, LogNotifier, Notifier, TelegramNotifier};
use parsing::LinkClassifier;
use scrapers::{BrowserFetcher, HttpFetcher, PageFetcher};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use watcher::{Scheduler, WatchSettings, Watcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    // Initialize logging; RUST_LOG wins over -v
    let default_filter = match config.verbose {
        0 => "plot_scout=info,warn",
        1 => "plot_scout=debug,info",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    info!("🏡 Plot Scout");
    info!("==========================================");

    let search_url = config.search_url()?;
    let criteria = config.criteria();
    info!(
        url = %search_url,
        max_price = criteria.max_price,
        min_plot = criteria.min_plot_area,
        interval_secs = config.interval,
        "Watching search page"
    );

    let fetcher: Arc<dyn PageFetcher> = match config.fetcher {
        FetcherKind::Browser => {
            // Keep the DevTools connection alive through the sleep between cycles
            let idle_timeout = config.interval() + config.fetch_timeout() * 2;
            Arc::new(BrowserFetcher::new(config.fetch_options(), idle_timeout))
        }
        FetcherKind::Http => Arc::new(HttpFetcher::new(&config.fetch_options())?),
    };

    let notifier: Arc<dyn Notifier> = match config.telegram_credentials() {
        Some((token, chat_id)) => Arc::new(TelegramNotifier::new(token, chat_id)?),
        None => {
            warn!("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID missing, notifications go to the log only");
            Arc::new(LogNotifier)
        }
    };

    let classifier = LinkClassifier::new(&search_url, config.link_markers.clone());
    let settings = WatchSettings {
        search_url,
        criteria,
        max_listings_per_cycle: config.max_listings_per_cycle,
        fetch_timeout: config.fetch_timeout(),
        label: config.label().map(str::to_string),
    };
    let watcher = Watcher::new(fetcher, notifier, classifier, settings);

    if config.notify_startup {
        watcher
            .notify(&messages::startup_message(&criteria, config.label()))
            .await;
    }

    let mut scheduler = Scheduler::new(watcher, config.interval());

    if config.once {
        scheduler.run_cycles(1).await;
        return Ok(());
    }

    tokio::select! {
        _ = scheduler.run_forever() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down");
        }
    }

    Ok(())
}
