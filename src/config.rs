use crate::models::MatchCriteria;
use crate::scrapers::FetchOptions;
use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::time::Duration;
use url::Url;

const DEFAULT_SEARCH_URL: &str =
    "https://www.spitogatos.gr/en/for_sale-houses/corinthia?maximum_price=150000";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125 Safari/537.36";

/// How pages are loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FetcherKind {
    /// Headless Chrome, for client-rendered result pages
    Browser,
    /// Plain HTTP GET
    Http,
}

/// Process configuration, read once at startup from flags, the environment
/// and an optional `.env` file.
#[derive(Debug, Clone, Parser)]
#[command(name = "plot-scout", about = "Watches a property search and reports new plots", version)]
pub struct Config {
    /// Search results page to watch
    #[arg(long, env = "SEARCH_URL", default_value = DEFAULT_SEARCH_URL)]
    pub search_url: String,

    /// Highest acceptable price (EUR)
    #[arg(long, env = "MAX_PRICE_EUR", default_value_t = 150_000)]
    pub max_price: i64,

    /// Smallest acceptable plot (m²)
    #[arg(long, env = "MIN_PLOT_M2", default_value_t = 1000)]
    pub min_plot: i64,

    /// Seconds between cycles
    #[arg(long, env = "CHECK_INTERVAL", default_value_t = 900)]
    pub interval: u64,

    #[arg(long, env = "USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub telegram_bot_token: Option<String>,

    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,

    /// Path fragments that identify a listing detail page
    #[arg(
        long,
        env = "LINK_MARKERS",
        value_delimiter = ',',
        default_value = "for_sale,property,listing,aggelia"
    )]
    pub link_markers: Vec<String>,

    /// New listings checked per cycle at most; the rest wait for the next one
    #[arg(long, env = "MAX_LISTINGS_PER_CYCLE", default_value_t = 40)]
    pub max_listings_per_cycle: usize,

    /// Seconds a single page load may take
    #[arg(long, env = "FETCH_TIMEOUT", default_value_t = 60)]
    pub fetch_timeout: u64,

    #[arg(long, env = "FETCHER", value_enum, default_value_t = FetcherKind::Browser)]
    pub fetcher: FetcherKind,

    #[arg(long, env = "SEARCH_SETTLE_MS", default_value_t = 4000)]
    pub search_settle_ms: u64,

    #[arg(long, env = "DETAIL_SETTLE_MS", default_value_t = 2500)]
    pub detail_settle_ms: u64,

    /// Name of the watch, shown in message titles
    #[arg(long, env = "WATCH_LABEL")]
    pub label: Option<String>,

    /// Send a liveness message at startup
    #[arg(long, env = "NOTIFY_STARTUP", default_value_t = true, action = ArgAction::Set)]
    pub notify_startup: bool,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    /// Load configuration from `.env`, environment and flags
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.search_url()?;

        if self.interval == 0 {
            bail!("CHECK_INTERVAL must be at least 1 second");
        }
        if self.fetch_timeout == 0 {
            bail!("FETCH_TIMEOUT must be at least 1 second");
        }
        if self.max_listings_per_cycle == 0 {
            bail!("MAX_LISTINGS_PER_CYCLE must be at least 1");
        }
        if self.max_price < 0 || self.min_plot < 0 {
            bail!("MAX_PRICE_EUR and MIN_PLOT_M2 must not be negative");
        }
        Ok(())
    }

    pub fn search_url(&self) -> Result<Url> {
        let url = Url::parse(&self.search_url)
            .with_context(|| format!("Invalid SEARCH_URL: {}", self.search_url))?;

        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            bail!("SEARCH_URL must be an http(s) URL with a host: {}", self.search_url);
        }
        Ok(url)
    }

    pub fn criteria(&self) -> MatchCriteria {
        MatchCriteria {
            max_price: self.max_price,
            min_plot_area: self.min_plot,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            user_agent: self.user_agent.clone(),
            timeout: self.fetch_timeout(),
            search_settle: Duration::from_millis(self.search_settle_ms),
            detail_settle: Duration::from_millis(self.detail_settle_ms),
        }
    }

    /// Bot token and chat id, when both are set and non-blank
    pub fn telegram_credentials(&self) -> Option<(String, String)> {
        let token = self.telegram_bot_token.as_deref().map(str::trim)?;
        let chat_id = self.telegram_chat_id.as_deref().map(str::trim)?;

        if token.is_empty() || chat_id.is_empty() {
            return None;
        }
        Some((token.to_string(), chat_id.to_string()))
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref().map(str::trim).filter(|l| !l.is_empty())
    }
}
