use crate::parsing::extract_links;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Which kind of page is being fetched; rendered fetchers wait longer for
/// the search results grid than for a single listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageKind {
    Search,
    Detail,
}

/// A fetched page: raw HTML, visible text and the absolute links on it
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub html: String,
    pub text: String,
    pub links: Vec<String>,
}

impl Page {
    /// Build a page, resolving its links against `url`
    pub fn new(url: &str, html: String, text: String) -> Result<Self> {
        let base = Url::parse(url).with_context(|| format!("Invalid page URL: {}", url))?;
        let links = extract_links(&html, &base);

        Ok(Self {
            html,
            text,
            links,
        })
    }
}

/// Fetch settings shared by both fetchers
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: String,
    /// Upper bound for one page load
    pub timeout: Duration,
    /// Extra wait after navigation before the search page is read
    pub search_settle: Duration,
    /// Extra wait after navigation before a listing page is read
    pub detail_settle: Duration,
}

impl FetchOptions {
    pub fn settle_for(&self, kind: PageKind) -> Duration {
        match kind {
            PageKind::Search => self.search_settle,
            PageKind::Detail => self.detail_settle,
        }
    }
}
