use crate::scrapers::types::{Page, PageKind};
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for everything that can load a page for the watcher.
/// The headless browser and the plain HTTP client both implement it, and
/// tests swap in an in-memory fake.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Load `url` and return its HTML, visible text and links
    async fn fetch(&self, url: &str, kind: PageKind) -> Result<Page>;

    /// Name of the fetch mechanism, for logs
    fn name(&self) -> &'static str;
}
