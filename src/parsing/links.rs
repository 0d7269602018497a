use crate::models::ListingUrl;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Every `a[href]` on the page as an absolute http(s) URL, in document order.
pub fn extract_links(html: &str, base: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    Html::parse_document(html)
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href.trim()).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(String::from)
        .collect()
}

/// Narrows the links of a search results page down to listing detail pages.
#[derive(Debug, Clone)]
pub struct LinkClassifier {
    site: String,
    search_url: String,
    markers: Vec<String>,
}

impl LinkClassifier {
    pub fn new(search_url: &Url, markers: Vec<String>) -> Self {
        let site = search_url.host_str().map(bare_host).unwrap_or_default();

        Self {
            site: site.to_string(),
            search_url: search_url.to_string(),
            markers: markers
                .into_iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    /// Candidate listing URLs, first-seen order, exact duplicates removed.
    pub fn classify(&self, links: &[String]) -> Vec<ListingUrl> {
        let mut seen = HashSet::new();
        let mut listings = Vec::new();

        for link in links {
            if self.is_listing(link) && seen.insert(link.as_str()) {
                listings.push(link.clone());
            }
        }

        listings
    }

    fn is_listing(&self, link: &str) -> bool {
        if link == self.search_url {
            return false;
        }
        let Ok(url) = Url::parse(link) else {
            return false;
        };
        let Some(host) = url.host_str() else {
            return false;
        };

        self.belongs_to_site(host) && self.markers.iter().any(|m| url.path().contains(m.as_str()))
    }

    fn belongs_to_site(&self, host: &str) -> bool {
        let host = bare_host(host);
        !self.site.is_empty()
            && (host == self.site || host.ends_with(&format!(".{}", self.site)))
    }
}

fn bare_host(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
