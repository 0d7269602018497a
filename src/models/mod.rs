use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Absolute URL of one listing detail page; the only dedup key.
pub type ListingUrl = String;

/// Fields pulled out of a listing page's text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Asking price in whole euros
    pub price: Option<i64>,
    /// Plot area in square meters
    pub plot_area: Option<i64>,
}

/// Acceptance thresholds, fixed for the process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCriteria {
    pub max_price: i64,
    pub min_plot_area: i64,
}

/// A listing page after extraction
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub id: String,
    pub url: ListingUrl,
    pub fields: ExtractedFields,
    pub checked_at: DateTime<Utc>,
}

impl Listing {
    pub fn new(url: &str, fields: ExtractedFields) -> Self {
        Self {
            id: stable_id(url),
            url: url.to_string(),
            fields,
            checked_at: Utc::now(),
        }
    }
}

/// Summary of one orchestrator pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleResult {
    pub started_at: DateTime<Utc>,
    pub links_found: usize,
    pub listings_checked: usize,
    pub matches_notified: usize,
    pub listings_failed: usize,
    pub listings_blocked: usize,
    pub blocked: bool,
}

impl CycleResult {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            links_found: 0,
            listings_checked: 0,
            matches_notified: 0,
            listings_failed: 0,
            listings_blocked: 0,
            blocked: false,
        }
    }
}

/// Short hex id derived from the URL, used to keep log lines readable
pub fn stable_id(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    hex::encode(digest)[..12].to_string()
}
