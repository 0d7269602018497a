use crate::models::{Listing, MatchCriteria};

/// Message for a listing that passed the filter
pub fn match_message(listing: &Listing, criteria: &MatchCriteria, label: Option<&str>) -> String {
    let title = match label {
        Some(label) => format!("🏡 MATCH – {}", label),
        None => "🏡 MATCH".to_string(),
    };
    let price = listing
        .fields
        .price
        .map(|p| p.to_string())
        .unwrap_or_else(|| "n/a".to_string());
    let plot = listing
        .fields
        .plot_area
        .map(|p| p.to_string())
        .unwrap_or_else(|| "n/a".to_string());

    format!(
        "{}\n\n💰 {} €\n🌿 Plot: {} m² (min {})\n🔗 {}",
        title, price, plot, criteria.min_plot_area, listing.url
    )
}

/// Sent once per cycle in which the search page is a challenge page
pub fn blocked_message(site: &str) -> String {
    format!(
        "⚠️ Watcher: {} is showing a verification page (captcha). Automatic reading is blocked.",
        site
    )
}

/// Liveness message sent at startup
pub fn startup_message(criteria: &MatchCriteria, label: Option<&str>) -> String {
    let scope = label.map(|l| format!(" – {}", l)).unwrap_or_default();
    format!(
        "✅ Watcher online{} – price ≤ {} € – plot ≥ {} m²",
        scope, criteria.max_price, criteria.min_plot_area
    )
}
