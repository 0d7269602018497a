//! Price and plot-area extraction from normalized page text.
//!
//! Everything here is pure. Input is expected to have gone through
//! [`normalize_text`](super::normalize_text) already, so patterns only need
//! to handle single spaces and lower case.

use crate::models::ExtractedFields;
use regex::Regex;
use std::sync::LazyLock;

use super::normalize_text;

// ── Number shapes ─────────────────────────────────────────────────────────────

/// Number must not continue a longer digit run (`1.200.000` is not `200.000`).
const NUMBER_START: &str = r"(?:^|[^\d.,])";

/// Unit must end the word: `στρ` matches in `2 στρ.` but not in `στρώμα`.
const WORD_END: &str = r"(?:[^\p{L}\p{N}_]|$)";

/// 1000 m² unit, Latin transliterations and Greek spellings.
const STREMMA_UNITS: &[&str] = &[
    "stremmata",
    "stremma",
    "στρέμματα",
    "στρεμματα",
    "στρέμμα",
    "στρεμμα",
    "στρεμ",
    "στρ",
];

const SQUARE_METER_UNITS: &[&str] = &["m²", "m2", "sqm", "sq.m", "τ.μ", "τμ"];

static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    // "€ 95.000" or "95,000 €"; alternation keeps document order
    Regex::new(r"€\s*(\d[\d.,]*)|(\d[\d.,]*)\s*€").expect("hardcoded regex pattern is valid")
});

// ── Area rules ────────────────────────────────────────────────────────────────

/// One plot-area pattern: a number shape, the unit tokens that may follow
/// it, and how to turn the captured number into square meters.
struct AreaRule {
    name: &'static str,
    pattern: Regex,
    to_square_meters: fn(&str) -> Option<i64>,
}

impl AreaRule {
    fn new(
        name: &'static str,
        number: &str,
        units: &[&str],
        to_square_meters: fn(&str) -> Option<i64>,
    ) -> Self {
        let units = units
            .iter()
            .map(|u| regex::escape(u))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"(?i){NUMBER_START}({number})\s*(?:{units}){WORD_END}");

        Self {
            name,
            pattern: Regex::new(&pattern).expect("area rule pattern is valid"),
            to_square_meters,
        }
    }

    fn apply(&self, text: &str) -> Option<i64> {
        let caps = self.pattern.captures(text)?;
        (self.to_square_meters)(caps.get(1)?.as_str())
    }
}

/// Evaluated in order; the first rule that matches decides.
static AREA_RULES: LazyLock<Vec<AreaRule>> = LazyLock::new(|| {
    vec![
        AreaRule::new("stremma", r"\d+(?:[.,]\d+)?", STREMMA_UNITS, stremma_to_m2),
        AreaRule::new(
            "square_meters",
            r"\d{1,3}(?:[.,]\d{3})+|\d{3,5}",
            SQUARE_METER_UNITS,
            parse_grouped_integer,
        ),
    ]
});

/// "1,5" / "1.5" → 1500
fn stremma_to_m2(raw: &str) -> Option<i64> {
    let value: f64 = raw.replace(',', ".").parse().ok()?;
    let square_meters = (value * 1000.0).round();
    // `as` would saturate at i64::MAX and pass every minimum
    if !square_meters.is_finite() || square_meters >= i64::MAX as f64 {
        return None;
    }
    Some(square_meters as i64)
}

/// "1.200" / "1,200" / "1200" → 1200
fn parse_grouped_integer(raw: &str) -> Option<i64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

// ── Public extractors ─────────────────────────────────────────────────────────

/// First euro amount in document order, in whole euros.
pub fn extract_price(text: &str) -> Option<i64> {
    let caps = PRICE_RE.captures(text)?;
    let raw = caps.get(1).or_else(|| caps.get(2))?;
    parse_grouped_integer(raw.as_str())
}

/// Plot area in square meters, by the first matching area rule.
pub fn extract_plot_area(text: &str) -> Option<i64> {
    AREA_RULES.iter().find_map(|rule| {
        let area = rule.apply(text)?;
        tracing::trace!(rule = rule.name, area, "plot area rule matched");
        Some(area)
    })
}

pub fn extract_fields(text: &str) -> ExtractedFields {
    ExtractedFields {
        price: extract_price(text),
        plot_area: extract_plot_area(text),
    }
}

/// Extract from the rendered body text, falling back to the raw HTML for
/// any field the text does not carry.
pub fn extract_page_fields(text: &str, html: &str) -> ExtractedFields {
    let from_text = extract_fields(&normalize_text(text));
    if from_text.price.is_some() && from_text.plot_area.is_some() {
        return from_text;
    }

    let html = normalize_text(html);
    ExtractedFields {
        price: from_text.price.or_else(|| extract_price(&html)),
        plot_area: from_text.plot_area.or_else(|| extract_plot_area(&html)),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
