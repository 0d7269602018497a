use crate::models::{ExtractedFields, MatchCriteria};

/// Plot area is required and must reach the minimum. Price only rules a
/// listing out when it is known and above the maximum, since the search
/// query already bounds it.
pub fn matches(fields: &ExtractedFields, criteria: &MatchCriteria) -> bool {
    let plot_ok = fields
        .plot_area
        .is_some_and(|area| area >= criteria.min_plot_area);
    let price_ok = fields.price.map_or(true, |price| price <= criteria.max_price);

    plot_ok && price_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRITERIA: MatchCriteria = MatchCriteria {
        max_price: 150_000,
        min_plot_area: 1000,
    };

    fn fields(price: Option<i64>, plot_area: Option<i64>) -> ExtractedFields {
        ExtractedFields { price, plot_area }
    }

    #[test]
    fn test_missing_plot_never_matches() {
        assert!(!matches(&fields(None, None), &CRITERIA));
        assert!(!matches(&fields(Some(50_000), None), &CRITERIA));
    }

    #[test]
    fn test_plot_boundary_is_inclusive() {
        assert!(matches(&fields(Some(100_000), Some(1000)), &CRITERIA));
        assert!(!matches(&fields(Some(100_000), Some(999)), &CRITERIA));
    }

    #[test]
    fn test_missing_price_does_not_disqualify() {
        assert!(matches(&fields(None, Some(1500)), &CRITERIA));
    }

    #[test]
    fn test_price_boundary_is_inclusive() {
        assert!(matches(&fields(Some(150_000), Some(1500)), &CRITERIA));
        assert!(!matches(&fields(Some(150_001), Some(1500)), &CRITERIA));
    }
}
