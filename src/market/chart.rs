//! Chart data deriver — the 7-point synthetic price series.
//!
//! The AI never supplies a historical time series, so the dashboard chart is
//! a deterministic projection around the one extracted price point.  This is
//! **synthetic visualization data, not real historical prices** — testers
//! and downstream consumers must treat it as such.

// ---------------------------------------------------------------------------
// PricePoint
// ---------------------------------------------------------------------------

/// One labeled point of a derived series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricePoint {
    /// `"Day 1"` .. `"Day 7"`.
    pub label: String,
    pub price: i64,
}

/// Series returned when no base price is extractable.
pub const FALLBACK_SERIES: [i64; 7] = [2100, 2150, 2200, 2180, 2250, 2300, 2280];

/// Fractional offsets of the 15% variation band, one per day.
const DAY_OFFSETS: [f64; 7] = [-0.8, -0.5, -0.2, 0.0, 0.3, 0.6, 0.8];

// ---------------------------------------------------------------------------
// derive_series
// ---------------------------------------------------------------------------

/// Derive a 7-point series for an optional base price.
///
/// `None` or an exact zero returns the fixed [`FALLBACK_SERIES`]; otherwise
/// each day is `base + offset * (base * 0.15)` rounded to the nearest
/// integer.  Pure and deterministic; the result always has exactly 7 points.
pub fn derive_series(base_price: Option<f64>) -> Vec<PricePoint> {
    let prices: Vec<i64> = match base_price {
        None => FALLBACK_SERIES.to_vec(),
        Some(base) if base == 0.0 => FALLBACK_SERIES.to_vec(),
        Some(base) => {
            let variation = base * 0.15;
            DAY_OFFSETS
                .iter()
                .map(|offset| (base + variation * offset).round() as i64)
                .collect()
        }
    };

    prices
        .into_iter()
        .enumerate()
        .map(|(i, price)| PricePoint {
            label: format!("Day {}", i + 1),
            price,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(series: &[PricePoint]) -> Vec<i64> {
        series.iter().map(|p| p.price).collect()
    }

    // -----------------------------------------------------------------------
    // Fallback
    // -----------------------------------------------------------------------

    #[test]
    fn none_returns_fallback_series() {
        let series = derive_series(None);
        assert_eq!(prices(&series), FALLBACK_SERIES);
    }

    #[test]
    fn zero_returns_fallback_series() {
        let series = derive_series(Some(0.0));
        assert_eq!(prices(&series), FALLBACK_SERIES);
    }

    // -----------------------------------------------------------------------
    // Derivation
    // -----------------------------------------------------------------------

    #[test]
    fn base_1000_projects_15_percent_band() {
        // variation = 150; offsets -0.8 -0.5 -0.2 0 +0.3 +0.6 +0.8
        let series = derive_series(Some(1000.0));
        assert_eq!(prices(&series), vec![880, 925, 970, 1000, 1045, 1090, 1120]);
    }

    #[test]
    fn fractional_base_rounds_to_nearest_integer() {
        // variation = 2500.5 * 0.15 = 375.075
        let series = derive_series(Some(2500.5));
        let expected: Vec<i64> = [-0.8f64, -0.5, -0.2, 0.0, 0.3, 0.6, 0.8]
            .iter()
            .map(|o| (2500.5 + 375.075 * o).round() as i64)
            .collect();
        assert_eq!(prices(&series), expected);
    }

    // -----------------------------------------------------------------------
    // Shape invariants
    // -----------------------------------------------------------------------

    #[test]
    fn always_exactly_seven_points() {
        assert_eq!(derive_series(None).len(), 7);
        assert_eq!(derive_series(Some(42.0)).len(), 7);
    }

    #[test]
    fn labels_run_day_1_through_7() {
        let series = derive_series(Some(1000.0));
        let labels: Vec<&str> = series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Day 1", "Day 2", "Day 3", "Day 4", "Day 5", "Day 6", "Day 7"]
        );
    }

    #[test]
    fn deterministic_for_same_input() {
        assert_eq!(derive_series(Some(3100.0)), derive_series(Some(3100.0)));
    }
}
