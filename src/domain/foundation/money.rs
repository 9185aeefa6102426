//! Money arithmetic shared by budget lines and their aggregates.
//!
//! Amounts are plain `f64` in the deal currency; comparisons in tests use a
//! tolerance rather than exact equality.

/// Margin as a percentage of revenue: `(revenue - cost) / revenue * 100`.
///
/// Zero revenue yields a margin of zero rather than a division by zero.
pub fn margin_percent(revenue: f64, cost: f64) -> f64 {
    if revenue == 0.0 {
        return 0.0;
    }
    (revenue - cost) / revenue * 100.0
}

/// Revenue that yields `target_margin` percent on top of `cost`.
///
/// Callers guarantee `0 <= target_margin < 100`.
pub fn revenue_for_margin(cost: f64, target_margin: f64) -> f64 {
    cost / (1.0 - target_margin / 100.0)
}
