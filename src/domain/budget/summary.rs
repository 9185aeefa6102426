//! Per-parent budget aggregate.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::margin_percent;

use super::BudgetLine;

/// Derived totals over every line of one parent. Never persisted as such.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub line_count: usize,
    pub total_cost: f64,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub margin_percent: f64,
}

impl BudgetSummary {
    /// Sums the given lines. An empty slice yields all zeros.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a BudgetLine>) -> Self {
        let (line_count, total_cost, total_revenue) = lines
            .into_iter()
            .fold((0usize, 0.0f64, 0.0f64), |(n, cost, revenue), line| {
                (n + 1, cost + line.cost, revenue + line.revenue)
            });

        Self {
            line_count,
            total_cost,
            total_revenue,
            total_profit: total_revenue - total_cost,
            margin_percent: margin_percent(total_revenue, total_cost),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.line_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::budget::{BudgetParent, LineDetails, LineName, Pricing};
    use crate::domain::foundation::ProjectId;

    fn lines(pricings: &[Pricing]) -> Vec<BudgetLine> {
        let parent = BudgetParent::Project(ProjectId::new());
        pricings
            .iter()
            .enumerate()
            .map(|(i, p)| {
                BudgetLine::create(
                    parent,
                    LineName::custom(format!("line {}", i)),
                    LineDetails::default(),
                    *p,
                    i as u32,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn empty_parent_summarizes_to_zero() {
        let summary = BudgetSummary::from_lines(&Vec::<BudgetLine>::new());
        assert_eq!(summary, BudgetSummary::default());
        assert!(summary.is_empty());
    }

    #[test]
    fn totals_profit_and_margin() {
        let lines = lines(&[Pricing::fixed(60.0, 100.0), Pricing::with_margin(80.0, 20.0)]);
        let summary = BudgetSummary::from_lines(&lines);

        assert_eq!(summary.line_count, 2);
        assert!((summary.total_cost - 140.0).abs() < 1e-9);
        assert!((summary.total_revenue - 200.0).abs() < 1e-9);
        assert!((summary.total_profit - 60.0).abs() < 1e-9);
        assert!((summary.margin_percent - 30.0).abs() < 1e-9);
    }

    #[test]
    fn zero_revenue_reports_zero_margin() {
        let lines = lines(&[Pricing::fixed(50.0, 0.0)]);
        let summary = BudgetSummary::from_lines(&lines);
        assert_eq!(summary.margin_percent, 0.0);
        assert_eq!(summary.total_profit, -50.0);
    }
}
