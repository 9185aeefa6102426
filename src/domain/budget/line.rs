//! Budget line entity.
//!
//! A budget line is one costed, revenue-bearing entry on an Offer or a
//! Project. Revenue is either supplied by the caller or, in margin-override
//! mode, derived from cost and a target margin:
//!
//! ```text
//! revenue = cost / (1 - target_margin / 100)
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    margin_percent, revenue_for_margin, BudgetLineId, CategoryId, Timestamp,
};

use super::{BudgetError, BudgetParent};

/// Where a new line takes its name from, as requested by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSource {
    Category(CategoryId),
    Custom(String),
}

impl NameSource {
    /// Accepts exactly one of a category reference or a non-blank custom name.
    pub fn from_parts(
        category_id: Option<CategoryId>,
        custom_name: Option<String>,
    ) -> Result<Self, BudgetError> {
        let custom_name = custom_name.filter(|name| !name.trim().is_empty());
        match (category_id, custom_name) {
            (Some(id), None) => Ok(NameSource::Category(id)),
            (None, Some(name)) => Ok(NameSource::Custom(name.trim().to_string())),
            _ => Err(BudgetError::MissingName),
        }
    }
}

/// Resolved name of a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum LineName {
    Category { id: CategoryId, name: String },
    Custom { name: String },
}

impl LineName {
    pub fn custom(name: impl Into<String>) -> Self {
        LineName::Custom { name: name.into() }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LineName::Category { name, .. } => name,
            LineName::Custom { name } => name,
        }
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        match self {
            LineName::Category { id, .. } => Some(*id),
            LineName::Custom { .. } => None,
        }
    }
}

/// Free-text details carried alongside the financials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineDetails {
    pub description: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

/// Cost and revenue inputs of a line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub cost: f64,
    pub revenue: f64,
    pub margin_override: bool,
    pub target_margin_percent: Option<f64>,
}

impl Pricing {
    /// Revenue supplied directly by the caller.
    pub fn fixed(cost: f64, revenue: f64) -> Self {
        Self {
            cost,
            revenue,
            margin_override: false,
            target_margin_percent: None,
        }
    }

    /// Revenue derived from cost and a target margin.
    pub fn with_margin(cost: f64, target_margin_percent: f64) -> Self {
        Self {
            cost,
            revenue: 0.0,
            margin_override: true,
            target_margin_percent: Some(target_margin_percent),
        }
    }

    /// Validates the inputs and returns the pricing with revenue settled.
    pub fn resolve(self) -> Result<Self, BudgetError> {
        if !self.cost.is_finite() || self.cost <= 0.0 {
            return Err(BudgetError::InvalidCost);
        }

        if self.margin_override {
            let margin = self.target_margin_percent.ok_or_else(|| {
                BudgetError::InvalidTargetMargin(
                    "target margin is required when margin override is enabled".to_string(),
                )
            })?;
            if !margin.is_finite() || !(0.0..100.0).contains(&margin) {
                return Err(BudgetError::InvalidTargetMargin(format!("got {}", margin)));
            }
            return Ok(Self {
                revenue: revenue_for_margin(self.cost, margin),
                ..self
            });
        }

        if !self.revenue.is_finite() || self.revenue < 0.0 {
            return Err(BudgetError::InvalidRevenue);
        }
        Ok(self)
    }
}

/// Partial update of a line; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetLinePatch {
    pub name: Option<LineName>,
    pub description: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub cost: Option<f64>,
    pub revenue: Option<f64>,
    pub margin_override: Option<bool>,
    pub target_margin_percent: Option<f64>,
}

impl BudgetLinePatch {
    pub fn touches_pricing(&self) -> bool {
        self.cost.is_some()
            || self.revenue.is_some()
            || self.margin_override.is_some()
            || self.target_margin_percent.is_some()
    }
}

/// A single budgeted entry attached to an Offer or Project.
///
/// # Invariants
///
/// - `cost > 0`
/// - with `margin_override`, `revenue == cost / (1 - target_margin_percent / 100)`
/// - `display_order` is unique and contiguous per parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLine {
    pub id: BudgetLineId,
    pub parent: BudgetParent,
    pub name: LineName,
    pub details: LineDetails,
    pub cost: f64,
    pub revenue: f64,
    pub margin_override: bool,
    pub target_margin_percent: Option<f64>,
    pub display_order: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BudgetLine {
    /// Creates a validated line at the given display position.
    pub fn create(
        parent: BudgetParent,
        name: LineName,
        details: LineDetails,
        pricing: Pricing,
        display_order: u32,
    ) -> Result<Self, BudgetError> {
        let pricing = pricing.resolve()?;
        let now = Timestamp::now();
        Ok(Self {
            id: BudgetLineId::new(),
            parent,
            name,
            details,
            cost: pricing.cost,
            revenue: pricing.revenue,
            margin_override: pricing.margin_override,
            target_margin_percent: pricing.target_margin_percent,
            display_order,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn pricing(&self) -> Pricing {
        Pricing {
            cost: self.cost,
            revenue: self.revenue,
            margin_override: self.margin_override,
            target_margin_percent: self.target_margin_percent,
        }
    }

    pub fn profit(&self) -> f64 {
        self.revenue - self.cost
    }

    pub fn margin_percent(&self) -> f64 {
        margin_percent(self.revenue, self.cost)
    }

    /// Applies a partial update, re-validating pricing as a whole.
    ///
    /// Nothing changes when validation fails.
    pub fn apply(&mut self, patch: BudgetLinePatch) -> Result<(), BudgetError> {
        let current = self.pricing();
        let pricing = Pricing {
            cost: patch.cost.unwrap_or(current.cost),
            revenue: patch.revenue.unwrap_or(current.revenue),
            margin_override: patch.margin_override.unwrap_or(current.margin_override),
            target_margin_percent: patch
                .target_margin_percent
                .or(current.target_margin_percent),
        }
        .resolve()?;

        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.details.description = Some(description);
        }
        if let Some(quantity) = patch.quantity {
            self.details.quantity = Some(quantity);
        }
        if let Some(unit) = patch.unit {
            self.details.unit = Some(unit);
        }
        self.cost = pricing.cost;
        self.revenue = pricing.revenue;
        self.margin_override = pricing.margin_override;
        self.target_margin_percent = pricing.target_margin_percent;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Copy of this line under another parent with a fresh id.
    pub fn copy_to(&self, parent: BudgetParent, display_order: u32) -> BudgetLine {
        let now = Timestamp::now();
        BudgetLine {
            id: BudgetLineId::new(),
            parent,
            display_order,
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }
}
