//! Typed parameter snapshot frozen into simulations and lots.
//!
//! The snapshot is captured once from the caller's input at creation time
//! and persisted as a JSON document. Later parameter edits never touch it,
//! and promotion copies the stored document byte for byte.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSnapshot {
    pub base_cost: Decimal,
    pub ipca_pct: Option<Decimal>,
    pub subsidy_pct: Option<Decimal>,
    pub limit_min_base: Option<Decimal>,
    pub limit_max_base: Option<Decimal>,
    pub limit_min_updated: Option<Decimal>,
    pub limit_max_updated: Option<Decimal>,
    /// Optional override for the cost distributed across the catalog.
    pub final_cost: Option<Decimal>,
}

/// Values the calculation actually runs with, after defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveRates {
    pub final_cost: Decimal,
    pub limit_min: Decimal,
    pub limit_max: Decimal,
}

/// Lower clamp applied when the snapshot carries no updated minimum.
pub fn default_limit_min() -> Decimal {
    Decimal::new(258_00, 2)
}

/// Upper clamp applied when the snapshot carries no updated maximum.
pub fn default_limit_max() -> Decimal {
    Decimal::new(1_600_08, 2)
}

impl ParameterSnapshot {
    /// A snapshot carrying only a base cost, everything else unset.
    pub fn from_base_cost(base_cost: Decimal) -> Self {
        Self {
            base_cost,
            ipca_pct: None,
            subsidy_pct: None,
            limit_min_base: None,
            limit_max_base: None,
            limit_min_updated: None,
            limit_max_updated: None,
            final_cost: None,
        }
    }

    /// Resolve the documented defaults: `final_cost` falls back to
    /// `base_cost`, the clamps fall back to the fixed municipal limits.
    pub fn effective_rates(&self) -> EffectiveRates {
        EffectiveRates {
            final_cost: self.final_cost.unwrap_or(self.base_cost),
            limit_min: self.limit_min_updated.unwrap_or_else(default_limit_min),
            limit_max: self.limit_max_updated.unwrap_or_else(default_limit_max),
        }
    }
}
