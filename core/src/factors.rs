//! Usage factor table.
//!
//! RULE: The factor table is an immutable configuration value injected into
//! the calculation, never a module-level global. Tests may build a custom
//! table; production uses `UsageFactorTable::default()`.

use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// Reason recorded when a property is exempt solely because of its
/// public/philanthropic classification.
pub const IMPLICIT_EXEMPTION_REASON: &str = "PUBLIC/PHILANTHROPIC PROPERTY";

/// Classification assumed when the catalog carries none.
pub const DEFAULT_CLASSIFICATION: &str = "RESIDENTIAL";

#[derive(Debug, Clone)]
pub struct UsageFactorTable {
    factors: HashMap<String, Decimal>,
    exempt_classes: HashSet<String>,
    default_factor: Decimal,
}

impl Default for UsageFactorTable {
    fn default() -> Self {
        let factors = [
            ("RESIDENTIAL", Decimal::new(10, 1)),
            ("SERVICE", Decimal::new(12, 1)),
            ("COMMERCE", Decimal::new(15, 1)),
            ("INDUSTRY", Decimal::new(20, 1)),
            ("PUBLIC", Decimal::ZERO),
            ("PHILANTHROPIC", Decimal::ZERO),
            ("PUBLIC/PHILANTHROPIC", Decimal::ZERO),
        ]
        .into_iter()
        .map(|(class, factor)| (class.to_string(), factor))
        .collect();

        let exempt_classes = ["PUBLIC", "PHILANTHROPIC", "PUBLIC/PHILANTHROPIC"]
            .into_iter()
            .map(str::to_string)
            .collect();

        Self {
            factors,
            exempt_classes,
            default_factor: Decimal::ONE,
        }
    }
}

impl UsageFactorTable {
    /// Factor for a normalized classification. Unknown classifications use
    /// the default factor and are NOT exempt.
    pub fn factor(&self, classification: &str) -> Decimal {
        self.factors
            .get(classification)
            .copied()
            .unwrap_or(self.default_factor)
    }

    /// Public/philanthropic classifications are exempt even without an
    /// explicit exemption record.
    pub fn implicitly_exempt(&self, classification: &str) -> bool {
        self.exempt_classes.contains(classification)
    }

    /// Canonical case form used for factor lookup and persisted on items.
    /// Missing or blank classifications fall back to RESIDENTIAL.
    pub fn normalize(classification: Option<&str>) -> String {
        let trimmed = classification.map(str::trim).unwrap_or("");
        if trimmed.is_empty() {
            DEFAULT_CLASSIFICATION.to_string()
        } else {
            trimmed.to_uppercase()
        }
    }
}
