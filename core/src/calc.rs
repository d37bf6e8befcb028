//! The TLP calculation — a pure function over a parameter snapshot, an
//! exemption map and the property catalog.
//!
//! No side effects: given identical inputs the output item sequence is
//! identical, in catalog order.

use crate::catalog::PropertyRecord;
use crate::error::{TlpError, TlpResult};
use crate::factors::{UsageFactorTable, IMPLICIT_EXEMPTION_REASON};
use crate::snapshot::EffectiveRates;
use crate::types::PropertyId;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Active exemptions for a fiscal year: property id → recorded reason, if any.
pub type ExemptionMap = HashMap<PropertyId, Option<String>>;

/// One computed per-property outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedItem {
    pub property_id: PropertyId,
    pub contributor_name: Option<String>,
    pub usage_classification: String,
    pub considered_activity: Option<String>,
    pub usage_factor: Decimal,
    pub gross_value: Decimal,
    pub calculated_value: Decimal,
    pub is_exempt: bool,
    pub exemption_reason: Option<String>,
}

/// Compute one item per catalog record.
///
/// The uniform base is `final_cost / catalog size`; each property's gross
/// value is base × usage factor, clamped into [limit_min, limit_max] unless
/// the property is exempt, in which case the calculated value is exactly
/// zero. Exemption is explicit (an active registry entry) or implicit
/// (public/philanthropic classification); an explicit reason wins over the
/// fixed implicit one.
pub fn run(
    rates: &EffectiveRates,
    factors: &UsageFactorTable,
    exemptions: &ExemptionMap,
    catalog: &[PropertyRecord],
) -> TlpResult<Vec<ComputedItem>> {
    if catalog.is_empty() {
        return Err(TlpError::EmptyCatalog);
    }

    let base_per_property = rates.final_cost / Decimal::from(catalog.len() as u64);

    let mut items = Vec::with_capacity(catalog.len());
    for record in catalog {
        let classification = UsageFactorTable::normalize(record.usage_classification.as_deref());
        let factor = factors.factor(&classification);
        let gross = base_per_property * factor;

        let explicit = exemptions.get(&record.property_id);
        let implicit = factors.implicitly_exempt(&classification);
        let is_exempt = explicit.is_some() || implicit;

        let exemption_reason = match (explicit, implicit) {
            (Some(Some(reason)), _) => Some(reason.clone()),
            (_, true) => Some(IMPLICIT_EXEMPTION_REASON.to_string()),
            _ => None,
        };

        // max(min, min(max, gross)): the floor wins if the limits ever cross.
        let calculated_value = if is_exempt {
            Decimal::ZERO
        } else {
            gross.min(rates.limit_max).max(rates.limit_min)
        };

        items.push(ComputedItem {
            property_id: record.property_id.clone(),
            contributor_name: record.contributor_name.clone(),
            usage_classification: classification,
            considered_activity: record.considered_activity.clone(),
            usage_factor: factor,
            gross_value: gross,
            calculated_value,
            is_exempt,
            exemption_reason,
        });
    }

    Ok(items)
}
