//! Aggregated statistics over a simulation's result set.
//!
//! All values are exact decimals; conversion to floats happens only at the
//! display boundary (the runner).

use crate::engine::TlpEngine;
use crate::error::TlpResult;
use crate::simulation::Simulation;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationStats {
    pub total_properties: i64,
    pub total_value: Decimal,
    pub average_value: Decimal,
    pub min_value: Decimal,
    pub max_value: Decimal,
    pub exempt_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageBreakdown {
    pub usage_classification: String,
    pub count: i64,
    pub total_value: Decimal,
}

#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub simulation: Simulation,
    pub stats: SimulationStats,
    pub by_usage: Vec<UsageBreakdown>,
}

impl TlpEngine {
    /// Statistics and per-classification breakdown for a simulation.
    /// Fails with not-found if the simulation does not exist; a simulation
    /// without items yields zeroed stats and an empty breakdown.
    pub fn simulation_result(&self, id: Uuid) -> TlpResult<SimulationResult> {
        let simulation = self.get_simulation(id)?;
        let items = self.store().all_simulation_items(id)?;

        let mut total_value = Decimal::ZERO;
        let mut exempt_count = 0i64;
        let mut min_value: Option<Decimal> = None;
        let mut max_value: Option<Decimal> = None;
        let mut by_usage: BTreeMap<String, (i64, Decimal)> = BTreeMap::new();

        for item in &items {
            total_value += item.calculated_value;
            if item.is_exempt {
                exempt_count += 1;
            }
            min_value = Some(match min_value {
                Some(current) => current.min(item.calculated_value),
                None => item.calculated_value,
            });
            max_value = Some(match max_value {
                Some(current) => current.max(item.calculated_value),
                None => item.calculated_value,
            });
            let entry = by_usage
                .entry(item.usage_classification.clone())
                .or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += item.calculated_value;
        }

        let count = items.len() as i64;
        let average_value = if count > 0 {
            total_value / Decimal::from(count)
        } else {
            Decimal::ZERO
        };

        Ok(SimulationResult {
            simulation,
            stats: SimulationStats {
                total_properties: count,
                total_value,
                average_value,
                min_value: min_value.unwrap_or(Decimal::ZERO),
                max_value: max_value.unwrap_or(Decimal::ZERO),
                exempt_count,
            },
            by_usage: by_usage
                .into_iter()
                .map(|(usage_classification, (count, total_value))| UsageBreakdown {
                    usage_classification,
                    count,
                    total_value,
                })
                .collect(),
        })
    }
}
