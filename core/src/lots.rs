//! Launch lots — official, versioned batches promoted from simulations.
//!
//! A lot's snapshot is a byte-for-byte copy of the origin simulation's
//! stored snapshot document. Lot versions form their own per-year sequence,
//! independent of parameter versions and of the simulation's lifecycle.

use crate::engine::TlpEngine;
use crate::error::TlpResult;
use crate::params::VERSION_RETRY_LIMIT;
use crate::simulation::SimulationStatus;
use crate::snapshot::ParameterSnapshot;
use crate::types::FiscalYear;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LotStatus {
    Gerado,
    Processado,
    Enviado,
}

impl LotStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LotStatus::Gerado => "GERADO",
            LotStatus::Processado => "PROCESSADO",
            LotStatus::Enviado => "ENVIADO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GERADO" => Some(LotStatus::Gerado),
            "PROCESSADO" => Some(LotStatus::Processado),
            "ENVIADO" => Some(LotStatus::Enviado),
            _ => None,
        }
    }
}

impl fmt::Display for LotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Lot {
    pub id: Uuid,
    pub fiscal_year: FiscalYear,
    pub version: i32,
    pub origin_simulation_id: Uuid,
    pub snapshot: ParameterSnapshot,
    pub status: LotStatus,
    pub created_at: DateTime<Utc>,
}

/// Rates surfaced from the newest lot of a fiscal year, used to seed the
/// next year's parameters. Absent snapshot fields surface as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestLotRates {
    pub fiscal_year: FiscalYear,
    pub version: i32,
    pub limit_min_updated: Decimal,
    pub limit_max_updated: Decimal,
    pub ipca_pct: Decimal,
}

impl TlpEngine {
    /// All lots, newest first.
    pub fn list_lots(&self) -> TlpResult<Vec<Lot>> {
        self.store().list_lots()
    }

    /// The highest-version lot of a fiscal year, reduced to the rates the
    /// next cycle starts from, or None when the year has no lots.
    pub fn latest_lot(&self, fiscal_year: FiscalYear) -> TlpResult<Option<LatestLotRates>> {
        let lot = match self.store().latest_lot(fiscal_year)? {
            Some(lot) => lot,
            None => return Ok(None),
        };
        Ok(Some(LatestLotRates {
            fiscal_year: lot.fiscal_year,
            version: lot.version,
            limit_min_updated: lot.snapshot.limit_min_updated.unwrap_or(Decimal::ZERO),
            limit_max_updated: lot.snapshot.limit_max_updated.unwrap_or(Decimal::ZERO),
            ipca_pct: lot.snapshot.ipca_pct.unwrap_or(Decimal::ZERO),
        }))
    }

    /// Promote a simulation into an official lot.
    ///
    /// Copies the stored snapshot verbatim, assigns the next lot version for
    /// the fiscal year and marks the origin simulation CONVERTED_TO_LOT, all
    /// in one transaction. Completion of the simulation is not required —
    /// promotion and calculation completeness are independent axes.
    pub fn promote_simulation(&mut self, origin_simulation_id: Uuid) -> TlpResult<Lot> {
        let simulation = self.get_simulation(origin_simulation_id)?;
        let snapshot_json = self.store().simulation_snapshot_json(origin_simulation_id)?;

        let mut attempts = 0;
        loop {
            let version = self
                .store()
                .last_lot_version(simulation.fiscal_year)?
                .unwrap_or(0)
                + 1;
            let lot = Lot {
                id: Uuid::new_v4(),
                fiscal_year: simulation.fiscal_year,
                version,
                origin_simulation_id,
                snapshot: simulation.snapshot.clone(),
                status: LotStatus::Gerado,
                created_at: Utc::now(),
            };
            match self.store_mut().insert_lot_and_convert(
                &lot,
                &snapshot_json,
                SimulationStatus::ConvertedToLot,
            ) {
                Ok(()) => {
                    log::info!(
                        "lot v{} created for fiscal year {} from simulation {}",
                        lot.version,
                        lot.fiscal_year,
                        origin_simulation_id
                    );
                    return Ok(lot);
                }
                Err(e) if e.is_unique_violation() && attempts < VERSION_RETRY_LIMIT => {
                    attempts += 1;
                    log::debug!(
                        "lot version {} for fiscal year {} already taken, retrying",
                        version,
                        simulation.fiscal_year
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}
