//! Yearly tariff parameters.
//!
//! Parameters are create-only: a correction is a new version row for the
//! same fiscal year, never an in-place update. Version numbers per fiscal
//! year are unique and strictly increasing, enforced by the database and a
//! bounded retry on lost races.

use crate::engine::TlpEngine;
use crate::error::TlpResult;
use crate::types::FiscalYear;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// How many extra attempts a create gets after losing a version race.
pub(crate) const VERSION_RETRY_LIMIT: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub id: Uuid,
    pub fiscal_year: FiscalYear,
    pub version: i32,
    pub base_cost: Decimal,
    pub ipca_pct: Option<Decimal>,
    pub subsidy_pct: Option<Decimal>,
    pub limit_min_base: Option<Decimal>,
    pub limit_max_base: Option<Decimal>,
    pub limit_min_updated: Option<Decimal>,
    pub limit_max_updated: Option<Decimal>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new parameter version. Optional fields
/// persist as NULL; defaults apply at processing time, not at write time.
#[derive(Debug, Clone, Default)]
pub struct NewParameter {
    pub fiscal_year: FiscalYear,
    pub base_cost: Decimal,
    pub ipca_pct: Option<Decimal>,
    pub subsidy_pct: Option<Decimal>,
    pub limit_min_base: Option<Decimal>,
    pub limit_max_base: Option<Decimal>,
    pub limit_min_updated: Option<Decimal>,
    pub limit_max_updated: Option<Decimal>,
}

impl TlpEngine {
    /// All parameters, newest fiscal year first, then newest version.
    pub fn list_parameters(&self) -> TlpResult<Vec<Parameter>> {
        self.store().list_parameters()
    }

    /// Create the next version for the fiscal year (1 when none exists yet).
    pub fn create_parameter(&self, input: NewParameter) -> TlpResult<Parameter> {
        let mut attempts = 0;
        loop {
            let version = self
                .store()
                .last_parameter_version(input.fiscal_year)?
                .unwrap_or(0)
                + 1;
            let parameter = Parameter {
                id: Uuid::new_v4(),
                fiscal_year: input.fiscal_year,
                version,
                base_cost: input.base_cost,
                ipca_pct: input.ipca_pct,
                subsidy_pct: input.subsidy_pct,
                limit_min_base: input.limit_min_base,
                limit_max_base: input.limit_max_base,
                limit_min_updated: input.limit_min_updated,
                limit_max_updated: input.limit_max_updated,
                active: true,
                created_at: Utc::now(),
            };
            match self.store().insert_parameter(&parameter) {
                Ok(()) => {
                    log::info!(
                        "parameter v{} created for fiscal year {}",
                        parameter.version,
                        parameter.fiscal_year
                    );
                    return Ok(parameter);
                }
                Err(e) if e.is_unique_violation() && attempts < VERSION_RETRY_LIMIT => {
                    attempts += 1;
                    log::debug!(
                        "version {} for fiscal year {} already taken, retrying",
                        version,
                        input.fiscal_year
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}
