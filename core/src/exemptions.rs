//! Exemption registry.
//!
//! Soft-stateful: deactivation flips the `active` flag instead of deleting
//! the row, so the audit history survives. Every query filters on the flag.

use crate::calc::ExemptionMap;
use crate::engine::TlpEngine;
use crate::error::{TlpError, TlpResult};
use crate::types::{FiscalYear, PropertyId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exemption {
    pub id: Uuid,
    pub property_id: PropertyId,
    pub fiscal_year: FiscalYear,
    pub reason: Option<String>,
    pub source: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl TlpEngine {
    /// Active exemptions only, newest first.
    pub fn list_exemptions(&self) -> TlpResult<Vec<Exemption>> {
        self.store().list_active_exemptions()
    }

    pub fn create_exemption(
        &self,
        property_id: PropertyId,
        fiscal_year: FiscalYear,
        reason: Option<String>,
        source: Option<String>,
    ) -> TlpResult<Exemption> {
        let exemption = Exemption {
            id: Uuid::new_v4(),
            property_id,
            fiscal_year,
            reason,
            source,
            active: true,
            created_at: Utc::now(),
        };
        self.store().insert_exemption(&exemption)?;
        log::info!(
            "exemption created for property {} in fiscal year {}",
            exemption.property_id,
            exemption.fiscal_year
        );
        Ok(exemption)
    }

    /// Flip an active exemption to inactive. The row is kept.
    pub fn deactivate_exemption(&self, id: Uuid) -> TlpResult<()> {
        if self.store().deactivate_exemption(id)? {
            Ok(())
        } else {
            Err(TlpError::not_found("active exemption", id))
        }
    }

    /// Active exemptions of a fiscal year as a property → reason map, the
    /// form the calculation consumes.
    pub fn exemption_lookup(&self, fiscal_year: FiscalYear) -> TlpResult<ExemptionMap> {
        self.store().active_exemptions_for_year(fiscal_year)
    }
}
