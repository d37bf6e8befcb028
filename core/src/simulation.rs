//! Simulation lifecycle.
//!
//! States: DRAFT → PROCESSING → {COMPLETED, FAILED}. FAILED and DRAFT may
//! re-enter PROCESSING (retry); COMPLETED is terminal — recomputing after
//! completion means creating a new simulation. The transition to PROCESSING
//! commits before the calculation starts; `reset_processing` is the recovery
//! path when a crash strands a simulation there.

use crate::calc;
use crate::catalog::PropertyCatalog;
use crate::engine::TlpEngine;
use crate::error::{TlpError, TlpResult};
use crate::snapshot::ParameterSnapshot;
use crate::types::{FiscalYear, PropertyId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationStatus {
    Draft,
    Processing,
    Completed,
    Failed,
    ConvertedToLot,
}

impl SimulationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SimulationStatus::Draft => "DRAFT",
            SimulationStatus::Processing => "PROCESSING",
            SimulationStatus::Completed => "COMPLETED",
            SimulationStatus::Failed => "FAILED",
            SimulationStatus::ConvertedToLot => "CONVERTED_TO_LOT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(SimulationStatus::Draft),
            "PROCESSING" => Some(SimulationStatus::Processing),
            "COMPLETED" => Some(SimulationStatus::Completed),
            "FAILED" => Some(SimulationStatus::Failed),
            "CONVERTED_TO_LOT" => Some(SimulationStatus::ConvertedToLot),
            _ => None,
        }
    }
}

impl fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Simulation {
    pub id: Uuid,
    pub fiscal_year: FiscalYear,
    pub description: String,
    pub status: SimulationStatus,
    pub snapshot: ParameterSnapshot,
    pub created_at: DateTime<Utc>,
}

/// Caller input for a new simulation. The snapshot is taken from these
/// values verbatim — it is NOT re-read from the parameter table.
#[derive(Debug, Clone)]
pub struct NewSimulation {
    pub fiscal_year: FiscalYear,
    pub description: String,
    pub snapshot: ParameterSnapshot,
}

/// One persisted per-property result, owned by its simulation.
#[derive(Debug, Clone)]
pub struct SimulationItem {
    pub id: Uuid,
    pub simulation_id: Uuid,
    pub property_id: PropertyId,
    pub contributor_name: Option<String>,
    pub usage_classification: String,
    pub considered_activity: Option<String>,
    pub usage_factor: Decimal,
    pub gross_value: Decimal,
    pub calculated_value: Decimal,
    pub is_exempt: bool,
    pub exemption_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What a successful processing run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub total_properties: usize,
    pub items_written: usize,
}

impl TlpEngine {
    pub fn create_simulation(&self, input: NewSimulation) -> TlpResult<Simulation> {
        let simulation = Simulation {
            id: Uuid::new_v4(),
            fiscal_year: input.fiscal_year,
            description: input.description,
            status: SimulationStatus::Draft,
            snapshot: input.snapshot,
            created_at: Utc::now(),
        };
        let snapshot_json = serde_json::to_string(&simulation.snapshot)?;
        self.store().insert_simulation(&simulation, &snapshot_json)?;
        log::info!(
            "simulation {} created for fiscal year {}",
            simulation.id,
            simulation.fiscal_year
        );
        Ok(simulation)
    }

    /// All simulations, newest first.
    pub fn list_simulations(&self) -> TlpResult<Vec<Simulation>> {
        self.store().list_simulations()
    }

    pub fn get_simulation(&self, id: Uuid) -> TlpResult<Simulation> {
        self.store()
            .get_simulation(id)?
            .ok_or_else(|| TlpError::not_found("simulation", id))
    }

    /// Run the calculation for a simulation and replace its item set.
    ///
    /// Fails with not-found (missing simulation), invalid-state (already
    /// COMPLETED), empty-catalog (nothing to distribute over, before any
    /// write) or a persistence error. On failure the simulation is marked
    /// FAILED as a compensating write; if that write fails too, both errors
    /// are reported distinctly via `TlpError::CompensationFailed`.
    pub fn process_simulation(&mut self, id: Uuid) -> TlpResult<ProcessOutcome> {
        let simulation = self.get_simulation(id)?;
        if simulation.status == SimulationStatus::Completed {
            return Err(TlpError::InvalidState {
                operation: "process",
                status: simulation.status.to_string(),
            });
        }

        // Committed immediately, before the calculation starts.
        self.store()
            .update_simulation_status(id, SimulationStatus::Processing)?;
        log::info!("simulation {id} processing started");

        match self.run_calculation(&simulation) {
            Ok(outcome) => {
                self.store()
                    .update_simulation_status(id, SimulationStatus::Completed)?;
                log::info!(
                    "simulation {id} completed: {} items over {} properties",
                    outcome.items_written,
                    outcome.total_properties
                );
                Ok(outcome)
            }
            Err(source) => {
                log::error!("simulation {id} processing failed: {source}");
                match self
                    .store()
                    .update_simulation_status(id, SimulationStatus::Failed)
                {
                    Ok(()) => Err(source),
                    Err(compensation) => {
                        log::error!(
                            "simulation {id} could not be marked FAILED: {compensation}"
                        );
                        Err(TlpError::CompensationFailed {
                            source: Box::new(source),
                            compensation: Box::new(compensation),
                        })
                    }
                }
            }
        }
    }

    fn run_calculation(&mut self, simulation: &Simulation) -> TlpResult<ProcessOutcome> {
        let rates = simulation.snapshot.effective_rates();
        let exemptions = self.exemption_lookup(simulation.fiscal_year)?;
        let catalog = self.store().fetch_all()?;
        let computed = calc::run(&rates, self.factors(), &exemptions, &catalog)?;
        let items_written = self
            .store_mut()
            .replace_simulation_items(simulation.id, &computed)?;
        Ok(ProcessOutcome {
            total_properties: catalog.len(),
            items_written,
        })
    }

    /// Items of a simulation sorted by calculated value, highest first.
    pub fn simulation_items(
        &self,
        id: Uuid,
        offset: u64,
        limit: u64,
    ) -> TlpResult<Vec<SimulationItem>> {
        self.store().simulation_items_page(id, offset, limit)
    }

    /// Recovery path for a simulation stranded in PROCESSING by a crash:
    /// transitions it to FAILED so it becomes retryable. Rejects any other
    /// status with an invalid-state error.
    pub fn reset_processing(&self, id: Uuid) -> TlpResult<()> {
        let simulation = self.get_simulation(id)?;
        if simulation.status != SimulationStatus::Processing {
            return Err(TlpError::InvalidState {
                operation: "reset",
                status: simulation.status.to_string(),
            });
        }
        self.store()
            .update_simulation_status(id, SimulationStatus::Failed)?;
        log::warn!("simulation {id} reset from PROCESSING to FAILED");
        Ok(())
    }
}
