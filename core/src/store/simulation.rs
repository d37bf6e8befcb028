//! Simulation and simulation_item table queries.

use super::{conversion_err, parse_decimal, parse_timestamp, parse_uuid, TlpStore};
use crate::calc::ComputedItem;
use crate::error::TlpResult;
use crate::simulation::{Simulation, SimulationItem, SimulationStatus};
use crate::snapshot::ParameterSnapshot;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

const SIMULATION_COLUMNS: &str =
    "id, fiscal_year, description, status, snapshot, created_at";

const ITEM_COLUMNS: &str = "id, simulation_id, property_id, contributor_name, \
     usage_classification, considered_activity, usage_factor, gross_value, \
     calculated_value, is_exempt, exemption_reason, created_at";

fn simulation_row(row: &Row<'_>) -> rusqlite::Result<Simulation> {
    let status_text: String = row.get(3)?;
    let status = SimulationStatus::parse(&status_text).ok_or_else(|| {
        conversion_err(3, format!("unknown simulation status: {status_text}").into())
    })?;
    let snapshot_text: String = row.get(4)?;
    let snapshot: ParameterSnapshot =
        serde_json::from_str(&snapshot_text).map_err(|e| conversion_err(4, Box::new(e)))?;
    Ok(Simulation {
        id: parse_uuid(row.get(0)?, 0)?,
        fiscal_year: row.get(1)?,
        description: row.get(2)?,
        status,
        snapshot,
        created_at: parse_timestamp(row.get(5)?, 5)?,
    })
}

fn item_row(row: &Row<'_>) -> rusqlite::Result<SimulationItem> {
    Ok(SimulationItem {
        id: parse_uuid(row.get(0)?, 0)?,
        simulation_id: parse_uuid(row.get(1)?, 1)?,
        property_id: row.get(2)?,
        contributor_name: row.get(3)?,
        usage_classification: row.get(4)?,
        considered_activity: row.get(5)?,
        usage_factor: parse_decimal(row.get(6)?, 6)?,
        gross_value: parse_decimal(row.get(7)?, 7)?,
        calculated_value: parse_decimal(row.get(8)?, 8)?,
        is_exempt: row.get::<_, i32>(9)? != 0,
        exemption_reason: row.get(10)?,
        created_at: parse_timestamp(row.get(11)?, 11)?,
    })
}

impl TlpStore {
    /// The snapshot JSON is passed in pre-serialized so the stored document
    /// is exactly what promotion later copies byte for byte.
    pub fn insert_simulation(&self, s: &Simulation, snapshot_json: &str) -> TlpResult<()> {
        self.conn().execute(
            "INSERT INTO simulation (id, fiscal_year, description, status, snapshot, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                s.id.to_string(),
                s.fiscal_year,
                s.description,
                s.status.as_str(),
                snapshot_json,
                s.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_simulation(&self, id: Uuid) -> TlpResult<Option<Simulation>> {
        let sim = self
            .conn()
            .query_row(
                &format!("SELECT {SIMULATION_COLUMNS} FROM simulation WHERE id = ?1"),
                params![id.to_string()],
                simulation_row,
            )
            .optional()?;
        Ok(sim)
    }

    /// The raw stored snapshot document of a simulation.
    pub fn simulation_snapshot_json(&self, id: Uuid) -> TlpResult<String> {
        let json = self.conn().query_row(
            "SELECT snapshot FROM simulation WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(json)
    }

    pub fn list_simulations(&self) -> TlpResult<Vec<Simulation>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {SIMULATION_COLUMNS} FROM simulation
             ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], simulation_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn update_simulation_status(
        &self,
        id: Uuid,
        status: SimulationStatus,
    ) -> TlpResult<()> {
        self.conn().execute(
            "UPDATE simulation SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id.to_string()],
        )?;
        Ok(())
    }

    /// Replace the full item set of a simulation in one transaction:
    /// delete-all-then-insert-all, so a mid-run failure leaves the prior set
    /// (or no items), never a mix. Returns the number of items written.
    pub fn replace_simulation_items(
        &mut self,
        simulation_id: Uuid,
        items: &[ComputedItem],
    ) -> TlpResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn_mut().transaction()?;
        tx.execute(
            "DELETE FROM simulation_item WHERE simulation_id = ?1",
            params![simulation_id.to_string()],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO simulation_item (
                    id, simulation_id, property_id, contributor_name,
                    usage_classification, considered_activity, usage_factor,
                    gross_value, calculated_value, is_exempt, exemption_reason,
                    created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for item in items {
                stmt.execute(params![
                    Uuid::new_v4().to_string(),
                    simulation_id.to_string(),
                    item.property_id,
                    item.contributor_name,
                    item.usage_classification,
                    item.considered_activity,
                    item.usage_factor.to_string(),
                    item.gross_value.to_string(),
                    item.calculated_value.to_string(),
                    if item.is_exempt { 1 } else { 0 },
                    item.exemption_reason,
                    now,
                ])?;
            }
        }
        tx.commit()?;
        Ok(items.len())
    }

    /// One page of items, highest calculated value first. The decimal text
    /// is cast for ordering only; values themselves stay exact.
    pub fn simulation_items_page(
        &self,
        simulation_id: Uuid,
        offset: u64,
        limit: u64,
    ) -> TlpResult<Vec<SimulationItem>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM simulation_item
             WHERE simulation_id = ?1
             ORDER BY CAST(calculated_value AS REAL) DESC, property_id ASC
             LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt.query_map(
            params![simulation_id.to_string(), limit as i64, offset as i64],
            item_row,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// All items of a simulation in insertion (catalog) order.
    pub fn all_simulation_items(&self, simulation_id: Uuid) -> TlpResult<Vec<SimulationItem>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM simulation_item
             WHERE simulation_id = ?1
             ORDER BY rowid ASC"
        ))?;
        let rows = stmt.query_map(params![simulation_id.to_string()], item_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn simulation_item_count(&self, simulation_id: Uuid) -> TlpResult<i64> {
        let count = self.conn().query_row(
            "SELECT COUNT(*) FROM simulation_item WHERE simulation_id = ?1",
            params![simulation_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
