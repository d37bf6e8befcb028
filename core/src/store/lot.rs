//! Lot table queries.

use super::{conversion_err, parse_timestamp, parse_uuid, TlpStore};
use crate::error::TlpResult;
use crate::lots::{Lot, LotStatus};
use crate::simulation::SimulationStatus;
use crate::snapshot::ParameterSnapshot;
use crate::types::FiscalYear;
use rusqlite::{params, OptionalExtension, Row};

const LOT_COLUMNS: &str =
    "id, fiscal_year, version, origin_simulation_id, snapshot, status, created_at";

fn lot_row(row: &Row<'_>) -> rusqlite::Result<Lot> {
    let snapshot_text: String = row.get(4)?;
    let snapshot: ParameterSnapshot =
        serde_json::from_str(&snapshot_text).map_err(|e| conversion_err(4, Box::new(e)))?;
    let status_text: String = row.get(5)?;
    let status = LotStatus::parse(&status_text)
        .ok_or_else(|| conversion_err(5, format!("unknown lot status: {status_text}").into()))?;
    Ok(Lot {
        id: parse_uuid(row.get(0)?, 0)?,
        fiscal_year: row.get(1)?,
        version: row.get(2)?,
        origin_simulation_id: parse_uuid(row.get(3)?, 3)?,
        snapshot,
        status,
        created_at: parse_timestamp(row.get(6)?, 6)?,
    })
}

impl TlpStore {
    /// Insert a lot carrying the origin simulation's snapshot document
    /// verbatim, and mark the origin with the given status. Both writes
    /// commit in one transaction.
    pub fn insert_lot_and_convert(
        &mut self,
        lot: &Lot,
        snapshot_json: &str,
        origin_status: SimulationStatus,
    ) -> TlpResult<()> {
        let tx = self.conn_mut().transaction()?;
        tx.execute(
            "INSERT INTO lot (
                id, fiscal_year, version, origin_simulation_id, snapshot,
                status, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                lot.id.to_string(),
                lot.fiscal_year,
                lot.version,
                lot.origin_simulation_id.to_string(),
                snapshot_json,
                lot.status.as_str(),
                lot.created_at.to_rfc3339(),
            ],
        )?;
        tx.execute(
            "UPDATE simulation SET status = ?1 WHERE id = ?2",
            params![
                origin_status.as_str(),
                lot.origin_simulation_id.to_string()
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn last_lot_version(&self, fiscal_year: FiscalYear) -> TlpResult<Option<i32>> {
        let version = self.conn().query_row(
            "SELECT MAX(version) FROM lot WHERE fiscal_year = ?1",
            params![fiscal_year],
            |row| row.get::<_, Option<i32>>(0),
        )?;
        Ok(version)
    }

    pub fn list_lots(&self) -> TlpResult<Vec<Lot>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {LOT_COLUMNS} FROM lot ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], lot_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// The highest-version lot of a fiscal year.
    pub fn latest_lot(&self, fiscal_year: FiscalYear) -> TlpResult<Option<Lot>> {
        let lot = self
            .conn()
            .query_row(
                &format!(
                    "SELECT {LOT_COLUMNS} FROM lot
                     WHERE fiscal_year = ?1
                     ORDER BY version DESC LIMIT 1"
                ),
                params![fiscal_year],
                lot_row,
            )
            .optional()?;
        Ok(lot)
    }

    /// The raw stored snapshot document of a lot (promotion fidelity checks).
    pub fn lot_snapshot_json(&self, id: uuid::Uuid) -> TlpResult<String> {
        let json = self.conn().query_row(
            "SELECT snapshot FROM lot WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(json)
    }
}
