//! Exemption table queries. All reads filter on the `active` flag;
//! deactivation is an UPDATE, never a DELETE.

use super::{parse_timestamp, parse_uuid, TlpStore};
use crate::calc::ExemptionMap;
use crate::error::TlpResult;
use crate::exemptions::Exemption;
use crate::types::FiscalYear;
use rusqlite::params;
use uuid::Uuid;

impl TlpStore {
    pub fn insert_exemption(&self, e: &Exemption) -> TlpResult<()> {
        self.conn().execute(
            "INSERT INTO exemption (
                id, property_id, fiscal_year, reason, source, active, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                e.id.to_string(),
                e.property_id,
                e.fiscal_year,
                e.reason,
                e.source,
                if e.active { 1 } else { 0 },
                e.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_active_exemptions(&self) -> TlpResult<Vec<Exemption>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, property_id, fiscal_year, reason, source, active, created_at
             FROM exemption
             WHERE active = 1
             ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Exemption {
                id: parse_uuid(row.get(0)?, 0)?,
                property_id: row.get(1)?,
                fiscal_year: row.get(2)?,
                reason: row.get(3)?,
                source: row.get(4)?,
                active: row.get::<_, i32>(5)? != 0,
                created_at: parse_timestamp(row.get(6)?, 6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Active exemptions of a fiscal year as a property → reason map.
    pub fn active_exemptions_for_year(&self, fiscal_year: FiscalYear) -> TlpResult<ExemptionMap> {
        let mut stmt = self.conn().prepare(
            "SELECT property_id, reason FROM exemption
             WHERE fiscal_year = ?1 AND active = 1",
        )?;
        let rows = stmt.query_map(params![fiscal_year], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })?;
        let mut map = ExemptionMap::new();
        for row in rows {
            let (property_id, reason) = row?;
            map.insert(property_id, reason);
        }
        Ok(map)
    }

    /// Returns false when no active row matched.
    pub fn deactivate_exemption(&self, id: Uuid) -> TlpResult<bool> {
        let changed = self.conn().execute(
            "UPDATE exemption SET active = 0 WHERE id = ?1 AND active = 1",
            params![id.to_string()],
        )?;
        Ok(changed > 0)
    }
}
