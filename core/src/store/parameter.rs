//! Parameter table queries.

use super::{parse_decimal, parse_decimal_opt, parse_timestamp, parse_uuid, TlpStore};
use crate::error::TlpResult;
use crate::params::Parameter;
use crate::types::FiscalYear;
use rusqlite::params;

impl TlpStore {
    pub fn insert_parameter(&self, p: &Parameter) -> TlpResult<()> {
        self.conn().execute(
            "INSERT INTO parameter (
                id, fiscal_year, version, base_cost, ipca_pct, subsidy_pct,
                limit_min_base, limit_max_base, limit_min_updated,
                limit_max_updated, active, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                p.id.to_string(),
                p.fiscal_year,
                p.version,
                p.base_cost.to_string(),
                p.ipca_pct.map(|d| d.to_string()),
                p.subsidy_pct.map(|d| d.to_string()),
                p.limit_min_base.map(|d| d.to_string()),
                p.limit_max_base.map(|d| d.to_string()),
                p.limit_min_updated.map(|d| d.to_string()),
                p.limit_max_updated.map(|d| d.to_string()),
                if p.active { 1 } else { 0 },
                p.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn last_parameter_version(&self, fiscal_year: FiscalYear) -> TlpResult<Option<i32>> {
        let version = self.conn().query_row(
            "SELECT MAX(version) FROM parameter WHERE fiscal_year = ?1",
            params![fiscal_year],
            |row| row.get::<_, Option<i32>>(0),
        )?;
        Ok(version)
    }

    pub fn list_parameters(&self) -> TlpResult<Vec<Parameter>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, fiscal_year, version, base_cost, ipca_pct, subsidy_pct,
                    limit_min_base, limit_max_base, limit_min_updated,
                    limit_max_updated, active, created_at
             FROM parameter
             ORDER BY fiscal_year DESC, version DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Parameter {
                id: parse_uuid(row.get(0)?, 0)?,
                fiscal_year: row.get(1)?,
                version: row.get(2)?,
                base_cost: parse_decimal(row.get(3)?, 3)?,
                ipca_pct: parse_decimal_opt(row.get(4)?, 4)?,
                subsidy_pct: parse_decimal_opt(row.get(5)?, 5)?,
                limit_min_base: parse_decimal_opt(row.get(6)?, 6)?,
                limit_max_base: parse_decimal_opt(row.get(7)?, 7)?,
                limit_min_updated: parse_decimal_opt(row.get(8)?, 8)?,
                limit_max_updated: parse_decimal_opt(row.get(9)?, 9)?,
                active: row.get::<_, i32>(10)? != 0,
                created_at: parse_timestamp(row.get(11)?, 11)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
