//! Property catalog queries. The engine only reads this table; the insert
//! helper exists for the runner seed and for tests.

use super::TlpStore;
use crate::catalog::{PropertyCatalog, PropertyRecord};
use crate::error::TlpResult;
use rusqlite::{params, OptionalExtension, Row};

fn property_row(row: &Row<'_>) -> rusqlite::Result<PropertyRecord> {
    Ok(PropertyRecord {
        property_id: row.get(0)?,
        contributor_name: row.get(1)?,
        usage_classification: row.get(2)?,
        considered_activity: row.get(3)?,
        has_service: row.get::<_, i32>(4)? != 0,
        has_commerce: row.get::<_, i32>(5)? != 0,
        has_industry: row.get::<_, i32>(6)? != 0,
        distinct_companies: row.get(7)?,
        distinct_cnaes: row.get(8)?,
    })
}

const PROPERTY_COLUMNS: &str = "property_id, contributor_name, usage_classification, \
     considered_activity, has_service, has_commerce, has_industry, \
     distinct_companies, distinct_cnaes";

impl TlpStore {
    pub fn insert_property(&self, record: &PropertyRecord) -> TlpResult<()> {
        self.conn().execute(
            &format!(
                "INSERT INTO property ({PROPERTY_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            ),
            params![
                record.property_id,
                record.contributor_name,
                record.usage_classification,
                record.considered_activity,
                if record.has_service { 1 } else { 0 },
                if record.has_commerce { 1 } else { 0 },
                if record.has_industry { 1 } else { 0 },
                record.distinct_companies,
                record.distinct_cnaes,
            ],
        )?;
        Ok(())
    }

    pub fn property_count(&self) -> TlpResult<i64> {
        let count = self
            .conn()
            .query_row("SELECT COUNT(*) FROM property", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl PropertyCatalog for TlpStore {
    /// The whole catalog in stable (property id) order.
    fn fetch_all(&self) -> TlpResult<Vec<PropertyRecord>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM property ORDER BY property_id ASC"
        ))?;
        let rows = stmt.query_map([], property_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn get(&self, property_id: &str) -> TlpResult<Option<PropertyRecord>> {
        let record = self
            .conn()
            .query_row(
                &format!("SELECT {PROPERTY_COLUMNS} FROM property WHERE property_id = ?1"),
                params![property_id],
                property_row,
            )
            .optional()?;
        Ok(record)
    }
}
