//! SQLite persistence layer.
//!
//! RULE: Only the store modules talk to the database.
//! The engine calls store methods — it never executes SQL directly.

mod catalog;
mod exemption;
mod lot;
mod parameter;
mod simulation;

use crate::error::TlpResult;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Connection;
use rust_decimal::Decimal;
use uuid::Uuid;

pub struct TlpStore {
    conn: Connection,
}

impl TlpStore {
    pub fn open(path: &str) -> TlpResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only matters for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (tests and the runner default).
    pub fn in_memory() -> TlpResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> TlpResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_parameters.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_exemptions.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/003_simulations.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/004_lots.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/005_property_catalog.sql"))?;
        Ok(())
    }

    pub(self) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub(self) fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

// ── Row conversion helpers ─────────────────────────────────────────
//
// Decimals, uuids and timestamps are persisted as canonical text; parse
// failures surface as conversion errors on the offending column.

pub(self) fn parse_decimal(text: String, idx: usize) -> rusqlite::Result<Decimal> {
    text.parse()
        .map_err(|e: rust_decimal::Error| conversion_err(idx, Box::new(e)))
}

pub(self) fn parse_decimal_opt(
    text: Option<String>,
    idx: usize,
) -> rusqlite::Result<Option<Decimal>> {
    text.map(|t| parse_decimal(t, idx)).transpose()
}

pub(self) fn parse_uuid(text: String, idx: usize) -> rusqlite::Result<Uuid> {
    text.parse()
        .map_err(|e: uuid::Error| conversion_err(idx, Box::new(e)))
}

pub(self) fn parse_timestamp(text: String, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_err(idx, Box::new(e)))
}

pub(self) fn conversion_err(
    idx: usize,
    err: Box<dyn std::error::Error + Send + Sync>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err)
}
