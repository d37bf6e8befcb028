//! Engine facade.
//!
//! `TlpEngine` owns the store and the injected usage-factor table; every
//! boundary operation hangs off it. Domain logic lives in the sibling
//! modules (`params`, `exemptions`, `simulation`, `lots`, `report`), each
//! contributing its own `impl TlpEngine` block.

use crate::error::TlpResult;
use crate::factors::UsageFactorTable;
use crate::store::TlpStore;

pub struct TlpEngine {
    store: TlpStore,
    factors: UsageFactorTable,
}

impl TlpEngine {
    pub fn new(store: TlpStore) -> Self {
        Self {
            store,
            factors: UsageFactorTable::default(),
        }
    }

    /// Engine with a custom factor table (tests and what-if runs).
    pub fn with_factors(store: TlpStore, factors: UsageFactorTable) -> Self {
        Self { store, factors }
    }

    /// In-memory engine with migrations applied. Used by tests and the
    /// runner's default mode.
    pub fn in_memory() -> TlpResult<Self> {
        let store = TlpStore::in_memory()?;
        store.migrate()?;
        Ok(Self::new(store))
    }

    pub fn store(&self) -> &TlpStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut TlpStore {
        &mut self.store
    }

    pub fn factors(&self) -> &UsageFactorTable {
        &self.factors
    }
}
