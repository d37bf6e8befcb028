//! Shared primitive types used across the engine.

/// The year a parameter, simulation or lot applies to (exercicio).
pub type FiscalYear = i32;

/// The stable cadastral key of a property in the catalog.
pub type PropertyId = String;
