//! Read-only boundary to the classified property catalog.

use crate::error::TlpResult;
use crate::types::PropertyId;
use serde::{Deserialize, Serialize};

/// One classified property as supplied by the catalog view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub property_id: PropertyId,
    pub contributor_name: Option<String>,
    pub usage_classification: Option<String>,
    pub considered_activity: Option<String>,
    pub has_service: bool,
    pub has_commerce: bool,
    pub has_industry: bool,
    pub distinct_companies: i64,
    pub distinct_cnaes: i64,
}

/// Contract with the external property catalog: a fully-materialized,
/// stably-ordered sequence of classified records for the whole jurisdiction.
/// The calculation never assumes paged or incremental fetch.
pub trait PropertyCatalog {
    fn fetch_all(&self) -> TlpResult<Vec<PropertyRecord>>;
    fn get(&self, property_id: &str) -> TlpResult<Option<PropertyRecord>>;
}
