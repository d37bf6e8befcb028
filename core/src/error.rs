use thiserror::Error;

#[derive(Error, Debug)]
pub enum TlpError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Snapshot serialization error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    #[error("Cannot {operation} a simulation in status {status}")]
    InvalidState {
        operation: &'static str,
        status: String,
    },

    #[error("No properties found in the catalog")]
    EmptyCatalog,

    #[error("{source}; marking the simulation FAILED also failed: {compensation}")]
    CompensationFailed {
        source: Box<TlpError>,
        compensation: Box<TlpError>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type TlpResult<T> = Result<T, TlpError>;

impl TlpError {
    pub fn not_found(what: &'static str, id: impl ToString) -> Self {
        TlpError::NotFound {
            what,
            id: id.to_string(),
        }
    }

    /// True when the underlying SQLite error is a constraint violation, e.g.
    /// a lost race on a UNIQUE (fiscal_year, version) index.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            TlpError::Database(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}
