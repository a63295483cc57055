//! Error types for the progression, catalog and persistence boundaries.
//!
//! Battle precondition failures are not errors; they come back as
//! [`crate::battle::TurnResult`] values.

use thiserror::Error;

/// Failures of the external catalog lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("no catalog entry for identity {0}")]
    NotFound(u32),

    #[error("network error: {0}")]
    Network(String),

    #[error("catalog response could not be decoded: {0}")]
    Decode(String),

    #[error("catalog lookup timed out")]
    TimedOut,

    #[error("catalog has no entries to choose from")]
    Empty,
}

#[derive(Debug, Error)]
pub enum EvolutionError {
    #[error("Pokemon cannot evolve at this time")]
    CannotEvolve,

    #[error("No evolution data available for this Pokemon")]
    NoEvolutionData,

    #[error("Failed to fetch evolution data: {0}")]
    FetchFailed(#[source] CatalogError),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Error saving data: {0}")]
    Save(String),

    #[error("Error loading data: {0}")]
    Load(String),
}

pub type PersistenceResult<T> = std::result::Result<T, PersistenceError>;
