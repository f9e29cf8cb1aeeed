//! Error types for dice pool operations

use thiserror::Error;

/// Errors raised by heap and pool operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("no heap of d{facets} in the pool")]
    HeapNotFound { facets: u32 },

    #[error("die must have at least 1 facet (got {0})")]
    InvalidFacets(u32),

    #[error("dice count must be at least 1 (got {0})")]
    InvalidCount(u32),

    #[error("heap of d{facets} would hold {count} dice (limit {max})")]
    TooManyDice { facets: u32, count: u64, max: u32 },

    #[error("invalid dice descriptor: {0}")]
    InvalidDescriptor(String),
}

impl DiceError {
    /// Whether the error was caused by bad caller input rather than a missing heap
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(self, DiceError::HeapNotFound { .. })
    }
}

/// Result type alias for dice operations
pub type Result<T> = std::result::Result<T, DiceError>;
