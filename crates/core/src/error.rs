//! Domain error model.

use thiserror::Error;

use crate::id::{ProductId, WarehouseId};

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures. Callers translate
/// the structured context (names, quantities) into user-facing messages; the
/// engine never formats prose beyond `Display`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A referenced entity (product, warehouse, party, workshop, sale,
    /// purchase, production order) does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// An outbound delta was applied to a (product, warehouse) pair that has
    /// no snapshot row. Distinct from `NotFound`: the catalog entities exist,
    /// the pair simply has no stock history.
    #[error("no stock snapshot for product {product_id} in warehouse {warehouse_id}")]
    SnapshotNotFound {
        product_id: ProductId,
        warehouse_id: WarehouseId,
    },

    /// Requested quantity exceeds what the warehouse holds.
    #[error(
        "insufficient stock of '{product}' in warehouse '{warehouse}': available {available}, requested {requested}"
    )]
    InsufficientStock {
        product: String,
        warehouse: String,
        available: i64,
        requested: i64,
    },

    /// A ledger invariant was violated. Programming error: correct callers
    /// never produce this.
    #[error("invalid movement: {0}")]
    InvalidMovement(String),

    /// A state-machine transition was attempted from the wrong state.
    #[error("invalid state: expected {expected}, found {found}")]
    InvalidState {
        expected: &'static str,
        found: String,
    },

    /// Production order code collision.
    #[error("duplicate production order code '{0}'")]
    DuplicateCode(String),

    /// A value failed validation (e.g. malformed or empty input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Optimistic concurrency check failed (stale snapshot version).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_movement(msg: impl Into<String>) -> Self {
        Self::InvalidMovement(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn duplicate_code(code: impl Into<String>) -> Self {
        Self::DuplicateCode(code.into())
    }
}
