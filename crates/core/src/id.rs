//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! impl_uuid_newtype {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| DomainError::validation(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

impl_uuid_newtype!(
    /// Identifier of a product in the reference catalog.
    ProductId,
    "ProductId"
);
impl_uuid_newtype!(
    /// Identifier of a warehouse.
    WarehouseId,
    "WarehouseId"
);
impl_uuid_newtype!(
    /// Identifier of a party (client or supplier).
    PartyId,
    "PartyId"
);
impl_uuid_newtype!(
    /// Identifier of a production workshop.
    WorkshopId,
    "WorkshopId"
);
impl_uuid_newtype!(
    /// Identifier of the authenticated actor performing a transaction.
    ActorId,
    "ActorId"
);
impl_uuid_newtype!(
    /// Identifier of one ledger movement row.
    MovementId,
    "MovementId"
);
impl_uuid_newtype!(
    /// Identifier of a stock snapshot row.
    SnapshotId,
    "SnapshotId"
);
impl_uuid_newtype!(
    /// Identifier of a committed sale.
    SaleId,
    "SaleId"
);
impl_uuid_newtype!(
    /// Identifier of a committed purchase.
    PurchaseId,
    "PurchaseId"
);
impl_uuid_newtype!(
    /// Identifier of a production order.
    ProductionOrderId,
    "ProductionOrderId"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrip() {
        let id = ProductId::new();
        let parsed: ProductId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = "not-a-uuid".parse::<WarehouseId>().unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("WarehouseId") => {}
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn ids_are_time_ordered() {
        // UUIDv7 sorts by creation time; the ledger relies on this for
        // deterministic tie-breaking.
        let a = MovementId::new();
        let b = MovementId::new();
        assert!(a <= b);
    }
}
