use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kardex_core::{
    ActorId, DomainError, DomainResult, MovementId, ProductId, ProductionOrderId, PurchaseId,
    SaleId, WarehouseId,
};

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

/// Cause of a stock movement. The wire names are stable: audit exports and
/// the Kardex report key on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    PurchaseIn,
    SaleOut,
    CustomerReturnIn,
    SupplierReturnOut,
    AdjustmentIn,
    AdjustmentOut,
    ProductionConsumptionOut,
    ProductionOutputIn,
}

impl MovementKind {
    pub fn direction(self) -> Direction {
        match self {
            MovementKind::PurchaseIn
            | MovementKind::CustomerReturnIn
            | MovementKind::AdjustmentIn
            | MovementKind::ProductionOutputIn => Direction::Inbound,
            MovementKind::SaleOut
            | MovementKind::SupplierReturnOut
            | MovementKind::AdjustmentOut
            | MovementKind::ProductionConsumptionOut => Direction::Outbound,
        }
    }
}

/// Transaction a movement originated from. At most one origin per movement;
/// manual adjustments carry none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementOrigin {
    Sale(SaleId),
    Purchase(PurchaseId),
    Production(ProductionOrderId),
}

/// One immutable ledger row: a single stock change with its before/after
/// balances. Created inside the same transaction as the snapshot update it
/// describes; never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    /// Global, monotonically increasing ledger position, assigned on append.
    pub sequence: u64,
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub actor_id: ActorId,
    pub kind: MovementKind,
    /// Signed quantity change. Inbound kinds are positive, outbound negative.
    pub delta: i64,
    pub quantity_before: i64,
    pub quantity_after: i64,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub origin: Option<MovementOrigin>,
}

impl StockMovement {
    /// Build a movement from a snapshot transition, checking the ledger
    /// invariants. `sequence` is assigned later by the ledger.
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        kind: MovementKind,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        actor_id: ActorId,
        quantity_before: i64,
        delta: i64,
        origin: Option<MovementOrigin>,
        note: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let quantity_after = quantity_before.checked_add(delta).ok_or_else(|| {
            DomainError::invalid_movement("resulting balance overflows")
        })?;
        let movement = Self {
            id: MovementId::new(),
            sequence: 0,
            product_id,
            warehouse_id,
            actor_id,
            kind,
            delta,
            quantity_before,
            quantity_after,
            note,
            occurred_at,
            origin,
        };
        movement.validate()?;
        Ok(movement)
    }

    /// Ledger invariants: non-zero delta whose sign matches the kind,
    /// consistent before/after arithmetic, no negative balances.
    pub fn validate(&self) -> DomainResult<()> {
        if self.delta == 0 {
            return Err(DomainError::invalid_movement("delta cannot be zero"));
        }
        match self.kind.direction() {
            Direction::Inbound if self.delta < 0 => {
                return Err(DomainError::invalid_movement(format!(
                    "inbound kind {:?} requires a positive delta, got {}",
                    self.kind, self.delta
                )));
            }
            Direction::Outbound if self.delta > 0 => {
                return Err(DomainError::invalid_movement(format!(
                    "outbound kind {:?} requires a negative delta, got {}",
                    self.kind, self.delta
                )));
            }
            _ => {}
        }
        if self.quantity_before.checked_add(self.delta) != Some(self.quantity_after) {
            return Err(DomainError::invalid_movement(format!(
                "quantity_after {} != quantity_before {} + delta {}",
                self.quantity_after, self.quantity_before, self.delta
            )));
        }
        if self.quantity_before < 0 || self.quantity_after < 0 {
            return Err(DomainError::invalid_movement(
                "balances cannot be negative",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_movement(kind: MovementKind, before: i64, delta: i64) -> DomainResult<StockMovement> {
        StockMovement::record(
            kind,
            ProductId::new(),
            WarehouseId::new(),
            ActorId::new(),
            before,
            delta,
            None,
            None,
            Utc::now(),
        )
    }

    #[test]
    fn record_computes_quantity_after() {
        let m = test_movement(MovementKind::PurchaseIn, 10, 5).unwrap();
        assert_eq!(m.quantity_before, 10);
        assert_eq!(m.quantity_after, 15);
    }

    #[test]
    fn sign_must_match_kind() {
        let err = test_movement(MovementKind::SaleOut, 10, 3).unwrap_err();
        match err {
            DomainError::InvalidMovement(msg) if msg.contains("negative delta") => {}
            other => panic!("expected InvalidMovement, got {other:?}"),
        }

        let err = test_movement(MovementKind::PurchaseIn, 10, -3).unwrap_err();
        match err {
            DomainError::InvalidMovement(msg) if msg.contains("positive delta") => {}
            other => panic!("expected InvalidMovement, got {other:?}"),
        }
    }

    #[test]
    fn zero_delta_is_rejected() {
        assert!(test_movement(MovementKind::AdjustmentIn, 4, 0).is_err());
    }

    #[test]
    fn negative_resulting_balance_is_rejected() {
        let err = test_movement(MovementKind::SaleOut, 2, -5).unwrap_err();
        match err {
            DomainError::InvalidMovement(msg) if msg.contains("negative") => {}
            other => panic!("expected InvalidMovement, got {other:?}"),
        }
    }

    #[test]
    fn balance_near_i64_max_does_not_overflow() {
        let err = test_movement(MovementKind::PurchaseIn, i64::MAX, 1).unwrap_err();
        match err {
            DomainError::InvalidMovement(msg) if msg.contains("overflows") => {}
            other => panic!("expected InvalidMovement, got {other:?}"),
        }
    }

    #[test]
    fn tampered_arithmetic_fails_validation() {
        let mut m = test_movement(MovementKind::PurchaseIn, 0, 7).unwrap();
        m.quantity_after = 99;
        assert!(m.validate().is_err());
    }

    #[test]
    fn kind_wire_names_are_stable() {
        // The Kardex report and audit exports key on these names.
        assert_eq!(
            serde_json::to_string(&MovementKind::SaleOut).unwrap(),
            "\"sale_out\""
        );
        assert_eq!(
            serde_json::to_string(&MovementKind::ProductionConsumptionOut).unwrap(),
            "\"production_consumption_out\""
        );
        assert_eq!(
            serde_json::to_string(&MovementKind::CustomerReturnIn).unwrap(),
            "\"customer_return_in\""
        );
    }

    proptest! {
        /// Property: a movement built by `record` either fails validation or
        /// satisfies quantity_after = quantity_before + delta with the sign
        /// matching its direction.
        #[test]
        fn recorded_movements_hold_invariants(before in 0i64..10_000, delta in -10_000i64..10_000) {
            let kinds = [
                MovementKind::PurchaseIn,
                MovementKind::SaleOut,
                MovementKind::AdjustmentIn,
                MovementKind::AdjustmentOut,
            ];
            for kind in kinds {
                match test_movement(kind, before, delta) {
                    Ok(m) => {
                        prop_assert_eq!(m.quantity_after, m.quantity_before + m.delta);
                        match kind.direction() {
                            Direction::Inbound => prop_assert!(m.delta > 0),
                            Direction::Outbound => prop_assert!(m.delta < 0),
                        }
                        prop_assert!(m.quantity_after >= 0);
                    }
                    Err(DomainError::InvalidMovement(_)) => {}
                    Err(other) => prop_assert!(false, "unexpected error {:?}", other),
                }
            }
        }
    }
}
