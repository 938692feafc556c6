use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kardex_core::ProductId;

use crate::movement::StockMovement;

/// Chronological audit trail of one product's movements over a period, with
/// the opening balance seeded from the last movement before the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KardexReport {
    pub product_id: ProductId,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub opening_balance: i64,
    /// Ordered by (occurred_at, sequence) ascending.
    pub entries: Vec<StockMovement>,
}

impl KardexReport {
    pub fn build(
        product_id: ProductId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        opening: Option<&StockMovement>,
        entries: Vec<StockMovement>,
    ) -> Self {
        Self {
            product_id,
            from,
            to,
            opening_balance: opening.map(|m| m.quantity_after).unwrap_or(0),
            entries,
        }
    }

    /// Balance after the last movement of the period (opening balance when
    /// the period is empty).
    pub fn closing_balance(&self) -> i64 {
        self.entries
            .last()
            .map(|m| m.quantity_after)
            .unwrap_or(self.opening_balance)
    }

    /// Net quantity change over the period.
    pub fn net_change(&self) -> i64 {
        self.entries.iter().map(|m| m.delta).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::MovementKind;
    use kardex_core::{ActorId, WarehouseId};

    fn test_movement(before: i64, delta: i64) -> StockMovement {
        let kind = if delta >= 0 {
            MovementKind::AdjustmentIn
        } else {
            MovementKind::AdjustmentOut
        };
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
        .unwrap()
    }

    #[test]
    fn empty_period_carries_opening_balance() {
        let opening = test_movement(3, 4);
        let report = KardexReport::build(
            ProductId::new(),
            Utc::now(),
            Utc::now(),
            Some(&opening),
            vec![],
        );
        assert_eq!(report.opening_balance, 7);
        assert_eq!(report.closing_balance(), 7);
        assert_eq!(report.net_change(), 0);
    }

    #[test]
    fn no_history_opens_at_zero() {
        let report = KardexReport::build(ProductId::new(), Utc::now(), Utc::now(), None, vec![]);
        assert_eq!(report.opening_balance, 0);
    }

    #[test]
    fn closing_balance_follows_last_entry() {
        let entries = vec![test_movement(0, 10), test_movement(10, -4)];
        let report = KardexReport::build(ProductId::new(), Utc::now(), Utc::now(), None, entries);
        assert_eq!(report.closing_balance(), 6);
        assert_eq!(report.net_change(), 6);
    }
}
