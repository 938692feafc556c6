use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kardex_core::{
    ActorId, Cents, DomainError, DomainResult, MovementId, PartyId, ProductId, PurchaseId,
    WarehouseId, money,
};

/// Requested purchase line. `unit_cost` comes from the supplier document and
/// becomes the product's new master cost (last-cost-wins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPurchaseLine {
    pub product_id: ProductId,
    pub quantity: i64,
    /// Cost in smallest currency unit (e.g., cents).
    pub unit_cost: Cents,
}

/// Committed purchase line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub line_no: u32,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_cost: Cents,
    pub subtotal: Cents,
}

impl PurchaseLine {
    pub fn new(
        line_no: u32,
        product_id: ProductId,
        quantity: i64,
        unit_cost: Cents,
    ) -> DomainResult<Self> {
        let subtotal = money::line_subtotal(unit_cost, quantity)?;
        Ok(Self {
            line_no,
            product_id,
            quantity,
            unit_cost,
            subtotal,
        })
    }
}

/// Purchase lifecycle status. Committed purchases are immutable; corrections
/// are separate counter-transactions (supplier returns, adjustments).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Committed,
}

/// Aggregate: purchase header owning its lines and the ledger movements the
/// transaction generated. Persisted as one atomic unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub supplier_id: PartyId,
    pub warehouse_id: WarehouseId,
    pub actor_id: ActorId,
    pub occurred_at: DateTime<Utc>,
    /// Supplier document (invoice/delivery note) backing this purchase.
    pub reference_doc: Option<String>,
    pub lines: Vec<PurchaseLine>,
    /// One `purchase_in` movement per line, in line order.
    pub movements: Vec<MovementId>,
    pub total: Cents,
    pub status: PurchaseStatus,
}

impl Purchase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PurchaseId,
        supplier_id: PartyId,
        warehouse_id: WarehouseId,
        actor_id: ActorId,
        lines: Vec<PurchaseLine>,
        movements: Vec<MovementId>,
        reference_doc: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation(
                "purchase must have at least one line",
            ));
        }
        if movements.len() != lines.len() {
            return Err(DomainError::validation(
                "purchase must carry exactly one movement per line",
            ));
        }
        let wide: u128 = lines.iter().map(|l| l.subtotal as u128).sum();
        let total =
            u64::try_from(wide).map_err(|_| DomainError::validation("purchase total overflows"))?;
        Ok(Self {
            id,
            supplier_id,
            warehouse_id,
            actor_id,
            occurred_at,
            reference_doc,
            lines,
            movements,
            total,
            status: PurchaseStatus::Committed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_line(line_no: u32, quantity: i64, unit_cost: Cents) -> PurchaseLine {
        PurchaseLine::new(line_no, ProductId::new(), quantity, unit_cost).unwrap()
    }

    #[test]
    fn line_subtotal_is_cost_times_quantity() {
        assert_eq!(test_line(1, 4, 1_25).subtotal, 5_00);
    }

    #[test]
    fn header_total_sums_lines() {
        let purchase = Purchase::new(
            PurchaseId::new(),
            PartyId::new(),
            WarehouseId::new(),
            ActorId::new(),
            vec![test_line(1, 4, 1_25), test_line(2, 10, 30)],
            vec![MovementId::new(), MovementId::new()],
            Some("INV-001".to_string()),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(purchase.total, 8_00);
        assert_eq!(purchase.status, PurchaseStatus::Committed);
    }

    #[test]
    fn purchase_requires_lines() {
        let err = Purchase::new(
            PurchaseId::new(),
            PartyId::new(),
            WarehouseId::new(),
            ActorId::new(),
            vec![],
            vec![],
            None,
            Utc::now(),
        )
        .unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("at least one line") => {}
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn movement_count_must_match_lines() {
        let err = Purchase::new(
            PurchaseId::new(),
            PartyId::new(),
            WarehouseId::new(),
            ActorId::new(),
            vec![test_line(1, 1, 10)],
            vec![],
            None,
            Utc::now(),
        )
        .unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("movement per line") => {}
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
