use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kardex_core::{
    ActorId, Cents, DomainError, DomainResult, MovementId, PartyId, ProductId, SaleId, WarehouseId,
    money,
};

/// Fixed sales tax, percent of the subtotal.
pub const TAX_RATE_PERCENT: u64 = 18;

/// Requested sale line, before price capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSaleLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Committed sale line. `unit_price` is the product's sale price locked at
/// transaction time; later price changes do not touch committed sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub line_no: u32,
    pub product_id: ProductId,
    pub quantity: i64,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: Cents,
    pub subtotal: Cents,
}

impl SaleLine {
    pub fn new(
        line_no: u32,
        product_id: ProductId,
        quantity: i64,
        unit_price: Cents,
    ) -> DomainResult<Self> {
        let subtotal = money::line_subtotal(unit_price, quantity)?;
        Ok(Self {
            line_no,
            product_id,
            quantity,
            unit_price,
            subtotal,
        })
    }
}

/// Header totals: subtotal, 18% tax (half-up to the cent), grand total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleTotals {
    pub subtotal: Cents,
    pub tax: Cents,
    pub total: Cents,
}

pub fn compute_totals(lines: &[SaleLine]) -> DomainResult<SaleTotals> {
    let wide: u128 = lines.iter().map(|l| l.subtotal as u128).sum();
    let subtotal =
        u64::try_from(wide).map_err(|_| DomainError::validation("sale subtotal overflows"))?;
    let tax = money::percent_half_up(subtotal, TAX_RATE_PERCENT);
    Ok(SaleTotals {
        subtotal,
        tax,
        total: subtotal + tax,
    })
}

/// Sale lifecycle status. Committed sales are immutable; corrections are
/// separate counter-transactions (customer returns, adjustments).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Committed,
}

/// Aggregate: sale header owning its lines and the ledger movements the
/// transaction generated. Persisted as one atomic unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub client_id: PartyId,
    pub warehouse_id: WarehouseId,
    pub actor_id: ActorId,
    pub occurred_at: DateTime<Utc>,
    pub lines: Vec<SaleLine>,
    /// One `sale_out` movement per line, in line order.
    pub movements: Vec<MovementId>,
    pub subtotal: Cents,
    pub tax: Cents,
    pub total: Cents,
    pub status: SaleStatus,
}

impl Sale {
    pub fn new(
        id: SaleId,
        client_id: PartyId,
        warehouse_id: WarehouseId,
        actor_id: ActorId,
        lines: Vec<SaleLine>,
        movements: Vec<MovementId>,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation("sale must have at least one line"));
        }
        if movements.len() != lines.len() {
            return Err(DomainError::validation(
                "sale must carry exactly one movement per line",
            ));
        }
        let totals = compute_totals(&lines)?;
        Ok(Self {
            id,
            client_id,
            warehouse_id,
            actor_id,
            occurred_at,
            lines,
            movements,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            status: SaleStatus::Committed,
        })
    }
}
