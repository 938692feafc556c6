use std::sync::Arc;

use chrono::Utc;

use kardex_core::{
    ActorId, DomainError, DomainResult, ProductId, PurchaseId, SaleId, WarehouseId,
};
use kardex_inventory::{MovementKind, MovementOrigin, StockMovement};

use crate::store::InventoryStore;

/// Manual stock corrections and return flows. These are the only movements
/// without (adjustments) or with a back-reference (returns) to an originating
/// transaction, and they always carry a note explaining the change.
#[derive(Debug, Clone)]
pub struct AdjustmentService {
    store: Arc<InventoryStore>,
}

impl AdjustmentService {
    pub fn new(store: Arc<InventoryStore>) -> Self {
        Self { store }
    }

    /// Record a manual count correction. Positive `delta` is an
    /// `adjustment_in`, negative an `adjustment_out`; outbound corrections
    /// are stock-checked like any other outflow.
    pub fn record_adjustment(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        actor_id: ActorId,
        delta: i64,
        note: impl Into<String>,
    ) -> DomainResult<StockMovement> {
        let note = note.into();
        if note.trim().is_empty() {
            return Err(DomainError::validation("adjustment requires a note"));
        }
        let kind = match delta {
            0 => return Err(DomainError::validation("adjustment delta cannot be zero")),
            d if d > 0 => MovementKind::AdjustmentIn,
            _ => MovementKind::AdjustmentOut,
        };

        let movement = self.store.transact(|tx| {
            let product = tx.product(product_id)?;
            let warehouse = tx.warehouse(warehouse_id)?;
            let now = Utc::now();

            let (before, _) = tx.apply_delta(&product, &warehouse, delta, actor_id, now)?;
            tx.append_movement(StockMovement::record(
                kind,
                product.id,
                warehouse.id,
                actor_id,
                before,
                delta,
                None,
                Some(note.clone()),
                now,
            )?)
        })?;

        tracing::info!(
            movement_id = %movement.id,
            delta = movement.delta,
            "stock adjustment recorded"
        );
        Ok(movement)
    }

    /// Record a customer return against a committed sale. The product must
    /// appear on the sale and cumulative returns against the sale cannot
    /// exceed the quantity sold. Stock goes back into the sale's warehouse.
    pub fn record_customer_return(
        &self,
        sale_id: SaleId,
        product_id: ProductId,
        actor_id: ActorId,
        quantity: i64,
        note: impl Into<String>,
    ) -> DomainResult<StockMovement> {
        let note = note.into();
        if quantity <= 0 {
            return Err(DomainError::validation(
                "return quantity must be positive",
            ));
        }

        let movement = self.store.transact(|tx| {
            let sale = tx.sale(sale_id)?;
            let sold: i64 = sale
                .lines
                .iter()
                .filter(|l| l.product_id == product_id)
                .map(|l| l.quantity)
                .sum();
            if sold == 0 {
                return Err(DomainError::validation(
                    "product does not appear on the sale",
                ));
            }
            let already_returned = tx.units_moved(
                MovementKind::CustomerReturnIn,
                MovementOrigin::Sale(sale_id),
                product_id,
            );
            if already_returned + quantity > sold {
                return Err(DomainError::validation(format!(
                    "cannot return {quantity} units, sale covers {sold} with {already_returned} already returned"
                )));
            }

            let product = tx.product(product_id)?;
            let warehouse = tx.warehouse(sale.warehouse_id)?;
            let now = Utc::now();

            let (before, _) = tx.apply_delta(&product, &warehouse, quantity, actor_id, now)?;
            tx.append_movement(StockMovement::record(
                MovementKind::CustomerReturnIn,
                product.id,
                warehouse.id,
                actor_id,
                before,
                quantity,
                Some(MovementOrigin::Sale(sale_id)),
                Some(note.clone()),
                now,
            )?)
        })?;

        tracing::info!(
            movement_id = %movement.id,
            sale_id = %sale_id,
            "customer return recorded"
        );
        Ok(movement)
    }

    /// Record a return to supplier against a committed purchase. The product
    /// must appear on the purchase and cumulative returns cannot exceed the
    /// quantity purchased; the outflow is also stock-checked against the
    /// purchase's warehouse.
    pub fn record_supplier_return(
        &self,
        purchase_id: PurchaseId,
        product_id: ProductId,
        actor_id: ActorId,
        quantity: i64,
        note: impl Into<String>,
    ) -> DomainResult<StockMovement> {
        let note = note.into();
        if quantity <= 0 {
            return Err(DomainError::validation(
                "return quantity must be positive",
            ));
        }

        let movement = self.store.transact(|tx| {
            let purchase = tx.purchase(purchase_id)?;
            let bought: i64 = purchase
                .lines
                .iter()
                .filter(|l| l.product_id == product_id)
                .map(|l| l.quantity)
                .sum();
            if bought == 0 {
                return Err(DomainError::validation(
                    "product does not appear on the purchase",
                ));
            }
            let already_returned = tx.units_moved(
                MovementKind::SupplierReturnOut,
                MovementOrigin::Purchase(purchase_id),
                product_id,
            );
            if already_returned + quantity > bought {
                return Err(DomainError::validation(format!(
                    "cannot return {quantity} units, purchase covers {bought} with {already_returned} already returned"
                )));
            }

            let product = tx.product(product_id)?;
            let warehouse = tx.warehouse(purchase.warehouse_id)?;
            let now = Utc::now();

            let (before, _) = tx.apply_delta(&product, &warehouse, -quantity, actor_id, now)?;
            tx.append_movement(StockMovement::record(
                MovementKind::SupplierReturnOut,
                product.id,
                warehouse.id,
                actor_id,
                before,
                -quantity,
                Some(MovementOrigin::Purchase(purchase_id)),
                Some(note.clone()),
                now,
            )?)
        })?;

        tracing::info!(
            movement_id = %movement.id,
            purchase_id = %purchase_id,
            "supplier return recorded"
        );
        Ok(movement)
    }
}
