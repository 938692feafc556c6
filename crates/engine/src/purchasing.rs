use std::sync::Arc;

use chrono::Utc;

use kardex_core::{ActorId, DomainError, DomainResult, PartyId, PurchaseId, WarehouseId};
use kardex_inventory::{MovementKind, MovementOrigin, StockMovement};
use kardex_purchasing::{NewPurchaseLine, Purchase, PurchaseLine};

use crate::store::InventoryStore;

/// Orchestrates multi-line purchases into one warehouse.
#[derive(Debug, Clone)]
pub struct PurchaseService {
    store: Arc<InventoryStore>,
}

impl PurchaseService {
    pub fn new(store: Arc<InventoryStore>) -> Self {
        Self { store }
    }

    /// Commit a purchase: per line, locate or create the snapshot, increment
    /// it, overwrite the product's master cost with the captured unit cost
    /// (last-cost-wins), and append a `purchase_in` movement; then persist
    /// header, lines, and movements as one unit. Inbound lines never fail
    /// a sufficiency check.
    pub fn create_purchase(
        &self,
        supplier_id: PartyId,
        warehouse_id: WarehouseId,
        actor_id: ActorId,
        lines: Vec<NewPurchaseLine>,
        reference_doc: Option<String>,
    ) -> DomainResult<Purchase> {
        if lines.is_empty() {
            return Err(DomainError::validation(
                "purchase must have at least one line",
            ));
        }

        let purchase = self.store.transact(|tx| {
            let supplier = tx.party(supplier_id)?;
            if !supplier.is_supplier() {
                return Err(DomainError::validation(format!(
                    "party '{}' is not a supplier",
                    supplier.name
                )));
            }
            let warehouse = tx.warehouse(warehouse_id)?;
            let now = Utc::now();
            let purchase_id = PurchaseId::new();

            let mut purchase_lines = Vec::with_capacity(lines.len());
            let mut movement_ids = Vec::with_capacity(lines.len());

            for (idx, request) in lines.iter().enumerate() {
                let product = tx.product(request.product_id)?;

                let (before, _) =
                    tx.apply_delta(&product, &warehouse, request.quantity, actor_id, now)?;

                let line = PurchaseLine::new(
                    idx as u32 + 1,
                    product.id,
                    request.quantity,
                    request.unit_cost,
                )?;

                let movement = tx.append_movement(StockMovement::record(
                    MovementKind::PurchaseIn,
                    product.id,
                    warehouse.id,
                    actor_id,
                    before,
                    request.quantity,
                    Some(MovementOrigin::Purchase(purchase_id)),
                    None,
                    now,
                )?)?;

                tx.update_product_cost(product.id, request.unit_cost);

                purchase_lines.push(line);
                movement_ids.push(movement.id);
            }

            let purchase = Purchase::new(
                purchase_id,
                supplier.id,
                warehouse.id,
                actor_id,
                purchase_lines,
                movement_ids,
                reference_doc.clone(),
                now,
            )?;
            tx.insert_purchase(purchase.clone());
            Ok(purchase)
        })?;

        tracing::info!(
            purchase_id = %purchase.id,
            lines = purchase.lines.len(),
            total = purchase.total,
            "purchase committed"
        );
        Ok(purchase)
    }
}
