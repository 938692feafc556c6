use std::sync::Arc;

use chrono::Utc;

use kardex_core::{ActorId, DomainError, DomainResult, PartyId, SaleId, WarehouseId};
use kardex_inventory::{MovementKind, MovementOrigin, StockMovement};
use kardex_sales::{NewSaleLine, Sale, SaleLine};

use crate::store::InventoryStore;

/// Orchestrates multi-line sales against one warehouse.
#[derive(Debug, Clone)]
pub struct SaleService {
    store: Arc<InventoryStore>,
}

impl SaleService {
    pub fn new(store: Arc<InventoryStore>) -> Self {
        Self { store }
    }

    /// Commit a sale: per line, check stock, decrement the snapshot, lock in
    /// the product's current sale price, and append a `sale_out` movement;
    /// then persist header, lines, and movements as one unit.
    ///
    /// Any failing line aborts the whole sale; no partial decrement survives.
    pub fn create_sale(
        &self,
        client_id: PartyId,
        warehouse_id: WarehouseId,
        actor_id: ActorId,
        lines: Vec<NewSaleLine>,
    ) -> DomainResult<Sale> {
        if lines.is_empty() {
            return Err(DomainError::validation("sale must have at least one line"));
        }

        let sale = self.store.transact(|tx| {
            let client = tx.party(client_id)?;
            if !client.is_client() {
                return Err(DomainError::validation(format!(
                    "party '{}' is not a client",
                    client.name
                )));
            }
            let warehouse = tx.warehouse(warehouse_id)?;
            let now = Utc::now();
            let sale_id = SaleId::new();

            let mut sale_lines = Vec::with_capacity(lines.len());
            let mut movement_ids = Vec::with_capacity(lines.len());

            for (idx, request) in lines.iter().enumerate() {
                let product = tx.product(request.product_id)?;

                let available = tx.quantity(product.id, warehouse.id);
                if available < request.quantity {
                    return Err(DomainError::InsufficientStock {
                        product: product.name.clone(),
                        warehouse: warehouse.name.clone(),
                        available,
                        requested: request.quantity,
                    });
                }

                let (before, _) =
                    tx.apply_delta(&product, &warehouse, -request.quantity, actor_id, now)?;

                let line = SaleLine::new(
                    idx as u32 + 1,
                    product.id,
                    request.quantity,
                    product.sale_price,
                )?;

                let movement = tx.append_movement(StockMovement::record(
                    MovementKind::SaleOut,
                    product.id,
                    warehouse.id,
                    actor_id,
                    before,
                    -request.quantity,
                    Some(MovementOrigin::Sale(sale_id)),
                    None,
                    now,
                )?)?;

                sale_lines.push(line);
                movement_ids.push(movement.id);
            }

            let sale = Sale::new(
                sale_id,
                client.id,
                warehouse.id,
                actor_id,
                sale_lines,
                movement_ids,
                now,
            )?;
            tx.insert_sale(sale.clone());
            Ok(sale)
        })?;

        tracing::info!(
            sale_id = %sale.id,
            lines = sale.lines.len(),
            total = sale.total,
            "sale committed"
        );
        Ok(sale)
    }
}
