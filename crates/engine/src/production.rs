use std::sync::Arc;

use chrono::Utc;

use kardex_core::{ActorId, DomainResult, ProductionOrderId, WarehouseId, WorkshopId};
use kardex_inventory::{MovementKind, MovementOrigin, StockMovement};
use kardex_production::{OrderLine, ProductionOrder};

use crate::store::InventoryStore;

/// Orchestrates the production order lifecycle and the stock effects of its
/// transitions. Planning moves no stock; starting consumes inputs from the
/// input warehouse; finishing produces outputs into the output warehouse.
#[derive(Debug, Clone)]
pub struct ProductionService {
    store: Arc<InventoryStore>,
}

impl ProductionService {
    pub fn new(store: Arc<InventoryStore>) -> Self {
        Self { store }
    }

    /// Create an order in `Planned`. Validates that the workshop, both
    /// warehouses, and every line's product exist, and claims the order code.
    #[allow(clippy::too_many_arguments)]
    pub fn create_order(
        &self,
        code: &str,
        workshop_id: WorkshopId,
        input_warehouse_id: WarehouseId,
        output_warehouse_id: WarehouseId,
        actor_id: ActorId,
        lines: Vec<OrderLine>,
    ) -> DomainResult<ProductionOrder> {
        let order = self.store.transact(|tx| {
            tx.workshop(workshop_id)?;
            tx.warehouse(input_warehouse_id)?;
            tx.warehouse(output_warehouse_id)?;
            for line in &lines {
                tx.product(line.product_id())?;
            }

            let order_id = ProductionOrderId::new();
            tx.reserve_order_code(code, order_id)?;

            let order = ProductionOrder::plan(
                order_id,
                code,
                workshop_id,
                input_warehouse_id,
                output_warehouse_id,
                actor_id,
                lines.clone(),
                Utc::now(),
            )?;
            tx.upsert_order(order.clone());
            Ok(order)
        })?;

        tracing::info!(order_id = %order.id(), code = order.code(), "production order planned");
        Ok(order)
    }

    /// `Planned → InProduction`: consume every input line from the input
    /// warehouse and append one `production_consumption_out` movement each.
    /// A shortfall on any input aborts the transition entirely.
    pub fn start_order(
        &self,
        order_id: ProductionOrderId,
        actor_id: ActorId,
    ) -> DomainResult<ProductionOrder> {
        let order = self.store.transact(|tx| {
            let mut order = tx.production_order(order_id)?;
            let now = Utc::now();
            order.start(now)?;

            let warehouse = tx.warehouse(order.input_warehouse_id())?;
            let inputs: Vec<_> = order.inputs().collect();
            let mut movement_ids = Vec::with_capacity(inputs.len());

            for (product_id, quantity) in inputs {
                let product = tx.product(product_id)?;
                let (before, _) = tx.apply_delta(&product, &warehouse, -quantity, actor_id, now)?;
                let movement = tx.append_movement(StockMovement::record(
                    MovementKind::ProductionConsumptionOut,
                    product.id,
                    warehouse.id,
                    actor_id,
                    before,
                    -quantity,
                    Some(MovementOrigin::Production(order_id)),
                    None,
                    now,
                )?)?;
                movement_ids.push(movement.id);
            }

            order.record_movements(movement_ids);
            tx.upsert_order(order.clone());
            Ok(order)
        })?;

        tracing::info!(order_id = %order.id(), code = order.code(), "production order started");
        Ok(order)
    }

    /// `InProduction → Completed`: produce every output line into the output
    /// warehouse and append one `production_output_in` movement each.
    pub fn finish_order(
        &self,
        order_id: ProductionOrderId,
        actor_id: ActorId,
    ) -> DomainResult<ProductionOrder> {
        let order = self.store.transact(|tx| {
            let mut order = tx.production_order(order_id)?;
            let now = Utc::now();
            order.finish(now)?;

            let warehouse = tx.warehouse(order.output_warehouse_id())?;
            let outputs: Vec<_> = order.outputs().collect();
            let mut movement_ids = Vec::with_capacity(outputs.len());

            for (product_id, quantity) in outputs {
                let product = tx.product(product_id)?;
                let (before, _) = tx.apply_delta(&product, &warehouse, quantity, actor_id, now)?;
                let movement = tx.append_movement(StockMovement::record(
                    MovementKind::ProductionOutputIn,
                    product.id,
                    warehouse.id,
                    actor_id,
                    before,
                    quantity,
                    Some(MovementOrigin::Production(order_id)),
                    None,
                    now,
                )?)?;
                movement_ids.push(movement.id);
            }

            order.record_movements(movement_ids);
            tx.upsert_order(order.clone());
            Ok(order)
        })?;

        tracing::info!(order_id = %order.id(), code = order.code(), "production order completed");
        Ok(order)
    }

    /// `Planned → Cancelled`. Moves no stock; orders that already consumed
    /// inputs cannot be cancelled.
    pub fn cancel_order(&self, order_id: ProductionOrderId) -> DomainResult<ProductionOrder> {
        let order = self.store.transact(|tx| {
            let mut order = tx.production_order(order_id)?;
            order.cancel(Utc::now())?;
            tx.upsert_order(order.clone());
            Ok(order)
        })?;

        tracing::info!(order_id = %order.id(), code = order.code(), "production order cancelled");
        Ok(order)
    }
}
