use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use kardex_catalog::{Party, Product, Warehouse, Workshop};
use kardex_core::{
    ActorId, Cents, DomainError, DomainResult, MovementId, PartyId, ProductId, ProductionOrderId,
    PurchaseId, SaleId, WarehouseId, WorkshopId,
};
use kardex_inventory::{KardexReport, MovementKind, MovementOrigin, StockMovement, StockSnapshot};
use kardex_production::ProductionOrder;
use kardex_purchasing::Purchase;
use kardex_sales::Sale;

type SnapshotKey = (ProductId, WarehouseId);

#[derive(Debug, Default)]
struct EngineState {
    products: HashMap<ProductId, Product>,
    warehouses: HashMap<WarehouseId, Warehouse>,
    parties: HashMap<PartyId, Party>,
    workshops: HashMap<WorkshopId, Workshop>,

    /// One row per (product, warehouse) pair; rows are never deleted.
    snapshots: HashMap<SnapshotKey, StockSnapshot>,
    /// Append-only. The store exposes no update or delete for these rows.
    ledger: Vec<StockMovement>,
    last_sequence: u64,

    sales: HashMap<SaleId, Sale>,
    purchases: HashMap<PurchaseId, Purchase>,
    orders: HashMap<ProductionOrderId, ProductionOrder>,
    order_codes: HashMap<String, ProductionOrderId>,
}

/// In-memory transactional store: current snapshots, the append-only stock
/// ledger, committed transaction aggregates, and the registered reference
/// catalog, all behind one lock.
///
/// Mutations go through [`InventoryStore::transact`]: the closure works
/// against a staged [`StockTx`] view and nothing becomes visible unless the
/// whole unit of work succeeds. Intended for tests/dev and as the reference
/// semantics for SQL-backed stores.
#[derive(Debug, Default)]
pub struct InventoryStore {
    state: RwLock<EngineState>,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DomainResult<std::sync::RwLockReadGuard<'_, EngineState>> {
        self.state
            .read()
            .map_err(|_| DomainError::conflict("state lock poisoned"))
    }

    // ---- reference catalog ----------------------------------------------

    pub fn register_product(&self, product: Product) -> DomainResult<()> {
        let mut state = self.write()?;
        state.products.insert(product.id, product);
        Ok(())
    }

    pub fn register_warehouse(&self, warehouse: Warehouse) -> DomainResult<()> {
        let mut state = self.write()?;
        state.warehouses.insert(warehouse.id, warehouse);
        Ok(())
    }

    pub fn register_party(&self, party: Party) -> DomainResult<()> {
        let mut state = self.write()?;
        state.parties.insert(party.id, party);
        Ok(())
    }

    pub fn register_workshop(&self, workshop: Workshop) -> DomainResult<()> {
        let mut state = self.write()?;
        state.workshops.insert(workshop.id, workshop);
        Ok(())
    }

    pub fn product(&self, id: ProductId) -> DomainResult<Product> {
        self.read()?
            .products
            .get(&id)
            .cloned()
            .ok_or(DomainError::not_found("product"))
    }

    pub fn warehouse(&self, id: WarehouseId) -> DomainResult<Warehouse> {
        self.read()?
            .warehouses
            .get(&id)
            .cloned()
            .ok_or(DomainError::not_found("warehouse"))
    }

    pub fn party(&self, id: PartyId) -> DomainResult<Party> {
        self.read()?
            .parties
            .get(&id)
            .cloned()
            .ok_or(DomainError::not_found("party"))
    }

    pub fn workshop(&self, id: WorkshopId) -> DomainResult<Workshop> {
        self.read()?
            .workshops
            .get(&id)
            .cloned()
            .ok_or(DomainError::not_found("workshop"))
    }

    // ---- snapshot reads --------------------------------------------------

    /// Current quantity-on-hand; 0 when the pair has no snapshot row.
    pub fn quantity_on_hand(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> DomainResult<i64> {
        let state = self.read()?;
        Ok(state
            .snapshots
            .get(&(product_id, warehouse_id))
            .map(|s| s.quantity)
            .unwrap_or(0))
    }

    /// Per-warehouse stock breakdown for one product, ordered by warehouse id.
    pub fn stock_by_product(
        &self,
        product_id: ProductId,
    ) -> DomainResult<Vec<(WarehouseId, i64)>> {
        let state = self.read()?;
        let mut rows: Vec<(WarehouseId, i64)> = state
            .snapshots
            .values()
            .filter(|s| s.product_id == product_id)
            .map(|s| (s.warehouse_id, s.quantity))
            .collect();
        rows.sort_by_key(|(warehouse_id, _)| *warehouse_id);
        Ok(rows)
    }

    /// Full snapshot row, if the pair has history.
    pub fn snapshot(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> DomainResult<Option<StockSnapshot>> {
        let state = self.read()?;
        Ok(state.snapshots.get(&(product_id, warehouse_id)).cloned())
    }

    // ---- ledger reads ----------------------------------------------------

    /// Movements for one product with `from <= occurred_at <= to`, ordered by
    /// `(occurred_at, sequence)` ascending.
    pub fn movements_in_range(
        &self,
        product_id: ProductId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<StockMovement>> {
        let state = self.read()?;
        let mut rows: Vec<StockMovement> = state
            .ledger
            .iter()
            .filter(|m| m.product_id == product_id && m.occurred_at >= from && m.occurred_at <= to)
            .cloned()
            .collect();
        rows.sort_by_key(|m| (m.occurred_at, m.sequence));
        Ok(rows)
    }

    /// Most recent movement strictly before `at`, used to seed an opening
    /// balance for a reporting period.
    pub fn last_movement_before(
        &self,
        product_id: ProductId,
        at: DateTime<Utc>,
    ) -> DomainResult<Option<StockMovement>> {
        let state = self.read()?;
        Ok(state
            .ledger
            .iter()
            .filter(|m| m.product_id == product_id && m.occurred_at < at)
            .max_by_key(|m| (m.occurred_at, m.sequence))
            .cloned())
    }

    /// Assemble the Kardex report for a product over `[from, to]`.
    pub fn kardex(
        &self,
        product_id: ProductId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<KardexReport> {
        let opening = self.last_movement_before(product_id, from)?;
        let entries = self.movements_in_range(product_id, from, to)?;
        Ok(KardexReport::build(
            product_id,
            from,
            to,
            opening.as_ref(),
            entries,
        ))
    }

    pub fn movement(&self, id: MovementId) -> DomainResult<StockMovement> {
        self.read()?
            .ledger
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(DomainError::not_found("movement"))
    }

    // ---- committed aggregates -------------------------------------------

    pub fn sale(&self, id: SaleId) -> DomainResult<Sale> {
        self.read()?
            .sales
            .get(&id)
            .cloned()
            .ok_or(DomainError::not_found("sale"))
    }

    pub fn purchase(&self, id: PurchaseId) -> DomainResult<Purchase> {
        self.read()?
            .purchases
            .get(&id)
            .cloned()
            .ok_or(DomainError::not_found("purchase"))
    }

    pub fn production_order(&self, id: ProductionOrderId) -> DomainResult<ProductionOrder> {
        self.read()?
            .orders
            .get(&id)
            .cloned()
            .ok_or(DomainError::not_found("production order"))
    }

    // ---- unit of work ----------------------------------------------------

    /// Run `f` as one atomic unit of work.
    ///
    /// The closure reads through and writes into a staged [`StockTx`] view.
    /// On `Ok` every touched snapshot row's version is re-checked against the
    /// version observed at first read (`Conflict` on mismatch) and all staged
    /// writes are applied together; on `Err` everything staged is discarded.
    pub fn transact<T, F>(&self, f: F) -> DomainResult<T>
    where
        F: FnOnce(&mut StockTx<'_>) -> DomainResult<T>,
    {
        let mut state = self
            .state
            .write()
            .map_err(|_| DomainError::conflict("state lock poisoned"))?;

        let (out, writes) = {
            let mut tx = StockTx::new(&state);
            let out = f(&mut tx)?;
            (out, tx.into_writes())
        };

        Self::apply_writes(&mut state, writes)?;
        Ok(out)
    }

    fn write(&self) -> DomainResult<std::sync::RwLockWriteGuard<'_, EngineState>> {
        self.state
            .write()
            .map_err(|_| DomainError::conflict("state lock poisoned"))
    }

    fn apply_writes(state: &mut EngineState, writes: TxWrites) -> DomainResult<()> {
        for (key, seen) in &writes.read_versions {
            let current = state.snapshots.get(key).map(|s| s.version).unwrap_or(0);
            if current != *seen {
                return Err(DomainError::conflict(format!(
                    "stock snapshot for product {} in warehouse {} changed (version {} -> {})",
                    key.0, key.1, seen, current
                )));
            }
        }

        for (key, snapshot) in writes.snapshots {
            state.snapshots.insert(key, snapshot);
        }
        for movement in writes.movements {
            state.last_sequence = movement.sequence;
            state.ledger.push(movement);
        }
        for (product_id, cost) in writes.cost_updates {
            if let Some(product) = state.products.get_mut(&product_id) {
                product.cost = cost;
            }
        }
        for sale in writes.sales {
            state.sales.insert(sale.id, sale);
        }
        for purchase in writes.purchases {
            state.purchases.insert(purchase.id, purchase);
        }
        for (code, order_id) in writes.order_codes {
            state.order_codes.insert(code, order_id);
        }
        for order in writes.orders {
            state.orders.insert(order.id(), order);
        }
        Ok(())
    }
}

/// Staged writes collected by a [`StockTx`], applied atomically on commit.
#[derive(Debug, Default)]
struct TxWrites {
    snapshots: HashMap<SnapshotKey, StockSnapshot>,
    read_versions: HashMap<SnapshotKey, u64>,
    movements: Vec<StockMovement>,
    sales: Vec<Sale>,
    purchases: Vec<Purchase>,
    orders: Vec<ProductionOrder>,
    order_codes: Vec<(String, ProductionOrderId)>,
    cost_updates: HashMap<ProductId, Cents>,
}

/// Transaction-consistent view over the store.
///
/// Reads see the base state plus this transaction's own staged writes, so a
/// sufficiency check and the `apply_delta` it guards cannot disagree.
#[derive(Debug)]
pub struct StockTx<'a> {
    base: &'a EngineState,
    writes: TxWrites,
    next_sequence: u64,
}

impl<'a> StockTx<'a> {
    fn new(base: &'a EngineState) -> Self {
        Self {
            base,
            writes: TxWrites::default(),
            next_sequence: base.last_sequence + 1,
        }
    }

    fn into_writes(self) -> TxWrites {
        self.writes
    }

    // ---- reference lookups ----------------------------------------------

    pub fn product(&self, id: ProductId) -> DomainResult<Product> {
        let mut product = self
            .base
            .products
            .get(&id)
            .cloned()
            .ok_or(DomainError::not_found("product"))?;
        if let Some(cost) = self.writes.cost_updates.get(&id) {
            product.cost = *cost;
        }
        Ok(product)
    }

    pub fn warehouse(&self, id: WarehouseId) -> DomainResult<Warehouse> {
        self.base
            .warehouses
            .get(&id)
            .cloned()
            .ok_or(DomainError::not_found("warehouse"))
    }

    pub fn party(&self, id: PartyId) -> DomainResult<Party> {
        self.base
            .parties
            .get(&id)
            .cloned()
            .ok_or(DomainError::not_found("party"))
    }

    pub fn workshop(&self, id: WorkshopId) -> DomainResult<Workshop> {
        self.base
            .workshops
            .get(&id)
            .cloned()
            .ok_or(DomainError::not_found("workshop"))
    }

    pub fn sale(&self, id: SaleId) -> DomainResult<Sale> {
        if let Some(sale) = self.writes.sales.iter().find(|s| s.id == id) {
            return Ok(sale.clone());
        }
        self.base
            .sales
            .get(&id)
            .cloned()
            .ok_or(DomainError::not_found("sale"))
    }

    pub fn purchase(&self, id: PurchaseId) -> DomainResult<Purchase> {
        if let Some(purchase) = self.writes.purchases.iter().find(|p| p.id == id) {
            return Ok(purchase.clone());
        }
        self.base
            .purchases
            .get(&id)
            .cloned()
            .ok_or(DomainError::not_found("purchase"))
    }

    pub fn production_order(&self, id: ProductionOrderId) -> DomainResult<ProductionOrder> {
        if let Some(order) = self.writes.orders.iter().find(|o| o.id() == id) {
            return Ok(order.clone());
        }
        self.base
            .orders
            .get(&id)
            .cloned()
            .ok_or(DomainError::not_found("production order"))
    }

    // ---- snapshots -------------------------------------------------------

    /// Transaction-consistent quantity-on-hand; 0 when the pair has no row.
    pub fn quantity(&self, product_id: ProductId, warehouse_id: WarehouseId) -> i64 {
        let key = (product_id, warehouse_id);
        if let Some(staged) = self.writes.snapshots.get(&key) {
            return staged.quantity;
        }
        self.base
            .snapshots
            .get(&key)
            .map(|s| s.quantity)
            .unwrap_or(0)
    }

    /// The sole snapshot mutation entry point.
    ///
    /// Lazily creates the row for a positive delta; fails `SnapshotNotFound`
    /// for a negative delta against a missing row and `InsufficientStock`
    /// when the balance would go negative. Returns `(before, after)`.
    pub fn apply_delta(
        &mut self,
        product: &Product,
        warehouse: &Warehouse,
        delta: i64,
        actor_id: ActorId,
        at: DateTime<Utc>,
    ) -> DomainResult<(i64, i64)> {
        if delta == 0 {
            return Err(DomainError::validation("delta cannot be zero"));
        }

        let key = (product.id, warehouse.id);
        let mut snapshot = match self.writes.snapshots.get(&key) {
            Some(staged) => staged.clone(),
            None => match self.base.snapshots.get(&key) {
                Some(row) => {
                    self.writes.read_versions.insert(key, row.version);
                    row.clone()
                }
                None if delta < 0 => {
                    return Err(DomainError::SnapshotNotFound {
                        product_id: product.id,
                        warehouse_id: warehouse.id,
                    });
                }
                None => {
                    self.writes.read_versions.insert(key, 0);
                    StockSnapshot::empty(product.id, warehouse.id)
                }
            },
        };

        let before = snapshot.quantity;
        let after = before
            .checked_add(delta)
            .ok_or_else(|| DomainError::validation("stock quantity overflows"))?;
        if after < 0 {
            return Err(DomainError::InsufficientStock {
                product: product.name.clone(),
                warehouse: warehouse.name.clone(),
                available: before,
                requested: -delta,
            });
        }

        snapshot.quantity = after;
        snapshot.version += 1;
        snapshot.updated_by = Some(actor_id);
        snapshot.updated_at = Some(at);
        self.writes.snapshots.insert(key, snapshot);

        Ok((before, after))
    }

    // ---- ledger ----------------------------------------------------------

    /// Total units already moved by `kind` movements linked to `origin` for
    /// the product, across committed and staged ledger rows. Used to cap
    /// cumulative returns against their originating transaction.
    pub fn units_moved(
        &self,
        kind: MovementKind,
        origin: MovementOrigin,
        product_id: ProductId,
    ) -> i64 {
        self.base
            .ledger
            .iter()
            .chain(self.writes.movements.iter())
            .filter(|m| {
                m.kind == kind && m.origin == Some(origin) && m.product_id == product_id
            })
            .map(|m| m.delta.abs())
            .sum()
    }

    /// Stage a ledger row. Insert-only: assigns the next global sequence and
    /// re-validates the movement invariants.
    pub fn append_movement(&mut self, mut movement: StockMovement) -> DomainResult<StockMovement> {
        movement.validate()?;
        movement.sequence = self.next_sequence;
        self.next_sequence += 1;
        self.writes.movements.push(movement.clone());
        Ok(movement)
    }

    // ---- aggregates ------------------------------------------------------

    pub fn insert_sale(&mut self, sale: Sale) {
        self.writes.sales.push(sale);
    }

    pub fn insert_purchase(&mut self, purchase: Purchase) {
        self.writes.purchases.push(purchase);
    }

    /// Insert or replace a production order (creation and transitions).
    pub fn upsert_order(&mut self, order: ProductionOrder) {
        self.writes.orders.retain(|o| o.id() != order.id());
        self.writes.orders.push(order);
    }

    /// Claim a production order code, failing `DuplicateCode` on collision
    /// with committed or staged orders.
    pub fn reserve_order_code(
        &mut self,
        code: &str,
        order_id: ProductionOrderId,
    ) -> DomainResult<()> {
        if self.base.order_codes.contains_key(code)
            || self.writes.order_codes.iter().any(|(c, _)| c == code)
        {
            return Err(DomainError::duplicate_code(code));
        }
        self.writes
            .order_codes
            .push((code.to_string(), order_id));
        Ok(())
    }

    /// Overwrite the product's master cost (last-cost-wins).
    pub fn update_product_cost(&mut self, product_id: ProductId, cost: Cents) {
        self.writes.cost_updates.insert(product_id, cost);
    }
}
