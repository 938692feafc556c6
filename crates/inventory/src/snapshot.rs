use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kardex_core::{ActorId, ProductId, SnapshotId, WarehouseId};

/// Current quantity-on-hand for one (product, warehouse) pair.
///
/// Unique per pair; created lazily on the first inbound movement and never
/// deleted (it may sit at zero). `quantity` always equals the running sum of
/// all ledger deltas for the pair, because the two are written together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub id: SnapshotId,
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    /// Non-negative by invariant; mutations go through the owning
    /// transaction's `apply_delta`.
    pub quantity: i64,
    /// Optimistic concurrency token, bumped on every mutation.
    pub version: u64,
    pub updated_by: Option<ActorId>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StockSnapshot {
    /// Fresh zero-quantity row for a pair with no stock history.
    pub fn empty(product_id: ProductId, warehouse_id: WarehouseId) -> Self {
        Self {
            id: SnapshotId::new(),
            product_id,
            warehouse_id,
            quantity: 0,
            version: 0,
            updated_by: None,
            updated_at: None,
        }
    }
}
