//! Transactional inventory engine.
//!
//! Ties the catalog, the snapshot store, and the append-only stock ledger
//! together behind services that commit each business transaction as one
//! atomic unit: sales, purchases, the production order lifecycle, and manual
//! adjustments and returns. Every stock change writes a snapshot update and a
//! matching ledger movement in the same unit of work, so the ledger always
//! replays to the snapshots.

pub mod adjustments;
pub mod production;
pub mod purchasing;
pub mod sales;
pub mod store;

pub use adjustments::AdjustmentService;
pub use production::ProductionService;
pub use purchasing::PurchaseService;
pub use sales::SaleService;
pub use store::{InventoryStore, StockTx};
