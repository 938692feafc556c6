//! Stock data model: ledger movements, snapshots, and the Kardex report.
//!
//! Pure domain types; the transactional store that writes them lives in
//! `kardex-engine`.

pub mod kardex;
pub mod movement;
pub mod snapshot;

pub use kardex::KardexReport;
pub use movement::{Direction, MovementKind, MovementOrigin, StockMovement};
pub use snapshot::StockSnapshot;
