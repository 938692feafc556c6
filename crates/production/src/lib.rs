//! Production domain module.
//!
//! The production order state machine: inputs consumed from one warehouse on
//! start, outputs produced into another on finish. Stock effects are
//! orchestrated by `kardex-engine`; this crate guards the lifecycle.

pub mod order;

pub use order::{OrderLine, ProductionOrder, ProductionOrderStatus};
