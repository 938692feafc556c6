//! Purchasing domain module.
//!
//! Pure aggregate types for multi-line purchases into one warehouse; the
//! orchestration (snapshot upserts, ledger writes, master-cost updates)
//! lives in `kardex-engine`.

pub mod purchase;

pub use purchase::{NewPurchaseLine, Purchase, PurchaseLine, PurchaseStatus};
