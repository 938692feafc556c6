//! Sales domain module.
//!
//! Pure aggregate types and totals math for multi-line sales against one
//! warehouse; the orchestration (stock checks, ledger writes) lives in
//! `kardex-engine`.

pub mod sale;

pub use sale::{
    NewSaleLine, Sale, SaleLine, SaleStatus, SaleTotals, TAX_RATE_PERCENT, compute_totals,
};
