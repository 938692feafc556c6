//! `kardex-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod money;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    ActorId, MovementId, PartyId, ProductId, ProductionOrderId, PurchaseId, SaleId, SnapshotId,
    WarehouseId, WorkshopId,
};
pub use money::Cents;
