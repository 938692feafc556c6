//! Reference data consumed by the transaction engine.
//!
//! Pure entities with validating constructors; persistence of the catalog is
//! a collaborator concern (the engine only needs lookup-by-identity and the
//! master-cost update performed inside purchase transactions).

pub mod party;
pub mod product;
pub mod warehouse;
pub mod workshop;

pub use party::{Party, PartyRole};
pub use product::Product;
pub use warehouse::Warehouse;
pub use workshop::Workshop;
