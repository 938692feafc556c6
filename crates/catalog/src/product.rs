use serde::{Deserialize, Serialize};

use kardex_core::{Cents, DomainError, DomainResult, Entity, ProductId};

/// Product reference data.
///
/// `sale_price` is the current list price captured into sale lines at
/// transaction time; `cost` is the master cost, overwritten by each purchase
/// (last-cost-wins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    /// Current sale price in the smallest currency unit (e.g., cents).
    pub sale_price: Cents,
    /// Master unit cost in the smallest currency unit.
    pub cost: Cents,
}

impl Product {
    pub fn new(
        id: ProductId,
        sku: impl Into<String>,
        name: impl Into<String>,
        sale_price: Cents,
        cost: Cents,
    ) -> DomainResult<Self> {
        let sku = sku.into();
        let name = name.into();
        if sku.trim().is_empty() {
            return Err(DomainError::validation("product sku cannot be empty"));
        }
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        Ok(Self {
            id,
            sku,
            name,
            sale_price,
            cost,
        })
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
