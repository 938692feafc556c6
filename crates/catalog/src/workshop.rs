use serde::{Deserialize, Serialize};

use kardex_core::{DomainError, DomainResult, Entity, WorkshopId};

/// Production workshop reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workshop {
    pub id: WorkshopId,
    pub name: String,
}

impl Workshop {
    pub fn new(id: WorkshopId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("workshop name cannot be empty"));
        }
        Ok(Self { id, name })
    }
}

impl Entity for Workshop {
    type Id = WorkshopId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
