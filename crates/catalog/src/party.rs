use serde::{Deserialize, Serialize};

use kardex_core::{DomainError, DomainResult, Entity, PartyId};

/// Role a party plays towards the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyRole {
    Client,
    Supplier,
}

/// Party reference data (client or supplier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    pub name: String,
    pub role: PartyRole,
    pub tax_id: Option<String>,
}

impl Party {
    pub fn new(
        id: PartyId,
        name: impl Into<String>,
        role: PartyRole,
        tax_id: Option<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("party name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            role,
            tax_id,
        })
    }

    pub fn is_client(&self) -> bool {
        self.role == PartyRole::Client
    }

    pub fn is_supplier(&self) -> bool {
        self.role == PartyRole::Supplier
    }
}

impl Entity for Party {
    type Id = PartyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_predicates() {
        let client = Party::new(PartyId::new(), "Acme", PartyRole::Client, None).unwrap();
        assert!(client.is_client());
        assert!(!client.is_supplier());
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(Party::new(PartyId::new(), "  ", PartyRole::Supplier, None).is_err());
    }
}
