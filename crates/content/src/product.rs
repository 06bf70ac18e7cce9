//! Product entity: something a company markets content about.

use chrono::{DateTime, Utc};

use postpilot_core::{CompanyId, DomainError, DomainResult, Entity, ProductId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    company_id: CompanyId,
    name: String,
    description: Option<String>,
    url: Option<String>,
    created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        id: ProductId,
        company_id: CompanyId,
        name: impl Into<String>,
        description: Option<String>,
        url: Option<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }

        Ok(Self {
            id,
            company_id,
            name,
            description,
            url,
            created_at,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn company_id(&self) -> CompanyId {
        self.company_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
