//! Company entity: the account that owns products, content and schedules.

use chrono::{DateTime, Utc};

use postpilot_core::{CompanyId, DomainError, DomainResult, Entity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    id: CompanyId,
    name: String,
    website: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl Company {
    pub fn new(
        id: CompanyId,
        name: impl Into<String>,
        website: Option<String>,
        description: Option<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("company name cannot be empty"));
        }

        Ok(Self {
            id,
            name,
            website,
            description,
            created_at,
        })
    }

    pub fn id_typed(&self) -> CompanyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Company {
    type Id = CompanyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
