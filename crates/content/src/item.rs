//! Content item: one generated campaign/topic whose posts get scheduled.

use chrono::{DateTime, Utc};

use postpilot_core::{CompanyId, ContentItemId, DomainError, DomainResult, Entity, ProductId};

/// A batch of generated copy for a company, optionally tied to a product.
/// The posts themselves are separate `SocialPost` records keyed by this id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    id: ContentItemId,
    company_id: CompanyId,
    product_id: Option<ProductId>,
    title: String,
    brief: Option<String>,
    created_at: DateTime<Utc>,
}

impl ContentItem {
    pub fn new(
        id: ContentItemId,
        company_id: CompanyId,
        product_id: Option<ProductId>,
        title: impl Into<String>,
        brief: Option<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::validation("content item title cannot be empty"));
        }

        Ok(Self {
            id,
            company_id,
            product_id,
            title,
            brief,
            created_at,
        })
    }

    pub fn id_typed(&self) -> ContentItemId {
        self.id
    }

    pub fn company_id(&self) -> CompanyId {
        self.company_id
    }

    pub fn product_id(&self) -> Option<ProductId> {
        self.product_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn brief(&self) -> Option<&str> {
        self.brief.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for ContentItem {
    type Id = ContentItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
