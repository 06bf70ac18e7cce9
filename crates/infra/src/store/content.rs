//! Company / product / content-item storage (CRUD glue).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use postpilot_core::{CompanyId, ContentItemId, ProductId};
use postpilot_content::{Company, ContentItem, Product};

use super::StoreError;

/// Store for the entities the application manages around posts.
pub trait ContentStore: Send + Sync {
    fn insert_company(&self, company: Company) -> Result<CompanyId, StoreError>;
    fn get_company(&self, id: CompanyId) -> Result<Option<Company>, StoreError>;
    fn list_companies(&self) -> Result<Vec<Company>, StoreError>;

    fn insert_product(&self, product: Product) -> Result<ProductId, StoreError>;
    fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
    fn list_products(&self, company: CompanyId) -> Result<Vec<Product>, StoreError>;

    fn insert_item(&self, item: ContentItem) -> Result<ContentItemId, StoreError>;
    fn get_item(&self, id: ContentItemId) -> Result<Option<ContentItem>, StoreError>;
    fn list_items(&self, company: CompanyId) -> Result<Vec<ContentItem>, StoreError>;
}

/// In-memory content store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    companies: RwLock<HashMap<CompanyId, Company>>,
    products: RwLock<HashMap<ProductId, Product>>,
    items: RwLock<HashMap<ContentItemId, ContentItem>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl ContentStore for InMemoryContentStore {
    fn insert_company(&self, company: Company) -> Result<CompanyId, StoreError> {
        let mut companies = self.companies.write().unwrap();
        let id = company.id_typed();
        if companies.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }
        companies.insert(id, company);
        Ok(id)
    }

    fn get_company(&self, id: CompanyId) -> Result<Option<Company>, StoreError> {
        Ok(self.companies.read().unwrap().get(&id).cloned())
    }

    fn list_companies(&self) -> Result<Vec<Company>, StoreError> {
        let companies = self.companies.read().unwrap();
        let mut result: Vec<_> = companies.values().cloned().collect();
        result.sort_by_key(|c| (c.created_at(), c.id_typed()));
        Ok(result)
    }

    fn insert_product(&self, product: Product) -> Result<ProductId, StoreError> {
        if self.get_company(product.company_id())?.is_none() {
            return Err(StoreError::NotFound(product.company_id().to_string()));
        }

        let mut products = self.products.write().unwrap();
        let id = product.id_typed();
        if products.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }
        products.insert(id, product);
        Ok(id)
    }

    fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.products.read().unwrap().get(&id).cloned())
    }

    fn list_products(&self, company: CompanyId) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().unwrap();
        let mut result: Vec<_> = products
            .values()
            .filter(|p| p.company_id() == company)
            .cloned()
            .collect();
        result.sort_by_key(|p| (p.created_at(), p.id_typed()));
        Ok(result)
    }

    fn insert_item(&self, item: ContentItem) -> Result<ContentItemId, StoreError> {
        if self.get_company(item.company_id())?.is_none() {
            return Err(StoreError::NotFound(item.company_id().to_string()));
        }

        let mut items = self.items.write().unwrap();
        let id = item.id_typed();
        if items.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }
        items.insert(id, item);
        Ok(id)
    }

    fn get_item(&self, id: ContentItemId) -> Result<Option<ContentItem>, StoreError> {
        Ok(self.items.read().unwrap().get(&id).cloned())
    }

    fn list_items(&self, company: CompanyId) -> Result<Vec<ContentItem>, StoreError> {
        let items = self.items.read().unwrap();
        let mut result: Vec<_> = items
            .values()
            .filter(|i| i.company_id() == company)
            .cloned()
            .collect();
        result.sort_by_key(|i| (i.created_at(), i.id_typed()));
        Ok(result)
    }
}

impl<T: ContentStore + ?Sized> ContentStore for Arc<T> {
    fn insert_company(&self, company: Company) -> Result<CompanyId, StoreError> {
        (**self).insert_company(company)
    }

    fn get_company(&self, id: CompanyId) -> Result<Option<Company>, StoreError> {
        (**self).get_company(id)
    }

    fn list_companies(&self) -> Result<Vec<Company>, StoreError> {
        (**self).list_companies()
    }

    fn insert_product(&self, product: Product) -> Result<ProductId, StoreError> {
        (**self).insert_product(product)
    }

    fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get_product(id)
    }

    fn list_products(&self, company: CompanyId) -> Result<Vec<Product>, StoreError> {
        (**self).list_products(company)
    }

    fn insert_item(&self, item: ContentItem) -> Result<ContentItemId, StoreError> {
        (**self).insert_item(item)
    }

    fn get_item(&self, id: ContentItemId) -> Result<Option<ContentItem>, StoreError> {
        (**self).get_item(id)
    }

    fn list_items(&self, company: CompanyId) -> Result<Vec<ContentItem>, StoreError> {
        (**self).list_items(company)
    }
}
