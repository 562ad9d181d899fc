use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::ProductResult;
use crate::models::ProductRecord;
use crate::pagination::Window;
use crate::query::ProductQuery;

/// Read access to the product store
///
/// Implementations must apply the plan's filters, its ordering and the `id`
/// ascending tiebreak, in that order, before slicing by the window.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Get a product and its images by ID
    async fn get_by_id(&self, id: i64) -> ProductResult<Option<ProductRecord>>;

    /// Count products matching the plan
    async fn count(&self, query: &ProductQuery) -> ProductResult<u64>;

    /// Fetch matching products in plan order; `None` fetches all of them
    async fn fetch(
        &self,
        query: &ProductQuery,
        window: Option<Window>,
    ) -> ProductResult<Vec<ProductRecord>>;
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<i64, ProductRecord>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            products: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn with_records(records: impl IntoIterator<Item = ProductRecord>) -> Self {
        let map = records.into_iter().map(|r| (r.id(), r)).collect();
        Self {
            products: Arc::new(RwLock::new(map)),
        }
    }

    /// Insert or replace a product
    pub async fn insert(&self, record: ProductRecord) {
        let mut products = self.products.write().await;
        products.insert(record.id(), record);
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn get_by_id(&self, id: i64) -> ProductResult<Option<ProductRecord>> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn count(&self, query: &ProductQuery) -> ProductResult<u64> {
        let products = self.products.read().await;
        let count = products
            .values()
            .filter(|r| query.matches(&r.product))
            .count();
        Ok(count as u64)
    }

    async fn fetch(
        &self,
        query: &ProductQuery,
        window: Option<Window>,
    ) -> ProductResult<Vec<ProductRecord>> {
        let products = self.products.read().await;

        let mut result: Vec<&ProductRecord> = products
            .values()
            .filter(|r| query.matches(&r.product))
            .collect();
        result.sort_by(|a, b| query.compare(&a.product, &b.product));

        let (offset, limit) = match window {
            Some(w) => (w.offset as usize, w.limit as usize),
            None => (0, usize::MAX),
        };

        Ok(result
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
