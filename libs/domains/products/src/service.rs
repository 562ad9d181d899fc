//! Product Service - catalog read operations

use std::sync::Arc;
use tracing::instrument;

use crate::error::{ProductError, ProductResult};
use crate::models::{CatalogSettings, ProductRecord};
use crate::pagination::{PageRequest, PageSlice, Window, check_page, num_pages};
use crate::presenter::Presenter;
use crate::query::ProductQuery;
use crate::repository::ProductRepository;

/// Product service running query plans against a repository
///
/// Every operation is read-only; the service holds no per-request state.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    settings: CatalogSettings,
    presenter: Presenter,
}

impl<R: ProductRepository> ProductService<R> {
    /// Create a new ProductService with the given repository
    pub fn new(repository: R, settings: CatalogSettings) -> Self {
        let presenter = Presenter::new(&settings);
        Self {
            repository: Arc::new(repository),
            settings,
            presenter,
        }
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    /// All featured products, best rated first
    #[instrument(skip(self))]
    pub async fn featured(&self) -> ProductResult<Vec<ProductRecord>> {
        self.repository
            .fetch(&ProductQuery::featured_catalog(), None)
            .await
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i64) -> ProductResult<ProductRecord> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// One page of a filtered listing
    #[instrument(skip(self, query), fields(page = ?request.page))]
    pub async fn list(
        &self,
        query: &ProductQuery,
        request: PageRequest,
    ) -> ProductResult<PageSlice> {
        self.paginate(query, request).await
    }

    /// One page of a text search
    #[instrument(skip(self, query), fields(page = ?request.page))]
    pub async fn search(
        &self,
        query: &ProductQuery,
        request: PageRequest,
    ) -> ProductResult<PageSlice> {
        self.paginate(query, request).await
    }

    async fn paginate(&self, query: &ProductQuery, request: PageRequest) -> ProductResult<PageSlice> {
        let page_size = request.page_size(&self.settings);

        let count = self.repository.count(query).await?;
        let page = request.page().resolve(num_pages(count, page_size));
        let num_pages = check_page(page, count, page_size)?;

        let records = if count == 0 {
            Vec::new()
        } else {
            self.repository
                .fetch(query, Some(Window::for_page(page, page_size)))
                .await?
        };

        tracing::debug!(count, page, num_pages, returned = records.len(), "Paginated products");

        Ok(PageSlice {
            count,
            page,
            page_size,
            num_pages,
            records,
        })
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            settings: self.settings.clone(),
            presenter: self.presenter.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::product;
    use crate::pagination::PageNumber;
    use crate::repository::MockProductRepository;
    use sea_orm::DbErr;

    fn records(ids: &[i64]) -> Vec<ProductRecord> {
        ids.iter()
            .map(|id| ProductRecord::new(product(*id), vec![]))
            .collect()
    }

    #[tokio::test]
    async fn test_featured_fetches_without_window() {
        let mut mock_repo = MockProductRepository::new();

        mock_repo
            .expect_fetch()
            .withf(|query, window| {
                query.featured_filter() == Some(true) && window.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(records(&[3, 1])));

        let service = ProductService::new(mock_repo, CatalogSettings::default());
        let featured = service.featured().await.unwrap();
        assert_eq!(featured.len(), 2);
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let mut mock_repo = MockProductRepository::new();

        mock_repo
            .expect_get_by_id()
            .with(mockall::predicate::eq(42))
            .returning(|_| Ok(None));

        let service = ProductService::new(mock_repo, CatalogSettings::default());
        let err = service.get_product(42).await.unwrap_err();
        assert!(matches!(err, ProductError::NotFound(42)));
    }

    #[tokio::test]
    async fn test_second_page_requests_offset_window() {
        let mut mock_repo = MockProductRepository::new();

        mock_repo.expect_count().returning(|_| Ok(7));
        mock_repo
            .expect_fetch()
            .withf(|_, window| *window == Some(Window { offset: 3, limit: 3 }))
            .times(1)
            .returning(|_, _| Ok(records(&[4, 5, 6])));

        let service = ProductService::new(mock_repo, CatalogSettings::default());
        let slice = service
            .list(
                &ProductQuery::new(),
                PageRequest {
                    page: Some(PageNumber::Number(2)),
                    page_size: Some(3),
                },
            )
            .await
            .unwrap();

        assert_eq!(slice.count, 7);
        assert_eq!(slice.num_pages, 3);
        assert_eq!(slice.records.len(), 3);
    }

    #[tokio::test]
    async fn test_last_page_uses_page_count() {
        let mut mock_repo = MockProductRepository::new();

        mock_repo.expect_count().returning(|_| Ok(7));
        mock_repo
            .expect_fetch()
            .withf(|_, window| *window == Some(Window { offset: 6, limit: 3 }))
            .times(1)
            .returning(|_, _| Ok(records(&[7])));

        let service = ProductService::new(mock_repo, CatalogSettings::default());
        let slice = service
            .list(
                &ProductQuery::new(),
                PageRequest {
                    page: Some(PageNumber::Last),
                    page_size: Some(3),
                },
            )
            .await
            .unwrap();

        assert_eq!(slice.page, 3);
        assert!(!slice.has_next());
        assert!(slice.has_previous());
    }

    #[tokio::test]
    async fn test_page_beyond_last_is_rejected_before_fetch() {
        let mut mock_repo = MockProductRepository::new();

        mock_repo.expect_count().returning(|_| Ok(4));
        mock_repo.expect_fetch().times(0);

        let service = ProductService::new(mock_repo, CatalogSettings::default());
        let err = service
            .search(
                &ProductQuery::new(),
                PageRequest {
                    page: Some(PageNumber::Number(2)),
                    page_size: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProductError::InvalidPage {
                page: 2,
                num_pages: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_result_is_a_valid_first_page() {
        let mut mock_repo = MockProductRepository::new();

        mock_repo.expect_count().returning(|_| Ok(0));
        mock_repo.expect_fetch().times(0);

        let service = ProductService::new(mock_repo, CatalogSettings::default());
        let slice = service
            .list(&ProductQuery::new(), PageRequest::default())
            .await
            .unwrap();

        assert_eq!(slice.count, 0);
        assert_eq!(slice.num_pages, 1);
        assert!(slice.records.is_empty());
    }

    #[tokio::test]
    async fn test_repository_errors_propagate() {
        let mut mock_repo = MockProductRepository::new();

        mock_repo
            .expect_count()
            .returning(|_| Err(ProductError::Database(DbErr::Custom("connection reset".into()))));

        let service = ProductService::new(mock_repo, CatalogSettings::default());
        let err = service
            .list(&ProductQuery::new(), PageRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProductError::Database(_)));
    }
}
