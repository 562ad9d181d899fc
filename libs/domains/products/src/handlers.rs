//! HTTP handlers for the product catalog

use axum::{
    Json, Router,
    extract::{OriginalUri, State},
    routing::get,
};
use axum_helpers::{
    IdPath, RequestBase, ValidatedQuery,
    errors::responses::{BadRequestResponse, InternalServerErrorResponse},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::{DetailError, FeaturedError, FeaturedErrorBody, ProductErrorBody, ProductResult};
use crate::models::{ListParams, SearchParams};
use crate::pagination::{PageRequest, ProductPage};
use crate::presenter::{ImageOut, ProductOut};
use crate::query::ProductQuery;
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// OpenAPI documentation for the catalog endpoints
#[derive(OpenApi)]
#[openapi(
    paths(featured_products, list_products, search_products, get_product),
    components(
        schemas(
            ProductOut, ImageOut, ProductPage, FeaturedResponse,
            FeaturedErrorBody, ProductErrorBody
        ),
        responses(BadRequestResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = "Products", description = "Read-only product catalog")
    )
)]
pub struct ApiDoc;

/// `{"status": "success", ...}` envelope of the Featured operation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeaturedResponse {
    #[schema(example = "success")]
    pub status: String,
    pub count: usize,
    pub data: Vec<ProductOut>,
}

/// Create the catalog router; every route also answers with a trailing slash
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/products", get(list_products))
        .route("/products/", get(list_products))
        .route("/products/featured", get(featured_products))
        .route("/products/featured/", get(featured_products))
        .route("/products/search", get(search_products))
        .route("/products/search/", get(search_products))
        .route("/products/{id}", get(get_product))
        .route("/products/{id}/", get(get_product))
        .with_state(shared_service)
}

/// Featured products, best rated first
#[utoipa::path(
    get,
    path = "/products/featured/",
    tag = "Products",
    responses(
        (status = 200, description = "All featured products", body = FeaturedResponse),
        (status = 500, description = "Catalog unavailable", body = FeaturedErrorBody)
    )
)]
async fn featured_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    RequestBase(base): RequestBase,
) -> Result<Json<FeaturedResponse>, FeaturedError> {
    let records = service.featured().await?;
    let data = service
        .presenter()
        .present_all(&records, base.as_ref())
        .into_logged();

    Ok(Json(FeaturedResponse {
        status: "success".to_string(),
        count: data.len(),
        data,
    }))
}

/// List products with filters, ordering and pagination
#[utoipa::path(
    get,
    path = "/products/",
    tag = "Products",
    params(ListParams, PageRequest),
    responses(
        (status = 200, description = "One page of matching products", body = ProductPage),
        (status = 400, response = BadRequestResponse),
        (status = 404, description = "Page out of range", body = ProductErrorBody),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    RequestBase(base): RequestBase,
    OriginalUri(uri): OriginalUri,
    ValidatedQuery(paging): ValidatedQuery<PageRequest>,
    ValidatedQuery(params): ValidatedQuery<ListParams>,
) -> ProductResult<Json<ProductPage>> {
    let query = ProductQuery::from_list_params(&params)?;
    let slice = service.list(&query, paging).await?;

    let results = service
        .presenter()
        .present_all(&slice.records, base.as_ref())
        .into_logged();

    Ok(Json(ProductPage::new(&slice, results, base.as_ref(), &uri)))
}

/// Search products by text in name, descriptions and category
#[utoipa::path(
    get,
    path = "/products/search/",
    tag = "Products",
    params(SearchParams, PageRequest),
    responses(
        (status = 200, description = "One page of matching products", body = ProductPage),
        (status = 400, response = BadRequestResponse),
        (status = 404, description = "Page out of range", body = ProductErrorBody),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    RequestBase(base): RequestBase,
    OriginalUri(uri): OriginalUri,
    ValidatedQuery(paging): ValidatedQuery<PageRequest>,
    ValidatedQuery(params): ValidatedQuery<SearchParams>,
) -> ProductResult<Json<ProductPage>> {
    let query = ProductQuery::from_search_params(&params)?;
    let slice = service.search(&query, paging).await?;

    let results = service
        .presenter()
        .present_all(&slice.records, base.as_ref())
        .into_logged();

    Ok(Json(ProductPage::new(&slice, results, base.as_ref(), &uri)))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/products/{id}/",
    tag = "Products",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductOut),
        (status = 400, response = BadRequestResponse),
        (status = 404, description = "Product not found", body = ProductErrorBody),
        (status = 500, description = "Lookup failed", body = ProductErrorBody)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    RequestBase(base): RequestBase,
    IdPath(id): IdPath,
) -> Result<Json<ProductOut>, DetailError> {
    let record = service.get_product(id).await?;
    let product = service
        .presenter()
        .present(&record, base.as_ref())
        .into_logged();

    Ok(Json(product))
}
