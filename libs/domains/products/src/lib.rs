//! Products Domain
//!
//! Read-only product catalog: featured products, filtered listing, text
//! search and product detail, backed by PostgreSQL through SeaORM.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, envelopes
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐   ┌─────────────┐
//! │   Service   │──►│  Presenter  │  ← client-facing records, media URLs
//! └──────┬──────┘   └─────────────┘
//!        │ ProductQuery (immutable plan)
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + PostgreSQL / in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, domain records
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{handlers, CatalogSettings, PgProductRepository, ProductService};
//! use sea_orm::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("postgres://localhost/catalog").await?;
//!
//! let repository = PgProductRepository::new(db);
//! let service = ProductService::new(repository, CatalogSettings::default());
//!
//! // Routes under /products; mount the router under /api
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod postgres;
pub mod presenter;
pub mod query;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{PresentError, ProductError, ProductResult};
pub use handlers::{ApiDoc, FeaturedResponse};
pub use models::{CatalogSettings, ListParams, Product, ProductImage, ProductRecord, SearchParams};
pub use pagination::{PageNumber, PageRequest, ProductPage};
pub use postgres::PgProductRepository;
pub use presenter::{ImageOut, Presenter, ProductOut};
pub use query::ProductQuery;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;
