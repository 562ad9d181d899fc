//! # Axum Helpers
//!
//! HTTP plumbing shared by the catalog services.
//!
//! - **[`server`]**: router assembly with OpenAPI viewers, probes, graceful shutdown
//! - **[`http`]**: CORS and security-header middleware
//! - **[`errors`]**: the standard error body and [`AppError`]
//! - **[`extractors`]**: [`IdPath`], [`RequestBase`], [`ValidatedQuery`]
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//! use core_config::app_info;
//!
//! let router = create_router::<ApiDoc>(api_routes)?.merge(health_router(app_info!()));
//! create_production_app(router, &config.server, Duration::from_secs(30), cleanup).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};

pub use http::{cors_layer_from_env, create_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{BaseUri, IdPath, RequestBase, ValidatedQuery};
