use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::AppError;
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Client-facing text for 500s; the real cause only goes to the logs.
pub const GENERIC_FAILURE_DETAIL: &str = "An unexpected error occurred while processing the request";

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(i64),

    #[error("Invalid {parameter}: {message}")]
    Validation {
        parameter: &'static str,
        message: String,
    },

    #[error("Invalid page {page} (last page is {num_pages})")]
    InvalidPage { page: u64, num_pages: u64 },

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProductError {
    pub fn validation(parameter: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            parameter,
            message: message.into(),
        }
    }

    fn is_server_side(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Internal(_))
    }
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Fallible derived field of a presented product
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresentError {
    #[error("product {product_id} has negative stock quantity {quantity}")]
    NegativeStock { product_id: i64, quantity: i32 },

    #[error("media path '{path}' does not resolve to a valid URI: {reason}")]
    InvalidMediaUri { path: String, reason: String },
}

/// `{"error": ..., "details": ...}` body of the Detail and pagination errors
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ProductErrorBody {
    fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
            details: None,
        }
    }
}

/// `{"status": "error", ...}` body of a failed Featured request
#[derive(Debug, Serialize, ToSchema)]
pub struct FeaturedErrorBody {
    #[schema(example = "error")]
    pub status: String,
    pub message: String,
    pub detail: String,
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {} not found", id)),
            ProductError::Validation { parameter, message } => {
                AppError::invalid_parameter(parameter, message)
            }
            ProductError::InvalidPage { page, .. } => {
                AppError::NotFound(format!("Invalid page {}", page))
            }
            ProductError::Database(err) => AppError::Database(err),
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

/// Response of the List and Search operations
impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        match self {
            ProductError::NotFound(_) => not_found_response(),
            ProductError::InvalidPage { page, num_pages } => {
                tracing::info!(page, num_pages, "Requested page is out of range");
                (
                    StatusCode::NOT_FOUND,
                    Json(ProductErrorBody::new("Invalid page")),
                )
                    .into_response()
            }
            other => AppError::from(other).into_response(),
        }
    }
}

fn not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ProductErrorBody::new("Product not found")),
    )
        .into_response()
}

/// Error of the Detail operation
#[derive(Debug)]
pub struct DetailError(pub ProductError);

impl From<ProductError> for DetailError {
    fn from(err: ProductError) -> Self {
        Self(err)
    }
}

impl IntoResponse for DetailError {
    fn into_response(self) -> Response {
        match self.0 {
            ProductError::NotFound(id) => {
                tracing::warn!(product_id = id, "Product not found");
                not_found_response()
            }
            err if err.is_server_side() => {
                tracing::error!(error = %err, "Unable to retrieve product details");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ProductErrorBody {
                        error: "Unable to retrieve product details".to_string(),
                        details: Some(GENERIC_FAILURE_DETAIL.to_string()),
                    }),
                )
                    .into_response()
            }
            other => other.into_response(),
        }
    }
}

/// Error of the Featured operation; every failure is a 500 envelope
#[derive(Debug)]
pub struct FeaturedError(pub ProductError);

impl From<ProductError> for FeaturedError {
    fn from(err: ProductError) -> Self {
        Self(err)
    }
}

impl IntoResponse for FeaturedError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Unable to retrieve featured products");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(FeaturedErrorBody {
                status: "error".to_string(),
                message: "Unable to retrieve featured products".to_string(),
                detail: GENERIC_FAILURE_DETAIL.to_string(),
            }),
        )
            .into_response()
    }
}
