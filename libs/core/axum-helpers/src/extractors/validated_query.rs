//! Query-string extractor with `validator` constraints.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Deserializes the query string into `T` and runs `T::validate`.
///
/// Deserialization failures and constraint violations both become a 400
/// with the standard error body.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct Paging {
///     #[validate(range(min = 1))]
///     page: Option<u64>,
/// }
///
/// async fn list(ValidatedQuery(paging): ValidatedQuery<Paging>) { /* ... */ }
/// ```
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        value.validate()?;
        Ok(ValidatedQuery(value))
    }
}
