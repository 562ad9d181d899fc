//! Custom extractors for the catalog handlers.

pub mod id_path;
pub mod request_base;
pub mod validated_query;

pub use id_path::IdPath;
pub use request_base::{BaseUri, RequestBase};
pub use validated_query::ValidatedQuery;
