use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use validator::Validate;

use crate::error::PresentError;

/// Catalog product as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub description: String,
    pub short_description: String,
    pub meta_description: String,
    /// Relative media path of the primary image
    pub image: Option<String>,
    pub rating: f64,
    pub is_featured: bool,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// `stock_quantity > 0`, evaluated on every read.
    ///
    /// A negative quantity is corrupt data, not "out of stock".
    pub fn in_stock(&self) -> Result<bool, PresentError> {
        if self.stock_quantity < 0 {
            return Err(PresentError::NegativeStock {
                product_id: self.id,
                quantity: self.stock_quantity,
            });
        }
        Ok(self.stock_quantity > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    /// Relative media path
    pub image: String,
    pub is_primary: bool,
    pub alt_text: String,
}

/// A product with all of its images, ordered by image id
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub product: Product,
    pub images: Vec<ProductImage>,
}

impl ProductRecord {
    pub fn new(product: Product, mut images: Vec<ProductImage>) -> Self {
        images.sort_by_key(|image| image.id);
        Self { product, images }
    }

    pub fn id(&self) -> i64 {
        self.product.id
    }
}

/// Runtime knobs for listing and media links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    /// Page size when the request names none
    pub page_size: u64,
    /// Upper bound for a requested page size
    pub max_page_size: u64,
    /// Prefix for stored media paths, relative (`/media/`) or absolute (`https://cdn/...`)
    pub media_url: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_page_size: 100,
            media_url: "/media/".to_string(),
        }
    }
}

/// Raw query parameters of the List operation.
///
/// Values stay strings until the query plan parses them, so a malformed
/// value is reported against its parameter name.
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Exact category match
    #[param(example = "home")]
    pub category: Option<String>,
    /// `true`/`false`/`1`/`0`
    #[param(example = "true")]
    pub is_featured: Option<String>,
    /// Inclusive lower price bound
    #[param(example = "10.00")]
    pub min_price: Option<String>,
    /// Inclusive upper price bound
    #[param(example = "250")]
    pub max_price: Option<String>,
    /// Terms separated by whitespace or commas; each must match name, description or short description
    pub search: Option<String>,
    /// Comma-separated `price`, `rating`, `created_at`; prefix `-` for descending
    #[param(example = "-rating,price")]
    pub ordering: Option<String>,
}

/// Raw query parameters of the Search operation
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Substring matched in name, description, short description or category
    #[param(example = "linen")]
    pub q: Option<String>,
    /// Exact category match
    pub category: Option<String>,
    /// Inclusive lower price bound
    pub min_price: Option<String>,
    /// Inclusive upper price bound
    pub max_price: Option<String>,
    /// Comma-separated `price`, `rating`, `created_at`; prefix `-` for descending
    pub ordering: Option<String>,
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_in_stock_is_derived_from_quantity() {
        let mut p = product(1);
        assert_eq!(p.in_stock().unwrap(), true);

        p.stock_quantity = 0;
        assert_eq!(p.in_stock().unwrap(), false);
    }

    #[test]
    fn test_negative_stock_is_an_error() {
        let mut p = product(7);
        p.stock_quantity = -3;

        let err = p.in_stock().unwrap_err();
        assert!(matches!(
            err,
            PresentError::NegativeStock {
                product_id: 7,
                quantity: -3
            }
        ));
    }

    #[test]
    fn test_record_orders_images_by_id() {
        let record = ProductRecord::new(
            product(1),
            vec![image(9, 1, "b.jpg"), image(2, 1, "a.jpg"), image(5, 1, "c.jpg")],
        );

        let ids: Vec<i64> = record.images.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn test_default_settings() {
        let settings = CatalogSettings::default();
        assert_eq!(settings.page_size, 10);
        assert_eq!(settings.max_page_size, 100);
        assert_eq!(settings.media_url, "/media/");
    }
}
