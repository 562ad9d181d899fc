//! Mapping from stored products to the client-facing record.
//!
//! Derived fields (`image_url`, `additional_images[].image_url`,
//! `is_in_stock`) are computed as `Result`s. A failure degrades the field to
//! its fail-safe value and is kept as a warning; warnings are logged by
//! [`Presented::into_logged`] and never reach the payload.

use axum::http::Uri;
use axum_helpers::BaseUri;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::PresentError;
use crate::models::{CatalogSettings, ProductImage, ProductRecord};

/// Product record as returned by every catalog endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductOut {
    pub id: i64,
    pub name: String,
    pub category: String,
    #[schema(value_type = String, example = "49.99")]
    pub price: Decimal,
    pub description: String,
    pub short_description: String,
    pub meta_description: String,
    /// Absolute URL of the primary image; null without an image or request host
    #[schema(example = "http://shop.example.com/media/products/lamp.jpg")]
    pub image_url: Option<String>,
    pub additional_images: Vec<ImageOut>,
    pub rating: f64,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_in_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageOut {
    pub id: i64,
    pub image_url: Option<String>,
    pub is_primary: bool,
    pub alt_text: String,
}

/// A presented value plus the derived-field failures swallowed on the way
#[derive(Debug)]
pub struct Presented<T> {
    pub value: T,
    pub warnings: Vec<PresentError>,
}

impl<T> Presented<T> {
    /// Logs every warning and returns the value
    pub fn into_logged(self) -> T {
        for warning in &self.warnings {
            tracing::warn!(error = %warning, "Derived product field fell back to its default");
        }
        self.value
    }
}

/// Resolves stored media paths to absolute URLs
#[derive(Debug, Clone)]
pub struct MediaResolver {
    media_url: String,
}

impl MediaResolver {
    pub fn new(media_url: impl Into<String>) -> Self {
        let mut media_url = media_url.into();
        if !media_url.ends_with('/') {
            media_url.push('/');
        }
        Self { media_url }
    }

    /// `Ok(None)` when there is no path or no request base to join onto.
    pub fn resolve(
        &self,
        base: Option<&BaseUri>,
        path: &str,
    ) -> Result<Option<String>, PresentError> {
        let path = path.trim();
        if path.is_empty() {
            return Ok(None);
        }
        if is_absolute_url(path) {
            return validate(path, path.to_string()).map(Some);
        }
        let Some(base) = base else {
            return Ok(None);
        };

        let encoded = path
            .trim_start_matches('/')
            .split('/')
            .map(encode_segment)
            .collect::<Vec<_>>()
            .join("/");
        let media_path = format!("{}{}", self.media_url, encoded);

        let url = if is_absolute_url(&media_path) {
            media_path
        } else if media_path.starts_with('/') {
            format!("{}{}", base.origin(), media_path)
        } else {
            format!("{}/{}", base.origin(), media_path)
        };

        validate(path, url).map(Some)
    }
}

/// Characters left literal in media paths besides unreserved ones
const PATH_SAFE: [(&str, &str); 5] = [
    ("%21", "!"),
    ("%2A", "*"),
    ("%28", "("),
    ("%29", ")"),
    ("%27", "'"),
];

fn encode_segment(segment: &str) -> String {
    PATH_SAFE
        .iter()
        .fold(urlencoding::encode(segment).into_owned(), |encoded, (escaped, literal)| {
            encoded.replace(escaped, literal)
        })
}

fn is_absolute_url(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn validate(path: &str, url: String) -> Result<String, PresentError> {
    match Uri::try_from(url.as_str()) {
        Ok(uri) if uri.scheme().is_some() && uri.authority().is_some() => Ok(url),
        Ok(_) => Err(PresentError::InvalidMediaUri {
            path: path.to_string(),
            reason: "missing scheme or host".to_string(),
        }),
        Err(e) => Err(PresentError::InvalidMediaUri {
            path: path.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[derive(Debug, Clone)]
pub struct Presenter {
    media: MediaResolver,
}

impl Presenter {
    pub fn new(settings: &CatalogSettings) -> Self {
        Self {
            media: MediaResolver::new(settings.media_url.clone()),
        }
    }

    pub fn present(&self, record: &ProductRecord, base: Option<&BaseUri>) -> Presented<ProductOut> {
        let mut warnings = Vec::new();
        let product = &record.product;

        let image_url = product
            .image
            .as_deref()
            .map(|path| self.media.resolve(base, path))
            .transpose()
            .map(Option::flatten)
            .unwrap_or_else(|e| {
                warnings.push(e);
                None
            });

        let additional_images = record
            .images
            .iter()
            .map(|image| self.present_image(image, base, &mut warnings))
            .collect();

        let is_in_stock = product.in_stock().unwrap_or_else(|e| {
            warnings.push(e);
            false
        });

        Presented {
            value: ProductOut {
                id: product.id,
                name: product.name.clone(),
                category: product.category.clone(),
                price: product.price,
                description: product.description.clone(),
                short_description: product.short_description.clone(),
                meta_description: product.meta_description.clone(),
                image_url,
                additional_images,
                rating: product.rating,
                is_featured: product.is_featured,
                created_at: product.created_at,
                updated_at: product.updated_at,
                is_in_stock,
            },
            warnings,
        }
    }

    pub fn present_all(
        &self,
        records: &[ProductRecord],
        base: Option<&BaseUri>,
    ) -> Presented<Vec<ProductOut>> {
        let mut warnings = Vec::new();
        let value = records
            .iter()
            .map(|record| {
                let presented = self.present(record, base);
                warnings.extend(presented.warnings);
                presented.value
            })
            .collect();

        Presented { value, warnings }
    }

    fn present_image(
        &self,
        image: &ProductImage,
        base: Option<&BaseUri>,
        warnings: &mut Vec<PresentError>,
    ) -> ImageOut {
        let image_url = self.media.resolve(base, &image.image).unwrap_or_else(|e| {
            warnings.push(e);
            None
        });

        ImageOut {
            id: image.id,
            image_url,
            is_primary: image.is_primary,
            alt_text: image.alt_text.clone(),
        }
    }
}
