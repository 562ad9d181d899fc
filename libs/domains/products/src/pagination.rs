//! Page-number pagination with absolute neighbour links.

use axum::http::Uri;
use axum_helpers::BaseUri;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{CatalogSettings, ProductRecord};
use crate::presenter::ProductOut;

const PAGE_PARAM: &str = "page";

const LAST_PAGE: &str = "last";

/// Value of the `page` parameter: a 1-based number or `last`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum PageNumber {
    Number(u64),
    Last,
}

impl PageNumber {
    /// Concrete page once the number of pages is known
    pub fn resolve(self, num_pages: u64) -> u64 {
        match self {
            Self::Number(page) => page,
            Self::Last => num_pages,
        }
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::Number(1)
    }
}

impl TryFrom<String> for PageNumber {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        if raw == LAST_PAGE {
            return Ok(Self::Last);
        }
        match raw.parse::<u64>() {
            Ok(page) if page >= 1 => Ok(Self::Number(page)),
            _ => Err(format!("page must be a positive integer or '{}'", LAST_PAGE)),
        }
    }
}

/// `page`/`page_size` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageRequest {
    /// 1-based page number, or `last`
    #[param(value_type = Option<String>, example = "1")]
    pub page: Option<PageNumber>,
    /// Items per page, capped by the configured maximum
    #[validate(range(min = 1))]
    #[param(minimum = 1, example = 10)]
    pub page_size: Option<u64>,
}

impl PageRequest {
    pub fn page(&self) -> PageNumber {
        self.page.unwrap_or_default()
    }

    pub fn page_size(&self, settings: &CatalogSettings) -> u64 {
        self.page_size
            .unwrap_or(settings.page_size)
            .min(settings.max_page_size)
            .max(1)
    }
}

/// Offset/limit slice handed to the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

impl Window {
    pub fn for_page(page: u64, page_size: u64) -> Self {
        Self {
            offset: page.saturating_sub(1).saturating_mul(page_size),
            limit: page_size,
        }
    }
}

/// Number of pages for `count` items; an empty result still has page 1
pub fn num_pages(count: u64, page_size: u64) -> u64 {
    count.div_ceil(page_size.max(1)).max(1)
}

/// Rejects a page beyond the last one
pub fn check_page(page: u64, count: u64, page_size: u64) -> ProductResult<u64> {
    let num_pages = num_pages(count, page_size);
    if page == 0 || page > num_pages {
        return Err(ProductError::InvalidPage { page, num_pages });
    }
    Ok(num_pages)
}

/// One page of matching records plus the totals needed for links
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice {
    pub count: u64,
    pub page: u64,
    pub page_size: u64,
    pub num_pages: u64,
    pub records: Vec<ProductRecord>,
}

impl PageSlice {
    pub fn has_next(&self) -> bool {
        self.page < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Paginated envelope of the List and Search operations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductPage {
    /// Total number of matching products
    pub count: u64,
    #[schema(example = "http://shop.example.com/api/products/?page=3")]
    pub next: Option<String>,
    #[schema(example = "http://shop.example.com/api/products/")]
    pub previous: Option<String>,
    pub results: Vec<ProductOut>,
}

impl ProductPage {
    pub fn new(slice: &PageSlice, results: Vec<ProductOut>, base: Option<&BaseUri>, uri: &Uri) -> Self {
        let next = slice
            .has_next()
            .then(|| page_link(base, uri, Some(slice.page + 1)));
        let previous = slice.has_previous().then(|| {
            let target = slice.page - 1;
            page_link(base, uri, (target > 1).then_some(target))
        });

        Self {
            count: slice.count,
            next,
            previous,
            results,
        }
    }
}

/// The request URL with its `page` parameter replaced, or dropped for `None`.
///
/// Other parameters are kept and sorted by name. Without a request base the
/// link is relative to the host.
pub fn page_link(base: Option<&BaseUri>, uri: &Uri, page: Option<u64>) -> String {
    let mut pairs: Vec<(String, String)> = uri
        .query()
        .map(parse_query)
        .unwrap_or_default()
        .into_iter()
        .filter(|(key, _)| key != PAGE_PARAM)
        .collect();

    if let Some(page) = page {
        pairs.push((PAGE_PARAM.to_string(), page.to_string()));
    }
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let mut link = match base {
        Some(base) => format!("{}{}", base.origin(), uri.path()),
        None => uri.path().to_string(),
    };

    if !pairs.is_empty() {
        let query = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        link.push('?');
        link.push_str(&query);
    }
    link
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> BaseUri {
        BaseUri::new("http", "shop.example.com").unwrap()
    }

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    #[test]
    fn test_page_size_defaults_and_clamps() {
        let settings = CatalogSettings::default();

        assert_eq!(PageRequest::default().page_size(&settings), 10);
        assert_eq!(
            PageRequest {
                page_size: Some(500),
                ..Default::default()
            }
            .page_size(&settings),
            100
        );
        assert_eq!(PageRequest::default().page(), PageNumber::Number(1));
    }

    #[test]
    fn test_page_number_parsing() {
        assert_eq!(PageNumber::try_from("3".to_string()), Ok(PageNumber::Number(3)));
        assert_eq!(PageNumber::try_from("last".to_string()), Ok(PageNumber::Last));
        assert!(PageNumber::try_from("0".to_string()).is_err());
        assert!(PageNumber::try_from("Last".to_string()).is_err());
        assert!(PageNumber::try_from("-1".to_string()).is_err());
    }

    #[test]
    fn test_last_page_resolves_to_page_count() {
        assert_eq!(PageNumber::Last.resolve(num_pages(25, 10)), 3);
        assert_eq!(PageNumber::Last.resolve(num_pages(0, 10)), 1);
        assert_eq!(PageNumber::Number(2).resolve(3), 2);
    }

    #[test]
    fn test_num_pages() {
        assert_eq!(num_pages(0, 10), 1);
        assert_eq!(num_pages(10, 10), 1);
        assert_eq!(num_pages(11, 10), 2);
    }

    #[test]
    fn test_check_page() {
        assert_eq!(check_page(1, 0, 10).unwrap(), 1);
        assert_eq!(check_page(2, 11, 10).unwrap(), 2);

        let err = check_page(3, 11, 10).unwrap_err();
        assert!(matches!(
            err,
            ProductError::InvalidPage {
                page: 3,
                num_pages: 2
            }
        ));
    }

    #[test]
    fn test_window_for_page() {
        assert_eq!(Window::for_page(1, 10), Window { offset: 0, limit: 10 });
        assert_eq!(Window::for_page(3, 5), Window { offset: 10, limit: 5 });
    }

    #[test]
    fn test_page_link_replaces_page_and_keeps_filters() {
        let link = page_link(
            Some(&base()),
            &uri("/api/products/?page=2&category=home&search=desk+lamp"),
            Some(3),
        );

        assert_eq!(
            link,
            "http://shop.example.com/api/products/?category=home&page=3&search=desk%20lamp"
        );
    }

    #[test]
    fn test_page_link_drops_page_for_first_page() {
        assert_eq!(
            page_link(Some(&base()), &uri("/api/products/?page=2"), None),
            "http://shop.example.com/api/products/"
        );
    }

    #[test]
    fn test_page_link_without_base_is_relative() {
        assert_eq!(
            page_link(None, &uri("/api/products/search/?q=wool"), Some(2)),
            "/api/products/search/?page=2&q=wool"
        );
    }

    #[test]
    fn test_envelope_links() {
        let slice = PageSlice {
            count: 25,
            page: 2,
            page_size: 10,
            num_pages: 3,
            records: vec![],
        };
        let page = ProductPage::new(&slice, vec![], Some(&base()), &uri("/api/products/?page=2"));

        assert_eq!(page.count, 25);
        assert_eq!(
            page.next.as_deref(),
            Some("http://shop.example.com/api/products/?page=3")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("http://shop.example.com/api/products/")
        );
    }

    #[test]
    fn test_single_page_has_no_links() {
        let slice = PageSlice {
            count: 3,
            page: 1,
            page_size: 10,
            num_pages: 1,
            records: vec![],
        };
        let page = ProductPage::new(&slice, vec![], Some(&base()), &uri("/api/products/"));

        assert!(page.next.is_none());
        assert!(page.previous.is_none());
    }
}
