//! Immutable query plan over the product store.
//!
//! A [`ProductQuery`] is built from raw request parameters and handed to a
//! [`ProductRepository`](crate::repository::ProductRepository), which either
//! translates it to SQL or evaluates it in memory with [`ProductQuery::matches`]
//! and [`ProductQuery::compare`]. Both paths must agree.

use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::{ProductError, ProductResult};
use crate::models::{ListParams, Product, SearchParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Price,
    Rating,
    CreatedAt,
}

impl SortField {
    pub const ALLOWED: [&'static str; 3] = ["price", "rating", "created_at"];

    fn parse(name: &str) -> Option<Self> {
        match name {
            "price" => Some(Self::Price),
            "rating" => Some(Self::Rating),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderKey {
    pub field: SortField,
    pub descending: bool,
}

impl OrderKey {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            descending: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Name,
    Description,
    ShortDescription,
    Category,
}

impl SearchField {
    fn value(self, product: &Product) -> &str {
        match self {
            Self::Name => &product.name,
            Self::Description => &product.description,
            Self::ShortDescription => &product.short_description,
            Self::Category => &product.category,
        }
    }
}

/// Fields searched by the List operation's `search` parameter
pub const LIST_SEARCH_FIELDS: &[SearchField] = &[
    SearchField::Name,
    SearchField::Description,
    SearchField::ShortDescription,
];

/// Fields searched by the Search operation's `q` parameter
pub const SEARCH_FIELDS: &[SearchField] = &[
    SearchField::Name,
    SearchField::Description,
    SearchField::ShortDescription,
    SearchField::Category,
];

/// Case-insensitive substring search.
///
/// Every term must occur in at least one of `fields`; each term is one
/// OR-group, and the groups are AND-ed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch {
    terms: Vec<String>,
    fields: &'static [SearchField],
}

impl TextSearch {
    /// The whole input, untrimmed, is a single term. `None` when empty.
    pub fn phrase(input: &str, fields: &'static [SearchField]) -> Option<Self> {
        if input.is_empty() {
            return None;
        }
        Some(Self {
            terms: vec![input.to_string()],
            fields,
        })
    }

    /// Terms split on whitespace and commas. `None` when there are none.
    pub fn terms(input: &str, fields: &'static [SearchField]) -> Option<Self> {
        let terms: Vec<String> = input
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        if terms.is_empty() {
            return None;
        }
        Some(Self { terms, fields })
    }

    pub fn term_list(&self) -> &[String] {
        &self.terms
    }

    pub fn fields(&self) -> &'static [SearchField] {
        self.fields
    }

    fn matches(&self, product: &Product) -> bool {
        self.terms.iter().all(|term| {
            let needle = term.to_lowercase();
            self.fields
                .iter()
                .any(|field| field.value(product).to_lowercase().contains(&needle))
        })
    }
}

/// Filters and ordering for one catalog read.
///
/// Builder methods consume the plan and return a new one; results are
/// ordered by the ordering keys and then by `id` ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    category: Option<String>,
    featured: Option<bool>,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
    text: Option<TextSearch>,
    ordering: Vec<OrderKey>,
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Featured products, best rated first
    pub fn featured_catalog() -> Self {
        Self::new()
            .featured(true)
            .order_by(vec![OrderKey::desc(SortField::Rating)])
    }

    #[must_use]
    pub fn category(self, category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..self
        }
    }

    #[must_use]
    pub fn featured(self, featured: bool) -> Self {
        Self {
            featured: Some(featured),
            ..self
        }
    }

    #[must_use]
    pub fn min_price(self, min: Decimal) -> Self {
        Self {
            min_price: Some(min),
            ..self
        }
    }

    #[must_use]
    pub fn max_price(self, max: Decimal) -> Self {
        Self {
            max_price: Some(max),
            ..self
        }
    }

    #[must_use]
    pub fn text(self, text: TextSearch) -> Self {
        Self {
            text: Some(text),
            ..self
        }
    }

    #[must_use]
    pub fn order_by(self, ordering: Vec<OrderKey>) -> Self {
        Self { ordering, ..self }
    }

    /// Plan for the List operation
    pub fn from_list_params(params: &ListParams) -> ProductResult<Self> {
        let mut query = Self::new().with_price_and_category(
            params.category.as_deref(),
            params.min_price.as_deref(),
            params.max_price.as_deref(),
        )?;

        if let Some(flag) = non_blank(params.is_featured.as_deref()) {
            query = query.featured(parse_flag("is_featured", flag)?);
        }
        if let Some(text) = params
            .search
            .as_deref()
            .and_then(|s| TextSearch::terms(s, LIST_SEARCH_FIELDS))
        {
            query = query.text(text);
        }
        if let Some(raw) = non_blank(params.ordering.as_deref()) {
            query = query.order_by(parse_ordering(raw)?);
        }

        Ok(query)
    }

    /// Plan for the Search operation
    pub fn from_search_params(params: &SearchParams) -> ProductResult<Self> {
        let mut query = Self::new().with_price_and_category(
            params.category.as_deref(),
            params.min_price.as_deref(),
            params.max_price.as_deref(),
        )?;

        if let Some(text) = params
            .q
            .as_deref()
            .and_then(|q| TextSearch::phrase(q, SEARCH_FIELDS))
        {
            query = query.text(text);
        }
        if let Some(raw) = non_blank(params.ordering.as_deref()) {
            query = query.order_by(parse_ordering(raw)?);
        }

        Ok(query)
    }

    fn with_price_and_category(
        self,
        category: Option<&str>,
        min_price: Option<&str>,
        max_price: Option<&str>,
    ) -> ProductResult<Self> {
        let mut query = self;
        if let Some(category) = non_blank(category) {
            query = query.category(category);
        }
        if let Some(raw) = non_blank(min_price) {
            query = query.min_price(parse_price("min_price", raw)?);
        }
        if let Some(raw) = non_blank(max_price) {
            query = query.max_price(parse_price("max_price", raw)?);
        }
        Ok(query)
    }

    pub fn category_filter(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn featured_filter(&self) -> Option<bool> {
        self.featured
    }

    pub fn min_price_filter(&self) -> Option<Decimal> {
        self.min_price
    }

    pub fn max_price_filter(&self) -> Option<Decimal> {
        self.max_price
    }

    pub fn text_filter(&self) -> Option<&TextSearch> {
        self.text.as_ref()
    }

    pub fn ordering(&self) -> &[OrderKey] {
        &self.ordering
    }

    /// In-memory evaluation of the filters
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(ref category) = self.category {
            if &product.category != category {
                return false;
            }
        }
        if let Some(featured) = self.featured {
            if product.is_featured != featured {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if product.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price > max {
                return false;
            }
        }
        if let Some(ref text) = self.text {
            if !text.matches(product) {
                return false;
            }
        }
        true
    }

    /// In-memory evaluation of the ordering, including the `id` tiebreak
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        self.ordering
            .iter()
            .map(|key| {
                let ord = match key.field {
                    SortField::Price => a.price.cmp(&b.price),
                    SortField::Rating => a.rating.total_cmp(&b.rating),
                    SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                };
                if key.descending { ord.reverse() } else { ord }
            })
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_flag(parameter: &'static str, raw: &str) -> ProductResult<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ProductError::validation(
            parameter,
            format!("{} must be one of true, false, 1, 0", parameter),
        )),
    }
}

fn parse_price(parameter: &'static str, raw: &str) -> ProductResult<Decimal> {
    let value = Decimal::from_str(raw).map_err(|_| {
        ProductError::validation(parameter, format!("{} must be a decimal number", parameter))
    })?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(ProductError::validation(
            parameter,
            format!("{} must not be negative", parameter),
        ));
    }
    Ok(value)
}

fn parse_ordering(raw: &str) -> ProductResult<Vec<OrderKey>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (descending, name) = match part.strip_prefix('-') {
                Some(name) => (true, name),
                None => (false, part),
            };
            SortField::parse(name)
                .map(|field| OrderKey { field, descending })
                .ok_or_else(|| {
                    ProductError::validation(
                        "ordering",
                        format!(
                            "ordering field '{}' is not allowed; use one of {}",
                            name,
                            SortField::ALLOWED.join(", ")
                        ),
                    )
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::product;

    fn list(params: ListParams) -> ProductResult<ProductQuery> {
        ProductQuery::from_list_params(&params)
    }

    #[test]
    fn test_empty_params_impose_nothing() {
        let query = list(ListParams {
            category: Some("  ".into()),
            search: Some(" ".into()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(query, ProductQuery::new());
        assert!(query.matches(&product(1)));
    }

    #[test]
    fn test_builder_returns_new_plans() {
        let base = ProductQuery::new().category("home");
        let narrowed = base.clone().featured(true);

        assert_eq!(base.featured_filter(), None);
        assert_eq!(narrowed.featured_filter(), Some(true));
        assert_eq!(narrowed.category_filter(), Some("home"));
    }

    #[test]
    fn test_featured_flag_parsing() {
        for (raw, expected) in [("true", true), ("1", true), ("FALSE", false), ("0", false)] {
            let query = list(ListParams {
                is_featured: Some(raw.into()),
                ..Default::default()
            })
            .unwrap();
            assert_eq!(query.featured_filter(), Some(expected), "input {}", raw);
        }

        let err = list(ListParams {
            is_featured: Some("yes".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ProductError::Validation {
                parameter: "is_featured",
                ..
            }
        ));
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let query = ProductQuery::new()
            .min_price(Decimal::new(1000, 2))
            .max_price(Decimal::new(2000, 2));

        let mut p = product(1);
        p.price = Decimal::new(1000, 2);
        assert!(query.matches(&p));
        p.price = Decimal::new(2000, 2);
        assert!(query.matches(&p));
        p.price = Decimal::new(2001, 2);
        assert!(!query.matches(&p));
    }

    #[test]
    fn test_one_sided_price_bound() {
        let query = list(ListParams {
            min_price: Some("50".into()),
            ..Default::default()
        })
        .unwrap();

        let mut p = product(1);
        p.price = Decimal::new(999_999, 2);
        assert!(query.matches(&p));
        p.price = Decimal::new(4999, 2);
        assert!(!query.matches(&p));
    }

    #[test]
    fn test_invalid_prices_are_rejected() {
        for raw in ["abc", "-1", "1.2.3"] {
            let err = list(ListParams {
                max_price: Some(raw.into()),
                ..Default::default()
            })
            .unwrap_err();
            assert!(
                matches!(
                    err,
                    ProductError::Validation {
                        parameter: "max_price",
                        ..
                    }
                ),
                "input {}",
                raw
            );
        }
    }

    #[test]
    fn test_inverted_price_range_matches_nothing() {
        let query = list(ListParams {
            min_price: Some("100".into()),
            max_price: Some("10".into()),
            ..Default::default()
        })
        .unwrap();

        assert!(!query.matches(&product(1)));
    }

    #[test]
    fn test_search_covers_category_but_list_does_not() {
        let mut p = product(1);
        p.category = "Kitchenware".into();

        let search = ProductQuery::from_search_params(&SearchParams {
            q: Some("kitchen".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(search.matches(&p));

        let listed = list(ListParams {
            search: Some("kitchen".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(!listed.matches(&p));
    }

    #[test]
    fn test_search_phrase_is_case_insensitive_substring() {
        let mut p = product(1);
        p.short_description = "Washed LINEN apron".into();

        let query = ProductQuery::from_search_params(&SearchParams {
            q: Some("linen apr".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(query.matches(&p));
    }

    #[test]
    fn test_search_phrase_keeps_surrounding_whitespace() {
        let mut p = product(1);
        p.name = "Brass Desk Lamp".into();

        let search = |q: &str| {
            ProductQuery::from_search_params(&SearchParams {
                q: Some(q.into()),
                ..Default::default()
            })
            .unwrap()
        };

        assert!(!search("lamp ").matches(&p));
        assert!(search("desk ").matches(&p));
        assert!(search(" ").matches(&p));
        assert!(search(" ").text_filter().is_some());
        assert!(search("").text_filter().is_none());

        p.name = "Lamp".into();
        assert!(!search(" ").matches(&p));
    }

    #[test]
    fn test_list_terms_must_all_match() {
        let mut p = product(1);
        p.name = "Brass Desk Lamp".into();
        p.description = "Linen shade".into();

        let both = TextSearch::terms("brass, linen", LIST_SEARCH_FIELDS).unwrap();
        assert_eq!(both.term_list().len(), 2);
        assert!(ProductQuery::new().text(both).matches(&p));

        let one_missing = TextSearch::terms("brass wool", LIST_SEARCH_FIELDS).unwrap();
        assert!(!ProductQuery::new().text(one_missing).matches(&p));
    }

    #[test]
    fn test_ordering_parsing() {
        let query = list(ListParams {
            ordering: Some("-rating, price".into()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            query.ordering(),
            &[
                OrderKey::desc(SortField::Rating),
                OrderKey::asc(SortField::Price)
            ]
        );
    }

    #[test]
    fn test_unknown_ordering_field_is_rejected() {
        let err = list(ListParams {
            ordering: Some("price,-name".into()),
            ..Default::default()
        })
        .unwrap_err();

        match err {
            ProductError::Validation { parameter, message } => {
                assert_eq!(parameter, "ordering");
                assert!(message.contains("'name'"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_compare_breaks_ties_by_id() {
        let query = ProductQuery::featured_catalog();
        let mut a = product(2);
        let mut b = product(1);
        a.rating = 4.8;
        b.rating = 4.8;

        assert_eq!(query.compare(&a, &b), Ordering::Greater);

        b.rating = 4.1;
        assert_eq!(query.compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_compare_without_ordering_is_by_id() {
        let query = ProductQuery::new();
        assert_eq!(query.compare(&product(1), &product(3)), Ordering::Less);
    }
}
