use async_trait::async_trait;
use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};
use std::collections::HashMap;

use crate::{
    entity::{product, product_image},
    error::ProductResult,
    models::{ProductImage, ProductRecord},
    pagination::Window,
    query::{ProductQuery, SearchField, SortField},
    repository::ProductRepository,
};

/// PostgreSQL implementation of ProductRepository
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load_images(&self, product_ids: Vec<i64>) -> ProductResult<HashMap<i64, Vec<ProductImage>>> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let models = product_image::Entity::find()
            .filter(product_image::Column::ProductId.is_in(product_ids))
            .order_by_asc(product_image::Column::Id)
            .all(&self.db)
            .await?;

        let mut grouped: HashMap<i64, Vec<ProductImage>> = HashMap::new();
        for model in models {
            grouped
                .entry(model.product_id)
                .or_default()
                .push(model.into());
        }
        Ok(grouped)
    }
}

fn search_column(field: SearchField) -> product::Column {
    match field {
        SearchField::Name => product::Column::Name,
        SearchField::Description => product::Column::Description,
        SearchField::ShortDescription => product::Column::ShortDescription,
        SearchField::Category => product::Column::Category,
    }
}

fn sort_column(field: SortField) -> product::Column {
    match field {
        SortField::Price => product::Column::Price,
        SortField::Rating => product::Column::Rating,
        SortField::CreatedAt => product::Column::CreatedAt,
    }
}

/// Escapes LIKE wildcards so terms match literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// WHERE clause for a query plan
pub(crate) fn condition(query: &ProductQuery) -> Condition {
    let mut cond = Condition::all();

    if let Some(category) = query.category_filter() {
        cond = cond.add(product::Column::Category.eq(category));
    }
    if let Some(featured) = query.featured_filter() {
        cond = cond.add(product::Column::IsFeatured.eq(featured));
    }
    if let Some(min) = query.min_price_filter() {
        cond = cond.add(product::Column::Price.gte(min));
    }
    if let Some(max) = query.max_price_filter() {
        cond = cond.add(product::Column::Price.lte(max));
    }
    if let Some(text) = query.text_filter() {
        for term in text.term_list() {
            let pattern = format!("%{}%", escape_like(term));
            let any = text.fields().iter().fold(Condition::any(), |any, field| {
                any.add(Expr::col((product::Entity, search_column(*field))).ilike(pattern.as_str()))
            });
            cond = cond.add(any);
        }
    }

    cond
}

/// Filtered select; an empty plan gets no WHERE clause
fn filtered(query: &ProductQuery) -> Select<product::Entity> {
    let cond = condition(query);
    if cond.is_empty() {
        product::Entity::find()
    } else {
        product::Entity::find().filter(cond)
    }
}

/// Filtered and ordered select, ties broken by id
pub(crate) fn select(query: &ProductQuery) -> Select<product::Entity> {
    let mut select = filtered(query);
    for key in query.ordering() {
        let order = if key.descending { Order::Desc } else { Order::Asc };
        select = select.order_by(sort_column(key.field), order);
    }
    select.order_by_asc(product::Column::Id)
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn get_by_id(&self, id: i64) -> ProductResult<Option<ProductRecord>> {
        let Some(model) = product::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut images = self.load_images(vec![id]).await?;
        let record = ProductRecord::new(model.into(), images.remove(&id).unwrap_or_default());
        Ok(Some(record))
    }

    async fn count(&self, query: &ProductQuery) -> ProductResult<u64> {
        let count = filtered(query).count(&self.db).await?;
        Ok(count)
    }

    async fn fetch(
        &self,
        query: &ProductQuery,
        window: Option<Window>,
    ) -> ProductResult<Vec<ProductRecord>> {
        let mut select = select(query);
        if let Some(window) = window {
            select = select.offset(window.offset).limit(window.limit);
        }

        let models = select.all(&self.db).await?;
        tracing::debug!(rows = models.len(), "Fetched products");

        let mut images = self
            .load_images(models.iter().map(|m| m.id).collect())
            .await?;

        Ok(models
            .into_iter()
            .map(|model| {
                let product_images = images.remove(&model.id).unwrap_or_default();
                ProductRecord::new(model.into(), product_images)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{PgProductRepository, escape_like, select};
    use crate::entity::{product, product_image};
    use crate::pagination::Window;
    use crate::query::{LIST_SEARCH_FIELDS, OrderKey, ProductQuery, SEARCH_FIELDS, SortField, TextSearch};
    use crate::repository::ProductRepository;
    use chrono::{FixedOffset, TimeZone};
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait};

    fn sql(query: &ProductQuery) -> String {
        select(query).build(DatabaseBackend::Postgres).to_string()
    }

    fn product_model(id: i64) -> product::Model {
        let ts = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 1, 0, 0, 0)
            .unwrap();
        product::Model {
            id,
            name: format!("Product {}", id),
            category: "home".into(),
            price: Decimal::new(2500, 2),
            description: String::new(),
            short_description: String::new(),
            meta_description: String::new(),
            image: None,
            rating: 4.0,
            is_featured: true,
            stock_quantity: 3,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn image_model(id: i64, product_id: i64) -> product_image::Model {
        product_image::Model {
            id,
            product_id,
            image: format!("products/{}.jpg", id),
            is_primary: false,
            alt_text: String::new(),
        }
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("wool"), "wool");
    }

    #[test]
    fn test_empty_plan_orders_by_id_only() {
        let sql = sql(&ProductQuery::new());
        assert!(!sql.contains("WHERE"));
        assert!(sql.ends_with(r#"FROM "products" ORDER BY "products"."id" ASC"#));
    }

    #[test]
    fn test_search_phrase_is_not_trimmed() {
        let text = TextSearch::phrase("lamp ", SEARCH_FIELDS).unwrap();
        let sql = sql(&ProductQuery::new().text(text));

        assert_eq!(sql.matches("ILIKE '%lamp %'").count(), SEARCH_FIELDS.len());
        assert!(sql.contains(r#""products"."category" ILIKE"#));
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let query = ProductQuery::new()
            .category("home")
            .featured(true)
            .min_price(Decimal::new(10, 0));
        let sql = sql(&query);

        assert!(sql.contains(r#""products"."category" = 'home'"#));
        assert!(sql.contains(r#""products"."is_featured" = TRUE"#));
        assert!(sql.contains(r#""products"."price" >= 10"#));
        assert_eq!(sql.matches(" AND ").count(), 2);
    }

    #[test]
    fn test_text_search_uses_ilike_per_field() {
        let text = TextSearch::terms("wool", LIST_SEARCH_FIELDS).unwrap();
        let sql = sql(&ProductQuery::new().text(text));

        assert_eq!(sql.matches("ILIKE '%wool%'").count(), 3);
        assert!(sql.contains(" OR "));
    }

    #[test]
    fn test_ordering_precedes_id_tiebreak() {
        let query = ProductQuery::new().order_by(vec![OrderKey::desc(SortField::Rating)]);
        let sql = sql(&query);

        assert!(sql.contains(r#"ORDER BY "products"."rating" DESC, "products"."id" ASC"#));
    }

    #[tokio::test]
    async fn test_fetch_attaches_images() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product_model(1), product_model(2)]])
            .append_query_results([vec![image_model(3, 2), image_model(5, 2)]])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let records = repo
            .fetch(&ProductQuery::featured_catalog(), Some(Window { offset: 0, limit: 10 }))
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert!(records[0].images.is_empty());
        let image_ids: Vec<i64> = records[1].images.iter().map(|i| i.id).collect();
        assert_eq!(image_ids, vec![3, 5]);
    }

    #[tokio::test]
    async fn test_get_by_id_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<product::Model>::new()])
            .into_connection();
        let repo = PgProductRepository::new(db);

        assert!(repo.get_by_id(99).await.unwrap().is_none());
    }
}
