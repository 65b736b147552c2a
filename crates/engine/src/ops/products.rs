use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
    sea_query::{Expr, LikeExpr},
};
use uuid::Uuid;

use crate::{
    EngineError, Money, ProductCmd, ProductPatch, ResultEngine,
    products::{
        DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Product, ProductPage, ProductQuery, RecordSource,
        lookup, mirror, primary,
        schema::{self, DEFAULTS},
        tombstone,
    },
    util::{bounded_amount, normalize_optional_text, normalize_search_key},
};

use super::{Engine, with_tx};

fn required_name(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidProduct(
            "name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// `LIKE` pattern matching `text` anywhere, with `%`, `_` and `\\` taken
/// literally.
fn contains_literal(text: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(text))).escape('\\')
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn valid_price(price: Money) -> ResultEngine<Money> {
    if price.is_negative() {
        return Err(EngineError::InvalidAmount("price must be >= 0".to_string()));
    }
    bounded_amount(price, "price")
}

impl Engine {
    /// Fetch a product by id, legacy id or code, falling back to the mirror.
    pub async fn product(&self, key: &str) -> ResultEngine<Product> {
        if let Ok(id) = Uuid::parse_str(key.trim())
            && let Some(product) = self.products.get(&id).await
        {
            return Ok(product);
        }

        let seen = self.products.generation().await;
        let record = lookup::resolve(&self.database, &self.mirror, key)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(key.to_string()))?;
        let product = schema::normalize(record)?;
        self.products.put(product.clone(), seen).await;
        Ok(product)
    }

    /// Search the primary store.
    ///
    /// `q` matches the accent-folded name or the code, literally (`%` and
    /// `_` are not wildcards). Rows that never had a category count as the
    /// default category, and rows without an `active` flag count as active.
    /// A page whose offset does not fit the database is `InvalidCursor`.
    pub async fn search_products(&self, query: &ProductQuery) -> ResultEngine<ProductPage> {
        let per_page = query
            .per_page
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let page = query.page.unwrap_or(1).max(1);
        let offset_fits = page
            .checked_mul(per_page)
            .is_some_and(|end| end <= i64::MAX as u64);
        if !offset_fits {
            return Err(EngineError::InvalidCursor(format!("page {page} out of range")));
        }

        if let Err(err) = self.backfill_search_keys().await {
            tracing::warn!("product search key backfill failed: {err}");
        }

        let mut select = primary::Entity::find();
        if let Some(q) = normalize_optional_text(query.q.as_deref()) {
            let name_key = normalize_search_key(&q);
            select = select.filter(
                Condition::any()
                    .add(primary::Column::NameNorm.like(contains_literal(&name_key)))
                    .add(primary::Column::Code.like(contains_literal(&q))),
            );
        }
        if let Some(category) = normalize_optional_text(query.category.as_deref()) {
            let mut condition =
                Condition::any().add(primary::Column::Category.eq(category.clone()));
            if category == DEFAULTS.category {
                condition = condition.add(primary::Column::Category.is_null());
            }
            select = select.filter(condition);
        }
        match query.active {
            Some(true) => {
                select = select.filter(
                    Condition::any()
                        .add(primary::Column::Active.eq(true))
                        .add(primary::Column::Active.is_null()),
                );
            }
            Some(false) => select = select.filter(primary::Column::Active.eq(false)),
            None => {}
        }

        let paginator = select
            .order_by_asc(primary::Column::NameNorm)
            .order_by_asc(primary::Column::Id)
            .paginate(&self.database, per_page);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page - 1).await?;

        let items = models
            .into_iter()
            .filter_map(|model| {
                let id = model.id.clone();
                schema::normalize(model.into())
                    .inspect_err(|err| {
                        tracing::warn!(id = %id, "skipping unreadable product: {err}")
                    })
                    .ok()
            })
            .collect();

        Ok(ProductPage {
            items,
            total,
            page,
            per_page,
        })
    }

    /// Create a product in the primary store and copy it to the mirror.
    pub async fn create_product(&self, cmd: ProductCmd) -> ResultEngine<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            legacy_id: normalize_optional_text(cmd.legacy_id.as_deref()),
            code: normalize_optional_text(cmd.code.as_deref())
                .unwrap_or_else(|| DEFAULTS.code.to_string()),
            name: required_name(&cmd.name)?,
            description: normalize_optional_text(cmd.description.as_deref())
                .unwrap_or_else(|| DEFAULTS.description.to_string()),
            category: normalize_optional_text(cmd.category.as_deref())
                .unwrap_or_else(|| DEFAULTS.category.to_string()),
            price: valid_price(cmd.price.unwrap_or(Money::new(DEFAULTS.price_minor)))?,
            currency: cmd.currency.unwrap_or(DEFAULTS.currency),
            stock: cmd.stock.unwrap_or(DEFAULTS.stock),
            active: cmd.active.unwrap_or(DEFAULTS.active),
            images: cmd.images,
            created_at: Some(now),
            updated_at: Some(now),
        };

        with_tx!(self, |db_tx| {
            self.ensure_unique_keys(&db_tx, &product).await?;
            primary::ActiveModel::try_from(&product)?
                .insert(&db_tx)
                .await?;
            Ok::<_, EngineError>(())
        })?;

        self.sync_mirror(&product).await;
        self.products.invalidate(product.id).await;
        tracing::info!(id = %product.id, code = %product.code, "product created");
        Ok(product)
    }

    /// Apply `patch` to the product found under `key`.
    ///
    /// A product only present in the mirror is written back to the primary
    /// store.
    pub async fn update_product(&self, key: &str, patch: ProductPatch) -> ResultEngine<Product> {
        let record = lookup::resolve(&self.database, &self.mirror, key)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(key.to_string()))?;
        let source = record.source;
        let mut product = schema::normalize(record)?;

        if let Some(code) = patch.code {
            product.code = code.trim().to_string();
        }
        if let Some(name) = patch.name {
            product.name = required_name(&name)?;
        }
        if let Some(description) = patch.description {
            product.description = description.trim().to_string();
        }
        if let Some(category) = patch.category {
            product.category = normalize_optional_text(Some(category.as_str()))
                .unwrap_or_else(|| DEFAULTS.category.to_string());
        }
        if let Some(price) = patch.price {
            product.price = valid_price(price)?;
        }
        if let Some(currency) = patch.currency {
            product.currency = currency;
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        if let Some(active) = patch.active {
            product.active = active;
        }
        if let Some(images) = patch.images {
            product.images = images;
        }
        let now = Utc::now();
        product.created_at.get_or_insert(now);
        product.updated_at = Some(now);

        with_tx!(self, |db_tx| {
            self.ensure_unique_keys(&db_tx, &product).await?;
            let model = primary::ActiveModel::try_from(&product)?;
            let exists = primary::Entity::find_by_id(product.id.to_string())
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                model.update(&db_tx).await?;
            } else {
                model.insert(&db_tx).await?;
            }
            Ok::<_, EngineError>(())
        })?;

        if source == RecordSource::Mirror {
            tracing::info!(id = %product.id, "product restored from mirror");
        }
        self.sync_mirror(&product).await;
        self.products.invalidate(product.id).await;
        tracing::info!(id = %product.id, "product updated");
        Ok(product)
    }

    /// Delete the product found under `key` from both stores.
    ///
    /// The id is tombstoned in the primary store, so a mirror row left behind
    /// by a failed mirror delete is never served again.
    pub async fn delete_product(&self, key: &str) -> ResultEngine<Product> {
        let record = lookup::resolve(&self.database, &self.mirror, key)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(key.to_string()))?;
        let product = schema::normalize(record)?;
        let id = product.id.to_string();

        with_tx!(self, |db_tx| {
            primary::Entity::delete_by_id(id.clone())
                .exec(&db_tx)
                .await?;
            tombstone::ActiveModel {
                id: ActiveValue::Set(id.clone()),
                deleted_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok::<_, EngineError>(())
        })?;

        if let Err(err) = mirror::Entity::delete_by_id(id).exec(&self.mirror).await {
            tracing::warn!(id = %product.id, "mirror delete failed: {err}");
        }
        self.products.invalidate(product.id).await;
        tracing::info!(id = %product.id, "product deleted");
        Ok(product)
    }

    /// Fills `name_norm` on rows written outside the engine (imports, older
    /// rows), so free-text search sees them. Missing names use the default
    /// name, as reads do.
    async fn backfill_search_keys(&self) -> ResultEngine<()> {
        let rows = primary::Entity::find()
            .filter(primary::Column::NameNorm.is_null())
            .all(&self.database)
            .await?;
        if rows.is_empty() {
            return Ok(());
        }

        for row in &rows {
            let name = row
                .name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or(DEFAULTS.name);
            primary::Entity::update_many()
                .col_expr(
                    primary::Column::NameNorm,
                    Expr::value(normalize_search_key(name)),
                )
                .filter(primary::Column::Id.eq(row.id.clone()))
                .exec(&self.database)
                .await?;
        }
        tracing::debug!(count = rows.len(), "product search keys backfilled");
        Ok(())
    }

    /// Drop every cached product.
    pub async fn clear_product_cache(&self) {
        self.products.clear().await;
    }

    /// Codes and legacy ids identify a product, so two products cannot share
    /// one.
    async fn ensure_unique_keys<C>(&self, db: &C, product: &Product) -> ResultEngine<()>
    where
        C: sea_orm::ConnectionTrait,
    {
        let id = product.id.to_string();
        if !product.code.is_empty() {
            let clash = primary::Entity::find()
                .filter(primary::Column::Code.eq(product.code.clone()))
                .filter(primary::Column::Id.ne(id.clone()))
                .one(db)
                .await?;
            if clash.is_some() {
                return Err(EngineError::ExistingKey(product.code.clone()));
            }
        }
        if let Some(legacy_id) = &product.legacy_id {
            let clash = primary::Entity::find()
                .filter(primary::Column::LegacyId.eq(legacy_id.clone()))
                .filter(primary::Column::Id.ne(id))
                .one(db)
                .await?;
            if clash.is_some() {
                return Err(EngineError::ExistingKey(legacy_id.clone()));
            }
        }
        Ok(())
    }

    async fn sync_mirror(&self, product: &Product) {
        if let Err(err) = self.upsert_mirror(product).await {
            tracing::warn!(id = %product.id, "mirror write failed: {err}");
        }
    }

    async fn upsert_mirror(&self, product: &Product) -> ResultEngine<()> {
        let model = mirror::ActiveModel::try_from(product)?;
        let exists = mirror::Entity::find_by_id(product.id.to_string())
            .one(&self.mirror)
            .await?
            .is_some();
        if exists {
            model.update(&self.mirror).await?;
        } else {
            model.insert(&self.mirror).await?;
        }
        Ok(())
    }
}
