//! Product catalog.
//!
//! Products live in two stores: the primary `products` table and the
//! `product_mirror` table (which may sit in a second database). Both hold
//! loosely typed rows; every read goes through [`schema::normalize`] and
//! every lookup by key through [`lookup::LOOKUP_CHAIN`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, Money};

pub mod cache;
pub mod lookup;
pub mod mirror;
pub mod primary;
pub mod schema;
pub mod tombstone;

/// A normalized product: every field has a value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    /// Id the product had in the previous catalog, if imported.
    pub legacy_id: Option<String>,
    pub code: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Money,
    pub currency: Currency,
    pub stock: i64,
    pub active: bool,
    pub images: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Which store a raw record was read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordSource {
    Primary,
    Mirror,
}

/// A product row as stored, before normalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductRecord {
    pub source: RecordSource,
    pub id: String,
    pub legacy_id: Option<String>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_minor: Option<i64>,
    pub currency: Option<String>,
    pub stock: Option<i64>,
    pub active: Option<bool>,
    /// JSON array of image URLs.
    pub images: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Search filters. `page` is 1-based.
#[derive(Clone, Debug, Default)]
pub struct ProductQuery {
    /// Free text matched against the normalized name and the code.
    pub q: Option<String>,
    pub category: Option<String>,
    pub active: Option<bool>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Implements the record/active-model conversions for a product store entity.
///
/// Both stores share the same columns, so the mapping is generated once.
macro_rules! impl_product_store {
    ($source:expr) => {
        impl From<Model> for crate::products::ProductRecord {
            fn from(model: Model) -> Self {
                Self {
                    source: $source,
                    id: model.id,
                    legacy_id: model.legacy_id,
                    code: model.code,
                    name: model.name,
                    description: model.description,
                    category: model.category,
                    price_minor: model.price_minor,
                    currency: model.currency,
                    stock: model.stock,
                    active: model.active,
                    images: model.images,
                    created_at: model.created_at,
                    updated_at: model.updated_at,
                }
            }
        }

        impl TryFrom<&crate::products::Product> for ActiveModel {
            type Error = crate::EngineError;

            fn try_from(product: &crate::products::Product) -> crate::ResultEngine<Self> {
                use sea_orm::ActiveValue;

                Ok(Self {
                    id: ActiveValue::Set(product.id.to_string()),
                    legacy_id: ActiveValue::Set(product.legacy_id.clone()),
                    code: ActiveValue::Set(Some(product.code.clone())),
                    name: ActiveValue::Set(Some(product.name.clone())),
                    name_norm: ActiveValue::Set(Some(crate::util::normalize_search_key(
                        &product.name,
                    ))),
                    description: ActiveValue::Set(Some(product.description.clone())),
                    category: ActiveValue::Set(Some(product.category.clone())),
                    price_minor: ActiveValue::Set(Some(product.price.minor())),
                    currency: ActiveValue::Set(Some(product.currency.code().to_string())),
                    stock: ActiveValue::Set(Some(product.stock)),
                    active: ActiveValue::Set(Some(product.active)),
                    images: ActiveValue::Set(Some(serde_json::to_string(&product.images)?)),
                    created_at: ActiveValue::Set(product.created_at),
                    updated_at: ActiveValue::Set(product.updated_at),
                })
            }
        }
    };
}

pub(crate) use impl_product_store;
