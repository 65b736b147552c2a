//! Mirror product store.
//!
//! Kept in sync on every product write, best effort. Reads fall back to it
//! when the primary store has no match.

use sea_orm::entity::prelude::*;

use super::{RecordSource, impl_product_store};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "product_mirror")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub legacy_id: Option<String>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub name_norm: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_minor: Option<i64>,
    pub currency: Option<String>,
    pub stock: Option<i64>,
    pub active: Option<bool>,
    pub images: Option<String>,
    pub created_at: Option<DateTimeUtc>,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl_product_store!(RecordSource::Mirror);
