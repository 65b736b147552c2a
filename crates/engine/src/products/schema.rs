//! Product schema normalization.
//!
//! Stored rows may miss any field (older imports, partial mirror writes).
//! Missing or unreadable fields take the value in [`DEFAULTS`]:
//!
//! | field         | default      |
//! |---------------|--------------|
//! | `code`        | `""`         |
//! | `name`        | `Sin nombre` |
//! | `description` | `""`         |
//! | `category`    | `General`    |
//! | `price`       | `0`          |
//! | `currency`    | `PESO`       |
//! | `stock`       | `0`          |
//! | `active`      | `true`       |
//! | `images`      | `[]`         |
//!
//! A negative price, an unknown currency code or a malformed image list are
//! treated as missing and logged.

use uuid::Uuid;

use super::{Product, ProductRecord};
use crate::{Currency, EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug)]
pub struct ProductDefaults {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub price_minor: i64,
    pub currency: Currency,
    pub stock: i64,
    pub active: bool,
}

pub const DEFAULTS: ProductDefaults = ProductDefaults {
    code: "",
    name: "Sin nombre",
    description: "",
    category: "General",
    price_minor: 0,
    currency: Currency::Peso,
    stock: 0,
    active: true,
};

fn text_or(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Turns a stored record into a [`Product`], filling every gap from
/// [`DEFAULTS`]. Only an unreadable id is an error.
pub fn normalize(record: ProductRecord) -> ResultEngine<Product> {
    let id = Uuid::parse_str(record.id.trim())
        .map_err(|_| EngineError::InvalidId(format!("invalid product id: {}", record.id)))?;

    let price_minor = match record.price_minor {
        Some(price) if price < 0 => {
            tracing::warn!(%id, price, "negative product price, using default");
            DEFAULTS.price_minor
        }
        Some(price) => price,
        None => DEFAULTS.price_minor,
    };

    let currency = match record.currency.as_deref() {
        Some(code) => Currency::try_from(code).unwrap_or_else(|_| {
            tracing::warn!(%id, code, "unknown product currency, using default");
            DEFAULTS.currency
        }),
        None => DEFAULTS.currency,
    };

    let images = match record.images.as_deref() {
        Some(raw) => serde_json::from_str::<Vec<String>>(raw).unwrap_or_else(|err| {
            tracing::warn!(%id, "malformed product images, using default: {err}");
            Vec::new()
        }),
        None => Vec::new(),
    };

    Ok(Product {
        id,
        legacy_id: record
            .legacy_id
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
        code: text_or(record.code, DEFAULTS.code),
        name: text_or(record.name, DEFAULTS.name),
        description: text_or(record.description, DEFAULTS.description),
        category: text_or(record.category, DEFAULTS.category),
        price: Money::new(price_minor),
        currency,
        stock: record.stock.unwrap_or(DEFAULTS.stock),
        active: record.active.unwrap_or(DEFAULTS.active),
        images,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}
