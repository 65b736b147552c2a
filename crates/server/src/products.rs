//! Product catalog endpoints
//!
//! `{id}` accepts a product id, a legacy id or a product code.

use api_types::product::{ProductNew, ProductPage, ProductSearch, ProductUpdate, ProductView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Money, ProductCmd, ProductPatch, ProductQuery};

use crate::{
    ServerError,
    server::ServerState,
    user,
    views::{currency_from_api, product_view},
};

pub async fn search(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ProductSearch>,
) -> Result<Json<ProductPage>, ServerError> {
    let page = state
        .engine
        .search_products(&ProductQuery {
            q: query.q,
            category: query.category,
            active: query.active,
            page: query.page,
            per_page: query.per_page,
        })
        .await?;
    let timezone = state.engine.timezone();

    Ok(Json(ProductPage {
        items: page
            .items
            .into_iter()
            .map(|product| product_view(product, timezone))
            .collect(),
        total: page.total,
        page: page.page,
        per_page: page.per_page,
    }))
}

pub async fn get(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(key): Path<String>,
) -> Result<Json<ProductView>, ServerError> {
    let product = state.engine.product(&key).await?;
    Ok(Json(product_view(product, state.engine.timezone())))
}

pub async fn create(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ProductNew>,
) -> Result<(StatusCode, Json<ProductView>), ServerError> {
    let cmd = ProductCmd {
        legacy_id: payload.legacy_id,
        code: payload.code,
        name: payload.name,
        description: payload.description,
        category: payload.category,
        price: payload.price_minor.map(Money::new),
        currency: payload.currency.map(currency_from_api),
        stock: payload.stock,
        active: payload.active,
        images: payload.images,
    };

    let product = state.engine.create_product(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(product_view(product, state.engine.timezone())),
    ))
}

pub async fn update(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(key): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> Result<Json<ProductView>, ServerError> {
    let patch = ProductPatch {
        code: payload.code,
        name: payload.name,
        description: payload.description,
        category: payload.category,
        price: payload.price_minor.map(Money::new),
        currency: payload.currency.map(currency_from_api),
        stock: payload.stock,
        active: payload.active,
        images: payload.images,
    };
    if patch.is_empty() {
        return Err(ServerError::Generic("nothing to update".to_string()));
    }

    let product = state.engine.update_product(&key, patch).await?;
    Ok(Json(product_view(product, state.engine.timezone())))
}

pub async fn delete(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_product(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}
