//! Sales intake endpoints

use api_types::sale::{SaleNew, SaleStatusUpdate, SaleView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{Money, SaleCmd};
use uuid::Uuid;

use crate::{
    ServerError,
    server::ServerState,
    user,
    views::{currency_from_api, payment_details_from_api, sale_status_from_api, sale_view},
};

pub async fn record(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SaleNew>,
) -> Result<(StatusCode, Json<SaleView>), ServerError> {
    let created_at = payload
        .created_at
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    let mut cmd = SaleCmd::new(
        payload.order_number,
        Money::new(payload.total_minor),
        created_at,
    );
    if let Some(customer) = payload.customer {
        cmd = cmd.customer(customer);
    }
    if let Some(currency) = payload.currency {
        cmd = cmd.currency(currency_from_api(currency));
    }
    if let Some(amounts) = payload.payment_details {
        cmd = cmd.payment_details(payment_details_from_api(amounts));
    }

    let sale = state.engine.record_sale(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(sale_view(sale, state.engine.timezone())),
    ))
}

pub async fn set_status(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaleStatusUpdate>,
) -> Result<Json<SaleView>, ServerError> {
    let at = payload
        .at
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);
    let sale = state
        .engine
        .set_sale_status(id, sale_status_from_api(payload.status), at)
        .await?;
    Ok(Json(sale_view(sale, state.engine.timezone())))
}
