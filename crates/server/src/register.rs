//! Cash register API endpoints

use api_types::register::{
    BalanceView, ClosingList, ClosingListResponse, ClosingNew, ClosingView, DayQuery,
    DayTransactions, TransactionNew, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{NaiveDate, Utc};
use engine::{CloseRegisterCmd, Money, TransactionCmd};
use uuid::Uuid;

use crate::{
    ServerError,
    server::ServerState,
    user,
    views::{balance_view, closing_view, currency_from_api, kind_from_api, transaction_view},
};

const DEFAULT_CLOSINGS_LIMIT: u64 = 50;

fn business_day(state: &ServerState, date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| {
        Utc::now()
            .with_timezone(&state.engine.timezone())
            .date_naive()
    })
}

/// Transactions of a business day, newest first.
pub async fn day_transactions(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<DayQuery>,
) -> Result<Json<DayTransactions>, ServerError> {
    let date = business_day(&state, query.date);
    let timezone = state.engine.timezone();
    let transactions = state
        .engine
        .transactions_for_day(date)
        .await?
        .into_iter()
        .map(|tx| transaction_view(tx, timezone))
        .collect();

    Ok(Json(DayTransactions { date, transactions }))
}

pub async fn record_transaction(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let occurred_at = payload
        .occurred_at
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    let mut cmd = TransactionCmd::new(
        kind_from_api(payload.kind),
        Money::new(payload.amount_minor),
        payload.description,
        user.username,
        occurred_at,
    )
    .receivable(payload.receivable)
    .is_debt(payload.is_debt);
    if let Some(currency) = payload.currency {
        cmd = cmd.currency(currency_from_api(currency));
    }
    if let Some(reference) = payload.reference {
        cmd = cmd.reference(reference);
    }
    if let Some(category) = payload.category {
        cmd = cmd.category(category);
    }

    let tx = state.engine.record_transaction(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(transaction_view(tx, state.engine.timezone())),
    ))
}

pub async fn balance(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<DayQuery>,
) -> Result<Json<BalanceView>, ServerError> {
    let date = business_day(&state, query.date);
    let balance = state.engine.balance_for_day(date).await?;

    Ok(Json(BalanceView {
        date,
        currencies: balance_view(&balance),
        total_minor: balance.total().minor(),
    }))
}

/// Close the register. The closing user is the authenticated one.
pub async fn close(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ClosingNew>,
) -> Result<(StatusCode, Json<ClosingView>), ServerError> {
    let date = business_day(&state, payload.date);
    let mut cmd = CloseRegisterCmd::new(
        date,
        user.username,
        Money::new(payload.counted_minor),
        Utc::now(),
    );
    if let Some(currency) = payload.currency {
        cmd = cmd.currency(currency_from_api(currency));
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }

    let closing = state.engine.close_register(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(closing_view(closing, state.engine.timezone())),
    ))
}

pub async fn list_closings(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ClosingList>,
) -> Result<Json<ClosingListResponse>, ServerError> {
    let limit = query.limit.unwrap_or(DEFAULT_CLOSINGS_LIMIT);
    if limit == 0 {
        return Err(ServerError::Generic("limit must be > 0".to_string()));
    }

    let (closings, next_cursor) = state
        .engine
        .list_closings(limit, query.cursor.as_deref())
        .await?;
    let timezone = state.engine.timezone();

    Ok(Json(ClosingListResponse {
        closings: closings
            .into_iter()
            .map(|closing| closing_view(closing, timezone))
            .collect(),
        next_cursor,
    }))
}

pub async fn get_closing(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClosingView>, ServerError> {
    let closing = state.engine.closing(id).await?;
    Ok(Json(closing_view(closing, state.engine.timezone())))
}
