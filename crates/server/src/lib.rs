use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run_with_listener};

mod products;
mod register;
mod sales;
mod server;
mod user;
mod views;

pub mod types {
    pub use api_types::Currency;

    pub mod register {
        pub use api_types::{
            Currency,
            register::{
                BalanceView, ClosingList, ClosingListResponse, ClosingNew, ClosingStatus,
                ClosingView, CurrencyBalanceView, DayQuery, DayTransactions, TransactionKind,
                TransactionNew, TransactionView,
            },
        };
    }

    pub mod sale {
        pub use api_types::sale::{PaymentMethod, SaleNew, SaleStatus, SaleStatusUpdate, SaleView};
    }

    pub mod product {
        pub use api_types::product::{
            ProductNew, ProductPage, ProductSearch, ProductUpdate, ProductView,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    message: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) | EngineError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::InvalidAmount(_)
        | EngineError::InvalidTransaction(_)
        | EngineError::InvalidProduct(_)
        | EngineError::InvalidDate(_)
        | EngineError::InvalidId(_)
        | EngineError::InvalidCursor(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Serialization(json_err) => {
            tracing::error!("serialization error: {json_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { message })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
