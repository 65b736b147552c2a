use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tokio::sync::broadcast::error::RecvError;

use std::sync::Arc;

use crate::{products, register, sales, user};
use engine::{CacheEvent, Engine};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/register/transactions",
            get(register::day_transactions).post(register::record_transaction),
        )
        .route("/register/balance", get(register::balance))
        .route(
            "/register/closings",
            get(register::list_closings).post(register::close),
        )
        .route("/register/closings/{id}", get(register::get_closing))
        .route("/sales", post(sales::record))
        .route("/sales/{id}/status", post(sales::set_status))
        .route("/products", get(products::search).post(products::create))
        .route(
            "/products/{id}",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

/// Logs product cache invalidations until the engine goes away.
fn spawn_cache_logger(engine: &Engine) {
    let mut events = engine.subscribe_products();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(CacheEvent::Invalidated(id)) => tracing::debug!(%id, "product cache invalidated"),
                Ok(CacheEvent::Cleared) => tracing::debug!("product cache cleared"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "product cache events lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    spawn_cache_logger(&engine);
    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}
