use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Sale, SaleCmd, SaleStatus, sales,
    util::{bounded_amount, normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Register an order as `pending`.
    ///
    /// A breakdown with a negative amount is rejected; the breakdown does not
    /// have to add up to `total`.
    pub async fn record_sale(&self, cmd: SaleCmd) -> ResultEngine<Sale> {
        let order_number = normalize_required_text(&cmd.order_number, "order number")?;
        if cmd.total.is_negative() {
            return Err(EngineError::InvalidAmount(
                "sale total must be >= 0".to_string(),
            ));
        }
        bounded_amount(cmd.total, "sale total")?;
        if let Some(details) = &cmd.payment_details {
            if details.amounts.values().any(|amount| amount.is_negative()) {
                return Err(EngineError::InvalidAmount(
                    "payment amounts must be >= 0".to_string(),
                ));
            }
            for amount in details.amounts.values() {
                bounded_amount(*amount, "payment amount")?;
            }
        }

        let sale = Sale {
            id: Uuid::new_v4(),
            order_number,
            customer: normalize_optional_text(cmd.customer.as_deref()),
            status: SaleStatus::Pending,
            total: cmd.total,
            currency: cmd.currency,
            payment_details: cmd.payment_details,
            created_at: cmd.created_at,
            paid_at: None,
        };

        with_tx!(self, |db_tx| {
            let existing = sales::Entity::find()
                .filter(sales::Column::OrderNumber.eq(sale.order_number.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(sale.order_number.clone()));
            }
            sales::ActiveModel::try_from(&sale)?.insert(&db_tx).await?;
            Ok::<_, EngineError>(())
        })?;

        tracing::info!(
            id = %sale.id,
            order = %sale.order_number,
            total = %sale.total,
            "sale recorded"
        );
        Ok(sale)
    }

    /// Move a sale to `status`.
    ///
    /// Settling a sale stamps `paid_at` with `at` unless it was already set;
    /// moving it back to `pending` clears it, so the sale leaves the register.
    pub async fn set_sale_status(
        &self,
        id: Uuid,
        status: SaleStatus,
        at: DateTime<Utc>,
    ) -> ResultEngine<Sale> {
        let sale = with_tx!(self, |db_tx| {
            let model = sales::Entity::find_by_id(id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("sale not exists".to_string()))?;
            let mut sale = Sale::try_from(model)?;

            sale.status = status;
            if status.is_settled() {
                sale.paid_at.get_or_insert(at);
            } else {
                sale.paid_at = None;
            }

            sales::ActiveModel::try_from(&sale)?.update(&db_tx).await?;
            Ok::<_, EngineError>(sale)
        })?;

        tracing::info!(id = %sale.id, status = sale.status.as_str(), "sale status changed");
        Ok(sale)
    }

    pub async fn sale(&self, id: Uuid) -> ResultEngine<Sale> {
        let model = sales::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("sale not exists".to_string()))?;
        Sale::try_from(model)
    }
}
