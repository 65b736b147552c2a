use chrono::NaiveDate;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Balance, DayWindow, LedgerSource, ResultEngine, Sale, SaleSource, SaleStatus, Transaction,
    TransactionCmd, collect_day, sales, transactions,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Record a manual ledger entry (`Ingreso`, `Egreso`, `Compra` or `Ajuste`).
    pub async fn record_transaction(&self, cmd: TransactionCmd) -> ResultEngine<Transaction> {
        let TransactionCmd {
            kind,
            amount,
            currency,
            description,
            user,
            occurred_at,
            reference,
            category,
            receivable,
            is_debt,
        } = cmd;

        let description = normalize_required_text(&description, "description")?;
        let user = normalize_required_text(&user, "user")?;
        let mut tx = Transaction::new(kind, occurred_at, amount, currency, description, user)?;
        tx.reference = normalize_optional_text(reference.as_deref());
        tx.category = normalize_optional_text(category.as_deref());
        tx.receivable = receivable;
        tx.is_debt = is_debt;

        with_tx!(self, |db_tx| {
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            Ok::<_, crate::EngineError>(())
        })?;

        tracing::info!(
            id = %tx.id,
            kind = tx.kind.as_str(),
            amount = %tx.amount,
            currency = %tx.currency,
            "transaction recorded"
        );
        Ok(tx)
    }

    /// Every transaction of the local business day, newest first.
    pub async fn transactions_for_day(&self, date: NaiveDate) -> ResultEngine<Vec<Transaction>> {
        let window = self.day_window(date)?;
        Ok(collect_day(self, self, &window).await)
    }

    /// Per-currency balance of the local business day.
    pub async fn balance_for_day(&self, date: NaiveDate) -> ResultEngine<Balance> {
        let transactions = self.transactions_for_day(date).await?;
        Balance::from_transactions(&transactions)
    }
}

impl LedgerSource for Engine {
    async fn manual_transactions(&self, window: &DayWindow) -> ResultEngine<Vec<Transaction>> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::OccurredAt.gte(window.start()))
            .filter(transactions::Column::OccurredAt.lte(window.end()))
            .order_by_desc(transactions::Column::OccurredAt)
            .all(&self.database)
            .await?;

        Ok(models
            .into_iter()
            .filter_map(|model| {
                let id = model.id.clone();
                Transaction::try_from(model)
                    .inspect_err(|err| {
                        tracing::warn!(id = %id, "skipping unreadable transaction: {err}")
                    })
                    .ok()
            })
            .collect())
    }
}

impl SaleSource for Engine {
    async fn settled_sales(&self, window: &DayWindow) -> ResultEngine<Vec<Sale>> {
        let models = sales::Entity::find()
            .filter(
                sales::Column::Status
                    .is_in([SaleStatus::Paid.as_str(), SaleStatus::Delivered.as_str()]),
            )
            .filter(sales::Column::PaidAt.gte(window.start()))
            .filter(sales::Column::PaidAt.lte(window.end()))
            .all(&self.database)
            .await?;

        Ok(models
            .into_iter()
            .filter_map(|model| {
                let id = model.id.clone();
                Sale::try_from(model)
                    .inspect_err(|err| {
                        tracing::warn!(id = %id, "skipping unreadable sale: {err}")
                    })
                    .ok()
            })
            .collect())
    }
}
