//! Transaction primitives.
//!
//! A `Transaction` is a single movement of money in one currency bucket. It is
//! either entered by hand (stored in `cash_transactions`) or derived from a
//! settled sale at collection time (never stored).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, EngineError, Money, ResultEngine,
    util::{bounded_amount, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Ingreso,
    Egreso,
    Venta,
    Compra,
    Ajuste,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ingreso => "Ingreso",
            Self::Egreso => "Egreso",
            Self::Venta => "Venta",
            Self::Compra => "Compra",
            Self::Ajuste => "Ajuste",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Ingreso" => Ok(Self::Ingreso),
            "Egreso" => Ok(Self::Egreso),
            "Venta" => Ok(Self::Venta),
            "Compra" => Ok(Self::Compra),
            "Ajuste" => Ok(Self::Ajuste),
            other => Err(EngineError::InvalidTransaction(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub time: DateTime<Utc>,
    pub kind: TransactionKind,
    pub amount: Money,
    pub currency: Currency,
    pub description: String,
    pub user: String,
    pub reference: Option<String>,
    pub category: Option<String>,
    /// Money owed to the business (sold on credit, not yet collected).
    pub receivable: bool,
    /// Money the business owes (bought on credit, not yet paid).
    pub is_debt: bool,
}

impl Transaction {
    /// Builds a manually entered transaction.
    ///
    /// `Ajuste` is the only signed kind; every other kind needs a positive
    /// amount. `Venta` rows only come from sales.
    pub fn new(
        kind: TransactionKind,
        time: DateTime<Utc>,
        amount: Money,
        currency: Currency,
        description: String,
        user: String,
    ) -> ResultEngine<Self> {
        validate_manual_entry(kind, amount)?;
        if description.trim().is_empty() {
            return Err(EngineError::InvalidTransaction(
                "description must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            time,
            kind,
            amount,
            currency,
            description,
            user,
            reference: None,
            category: None,
            receivable: false,
            is_debt: false,
        })
    }
}

fn validate_manual_entry(kind: TransactionKind, amount: Money) -> ResultEngine<()> {
    bounded_amount(amount, "amount")?;
    match kind {
        TransactionKind::Venta => Err(EngineError::InvalidTransaction(
            "sales are recorded through orders, not manual entries".to_string(),
        )),
        TransactionKind::Ajuste if amount.is_zero() => Err(EngineError::InvalidAmount(
            "adjustment must not be zero".to_string(),
        )),
        TransactionKind::Ajuste => Ok(()),
        _ if !amount.is_positive() => Err(EngineError::InvalidAmount(
            "amount must be > 0".to_string(),
        )),
        _ => Ok(()),
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub occurred_at: DateTimeUtc,
    pub kind: String,
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
    pub created_by: String,
    pub reference: Option<String>,
    pub category: Option<String>,
    pub receivable: bool,
    pub is_debt: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            occurred_at: ActiveValue::Set(tx.time),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount.minor()),
            currency: ActiveValue::Set(tx.currency.code().to_string()),
            description: ActiveValue::Set(tx.description.clone()),
            created_by: ActiveValue::Set(tx.user.clone()),
            reference: ActiveValue::Set(tx.reference.clone()),
            category: ActiveValue::Set(tx.category.clone()),
            receivable: ActiveValue::Set(tx.receivable),
            is_debt: ActiveValue::Set(tx.is_debt),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            time: model.occurred_at,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount: Money::new(model.amount_minor),
            currency: Currency::try_from(model.currency.as_str())?,
            description: model.description,
            user: model.created_by,
            reference: model.reference,
            category: model.category,
            receivable: model.receivable,
            is_debt: model.is_debt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual(kind: TransactionKind, amount: i64) -> ResultEngine<Transaction> {
        Transaction::new(
            kind,
            Utc::now(),
            Money::new(amount),
            Currency::Peso,
            "caja".to_string(),
            "ana".to_string(),
        )
    }

    #[test]
    fn positive_kinds_reject_non_positive_amounts() {
        assert!(manual(TransactionKind::Ingreso, 0).is_err());
        assert!(manual(TransactionKind::Egreso, -10).is_err());
        assert!(manual(TransactionKind::Compra, 100).is_ok());
    }

    #[test]
    fn adjustments_are_signed_but_not_zero() {
        assert!(manual(TransactionKind::Ajuste, -250).is_ok());
        assert!(manual(TransactionKind::Ajuste, 250).is_ok());
        assert!(manual(TransactionKind::Ajuste, 0).is_err());
    }

    #[test]
    fn sales_cannot_be_entered_by_hand() {
        assert!(matches!(
            manual(TransactionKind::Venta, 100),
            Err(EngineError::InvalidTransaction(_))
        ));
    }

    #[test]
    fn description_is_required() {
        let res = Transaction::new(
            TransactionKind::Ingreso,
            Utc::now(),
            Money::new(100),
            Currency::Peso,
            "   ".to_string(),
            "ana".to_string(),
        );
        assert!(res.is_err());
    }

    #[test]
    fn amounts_beyond_input_limit_are_rejected() {
        for amount in [i64::MAX, i64::MIN, Money::MAX_INPUT.minor() + 1] {
            assert!(matches!(
                manual(TransactionKind::Ajuste, amount),
                Err(EngineError::InvalidAmount(_))
            ));
        }
        assert!(manual(TransactionKind::Ingreso, Money::MAX_INPUT.minor()).is_ok());
    }

    #[test]
    fn model_round_trip_keeps_flags() {
        let mut tx = manual(TransactionKind::Egreso, 1500).unwrap();
        tx.is_debt = true;
        tx.reference = Some("factura 12".to_string());
        let active = ActiveModel::from(&tx);
        let model = Model {
            id: active.id.unwrap(),
            occurred_at: active.occurred_at.unwrap(),
            kind: active.kind.unwrap(),
            amount_minor: active.amount_minor.unwrap(),
            currency: active.currency.unwrap(),
            description: active.description.unwrap(),
            created_by: active.created_by.unwrap(),
            reference: active.reference.unwrap(),
            category: active.category.unwrap(),
            receivable: active.receivable.unwrap(),
            is_debt: active.is_debt.unwrap(),
        };
        assert_eq!(Transaction::try_from(model).unwrap(), tx);
    }
}
