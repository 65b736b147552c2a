//! Cash closings.
//!
//! A closing is an append-only snapshot: the computed balance of a business
//! day next to what the cashier physically counted. Nothing links it to the
//! transactions it summarizes besides the day it covers.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Balance, Currency, EngineError, Money, ResultEngine,
    util::{bounded_amount, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClosingStatus {
    Correcto,
    Faltante,
    Sobrante,
}

impl ClosingStatus {
    /// `difference = counted - calculated`: zero is `Correcto`, negative is
    /// `Faltante` (missing money), positive is `Sobrante` (extra money).
    pub fn from_difference(difference: Money) -> Self {
        if difference.is_zero() {
            Self::Correcto
        } else if difference.is_negative() {
            Self::Faltante
        } else {
            Self::Sobrante
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Correcto => "Correcto",
            Self::Faltante => "Faltante",
            Self::Sobrante => "Sobrante",
        }
    }
}

impl TryFrom<&str> for ClosingStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Correcto" => Ok(Self::Correcto),
            "Faltante" => Ok(Self::Faltante),
            "Sobrante" => Ok(Self::Sobrante),
            other => Err(EngineError::InvalidTransaction(format!(
                "invalid closing status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashClosing {
    pub id: Uuid,
    /// Business day the closing covers.
    pub date: NaiveDate,
    pub closed_at: DateTime<Utc>,
    pub user: String,
    pub status: ClosingStatus,
    pub difference: Money,
    pub counted: Money,
    pub calculated: Money,
    /// Bucket the count was compared against; `None` means all buckets.
    pub currency: Option<Currency>,
    pub notes: Option<String>,
    pub balance: Balance,
}

impl CashClosing {
    /// Builds the snapshot from a computed balance and the physical count.
    ///
    /// The count must be within [`Money::MAX_INPUT`].
    pub fn new(
        date: NaiveDate,
        closed_at: DateTime<Utc>,
        user: String,
        counted: Money,
        currency: Option<Currency>,
        notes: Option<String>,
        balance: Balance,
    ) -> ResultEngine<Self> {
        let counted = bounded_amount(counted, "counted amount")?;
        let calculated = match currency {
            Some(currency) => balance.get(currency).balance,
            None => balance.total(),
        };
        let difference = counted.checked_sub(calculated).ok_or_else(|| {
            EngineError::InvalidAmount("closing difference out of range".to_string())
        })?;
        Ok(Self {
            id: Uuid::new_v4(),
            date,
            closed_at,
            user,
            status: ClosingStatus::from_difference(difference),
            difference,
            counted,
            calculated,
            currency,
            notes,
            balance,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_closings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub business_date: Date,
    pub closed_at: DateTimeUtc,
    pub closed_by: String,
    pub status: String,
    pub difference_minor: i64,
    pub counted_minor: i64,
    pub calculated_minor: i64,
    pub currency: Option<String>,
    pub notes: Option<String>,
    /// JSON encoded [`Balance`].
    pub balance: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&CashClosing> for ActiveModel {
    type Error = EngineError;

    fn try_from(closing: &CashClosing) -> ResultEngine<Self> {
        Ok(Self {
            id: ActiveValue::Set(closing.id.to_string()),
            business_date: ActiveValue::Set(closing.date),
            closed_at: ActiveValue::Set(closing.closed_at),
            closed_by: ActiveValue::Set(closing.user.clone()),
            status: ActiveValue::Set(closing.status.as_str().to_string()),
            difference_minor: ActiveValue::Set(closing.difference.minor()),
            counted_minor: ActiveValue::Set(closing.counted.minor()),
            calculated_minor: ActiveValue::Set(closing.calculated.minor()),
            currency: ActiveValue::Set(closing.currency.map(|c| c.code().to_string())),
            notes: ActiveValue::Set(closing.notes.clone()),
            balance: ActiveValue::Set(serde_json::to_string(&closing.balance)?),
        })
    }
}

impl TryFrom<Model> for CashClosing {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "closing")?,
            date: model.business_date,
            closed_at: model.closed_at,
            user: model.closed_by,
            status: ClosingStatus::try_from(model.status.as_str())?,
            difference: Money::new(model.difference_minor),
            counted: Money::new(model.counted_minor),
            calculated: Money::new(model.calculated_minor),
            currency: model
                .currency
                .as_deref()
                .map(Currency::try_from)
                .transpose()?,
            notes: model.notes,
            balance: serde_json::from_str(&model.balance)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{Transaction, TransactionKind};

    fn balance_with(currency: Currency, amount: i64) -> Balance {
        let tx = Transaction {
            id: Uuid::new_v4(),
            time: Utc::now(),
            kind: TransactionKind::Ingreso,
            amount: Money::new(amount),
            currency,
            description: "x".to_string(),
            user: "ana".to_string(),
            reference: None,
            category: None,
            receivable: false,
            is_debt: false,
        };
        Balance::from_transactions(&[tx]).unwrap()
    }

    fn close(counted: i64, currency: Option<Currency>, balance: Balance) -> CashClosing {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        CashClosing::new(
            date,
            Utc::now(),
            "ana".to_string(),
            Money::new(counted),
            currency,
            None,
            balance,
        )
        .unwrap()
    }

    #[test]
    fn status_follows_difference_sign() {
        assert_eq!(
            ClosingStatus::from_difference(Money::ZERO),
            ClosingStatus::Correcto
        );
        assert_eq!(
            ClosingStatus::from_difference(Money::new(-1)),
            ClosingStatus::Faltante
        );
        assert_eq!(
            ClosingStatus::from_difference(Money::new(1)),
            ClosingStatus::Sobrante
        );
    }

    #[test]
    fn difference_is_counted_minus_calculated() {
        let closing = close(9_000, Some(Currency::Peso), balance_with(Currency::Peso, 10_000));
        assert_eq!(closing.calculated, Money::new(10_000));
        assert_eq!(closing.difference, Money::new(-1_000));
        assert_eq!(closing.status, ClosingStatus::Faltante);

        let closing = close(10_000, Some(Currency::Peso), balance_with(Currency::Peso, 10_000));
        assert_eq!(closing.status, ClosingStatus::Correcto);
    }

    #[test]
    fn without_currency_compares_against_total() {
        let mut balance = balance_with(Currency::Peso, 1_000);
        balance.apply(&Transaction {
            id: Uuid::new_v4(),
            time: Utc::now(),
            kind: TransactionKind::Ingreso,
            amount: Money::new(500),
            currency: Currency::Usd,
            description: "x".to_string(),
            user: "ana".to_string(),
            reference: None,
            category: None,
            receivable: false,
            is_debt: false,
        })
        .unwrap();
        let closing = close(2_000, None, balance);
        assert_eq!(closing.calculated, Money::new(1_500));
        assert_eq!(closing.difference, Money::new(500));
        assert_eq!(closing.status, ClosingStatus::Sobrante);
    }

    #[test]
    fn oversized_count_is_rejected() {
        let res = CashClosing::new(
            NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
            Utc::now(),
            "ana".to_string(),
            Money::new(i64::MAX),
            None,
            None,
            Balance::default(),
        );
        assert!(matches!(res, Err(EngineError::InvalidAmount(_))));
    }
}
