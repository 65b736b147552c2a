//! Sales (customer orders) as seen by the cash register.
//!
//! The register never changes a sale's money: it only reads paid or
//! delivered orders and turns their payments into `Venta` transactions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, EngineError, Money, PaymentMethod, Transaction, TransactionKind, util::parse_uuid,
};

/// Category given to every sale-derived transaction.
pub const SALE_CATEGORY: &str = "Ventas";
/// User recorded on sale-derived transactions.
pub const SYSTEM_USER: &str = "sistema";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Pending,
    Paid,
    Delivered,
}

impl SaleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Delivered => "delivered",
        }
    }

    /// Paid and delivered orders count as money in the register.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Paid | Self::Delivered)
    }
}

impl TryFrom<&str> for SaleStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "delivered" => Ok(Self::Delivered),
            other => Err(EngineError::InvalidTransaction(format!(
                "invalid sale status: {other}"
            ))),
        }
    }
}

/// Multi-method payment breakdown of a sale.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    #[serde(default)]
    pub amounts: BTreeMap<PaymentMethod, Money>,
}

impl PaymentDetails {
    /// Sum of every method amount.
    pub fn total(&self) -> Money {
        self.amounts.values().sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub order_number: String,
    pub customer: Option<String>,
    pub status: SaleStatus,
    pub total: Money,
    pub currency: Option<Currency>,
    pub payment_details: Option<PaymentDetails>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Sale {
    /// Explodes the sale into register transactions.
    ///
    /// With a breakdown, every non-zero method amount becomes one `Venta` in
    /// the method's bucket. Without one (or with an empty map) the sale
    /// becomes a single `Venta` of `total` in `currency`, defaulting to
    /// `PESO`. Ids are derived from the sale id, so collecting the same day
    /// twice yields the same rows.
    pub fn transactions(&self) -> Vec<Transaction> {
        let time = self.paid_at.unwrap_or(self.created_at);
        match self
            .payment_details
            .as_ref()
            .filter(|details| !details.amounts.is_empty())
        {
            Some(details) => details
                .amounts
                .iter()
                .filter(|(_, amount)| !amount.is_zero())
                .map(|(method, amount)| {
                    self.sale_transaction(method.key(), time, *amount, method.currency())
                })
                .collect(),
            None if self.total.is_zero() => Vec::new(),
            None => vec![self.sale_transaction(
                "total",
                time,
                self.total,
                self.currency.unwrap_or_default(),
            )],
        }
    }

    fn sale_transaction(
        &self,
        part: &str,
        time: DateTime<Utc>,
        amount: Money,
        currency: Currency,
    ) -> Transaction {
        let description = match &self.customer {
            Some(customer) => format!("Venta #{} - {customer}", self.order_number),
            None => format!("Venta #{}", self.order_number),
        };
        Transaction {
            id: Uuid::new_v5(&self.id, part.as_bytes()),
            time,
            kind: TransactionKind::Venta,
            amount,
            currency,
            description,
            user: SYSTEM_USER.to_string(),
            reference: Some(self.id.to_string()),
            category: Some(SALE_CATEGORY.to_string()),
            receivable: false,
            is_debt: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub order_number: String,
    pub customer: Option<String>,
    pub status: String,
    pub total_minor: i64,
    pub currency: Option<String>,
    /// JSON encoded [`PaymentDetails`].
    pub payment_details: Option<String>,
    pub created_at: DateTimeUtc,
    pub paid_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Sale> for ActiveModel {
    type Error = EngineError;

    fn try_from(sale: &Sale) -> Result<Self, Self::Error> {
        let payment_details = sale
            .payment_details
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        Ok(Self {
            id: ActiveValue::Set(sale.id.to_string()),
            order_number: ActiveValue::Set(sale.order_number.clone()),
            customer: ActiveValue::Set(sale.customer.clone()),
            status: ActiveValue::Set(sale.status.as_str().to_string()),
            total_minor: ActiveValue::Set(sale.total.minor()),
            currency: ActiveValue::Set(sale.currency.map(|c| c.code().to_string())),
            payment_details: ActiveValue::Set(payment_details),
            created_at: ActiveValue::Set(sale.created_at),
            paid_at: ActiveValue::Set(sale.paid_at),
        })
    }
}

impl TryFrom<Model> for Sale {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let payment_details = model
            .payment_details
            .as_deref()
            .map(serde_json::from_str::<PaymentDetails>)
            .transpose()?;
        Ok(Self {
            id: parse_uuid(&model.id, "sale")?,
            order_number: model.order_number,
            customer: model.customer,
            status: SaleStatus::try_from(model.status.as_str())?,
            total: Money::new(model.total_minor),
            currency: model
                .currency
                .as_deref()
                .map(Currency::try_from)
                .transpose()?,
            payment_details,
            created_at: model.created_at,
            paid_at: model.paid_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::ResultEngine;

    fn parse_payment_details(raw: &str) -> ResultEngine<PaymentDetails> {
        Ok(serde_json::from_str(raw)?)
    }

    fn sale(total: i64, details: Option<PaymentDetails>) -> Sale {
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 15, 30, 0).unwrap();
        Sale {
            id: Uuid::new_v4(),
            order_number: "1042".to_string(),
            customer: Some("Marta".to_string()),
            status: SaleStatus::Paid,
            total: Money::new(total),
            currency: None,
            payment_details: details,
            created_at: at,
            paid_at: Some(at),
        }
    }

    #[test]
    fn breakdown_yields_one_transaction_per_method() {
        let details =
            parse_payment_details(r#"{"amounts":{"cashUSD":5000,"transferARS":200000}}"#)
                .unwrap();
        let txs = sale(0, Some(details)).transactions();

        assert_eq!(txs.len(), 2);
        let mut currencies: Vec<Currency> = txs.iter().map(|t| t.currency).collect();
        currencies.sort();
        assert_eq!(currencies, vec![Currency::PesoTransferencia, Currency::Usd]);
        assert!(txs.iter().all(|t| t.kind == TransactionKind::Venta));
    }

    #[test]
    fn explosion_conserves_money_per_currency() {
        let details = parse_payment_details(
            r#"{"amounts":{"cashARS":1250,"transferARS":0,"cashEUR":700,"transferUSD":33}}"#,
        )
        .unwrap();
        let s = sale(1983, Some(details.clone()));
        let txs = s.transactions();

        assert_eq!(txs.len(), 3);
        for (method, amount) in &details.amounts {
            let recorded: Money = txs
                .iter()
                .filter(|t| t.currency == method.currency())
                .map(|t| t.amount)
                .sum();
            assert_eq!(recorded, *amount);
        }
        let all: Money = txs.iter().map(|t| t.amount).sum();
        assert_eq!(all, details.total());
    }

    #[test]
    fn sale_without_breakdown_uses_total_and_defaults_to_peso() {
        let txs = sale(4599, None).transactions();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].amount, Money::new(4599));
        assert_eq!(txs[0].currency, Currency::Peso);

        let mut usd = sale(100, Some(PaymentDetails::default()));
        usd.currency = Some(Currency::Usd);
        let txs = usd.transactions();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].currency, Currency::Usd);
    }

    #[test]
    fn all_zero_breakdown_yields_nothing() {
        let details = parse_payment_details(r#"{"amounts":{"cashARS":0}}"#).unwrap();
        assert!(sale(1000, Some(details)).transactions().is_empty());
    }

    #[test]
    fn derived_rows_are_deterministic_and_referenced() {
        let s = sale(1000, None);
        let first = s.transactions();
        let second = s.transactions();
        assert_eq!(first, second);
        assert_eq!(first[0].reference.as_deref(), Some(s.id.to_string().as_str()));
        assert_eq!(first[0].category.as_deref(), Some(SALE_CATEGORY));
        assert_eq!(first[0].description, "Venta #1042 - Marta");
    }
}
