//! Per-currency balance of the register.
//!
//! Folding rules:
//!
//! | kind             | flag              | bucket       |
//! |------------------|-------------------|--------------|
//! | Ingreso, Venta   | `receivable`      | `receivable` |
//! | Ingreso, Venta   |                   | `income`     |
//! | Egreso, Compra   | `is_debt`         | `payable`    |
//! | Egreso, Compra   |                   | `expense`    |
//! | Ajuste           | amount >= 0       | `income`     |
//! | Ajuste           | amount < 0        | `expense`    |
//!
//! and for every currency `balance = income - expense + receivable - payable`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, Money, ResultEngine, Transaction, TransactionKind};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyBalance {
    pub income: Money,
    pub expense: Money,
    pub receivable: Money,
    pub payable: Money,
    pub balance: Money,
}

impl CurrencyBalance {
    fn apply(&mut self, tx: &Transaction) -> ResultEngine<()> {
        let overflow = || {
            EngineError::InvalidAmount(format!("{} balance out of range", tx.currency))
        };
        let (bucket, amount) = match tx.kind {
            TransactionKind::Ingreso | TransactionKind::Venta if tx.receivable => {
                (&mut self.receivable, tx.amount)
            }
            TransactionKind::Ingreso | TransactionKind::Venta => (&mut self.income, tx.amount),
            TransactionKind::Egreso | TransactionKind::Compra if tx.is_debt => {
                (&mut self.payable, tx.amount)
            }
            TransactionKind::Egreso | TransactionKind::Compra => (&mut self.expense, tx.amount),
            TransactionKind::Ajuste if tx.amount.is_negative() => {
                (&mut self.expense, tx.amount.checked_abs().ok_or_else(overflow)?)
            }
            TransactionKind::Ajuste => (&mut self.income, tx.amount),
        };
        *bucket = bucket.checked_add(amount).ok_or_else(overflow)?;
        self.balance = self.checked_net().ok_or_else(overflow)?;
        Ok(())
    }

    /// `income - expense + receivable - payable`, `None` if it does not fit.
    pub fn checked_net(&self) -> Option<Money> {
        self.income
            .checked_sub(self.expense)?
            .checked_add(self.receivable)?
            .checked_sub(self.payable)
    }
}

/// Balance of every currency bucket, zero buckets included.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance(BTreeMap<Currency, CurrencyBalance>);

impl Default for Balance {
    fn default() -> Self {
        Self(
            Currency::ALL
                .into_iter()
                .map(|currency| (currency, CurrencyBalance::default()))
                .collect(),
        )
    }
}

impl Balance {
    /// Folds a list of transactions into a balance.
    ///
    /// Fails with `InvalidAmount` when a bucket or the grand total would
    /// overflow.
    pub fn from_transactions<'a>(
        transactions: impl IntoIterator<Item = &'a Transaction>,
    ) -> ResultEngine<Self> {
        let mut balance = Self::default();
        for tx in transactions {
            balance.apply(tx)?;
        }
        Ok(balance)
    }

    /// Adds one transaction. On error the balance is left unchanged.
    pub fn apply(&mut self, tx: &Transaction) -> ResultEngine<()> {
        let mut bucket = self.get(tx.currency);
        bucket.apply(tx)?;

        let previous = self.0.insert(tx.currency, bucket);
        if self.checked_total().is_none() {
            self.0.insert(tx.currency, previous.unwrap_or_default());
            return Err(EngineError::InvalidAmount(
                "register total out of range".to_string(),
            ));
        }
        Ok(())
    }

    /// Balance of a single bucket (zero if untouched).
    pub fn get(&self, currency: Currency) -> CurrencyBalance {
        self.0.get(&currency).copied().unwrap_or_default()
    }

    /// Sum of `balance` across every bucket.
    ///
    /// A folded balance always fits; a stored snapshot that does not
    /// saturates.
    pub fn total(&self) -> Money {
        self.0
            .values()
            .fold(Money::ZERO, |acc, b| acc.saturating_add(b.balance))
    }

    fn checked_total(&self) -> Option<Money> {
        self.0
            .values()
            .try_fold(Money::ZERO, |acc, b| acc.checked_add(b.balance))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Currency, &CurrencyBalance)> {
        self.0.iter().map(|(currency, balance)| (*currency, balance))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn tx(kind: TransactionKind, amount: i64, currency: Currency) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            time: Utc::now(),
            kind,
            amount: Money::new(amount),
            currency,
            description: "x".to_string(),
            user: "ana".to_string(),
            reference: None,
            category: None,
            receivable: false,
            is_debt: false,
        }
    }

    #[test]
    fn empty_balance_lists_every_currency() {
        let balance = Balance::from_transactions(&[]).unwrap();
        assert_eq!(balance.iter().count(), Currency::ALL.len());
        assert_eq!(balance.total(), Money::ZERO);
    }

    #[test]
    fn income_and_expense_per_currency() {
        let txs = vec![
            tx(TransactionKind::Ingreso, 10_000, Currency::Peso),
            tx(TransactionKind::Venta, 2_500, Currency::Peso),
            tx(TransactionKind::Egreso, 3_000, Currency::Peso),
            tx(TransactionKind::Compra, 1_000, Currency::Peso),
            tx(TransactionKind::Venta, 5_000, Currency::Usd),
        ];
        let balance = Balance::from_transactions(&txs).unwrap();

        let peso = balance.get(Currency::Peso);
        assert_eq!(peso.income, Money::new(12_500));
        assert_eq!(peso.expense, Money::new(4_000));
        assert_eq!(peso.balance, Money::new(8_500));
        assert_eq!(balance.get(Currency::Usd).balance, Money::new(5_000));
        assert_eq!(balance.total(), Money::new(13_500));
    }

    #[test]
    fn credit_flags_go_to_receivable_and_payable() {
        let mut on_credit = tx(TransactionKind::Venta, 700, Currency::Euro);
        on_credit.receivable = true;
        let mut owed = tx(TransactionKind::Compra, 300, Currency::Euro);
        owed.is_debt = true;
        let balance = Balance::from_transactions(&[on_credit, owed]).unwrap();

        let euro = balance.get(Currency::Euro);
        assert_eq!(euro.receivable, Money::new(700));
        assert_eq!(euro.payable, Money::new(300));
        assert_eq!(euro.income, Money::ZERO);
        assert_eq!(euro.balance, Money::new(400));
    }

    #[test]
    fn adjustments_follow_their_sign() {
        let balance = Balance::from_transactions(&[
            tx(TransactionKind::Ajuste, 150, Currency::Peso),
            tx(TransactionKind::Ajuste, -400, Currency::Peso),
        ])
        .unwrap();
        let peso = balance.get(Currency::Peso);
        assert_eq!(peso.income, Money::new(150));
        assert_eq!(peso.expense, Money::new(400));
        assert_eq!(peso.balance, Money::new(-250));
    }

    #[test]
    fn net_formula_holds_for_every_bucket() {
        let mut txs = Vec::new();
        for (i, currency) in Currency::ALL.into_iter().enumerate() {
            let i = i as i64 + 1;
            txs.push(tx(TransactionKind::Ingreso, 1_000 * i, currency));
            txs.push(tx(TransactionKind::Egreso, 130 * i, currency));
            let mut r = tx(TransactionKind::Ingreso, 77 * i, currency);
            r.receivable = true;
            txs.push(r);
            let mut p = tx(TransactionKind::Egreso, 55 * i, currency);
            p.is_debt = true;
            txs.push(p);
        }
        let balance = Balance::from_transactions(&txs).unwrap();
        for (_, b) in balance.iter() {
            assert_eq!(b.balance, b.income - b.expense + b.receivable - b.payable);
            assert_eq!(Some(b.balance), b.checked_net());
        }
    }

    #[test]
    fn serializes_as_currency_map() {
        let balance =
            Balance::from_transactions(&[tx(TransactionKind::Ingreso, 1, Currency::Usd)]).unwrap();
        let json = serde_json::to_value(&balance).unwrap();
        assert_eq!(json["USD"]["income"], 1);
        assert_eq!(json["USD"]["balance"], 1);
        assert_eq!(json["PESO"]["balance"], 0);
    }

    #[test]
    fn overflowing_fold_is_an_error() {
        let huge = [
            tx(TransactionKind::Ingreso, i64::MAX, Currency::Peso),
            tx(TransactionKind::Ingreso, i64::MAX, Currency::Peso),
        ];
        assert!(matches!(
            Balance::from_transactions(&huge),
            Err(EngineError::InvalidAmount(_))
        ));

        let min_adjustment = [tx(TransactionKind::Ajuste, i64::MIN, Currency::Usd)];
        assert!(Balance::from_transactions(&min_adjustment).is_err());
    }

    #[test]
    fn total_overflow_leaves_balance_untouched() {
        let mut balance =
            Balance::from_transactions(&[tx(TransactionKind::Ingreso, i64::MAX, Currency::Peso)])
                .unwrap();
        assert!(balance.apply(&tx(TransactionKind::Ingreso, 1, Currency::Usd)).is_err());
        assert_eq!(balance.get(Currency::Usd).balance, Money::ZERO);
        assert_eq!(balance.total(), Money::new(i64::MAX));
    }
}
