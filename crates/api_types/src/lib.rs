use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Currency bucket. `*_TRANSFERENCIA` buckets hold bank transfers.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    #[default]
    Peso,
    PesoTransferencia,
    Usd,
    UsdTransferencia,
    Euro,
    EuroTransferencia,
}

pub mod register {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub enum TransactionKind {
        Ingreso,
        Egreso,
        Venta,
        Compra,
        Ajuste,
    }

    /// Query string of the day endpoints. Missing `date` means today in the
    /// register timezone.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DayQuery {
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub kind: TransactionKind,
        /// Must be > 0, except for `Ajuste` which is signed and non-zero.
        pub amount_minor: i64,
        pub currency: Option<Currency>,
        pub description: String,
        /// RFC3339 timestamp. Optional: if absent, server uses now().
        pub occurred_at: Option<DateTime<FixedOffset>>,
        pub reference: Option<String>,
        pub category: Option<String>,
        #[serde(default)]
        pub receivable: bool,
        #[serde(default)]
        pub is_debt: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub kind: TransactionKind,
        /// RFC3339 timestamp in the register timezone.
        pub occurred_at: DateTime<FixedOffset>,
        pub amount_minor: i64,
        pub currency: Currency,
        pub description: String,
        pub user: String,
        pub reference: Option<String>,
        pub category: Option<String>,
        pub receivable: bool,
        pub is_debt: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DayTransactions {
        pub date: NaiveDate,
        pub transactions: Vec<TransactionView>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CurrencyBalanceView {
        pub income_minor: i64,
        pub expense_minor: i64,
        pub receivable_minor: i64,
        pub payable_minor: i64,
        pub balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub date: NaiveDate,
        /// Every currency is present, zero buckets included.
        pub currencies: BTreeMap<Currency, CurrencyBalanceView>,
        pub total_minor: i64,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub enum ClosingStatus {
        Correcto,
        Faltante,
        Sobrante,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ClosingNew {
        /// Business day to close. Optional: defaults to today.
        pub date: Option<NaiveDate>,
        pub counted_minor: i64,
        /// Compare against this bucket only; absent means every bucket.
        pub currency: Option<Currency>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ClosingView {
        pub id: Uuid,
        pub date: NaiveDate,
        pub closed_at: DateTime<FixedOffset>,
        pub user: String,
        pub status: ClosingStatus,
        pub difference_minor: i64,
        pub counted_minor: i64,
        pub calculated_minor: i64,
        pub currency: Option<Currency>,
        pub notes: Option<String>,
        pub balance: BTreeMap<Currency, CurrencyBalanceView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ClosingList {
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `next_cursor`.
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ClosingListResponse {
        pub closings: Vec<ClosingView>,
        /// Opaque cursor for fetching the next page (older items).
        pub next_cursor: Option<String>,
    }
}

pub mod sale {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
    pub enum PaymentMethod {
        #[serde(rename = "cashARS")]
        CashArs,
        #[serde(rename = "transferARS")]
        TransferArs,
        #[serde(rename = "cashUSD")]
        CashUsd,
        #[serde(rename = "transferUSD")]
        TransferUsd,
        #[serde(rename = "cashEUR")]
        CashEur,
        #[serde(rename = "transferEUR")]
        TransferEur,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum SaleStatus {
        Pending,
        Paid,
        Delivered,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SaleNew {
        pub order_number: String,
        pub customer: Option<String>,
        pub total_minor: i64,
        pub currency: Option<Currency>,
        /// Amount per payment method, in minor units.
        pub payment_details: Option<BTreeMap<PaymentMethod, i64>>,
        pub created_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SaleStatusUpdate {
        pub status: SaleStatus,
        /// When the status changed. Optional: if absent, server uses now().
        pub at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SaleView {
        pub id: Uuid,
        pub order_number: String,
        pub customer: Option<String>,
        pub status: SaleStatus,
        pub total_minor: i64,
        pub currency: Option<Currency>,
        pub payment_details: Option<BTreeMap<PaymentMethod, i64>>,
        pub created_at: DateTime<FixedOffset>,
        pub paid_at: Option<DateTime<FixedOffset>>,
    }
}

pub mod product {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProductSearch {
        pub q: Option<String>,
        pub category: Option<String>,
        pub active: Option<bool>,
        pub page: Option<u64>,
        pub per_page: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductNew {
        pub name: String,
        pub legacy_id: Option<String>,
        pub code: Option<String>,
        pub description: Option<String>,
        pub category: Option<String>,
        pub price_minor: Option<i64>,
        pub currency: Option<Currency>,
        pub stock: Option<i64>,
        pub active: Option<bool>,
        #[serde(default)]
        pub images: Vec<String>,
    }

    /// Partial update: absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProductUpdate {
        pub code: Option<String>,
        pub name: Option<String>,
        pub description: Option<String>,
        pub category: Option<String>,
        pub price_minor: Option<i64>,
        pub currency: Option<Currency>,
        pub stock: Option<i64>,
        pub active: Option<bool>,
        pub images: Option<Vec<String>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductView {
        pub id: Uuid,
        pub legacy_id: Option<String>,
        pub code: String,
        pub name: String,
        pub description: String,
        pub category: String,
        pub price_minor: i64,
        pub currency: Currency,
        pub stock: i64,
        pub active: bool,
        pub images: Vec<String>,
        pub created_at: Option<DateTime<FixedOffset>>,
        pub updated_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductPage {
        pub items: Vec<ProductView>,
        pub total: u64,
        pub page: u64,
        pub per_page: u64,
    }
}
