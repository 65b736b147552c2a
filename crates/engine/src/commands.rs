//! Command structs for engine operations.
//!
//! These types group parameters for write operations (ledger entries,
//! closings, sales and products), keeping call sites readable and avoiding
//! long argument lists.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{Currency, Money, PaymentDetails, TransactionKind};

/// Record a manual ledger entry.
#[derive(Clone, Debug)]
pub struct TransactionCmd {
    pub kind: TransactionKind,
    pub amount: Money,
    pub currency: Currency,
    pub description: String,
    pub user: String,
    pub occurred_at: DateTime<Utc>,
    pub reference: Option<String>,
    pub category: Option<String>,
    pub receivable: bool,
    pub is_debt: bool,
}

impl TransactionCmd {
    #[must_use]
    pub fn new(
        kind: TransactionKind,
        amount: Money,
        description: impl Into<String>,
        user: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            amount,
            currency: Currency::default(),
            description: description.into(),
            user: user.into(),
            occurred_at,
            reference: None,
            category: None,
            receivable: false,
            is_debt: false,
        }
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    #[must_use]
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sold on credit: counts as receivable instead of income.
    #[must_use]
    pub fn receivable(mut self, receivable: bool) -> Self {
        self.receivable = receivable;
        self
    }

    /// Bought on credit: counts as payable instead of expense.
    #[must_use]
    pub fn is_debt(mut self, is_debt: bool) -> Self {
        self.is_debt = is_debt;
        self
    }
}

/// Close the register for a business day.
#[derive(Clone, Debug)]
pub struct CloseRegisterCmd {
    pub date: NaiveDate,
    pub user: String,
    pub counted: Money,
    pub currency: Option<Currency>,
    pub notes: Option<String>,
    pub closed_at: DateTime<Utc>,
}

impl CloseRegisterCmd {
    #[must_use]
    pub fn new(
        date: NaiveDate,
        user: impl Into<String>,
        counted: Money,
        closed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            date,
            user: user.into(),
            counted,
            currency: None,
            notes: None,
            closed_at,
        }
    }

    /// Compare the count against a single bucket instead of the total.
    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Register an incoming order.
#[derive(Clone, Debug)]
pub struct SaleCmd {
    pub order_number: String,
    pub customer: Option<String>,
    pub total: Money,
    pub currency: Option<Currency>,
    pub payment_details: Option<PaymentDetails>,
    pub created_at: DateTime<Utc>,
}

impl SaleCmd {
    #[must_use]
    pub fn new(order_number: impl Into<String>, total: Money, created_at: DateTime<Utc>) -> Self {
        Self {
            order_number: order_number.into(),
            customer: None,
            total,
            currency: None,
            payment_details: None,
            created_at,
        }
    }

    #[must_use]
    pub fn customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    #[must_use]
    pub fn payment_details(mut self, details: PaymentDetails) -> Self {
        self.payment_details = Some(details);
        self
    }
}

/// Create a product. Unset fields take the catalog defaults.
#[derive(Clone, Debug, Default)]
pub struct ProductCmd {
    pub legacy_id: Option<String>,
    pub code: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<Money>,
    pub currency: Option<Currency>,
    pub stock: Option<i64>,
    pub active: Option<bool>,
    pub images: Vec<String>,
}

impl ProductCmd {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn legacy_id(mut self, legacy_id: impl Into<String>) -> Self {
        self.legacy_id = Some(legacy_id.into());
        self
    }

    #[must_use]
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn price(mut self, price: Money, currency: Currency) -> Self {
        self.price = Some(price);
        self.currency = Some(currency);
        self
    }

    #[must_use]
    pub fn stock(mut self, stock: i64) -> Self {
        self.stock = Some(stock);
        self
    }

    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    #[must_use]
    pub fn images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }
}

/// Partial product update; `None` leaves the field untouched.
#[derive(Clone, Debug, Default)]
pub struct ProductPatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<Money>,
    pub currency: Option<Currency>,
    pub stock: Option<i64>,
    pub active: Option<bool>,
    pub images: Option<Vec<String>>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.code.is_none()
            && self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.currency.is_none()
            && self.stock.is_none()
            && self.active.is_none()
            && self.images.is_none()
    }
}
