//! Cash register and catalog engine.
//!
//! The register side collects each business day's money movements, folds
//! them into per-currency balances and records cash closings. The catalog
//! side serves products from a primary store with a mirror fallback and an
//! in-process cache.

pub use balance::{Balance, CurrencyBalance};
pub use closings::{CashClosing, ClosingStatus};
pub use collector::{DayWindow, LedgerSource, SaleSource, collect_day};
pub use commands::{CloseRegisterCmd, ProductCmd, ProductPatch, SaleCmd, TransactionCmd};
pub use currency::{Currency, PaymentMethod};
pub use error::EngineError;
pub use money::Money;
pub use ops::{DEFAULT_TIMEZONE, Engine, EngineBuilder, MAX_CLOSINGS_LIMIT};
pub use products::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Product, ProductPage, ProductQuery, cache::CacheEvent,
};
pub use sales::{PaymentDetails, SALE_CATEGORY, SYSTEM_USER, Sale, SaleStatus};
pub use transactions::{Transaction, TransactionKind};

mod balance;
mod closings;
mod collector;
mod commands;
mod currency;
mod error;
mod money;
mod ops;
pub mod products;
mod sales;
mod transactions;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
