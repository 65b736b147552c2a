//! Conversions between engine types and the API wire types.

use std::collections::BTreeMap;

use api_types::{
    Currency as ApiCurrency,
    product::ProductView,
    register::{
        ClosingStatus as ApiClosingStatus, ClosingView, CurrencyBalanceView,
        TransactionKind as ApiKind, TransactionView,
    },
    sale::{PaymentMethod as ApiMethod, SaleStatus as ApiSaleStatus, SaleView},
};
use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use engine::{
    Balance, CashClosing, ClosingStatus, Currency, Money, PaymentDetails, PaymentMethod, Product,
    Sale, SaleStatus, Transaction, TransactionKind,
};

pub fn currency_to_api(currency: Currency) -> ApiCurrency {
    match currency {
        Currency::Peso => ApiCurrency::Peso,
        Currency::PesoTransferencia => ApiCurrency::PesoTransferencia,
        Currency::Usd => ApiCurrency::Usd,
        Currency::UsdTransferencia => ApiCurrency::UsdTransferencia,
        Currency::Euro => ApiCurrency::Euro,
        Currency::EuroTransferencia => ApiCurrency::EuroTransferencia,
    }
}

pub fn currency_from_api(currency: ApiCurrency) -> Currency {
    match currency {
        ApiCurrency::Peso => Currency::Peso,
        ApiCurrency::PesoTransferencia => Currency::PesoTransferencia,
        ApiCurrency::Usd => Currency::Usd,
        ApiCurrency::UsdTransferencia => Currency::UsdTransferencia,
        ApiCurrency::Euro => Currency::Euro,
        ApiCurrency::EuroTransferencia => Currency::EuroTransferencia,
    }
}

pub fn kind_to_api(kind: TransactionKind) -> ApiKind {
    match kind {
        TransactionKind::Ingreso => ApiKind::Ingreso,
        TransactionKind::Egreso => ApiKind::Egreso,
        TransactionKind::Venta => ApiKind::Venta,
        TransactionKind::Compra => ApiKind::Compra,
        TransactionKind::Ajuste => ApiKind::Ajuste,
    }
}

pub fn kind_from_api(kind: ApiKind) -> TransactionKind {
    match kind {
        ApiKind::Ingreso => TransactionKind::Ingreso,
        ApiKind::Egreso => TransactionKind::Egreso,
        ApiKind::Venta => TransactionKind::Venta,
        ApiKind::Compra => TransactionKind::Compra,
        ApiKind::Ajuste => TransactionKind::Ajuste,
    }
}

fn method_to_api(method: PaymentMethod) -> ApiMethod {
    match method {
        PaymentMethod::CashArs => ApiMethod::CashArs,
        PaymentMethod::TransferArs => ApiMethod::TransferArs,
        PaymentMethod::CashUsd => ApiMethod::CashUsd,
        PaymentMethod::TransferUsd => ApiMethod::TransferUsd,
        PaymentMethod::CashEur => ApiMethod::CashEur,
        PaymentMethod::TransferEur => ApiMethod::TransferEur,
    }
}

fn method_from_api(method: ApiMethod) -> PaymentMethod {
    match method {
        ApiMethod::CashArs => PaymentMethod::CashArs,
        ApiMethod::TransferArs => PaymentMethod::TransferArs,
        ApiMethod::CashUsd => PaymentMethod::CashUsd,
        ApiMethod::TransferUsd => PaymentMethod::TransferUsd,
        ApiMethod::CashEur => PaymentMethod::CashEur,
        ApiMethod::TransferEur => PaymentMethod::TransferEur,
    }
}

pub fn sale_status_to_api(status: SaleStatus) -> ApiSaleStatus {
    match status {
        SaleStatus::Pending => ApiSaleStatus::Pending,
        SaleStatus::Paid => ApiSaleStatus::Paid,
        SaleStatus::Delivered => ApiSaleStatus::Delivered,
    }
}

pub fn sale_status_from_api(status: ApiSaleStatus) -> SaleStatus {
    match status {
        ApiSaleStatus::Pending => SaleStatus::Pending,
        ApiSaleStatus::Paid => SaleStatus::Paid,
        ApiSaleStatus::Delivered => SaleStatus::Delivered,
    }
}

fn closing_status_to_api(status: ClosingStatus) -> ApiClosingStatus {
    match status {
        ClosingStatus::Correcto => ApiClosingStatus::Correcto,
        ClosingStatus::Faltante => ApiClosingStatus::Faltante,
        ClosingStatus::Sobrante => ApiClosingStatus::Sobrante,
    }
}

pub fn payment_details_to_api(details: &PaymentDetails) -> BTreeMap<ApiMethod, i64> {
    details
        .amounts
        .iter()
        .map(|(method, amount)| (method_to_api(*method), amount.minor()))
        .collect()
}

pub fn payment_details_from_api(amounts: BTreeMap<ApiMethod, i64>) -> PaymentDetails {
    PaymentDetails {
        amounts: amounts
            .into_iter()
            .map(|(method, minor)| (method_from_api(method), Money::new(minor)))
            .collect(),
    }
}

/// Renders a UTC instant in the register timezone.
pub fn local(at: DateTime<Utc>, timezone: Tz) -> DateTime<FixedOffset> {
    at.with_timezone(&timezone).fixed_offset()
}

pub fn transaction_view(tx: Transaction, timezone: Tz) -> TransactionView {
    TransactionView {
        id: tx.id,
        kind: kind_to_api(tx.kind),
        occurred_at: local(tx.time, timezone),
        amount_minor: tx.amount.minor(),
        currency: currency_to_api(tx.currency),
        description: tx.description,
        user: tx.user,
        reference: tx.reference,
        category: tx.category,
        receivable: tx.receivable,
        is_debt: tx.is_debt,
    }
}

pub fn balance_view(balance: &Balance) -> BTreeMap<ApiCurrency, CurrencyBalanceView> {
    balance
        .iter()
        .map(|(currency, bucket)| {
            (
                currency_to_api(currency),
                CurrencyBalanceView {
                    income_minor: bucket.income.minor(),
                    expense_minor: bucket.expense.minor(),
                    receivable_minor: bucket.receivable.minor(),
                    payable_minor: bucket.payable.minor(),
                    balance_minor: bucket.balance.minor(),
                },
            )
        })
        .collect()
}

pub fn closing_view(closing: CashClosing, timezone: Tz) -> ClosingView {
    ClosingView {
        id: closing.id,
        date: closing.date,
        closed_at: local(closing.closed_at, timezone),
        user: closing.user,
        status: closing_status_to_api(closing.status),
        difference_minor: closing.difference.minor(),
        counted_minor: closing.counted.minor(),
        calculated_minor: closing.calculated.minor(),
        currency: closing.currency.map(currency_to_api),
        notes: closing.notes,
        balance: balance_view(&closing.balance),
    }
}

pub fn sale_view(sale: Sale, timezone: Tz) -> SaleView {
    SaleView {
        id: sale.id,
        order_number: sale.order_number,
        customer: sale.customer,
        status: sale_status_to_api(sale.status),
        total_minor: sale.total.minor(),
        currency: sale.currency.map(currency_to_api),
        payment_details: sale.payment_details.as_ref().map(payment_details_to_api),
        created_at: local(sale.created_at, timezone),
        paid_at: sale.paid_at.map(|at| local(at, timezone)),
    }
}

pub fn product_view(product: Product, timezone: Tz) -> ProductView {
    ProductView {
        id: product.id,
        legacy_id: product.legacy_id,
        code: product.code,
        name: product.name,
        description: product.description,
        category: product.category,
        price_minor: product.price.minor(),
        currency: currency_to_api(product.currency),
        stock: product.stock,
        active: product.active,
        images: product.images,
        created_at: product.created_at.map(|at| local(at, timezone)),
        updated_at: product.updated_at.map(|at| local(at, timezone)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currencies_map_both_ways() {
        for currency in Currency::ALL {
            assert_eq!(currency_from_api(currency_to_api(currency)), currency);
        }
    }

    #[test]
    fn payment_details_keep_method_keys() {
        let amounts: BTreeMap<ApiMethod, i64> =
            serde_json::from_str(r#"{"cashUSD": 5000, "transferARS": 200000}"#).unwrap();
        let details = payment_details_from_api(amounts);
        assert_eq!(
            details.amounts.get(&PaymentMethod::CashUsd),
            Some(&Money::new(5_000))
        );
        assert_eq!(details.total(), Money::new(205_000));
    }

    #[test]
    fn local_time_uses_register_offset() {
        let at = DateTime::parse_from_rfc3339("2026-10-17T15:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let rendered = local(at, chrono_tz::America::Argentina::Buenos_Aires);
        assert_eq!(rendered.to_rfc3339(), "2026-10-17T12:00:00-03:00");
    }
}
