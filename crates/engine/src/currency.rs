use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Currency bucket of the cash register.
///
/// Money received by bank transfer is tracked in its own `*Transferencia`
/// bucket so that the physical drawer count only has to match the cash
/// buckets.
///
/// All buckets use 2 minor units (see [`Money`](crate::Money)).
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

impl Currency {
    /// Every bucket, in display order.
    pub const ALL: [Currency; 6] = [
        Currency::Peso,
        Currency::PesoTransferencia,
        Currency::Usd,
        Currency::UsdTransferencia,
        Currency::Euro,
        Currency::EuroTransferencia,
    ];

    /// Canonical code, as stored in the database.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Peso => "PESO",
            Currency::PesoTransferencia => "PESO_TRANSFERENCIA",
            Currency::Usd => "USD",
            Currency::UsdTransferencia => "USD_TRANSFERENCIA",
            Currency::Euro => "EURO",
            Currency::EuroTransferencia => "EURO_TRANSFERENCIA",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Peso | Currency::PesoTransferencia => "$",
            Currency::Usd | Currency::UsdTransferencia => "US$",
            Currency::Euro | Currency::EuroTransferencia => "€",
        }
    }

    /// Returns `true` for the bank transfer buckets.
    #[must_use]
    pub const fn is_transfer(self) -> bool {
        matches!(
            self,
            Currency::PesoTransferencia | Currency::UsdTransferencia | Currency::EuroTransferencia
        )
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let code = value.trim().to_ascii_uppercase();
        Currency::ALL
            .into_iter()
            .find(|currency| currency.code() == code)
            .ok_or_else(|| EngineError::InvalidAmount(format!("unsupported currency: {value}")))
    }
}

/// Payment method keys used by a sale's payment breakdown.
///
/// Each method settles into exactly one [`Currency`] bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
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

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::CashArs,
        PaymentMethod::TransferArs,
        PaymentMethod::CashUsd,
        PaymentMethod::TransferUsd,
        PaymentMethod::CashEur,
        PaymentMethod::TransferEur,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            PaymentMethod::CashArs => "cashARS",
            PaymentMethod::TransferArs => "transferARS",
            PaymentMethod::CashUsd => "cashUSD",
            PaymentMethod::TransferUsd => "transferUSD",
            PaymentMethod::CashEur => "cashEUR",
            PaymentMethod::TransferEur => "transferEUR",
        }
    }

    /// The bucket money paid with this method lands in.
    #[must_use]
    pub const fn currency(self) -> Currency {
        match self {
            PaymentMethod::CashArs => Currency::Peso,
            PaymentMethod::TransferArs => Currency::PesoTransferencia,
            PaymentMethod::CashUsd => Currency::Usd,
            PaymentMethod::TransferUsd => Currency::UsdTransferencia,
            PaymentMethod::CashEur => Currency::Euro,
            PaymentMethod::TransferEur => Currency::EuroTransferencia,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for currency in Currency::ALL {
            assert_eq!(Currency::try_from(currency.code()).unwrap(), currency);
        }
        assert_eq!(Currency::try_from(" usd ").unwrap(), Currency::Usd);
        assert!(Currency::try_from("ARS").is_err());
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&Currency::PesoTransferencia).unwrap();
        assert_eq!(json, "\"PESO_TRANSFERENCIA\"");
    }

    #[test]
    fn payment_methods_map_to_distinct_buckets() {
        let mut buckets: Vec<Currency> = PaymentMethod::ALL.iter().map(|m| m.currency()).collect();
        buckets.sort();
        buckets.dedup();
        assert_eq!(buckets.len(), 6);
        assert_eq!(PaymentMethod::CashUsd.currency(), Currency::Usd);
        assert_eq!(
            PaymentMethod::TransferArs.currency(),
            Currency::PesoTransferencia
        );
    }

    #[test]
    fn payment_method_serde_uses_original_keys() {
        for method in PaymentMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.key()));
        }
    }
}
