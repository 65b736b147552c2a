//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Trim a required text field, rejecting empty values.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidTransaction(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Reject amounts beyond [`Money::MAX_INPUT`].
pub(crate) fn bounded_amount(amount: Money, label: &str) -> ResultEngine<Money> {
    if !amount.within_input_limit() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} exceeds {}",
            Money::MAX_INPUT
        )));
    }
    Ok(amount)
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Folds text into the key used for product search: decomposed, without
/// diacritics, lowercase, single spaces.
pub(crate) fn normalize_search_key(value: &str) -> String {
    let folded: String = value
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_key_strips_accents_and_case() {
        assert_eq!(normalize_search_key("  Azúcar   MORENA "), "azucar morena");
        assert_eq!(normalize_search_key("Ñandú"), "nandu");
    }

    #[test]
    fn optional_text_drops_blank() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(Some(" x ")), Some("x".to_string()));
        assert_eq!(normalize_optional_text(None), None);
    }
}
