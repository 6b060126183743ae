//! Parse-or-zero numeric helpers and lenient serde adapters
//!
//! Form inputs and persisted master data carry numbers as JSON numbers,
//! numeric strings, empty strings or null. Everything funnels through
//! [`parse_amount`] so that no arithmetic in the engine ever sees an
//! unparsable value.

use bigdecimal::{BigDecimal, RoundingMode};
use std::str::FromStr;

/// Parse a decimal, treating empty or unparsable input as zero
pub fn parse_amount(input: &str) -> BigDecimal {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return BigDecimal::from(0);
    }
    BigDecimal::from_str(trimmed).unwrap_or_else(|_| BigDecimal::from(0))
}

/// Parse an optional form field: empty input means "not entered"
pub fn parse_field(input: &str) -> Option<BigDecimal> {
    if input.trim().is_empty() {
        None
    } else {
        Some(parse_amount(input))
    }
}

/// Round half-up to two decimal places
pub fn round2(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(2, RoundingMode::HalfUp)
}

/// Render an amount with exactly two decimals ("0.00")
pub fn format_amount(value: &BigDecimal) -> String {
    round2(value).to_string()
}

/// Value of an optional amount, zero when empty
pub fn or_zero(value: &Option<BigDecimal>) -> BigDecimal {
    value.clone().unwrap_or_else(|| BigDecimal::from(0))
}

/// An optional amount that is present and strictly positive
pub fn positive(value: &Option<BigDecimal>) -> Option<BigDecimal> {
    value
        .as_ref()
        .filter(|v| **v > BigDecimal::from(0))
        .cloned()
}

/// Lenient deserializers for loosely typed JSON
pub mod lenient {
    use super::{parse_amount, parse_field};
    use bigdecimal::BigDecimal;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Number, numeric string, empty string or null into an optional amount
    pub fn amount<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(n)) => Some(parse_amount(&n.to_string())),
            Some(Value::String(s)) => parse_field(&s),
            _ => None,
        })
    }

    /// Number or string into an optional trimmed, non-empty string
    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
    }

    /// Required id that may be persisted as a number or a string
    pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(text(deserializer)?.unwrap_or_default())
    }

    /// Piece counts: numbers or numeric strings, anything else is zero
    pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(n)) => n.as_u64().and_then(|c| u32::try_from(c).ok()).unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        })
    }
}
