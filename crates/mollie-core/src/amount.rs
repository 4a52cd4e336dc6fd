//! # Amount
//!
//! Validated monetary value: a decimal amount plus an ISO 4217 currency
//! code from the gateway's allow-list.

use crate::error::{MollieError, MollieResult};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::str::FromStr;

/// Currencies accepted by the gateway (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Currency {
    AED,
    AUD,
    BGN,
    BRL,
    CAD,
    CHF,
    CZK,
    DKK,
    EUR,
    GBP,
    HKD,
    HRK,
    HUF,
    ILS,
    ISK,
    JPY,
    MXN,
    MYR,
    NOK,
    NZD,
    PHP,
    PLN,
    RON,
    RUB,
    SEK,
    SGD,
    THB,
    TWD,
    USD,
    ZAR,
}

impl Currency {
    pub const ALL: [Currency; 30] = [
        Currency::AED,
        Currency::AUD,
        Currency::BGN,
        Currency::BRL,
        Currency::CAD,
        Currency::CHF,
        Currency::CZK,
        Currency::DKK,
        Currency::EUR,
        Currency::GBP,
        Currency::HKD,
        Currency::HRK,
        Currency::HUF,
        Currency::ILS,
        Currency::ISK,
        Currency::JPY,
        Currency::MXN,
        Currency::MYR,
        Currency::NOK,
        Currency::NZD,
        Currency::PHP,
        Currency::PLN,
        Currency::RON,
        Currency::RUB,
        Currency::SEK,
        Currency::SGD,
        Currency::THB,
        Currency::TWD,
        Currency::USD,
        Currency::ZAR,
    ];

    /// Returns the upper-cased ISO 4217 code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::AED => "AED",
            Currency::AUD => "AUD",
            Currency::BGN => "BGN",
            Currency::BRL => "BRL",
            Currency::CAD => "CAD",
            Currency::CHF => "CHF",
            Currency::CZK => "CZK",
            Currency::DKK => "DKK",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::HKD => "HKD",
            Currency::HRK => "HRK",
            Currency::HUF => "HUF",
            Currency::ILS => "ILS",
            Currency::ISK => "ISK",
            Currency::JPY => "JPY",
            Currency::MXN => "MXN",
            Currency::MYR => "MYR",
            Currency::NOK => "NOK",
            Currency::NZD => "NZD",
            Currency::PHP => "PHP",
            Currency::PLN => "PLN",
            Currency::RON => "RON",
            Currency::RUB => "RUB",
            Currency::SEK => "SEK",
            Currency::SGD => "SGD",
            Currency::THB => "THB",
            Currency::TWD => "TWD",
            Currency::USD => "USD",
            Currency::ZAR => "ZAR",
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::EUR
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = MollieError;

    /// Case-insensitive lookup in the allow-list
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let upper = code.trim().to_ascii_uppercase();
        Currency::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == upper)
            .ok_or_else(|| MollieError::validation(format!("Currency not allowed: {}", code)))
    }
}

impl TryFrom<String> for Currency {
    type Error = MollieError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.parse()
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.as_str().to_string()
    }
}

/// Smallest amount the gateway accepts
pub fn minimum_value() -> Decimal {
    Decimal::new(1, 3)
}

/// Largest amount accepted locally (10^15). Keeps two-decimal rendering
/// and fee arithmetic inside `Decimal` precision.
pub fn maximum_value() -> Decimal {
    Decimal::new(1_000_000_000_000_000, 0)
}

/// A validated monetary value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount {
    value: Decimal,
    currency: Currency,
}

impl Amount {
    /// Create an amount from a decimal value and a currency code.
    ///
    /// Fails with `Validation` when the value is below 0.001 or the
    /// currency is not in the allow-list.
    pub fn new(value: Decimal, currency: &str) -> MollieResult<Self> {
        let currency = currency.parse()?;
        Ok(Self {
            value: check_value(value)?,
            currency,
        })
    }

    /// Create an amount in EUR
    pub fn eur(value: Decimal) -> MollieResult<Self> {
        Self::with_currency(value, Currency::EUR)
    }

    pub fn with_currency(value: Decimal, currency: Currency) -> MollieResult<Self> {
        Ok(Self {
            value: check_value(value)?,
            currency,
        })
    }

    /// Parse an amount from dynamic input (request bodies, gateway replies).
    ///
    /// Accepts JSON numbers and numeric strings. Absent values, booleans and
    /// anything non-numeric are rejected.
    pub fn from_json(value: &Value, currency: &str) -> MollieResult<Self> {
        Self::new(decimal_from_json(value)?, currency)
    }

    /// Two-decimal rendering, or `None` when the backing value is zero
    pub fn value(&self) -> Option<String> {
        if self.value.is_zero() {
            return None;
        }
        Some(format_two_places(self.value))
    }

    /// The raw decimal as given
    pub fn decimal(&self) -> Decimal {
        self.value
    }

    /// Upper-cased currency code
    pub fn currency(&self) -> &'static str {
        self.currency.as_str()
    }

    pub fn currency_code(&self) -> Currency {
        self.currency
    }

    /// Replace the value; the amount is left unchanged on failure
    pub fn set_value(&mut self, value: Decimal) -> MollieResult<()> {
        self.value = check_value(value)?;
        Ok(())
    }

    /// Replace the currency; the amount is left unchanged on failure
    pub fn set_currency(&mut self, currency: &str) -> MollieResult<()> {
        self.currency = currency.parse()?;
        Ok(())
    }

    /// Structured `{value, currency}` payload for the outbound request
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "value": format_two_places(self.value),
            "currency": self.currency.as_str(),
        })
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.currency, format_two_places(self.value))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            value: String,
            currency: &'a str,
        }

        Wire {
            value: format_two_places(self.value),
            currency: self.currency.as_str(),
        }
        .serialize(serializer)
    }
}

fn check_value(value: Decimal) -> MollieResult<Decimal> {
    if value < minimum_value() {
        return Err(MollieError::validation(format!(
            "Value out of bounds: {} (minimum is 0.001)",
            value
        )));
    }
    if value > maximum_value() {
        return Err(MollieError::validation(format!(
            "Value out of bounds: {} (maximum is {})",
            value,
            maximum_value()
        )));
    }
    Ok(value)
}

/// Round half-up to two places and pad to exactly two decimals
pub fn format_two_places(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// Read a decimal out of a JSON number or numeric string
pub fn decimal_from_json(value: &Value) -> MollieResult<Decimal> {
    match value {
        Value::Null => Err(MollieError::validation("Value has to exist")),
        Value::Bool(_) => Err(MollieError::validation("Value cannot be a boolean")),
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .map_err(|_| MollieError::validation(format!("Value is not numeric: {}", n))),
        Value::String(s) => Decimal::from_str(s.trim())
            .map_err(|_| MollieError::validation(format!("Value is not numeric: {:?}", s))),
        other => Err(MollieError::validation(format!(
            "Value is not an acceptable type: {}",
            other
        ))),
    }
}
