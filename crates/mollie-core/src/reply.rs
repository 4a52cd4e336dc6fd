//! Helpers for pulling required keys out of gateway replies.
//!
//! Every failure here is a `MalformedReply`: the transport worked but the
//! body is not what the gateway contract promises.

use crate::amount::{decimal_from_json, Amount};
use crate::error::{MollieError, MollieResult};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// Walk a key path, failing if any segment is missing
pub(crate) fn require<'a>(value: &'a Value, path: &[&str]) -> MollieResult<&'a Value> {
    let mut current = value;
    for (depth, key) in path.iter().enumerate() {
        current = current
            .as_object()
            .and_then(|obj| obj.get(*key))
            .ok_or_else(|| MollieError::malformed(format!("missing key '{}'", path[..=depth].join("."))))?;
    }
    Ok(current)
}

pub(crate) fn require_str<'a>(value: &'a Value, path: &[&str]) -> MollieResult<&'a str> {
    require(value, path)?
        .as_str()
        .ok_or_else(|| MollieError::malformed(format!("'{}' is not a string", path.join("."))))
}

pub(crate) fn require_string(value: &Value, path: &[&str]) -> MollieResult<String> {
    require_str(value, path).map(str::to_string)
}

/// Key must be present; `null` maps to `None`
pub(crate) fn require_nullable_string(value: &Value, path: &[&str]) -> MollieResult<Option<String>> {
    match require(value, path)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(MollieError::malformed(format!(
            "'{}' is not a string",
            path.join(".")
        ))),
    }
}

pub(crate) fn require_object<'a>(
    value: &'a Value,
    path: &[&str],
) -> MollieResult<&'a Map<String, Value>> {
    require(value, path)?
        .as_object()
        .ok_or_else(|| MollieError::malformed(format!("'{}' is not an object", path.join("."))))
}

pub(crate) fn require_decimal(value: &Value, path: &[&str]) -> MollieResult<Decimal> {
    decimal_from_json(require(value, path)?)
        .map_err(|e| MollieError::malformed(format!("'{}': {}", path.join("."), e)))
}

/// Read `{value, currency}` from `path` into a validated `Amount`
pub(crate) fn require_amount(value: &Value, path: &[&str]) -> MollieResult<Amount> {
    let mut value_path = path.to_vec();
    value_path.push("value");
    let mut currency_path = path.to_vec();
    currency_path.push("currency");

    let decimal = require_decimal(value, &value_path)?;
    let currency = require_str(value, &currency_path)?;
    Amount::new(decimal, currency)
        .map_err(|e| MollieError::malformed(format!("'{}': {}", path.join("."), e)))
}
