//! # Payment Methods
//!
//! Typed records for the gateway's method listing
//! (`GET /methods?include=pricing`): amount bounds, fee schedule and images
//! per payment method.

use crate::amount::{format_two_places, Amount, Currency};
use crate::error::{MollieError, MollieResult};
use crate::reply::{require, require_amount, require_decimal, require_str, require_string};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{json, Value};

/// One entry in a method's fee schedule
#[derive(Debug, Clone, PartialEq)]
pub struct Pricing {
    id: usize,
    description: String,
    fee_region: String,
    fixed_fee_value: Decimal,
    fixed_fee_currency: Currency,
    variable_fee: Decimal,
}

impl Pricing {
    /// Parse the `index`-th pricing entry of a method
    pub fn from_reply(index: usize, entry: &Value) -> MollieResult<Self> {
        let fixed_fee_value = require_decimal(entry, &["fixed", "value"])?;
        let currency = require_str(entry, &["fixed", "currency"])?;
        let fixed_fee_currency = currency
            .parse()
            .map_err(|e| MollieError::malformed(format!("'fixed.currency': {}", e)))?;

        Ok(Self {
            id: index,
            description: require_string(entry, &["description"])?,
            fee_region: require_string(entry, &["feeRegion"])?,
            fixed_fee_value,
            fixed_fee_currency,
            variable_fee: require_decimal(entry, &["variable"])?,
        })
    }

    /// Position in the source listing
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn fee_region(&self) -> &str {
        &self.fee_region
    }

    pub fn fixed_fee_value(&self) -> Decimal {
        self.fixed_fee_value
    }

    pub fn fixed_fee_currency(&self) -> Currency {
        self.fixed_fee_currency
    }

    /// Fixed fee as an `Amount`; `None` for schedules without a fixed part.
    pub fn fixed_fee(&self) -> Option<Amount> {
        Amount::with_currency(self.fixed_fee_value, self.fixed_fee_currency).ok()
    }

    /// Variable fee in percent
    pub fn variable_fee(&self) -> Decimal {
        self.variable_fee
    }

    /// Multiplier form of the variable fee: `1 + variable / 100`
    pub fn variable_fee_calc(&self) -> Decimal {
        Decimal::ONE + self.variable_fee / Decimal::ONE_HUNDRED
    }

    pub fn fixed_fee_str(&self) -> String {
        format!(
            "{} {}",
            self.fixed_fee_currency,
            format_two_places(self.fixed_fee_value)
        )
    }

    pub fn variable_fee_str(&self) -> String {
        format!("{}%", self.variable_fee.normalize())
    }

    /// Fee charged on `amount`: fixed part plus the variable percentage,
    /// rounded to cents.
    pub fn fee_for(&self, amount: &Amount) -> MollieResult<Decimal> {
        let fee = percent_of(amount.decimal(), self.variable_fee)?
            .checked_add(self.fixed_fee_value)
            .ok_or_else(|| fee_overflow(amount.decimal()))?;
        Ok(fee.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn to_object(&self, extended: bool) -> Value {
        let mut output = json!({
            "id": self.id,
            "description": self.description,
            "fee_region": self.fee_region,
            "fixed_fee_value": format_two_places(self.fixed_fee_value),
            "fixed_fee_currency": self.fixed_fee_currency.as_str(),
            "variable_fee": self.variable_fee.normalize().to_string(),
            "variable_fee_calc": self.variable_fee_calc().normalize().to_string(),
        });
        if extended {
            output["fixed_fee_str"] = json!(self.fixed_fee_str());
            output["variable_fee_str"] = json!(self.variable_fee_str());
        }
        output
    }
}

/// Add VAT (in percent) on top of a fee, rounded to cents
pub fn with_vat(fee: Decimal, vat_percent: Decimal) -> MollieResult<Decimal> {
    let total = percent_of(fee, vat_percent)?
        .checked_add(fee)
        .ok_or_else(|| fee_overflow(fee))?;
    Ok(total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

fn percent_of(base: Decimal, percent: Decimal) -> MollieResult<Decimal> {
    base.checked_mul(percent)
        .and_then(|product| product.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| fee_overflow(base))
}

fn fee_overflow(base: Decimal) -> MollieError {
    MollieError::validation(format!("Fee calculation overflows for {}", base))
}

/// A payment method offered by the gateway
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    id: String,
    status: String,
    resource: String,
    description: String,
    amount_min: Amount,
    amount_max: Amount,
    pricing: Vec<Pricing>,
    image_svg_url: String,
    image_png_url: String,
    image_png2x_url: String,
}

impl Method {
    /// Parse one method entry.
    ///
    /// `pricing` may be absent (listings fetched without `include=pricing`),
    /// which yields an empty schedule.
    pub fn from_reply(entry: &Value) -> MollieResult<Self> {
        let amount_min = require_amount(entry, &["minimumAmount"])?;
        // the listing only reports the currency once, on the minimum
        let max_value = require_decimal(entry, &["maximumAmount", "value"])?;
        let amount_max = Amount::with_currency(max_value, amount_min.currency_code())
            .map_err(|e| MollieError::malformed(format!("'maximumAmount': {}", e)))?;

        let pricing = match entry.get("pricing") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => entries
                .iter()
                .enumerate()
                .map(|(idx, item)| Pricing::from_reply(idx, item))
                .collect::<MollieResult<Vec<_>>>()?,
            Some(_) => return Err(MollieError::malformed("'pricing' is not an array")),
        };

        Ok(Self {
            id: require_string(entry, &["id"])?,
            status: require_string(entry, &["status"])?,
            resource: require_string(entry, &["resource"])?,
            description: require_string(entry, &["description"])?,
            amount_min,
            amount_max,
            pricing,
            image_svg_url: require_string(entry, &["image", "svg"])?,
            image_png_url: require_string(entry, &["image", "size1x"])?,
            image_png2x_url: require_string(entry, &["image", "size2x"])?,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount_min(&self) -> &Amount {
        &self.amount_min
    }

    pub fn amount_max(&self) -> &Amount {
        &self.amount_max
    }

    pub fn pricing(&self) -> &[Pricing] {
        &self.pricing
    }

    pub fn image_svg_url(&self) -> &str {
        &self.image_svg_url
    }

    pub fn image_png_url(&self) -> &str {
        &self.image_png_url
    }

    pub fn image_png2x_url(&self) -> &str {
        &self.image_png2x_url
    }

    pub fn is_activated(&self) -> bool {
        self.status == "activated"
    }

    /// Whether `amount` is within this method's bounds and currency
    pub fn supports(&self, amount: &Amount) -> bool {
        amount.currency_code() == self.amount_min.currency_code()
            && amount.decimal() >= self.amount_min.decimal()
            && amount.decimal() <= self.amount_max.decimal()
    }

    pub fn to_object(&self, include_pricing: bool, include_images: bool) -> Value {
        let mut output = json!({
            "id": self.id,
            "status": self.status,
            "description": self.description,
            "resource": self.resource,
            "minimum_amount": self.amount_min,
            "maximum_amount": self.amount_max,
        });
        if include_pricing {
            output["pricing"] = Value::Array(
                self.pricing.iter().map(|p| p.to_object(true)).collect(),
            );
        }
        if include_images {
            output["image_png"] = json!(self.image_png_url);
            output["image_png2x"] = json!(self.image_png2x_url);
            output["image_svg"] = json!(self.image_svg_url);
        }
        output
    }
}

/// Ordered method listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Methods {
    methods: Vec<Method>,
}

impl Methods {
    /// Parse `_embedded.methods` preserving order. An empty listing is an
    /// error: the gateway always offers at least one method to an active
    /// profile.
    pub fn from_listing(reply: &Value) -> MollieResult<Self> {
        let entries = require(reply, &["_embedded", "methods"])?
            .as_array()
            .ok_or_else(|| MollieError::malformed("'_embedded.methods' is not an array"))?;

        if entries.is_empty() {
            return Err(MollieError::malformed("No payment methods in listing"));
        }

        let methods = entries
            .iter()
            .map(Method::from_reply)
            .collect::<MollieResult<Vec<_>>>()?;

        Ok(Self { methods })
    }

    pub fn get(&self, id: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.id == id)
    }

    /// Methods that can take `amount`
    pub fn supporting<'a>(&'a self, amount: &'a Amount) -> impl Iterator<Item = &'a Method> + 'a {
        self.methods.iter().filter(move |m| m.supports(amount))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Method> {
        self.methods.iter()
    }

    pub fn as_slice(&self) -> &[Method] {
        &self.methods
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn to_object(&self, include_pricing: bool, include_images: bool) -> Value {
        json!({
            "count": self.methods.len(),
            "methods": self
                .methods
                .iter()
                .map(|m| m.to_object(include_pricing, include_images))
                .collect::<Vec<_>>(),
        })
    }
}

impl<'a> IntoIterator for &'a Methods {
    type Item = &'a Method;
    type IntoIter = std::slice::Iter<'a, Method>;

    fn into_iter(self) -> Self::IntoIter {
        self.methods.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn method_entry(id: &str, with_pricing: bool) -> Value {
        let mut entry = json!({
            "resource": "method",
            "id": id,
            "description": format!("{} description", id),
            "minimumAmount": {"value": "0.01", "currency": "EUR"},
            "maximumAmount": {"value": "50000.00", "currency": "EUR"},
            "image": {
                "size1x": format!("https://www.mollie.com/external/icons/payment-methods/{}.png", id),
                "size2x": format!("https://www.mollie.com/external/icons/payment-methods/{}%402x.png", id),
                "svg": format!("https://www.mollie.com/external/icons/payment-methods/{}.svg", id)
            },
            "status": "activated",
            "_links": {"self": {"href": format!("https://api.mollie.com/v2/methods/{}", id)}}
        });
        if with_pricing {
            entry["pricing"] = json!([
                {"description": "Commercial & non-European cards", "fixed": {"value": "0.25", "currency": "EUR"}, "variable": "2.8", "feeRegion": "other"},
                {"description": "European cards", "fixed": {"value": "0.25", "currency": "EUR"}, "variable": "1.8", "feeRegion": "eu-cards"},
                {"description": "American Express", "fixed": {"value": "0.00", "currency": "EUR"}, "variable": "2.9", "feeRegion": "amex"}
            ]);
        }
        entry
    }

    fn listing(entries: Vec<Value>) -> Value {
        json!({
            "count": entries.len(),
            "_embedded": {"methods": entries},
            "_links": {"self": {"href": "https://api.mollie.com/v2/methods"}}
        })
    }

    #[test]
    fn test_listing_preserves_order() {
        let reply = listing(vec![
            method_entry("creditcard", true),
            method_entry("banktransfer", false),
            method_entry("paypal", true),
        ]);
        let methods = Methods::from_listing(&reply).unwrap();

        assert_eq!(methods.len(), 3);
        let ids: Vec<_> = methods.iter().map(|m| m.id()).collect();
        assert_eq!(ids, ["creditcard", "banktransfer", "paypal"]);
        assert!(methods.get("banktransfer").unwrap().pricing().is_empty());
    }

    #[test]
    fn test_empty_listing_fails() {
        let err = Methods::from_listing(&listing(vec![])).unwrap_err();
        assert!(matches!(err, MollieError::MalformedReply(_)));

        assert!(Methods::from_listing(&json!({"count": 0})).is_err());
    }

    #[test]
    fn test_method_fields() {
        let method = Method::from_reply(&method_entry("creditcard", true)).unwrap();

        assert_eq!(method.description(), "creditcard description");
        assert!(method.is_activated());
        assert_eq!(method.amount_min().value().as_deref(), Some("0.01"));
        assert_eq!(method.amount_max().value().as_deref(), Some("50000.00"));
        assert_eq!(method.amount_max().currency(), "EUR");
        assert!(method.image_svg_url().ends_with("creditcard.svg"));
        assert_eq!(method.pricing().len(), 3);
        assert_eq!(method.pricing()[2].id(), 2);
        assert_eq!(method.pricing()[2].fee_region(), "amex");
    }

    #[test]
    fn test_method_required_keys() {
        for path in [
            vec!["id"],
            vec!["status"],
            vec!["resource"],
            vec!["description"],
            vec!["minimumAmount"],
            vec!["maximumAmount"],
            vec!["image"],
        ] {
            let mut entry = method_entry("ideal", false);
            entry.as_object_mut().unwrap().remove(path[0]);
            assert!(
                matches!(Method::from_reply(&entry), Err(MollieError::MalformedReply(_))),
                "removing {:?} should fail",
                path
            );
        }

        let mut entry = method_entry("ideal", false);
        entry["image"].as_object_mut().unwrap().remove("size2x");
        assert!(Method::from_reply(&entry).is_err());

        let mut entry = method_entry("ideal", false);
        entry["pricing"] = json!("none");
        assert!(Method::from_reply(&entry).is_err());
    }

    #[test]
    fn test_pricing_parsing() {
        let pricing = Pricing::from_reply(
            4,
            &json!({"description": "European cards", "fixed": {"value": "0.25", "currency": "EUR"}, "variable": "1.8", "feeRegion": "eu-cards"}),
        )
        .unwrap();

        assert_eq!(pricing.id(), 4);
        assert_eq!(pricing.variable_fee(), dec!(1.8));
        assert_eq!(pricing.variable_fee_calc(), dec!(1.018));
        assert_eq!(pricing.fixed_fee_str(), "EUR 0.25");
        assert_eq!(pricing.variable_fee_str(), "1.8%");
        assert_eq!(pricing.fixed_fee().unwrap().value().as_deref(), Some("0.25"));

        let object = pricing.to_object(true);
        assert_eq!(object["variable_fee_calc"], "1.018");
        assert_eq!(object["fixed_fee_str"], "EUR 0.25");
    }

    #[test]
    fn test_pricing_rejects_bad_entries() {
        let missing_variable = json!({"description": "x", "fixed": {"value": "0.25", "currency": "EUR"}, "feeRegion": "eu"});
        assert!(matches!(
            Pricing::from_reply(0, &missing_variable),
            Err(MollieError::MalformedReply(_))
        ));

        let bad_value = json!({"description": "x", "fixed": {"value": "free", "currency": "EUR"}, "variable": "1", "feeRegion": "eu"});
        assert!(Pricing::from_reply(0, &bad_value).is_err());

        let bad_currency = json!({"description": "x", "fixed": {"value": "0.25", "currency": "XXX"}, "variable": "1", "feeRegion": "eu"});
        assert!(Pricing::from_reply(0, &bad_currency).is_err());
    }

    #[test]
    fn test_zero_fixed_fee() {
        let method = Method::from_reply(&method_entry("creditcard", true)).unwrap();
        let amex = &method.pricing()[2];
        assert!(amex.fixed_fee().is_none());
        assert_eq!(amex.fixed_fee_str(), "EUR 0.00");
    }

    #[test]
    fn test_fees() {
        let method = Method::from_reply(&method_entry("creditcard", true)).unwrap();
        let eu = &method.pricing()[1];
        let amount = Amount::eur(dec!(100)).unwrap();

        assert_eq!(eu.fee_for(&amount).unwrap(), dec!(2.05));
        assert_eq!(with_vat(dec!(0.25), dec!(21)).unwrap(), dec!(0.30));
        assert_eq!(with_vat(dec!(1.20), dec!(0)).unwrap(), dec!(1.20));
    }

    #[test]
    fn test_fee_overflow_is_rejected() {
        let pricing = Pricing::from_reply(
            0,
            &json!({"description": "Broken", "fixed": {"value": "0.25", "currency": "EUR"}, "variable": "79228162514264337593543950335", "feeRegion": "other"}),
        )
        .unwrap();
        let amount = Amount::eur(dec!(100)).unwrap();
        assert!(matches!(
            pricing.fee_for(&amount),
            Err(MollieError::Validation(_))
        ));

        assert!(matches!(
            with_vat(Decimal::MAX, dec!(21)),
            Err(MollieError::Validation(_))
        ));

        let largest = Amount::eur(crate::amount::maximum_value()).unwrap();
        let method = Method::from_reply(&method_entry("creditcard", true)).unwrap();
        assert!(method.pricing()[1].fee_for(&largest).is_ok());
    }

    #[test]
    fn test_supporting_amount() {
        let mut small = method_entry("paypal", false);
        small["maximumAmount"] = json!({"value": "10.00", "currency": "EUR"});
        let methods =
            Methods::from_listing(&listing(vec![method_entry("creditcard", false), small])).unwrap();

        let amount = Amount::eur(dec!(25)).unwrap();
        let ids: Vec<_> = methods.supporting(&amount).map(|m| m.id()).collect();
        assert_eq!(ids, ["creditcard"]);

        let usd = Amount::new(dec!(5), "USD").unwrap();
        assert_eq!(methods.supporting(&usd).count(), 0);
    }

    #[test]
    fn test_method_to_object() {
        let method = Method::from_reply(&method_entry("creditcard", true)).unwrap();

        let plain = method.to_object(false, false);
        assert!(plain.get("pricing").is_none());
        assert_eq!(plain["minimum_amount"], json!({"value": "0.01", "currency": "EUR"}));

        let full = method.to_object(true, true);
        assert_eq!(full["pricing"].as_array().unwrap().len(), 3);
        assert!(full["image_png2x"].as_str().unwrap().contains("%402x"));
    }
}
