//! # Payment Request
//!
//! Outbound payment model. Every setter validates before assigning, so a
//! failed call never leaves the payment half-updated.

use crate::amount::Amount;
use crate::error::{MollieError, MollieResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::warn;
use uuid::Uuid;

/// Metadata key carrying the internal correlation id
pub const FELLOZ_ID_KEY: &str = "felloz_id";

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[\w-]+\.\w{2,}/?(?:[\w.?=&/-]+)?$").expect("URL pattern is valid")
});

/// Check a redirect/webhook URL against the accepted shape
pub fn is_valid_url(url: &str) -> bool {
    URL_PATTERN.is_match(url)
}

/// Payment methods a payment can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    ApplePay,
    CreditCard,
    BankTransfer,
    PayPal,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::ApplePay => "applepay",
            PaymentMethod::CreditCard => "creditcard",
            PaymentMethod::BankTransfer => "banktransfer",
            PaymentMethod::PayPal => "paypal",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = MollieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applepay" => Ok(PaymentMethod::ApplePay),
            "creditcard" => Ok(PaymentMethod::CreditCard),
            "banktransfer" => Ok(PaymentMethod::BankTransfer),
            "paypal" => Ok(PaymentMethod::PayPal),
            other => Err(MollieError::validation(format!(
                "Method not available: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! locales {
    ($($variant:ident => $tag:literal),+ $(,)?) => {
        /// Checkout page locales
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Locale {
            $(
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl Locale {
            pub const ALL: &'static [Locale] = &[$(Locale::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Locale::$variant => $tag,)+
                }
            }
        }

        impl FromStr for Locale {
            type Err = MollieError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok(Locale::$variant),)+
                    other => Err(MollieError::validation(format!(
                        "Locale not available: {}",
                        other
                    ))),
                }
            }
        }
    };
}

locales! {
    EnUs => "en_US",
    NlNl => "nl_NL",
    NlBe => "nl_BE",
    FrFr => "fr_FR",
    FrBe => "fr_BE",
    DeDe => "de_DE",
    DeAt => "de_AT",
    DeCh => "de_CH",
    EsEs => "es_ES",
    CaEs => "ca_ES",
    PtPt => "pt_PT",
    ItIt => "it_IT",
    NbNo => "nb_NO",
    SvSe => "sv_SE",
    FiFi => "fi_FI",
    DaDk => "da_DK",
    IsIs => "is_IS",
    HuHu => "hu_HU",
    PlPl => "pl_PL",
    LvLv => "lv_LV",
    LtLt => "lt_LT",
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment to be created at the gateway
#[derive(Debug, Clone)]
pub struct Payment {
    id: Uuid,
    amount: Amount,
    description: String,
    redirect_url: String,
    webhook_url: Option<String>,
    method: Option<PaymentMethod>,
    locale: Option<Locale>,
    metadata: Map<String, Value>,
    payment_id: Option<String>,
    payment_metadata: Option<Value>,
}

impl Payment {
    /// Create a payment with its required fields and a fresh correlation id
    pub fn new(
        amount: Amount,
        description: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> MollieResult<Self> {
        let description = check_description(description.into())?;
        let redirect_url = check_url("Redirect URL", redirect_url.into())?;

        Ok(Self {
            id: Uuid::new_v4(),
            amount,
            description,
            redirect_url,
            webhook_url: None,
            method: None,
            locale: None,
            metadata: Map::new(),
            payment_id: None,
            payment_metadata: None,
        })
    }

    /// Internal correlation id
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Hex form of the correlation id, as sent in `metadata.felloz_id`
    pub fn felloz_id(&self) -> String {
        self.id.simple().to_string()
    }

    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn redirect_url(&self) -> &str {
        &self.redirect_url
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_deref()
    }

    pub fn method(&self) -> Option<PaymentMethod> {
        self.method
    }

    pub fn locale(&self) -> Option<Locale> {
        self.locale
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn payment_id(&self) -> Option<&str> {
        self.payment_id.as_deref()
    }

    pub fn payment_metadata(&self) -> Option<&Value> {
        self.payment_metadata.as_ref()
    }

    pub fn set_amount(&mut self, amount: Amount) {
        self.amount = amount;
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> MollieResult<()> {
        self.description = check_description(description.into())?;
        Ok(())
    }

    pub fn set_redirect_url(&mut self, url: impl Into<String>) -> MollieResult<()> {
        self.redirect_url = check_url("Redirect URL", url.into())?;
        Ok(())
    }

    pub fn set_webhook_url(&mut self, url: impl Into<String>) -> MollieResult<()> {
        self.webhook_url = Some(check_url("Webhook URL", url.into())?);
        Ok(())
    }

    /// Restrict the payment to a method by its gateway name (e.g. "creditcard")
    pub fn set_method(&mut self, method: &str) -> MollieResult<()> {
        self.method = Some(method.parse()?);
        Ok(())
    }

    pub fn set_locale(&mut self, locale: &str) -> MollieResult<()> {
        self.locale = Some(locale.parse()?);
        Ok(())
    }

    /// Replace caller metadata. `felloz_id` is reserved and is overwritten
    /// in the outbound payload.
    pub fn set_metadata(&mut self, metadata: Map<String, Value>) {
        if metadata.contains_key(FELLOZ_ID_KEY) {
            warn!(
                "Caller metadata contains reserved key '{}'; it will be replaced",
                FELLOZ_ID_KEY
            );
        }
        self.metadata = metadata;
    }

    /// Remember what the gateway returned for this payment
    pub fn record_creation(&mut self, payment_id: impl Into<String>, reply: Value) {
        self.payment_id = Some(payment_id.into());
        self.payment_metadata = Some(reply);
    }

    /// Builder: set the webhook URL
    pub fn with_webhook_url(mut self, url: impl Into<String>) -> MollieResult<Self> {
        self.set_webhook_url(url)?;
        Ok(self)
    }

    /// Builder: set the method
    pub fn with_method(mut self, method: &str) -> MollieResult<Self> {
        self.set_method(method)?;
        Ok(self)
    }

    /// Builder: set the locale
    pub fn with_locale(mut self, locale: &str) -> MollieResult<Self> {
        self.set_locale(locale)?;
        Ok(self)
    }

    /// Builder: add one metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Assemble the canonical request body
    pub fn payload(&self) -> PaymentPayload {
        let mut metadata = self.metadata.clone();
        if let Some(previous) = metadata.insert(FELLOZ_ID_KEY.to_string(), Value::String(self.felloz_id())) {
            warn!("Overwrote caller-supplied {}={}", FELLOZ_ID_KEY, previous);
        }

        PaymentPayload {
            amount: self.amount.clone(),
            description: self.description.clone(),
            redirect_url: self.redirect_url.clone(),
            webhook_url: self.webhook_url.clone(),
            method: self.method,
            locale: self.locale,
            metadata,
            payment_id: self.payment_id.clone(),
            payment_metadata: self.payment_metadata.clone(),
        }
    }

    /// Indented JSON of the request body
    pub fn pretty_json(&self) -> MollieResult<String> {
        Ok(serde_json::to_string_pretty(&self.payload())?)
    }
}

impl std::fmt::Display for Payment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Payment({}, {}, F#{}, redirect:{}, webhook:{})",
            self.amount,
            self.description,
            self.felloz_id(),
            self.redirect_url,
            self.webhook_url.as_deref().unwrap_or("-")
        )
    }
}

/// Request body for the gateway's create-payment endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentPayload {
    pub amount: Amount,
    pub description: String,
    #[serde(rename = "redirectUrl")]
    pub redirect_url: String,
    #[serde(rename = "webhookUrl", skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<Locale>,
    pub metadata: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_metadata: Option<Value>,
}

impl PaymentPayload {
    pub fn felloz_id(&self) -> Option<&str> {
        self.metadata.get(FELLOZ_ID_KEY).and_then(|v| v.as_str())
    }

    pub fn to_value(&self) -> MollieResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn check_description(description: String) -> MollieResult<String> {
    if description.chars().count() < 3 {
        return Err(MollieError::validation(
            "Description needs to be 3 characters or longer",
        ));
    }
    Ok(description)
}

fn check_url(label: &str, url: String) -> MollieResult<String> {
    if !is_valid_url(&url) {
        return Err(MollieError::validation(format!(
            "{} is not a valid URL: {}",
            label, url
        )));
    }
    Ok(url)
}
