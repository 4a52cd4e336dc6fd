//! # Payment Record
//!
//! Flat record of a payment as the merchant stores it. Storage itself is up
//! to the caller; this type only carries and checks the values.

use crate::error::{MollieError, MollieResult};
use crate::response::PaymentResponse;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

pub const TRANSACTION_ID_MAX: usize = 255;
pub const BANK_ID_MAX: usize = 4;
pub const DESCRIPTION_MAX: usize = 29;
pub const CONSUMER_FIELD_MAX: usize = 255;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub transaction_id: String,
    pub amount: Decimal,
    #[serde(default)]
    pub bank_id: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub consumer_account: String,
    #[serde(default)]
    pub consumer_name: String,
    #[serde(default)]
    pub consumer_city: String,
}

impl PaymentRecord {
    pub fn new(
        transaction_id: impl Into<String>,
        amount: Decimal,
        description: impl Into<String>,
    ) -> MollieResult<Self> {
        let mut amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(2);

        let record = Self {
            transaction_id: transaction_id.into(),
            amount,
            bank_id: String::new(),
            description: description.into(),
            timestamp: Utc::now(),
            consumer_account: String::new(),
            consumer_name: String::new(),
            consumer_city: String::new(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Record for a freshly created payment. The description is cut to the
    /// column width.
    pub fn from_response(response: &PaymentResponse) -> MollieResult<Self> {
        let description: String = response.description().chars().take(DESCRIPTION_MAX).collect();
        Self::new(response.id(), response.amount().decimal(), description)
    }

    /// Builder: set the consumer fields reported after payment
    pub fn with_consumer(
        mut self,
        account: impl Into<String>,
        name: impl Into<String>,
        city: impl Into<String>,
    ) -> MollieResult<Self> {
        self.consumer_account = account.into();
        self.consumer_name = name.into();
        self.consumer_city = city.into();
        self.validate()?;
        Ok(self)
    }

    pub fn with_bank_id(mut self, bank_id: impl Into<String>) -> MollieResult<Self> {
        self.bank_id = bank_id.into();
        self.validate()?;
        Ok(self)
    }

    /// Check column widths
    pub fn validate(&self) -> MollieResult<()> {
        check_len("transaction_id", &self.transaction_id, TRANSACTION_ID_MAX)?;
        check_len("bank_id", &self.bank_id, BANK_ID_MAX)?;
        check_len("description", &self.description, DESCRIPTION_MAX)?;
        check_len("consumer_account", &self.consumer_account, CONSUMER_FIELD_MAX)?;
        check_len("consumer_name", &self.consumer_name, CONSUMER_FIELD_MAX)?;
        check_len("consumer_city", &self.consumer_city, CONSUMER_FIELD_MAX)?;
        if self.transaction_id.is_empty() {
            return Err(MollieError::validation("transaction_id is required"));
        }
        Ok(())
    }
}

fn check_len(field: &str, value: &str, max: usize) -> MollieResult<()> {
    let len = value.chars().count();
    if len > max {
        return Err(MollieError::validation(format!(
            "{} is {} characters long (max {})",
            field, len, max
        )));
    }
    Ok(())
}
