//! # mollie-core
//!
//! Core types and traits for the Mollie payment integration.
//!
//! This crate provides:
//! - `Amount` and `Currency` for validated money values
//! - `Payment` for building create-payment requests
//! - `PaymentResponse` and `PaymentUpdate` for parsing gateway replies
//! - `Pricing`, `Method` and `Methods` for the method listing
//! - `PaymentGateway` trait and `PaymentDispatcher` for the round trip
//! - `PaymentRecord` for the merchant-side record
//! - `MollieError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use mollie_core::{Amount, Payment, PaymentDispatcher};
//! use rust_decimal_macros::dec;
//!
//! let payment = Payment::new(
//!     Amount::new(dec!(100), "eur")?,
//!     "Donation #734",
//!     "https://felloz.com/donation-confirm/734",
//! )?
//! .with_method("creditcard")?;
//!
//! let response = dispatcher.create(&payment).await?;
//!
//! // Redirect user to response.checkout_url()
//! ```

pub mod amount;
pub mod error;
pub mod gateway;
pub mod methods;
pub mod payment;
pub mod record;
mod reply;
pub mod response;

// Re-exports for convenience
pub use amount::{Amount, Currency};
pub use error::{MollieError, MollieResult};
pub use gateway::{BoxedPaymentGateway, PaymentDispatcher, PaymentGateway};
pub use methods::{with_vat, Method, Methods, Pricing};
pub use payment::{Locale, Payment, PaymentMethod, PaymentPayload, FELLOZ_ID_KEY};
pub use record::PaymentRecord;
pub use response::{PaymentResponse, PaymentStatus, PaymentUpdate};
