//! # mollie-api
//!
//! HTTP API layer for mollie-pay-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for creating payments and listing methods
//! - Redirect and webhook endpoints for Mollie callbacks
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/payment_create` | Create payment |
//! | GET/POST | `/payment_confirmed/{id}` | Payer returned |
//! | GET/POST | `/payment_failed/{id}` | Payer returned, payment failed |
//! | POST | `/payment_update/{id}` | Mollie webhook |
//! | GET | `/methods` | Payment methods with pricing |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
