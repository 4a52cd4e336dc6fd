//! # Routes
//!
//! Axum router configuration for the payment API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /health - Health check
/// - POST /payment_create - Create a payment
/// - GET|POST /payment_confirmed/{id} - Payer returned after checkout
/// - GET|POST /payment_failed/{id} - Payer returned after a failed checkout
/// - POST /payment_update/{id} - Mollie webhook
/// - GET  /methods - Enabled payment methods
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Where the payer's browser lands
    let callback_routes = Router::new()
        .route(
            "/payment_confirmed/{id}",
            get(handlers::payment_confirmed).post(handlers::payment_confirmed),
        )
        .route(
            "/payment_failed/{id}",
            get(handlers::payment_failed).post(handlers::payment_failed),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .route("/payment_create", post(handlers::create_payment))
        .route("/payment_update/{id}", post(handlers::payment_update))
        .route("/methods", get(handlers::list_methods))
        .merge(callback_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
