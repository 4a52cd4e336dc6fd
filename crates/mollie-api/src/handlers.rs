//! # Request Handlers
//!
//! Axum request handlers for the payment API.

use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};
use mollie_client::{dispatch_payment_update, WebhookNotification};
use mollie_core::{Amount, MollieError, Payment};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

type HandlerError = (StatusCode, Json<ErrorResponse>);

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create payment request
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    /// Number or numeric string; absent is `Null` and fails validation
    #[serde(default)]
    pub amount: Value,
    /// ISO 4217 code, defaults to EUR
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Defaults to `{PUBLIC_BASE_URL}/payment_confirmed/{felloz_id}`
    #[serde(default)]
    pub redirect_url: Option<String>,
    /// Defaults to `{PUBLIC_BASE_URL}/payment_update/{felloz_id}`
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Result of a payer returning from checkout
#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub felloz_id: String,
    pub result: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

pub fn mollie_error_to_response(err: MollieError) -> HandlerError {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

/// Bodies axum cannot deserialize get the same error shape as invalid fields
fn json_rejection_to_response(rejection: JsonRejection) -> HandlerError {
    warn!("Rejected request body: {}", rejection.body_text());
    mollie_error_to_response(MollieError::validation(rejection.body_text()))
}

fn parse_felloz_id(raw: &str) -> Result<String, HandlerError> {
    Uuid::parse_str(raw)
        .map(|id| id.simple().to_string())
        .map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!("Invalid payment reference: {}", raw), 400)),
            )
        })
}

/// Turn the request into a validated `Payment`
fn build_payment(state: &AppState, request: CreatePaymentRequest) -> Result<Payment, MollieError> {
    let currency = request.currency.as_deref().unwrap_or("EUR");
    let amount = Amount::from_json(&request.amount, currency)?;

    let placeholder = match (&request.redirect_url, &state.config.public_base_url) {
        (Some(url), _) => url.clone(),
        (None, Some(base)) => base.clone(),
        (None, None) => {
            return Err(MollieError::validation(
                "redirect_url is required when PUBLIC_BASE_URL is not configured",
            ))
        }
    };

    let mut payment = Payment::new(amount, request.description, placeholder)?;
    let felloz_id = payment.felloz_id();

    if request.redirect_url.is_none() {
        if let Some(url) = state.config.confirmed_url(&felloz_id) {
            payment.set_redirect_url(url)?;
        }
    }

    match request.webhook_url {
        Some(url) => payment.set_webhook_url(url)?,
        None => {
            if let Some(url) = state.config.update_url(&felloz_id) {
                payment.set_webhook_url(url)?;
            }
        }
    }

    if let Some(method) = request.method.as_deref() {
        payment.set_method(method)?;
    }
    if let Some(locale) = request.locale.as_deref() {
        payment.set_locale(locale)?;
    }
    if let Some(metadata) = request.metadata {
        payment.set_metadata(metadata);
    }

    Ok(payment)
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "mollie-pay",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a payment and return the checkout details
#[instrument(skip(state, body))]
pub async fn create_payment(
    State(state): State<AppState>,
    body: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), HandlerError> {
    let Json(request) = body.map_err(json_rejection_to_response)?;

    let payment = build_payment(&state, request).map_err(|e| {
        warn!("Rejected payment request: {}", e);
        mollie_error_to_response(e)
    })?;

    info!(
        "Creating payment: felloz_id={}, amount={}",
        payment.felloz_id(),
        payment.amount()
    );

    let response = state.dispatcher.create(&payment).await.map_err(|e| {
        error!("Failed to create payment: {}", e);
        mollie_error_to_response(e)
    })?;

    Ok((StatusCode::CREATED, Json(response.to_object())))
}

/// Payer came back from a completed checkout
#[instrument]
pub async fn payment_confirmed(
    Path(id): Path<String>,
) -> Result<Json<CallbackResponse>, HandlerError> {
    let felloz_id = parse_felloz_id(&id)?;
    info!("Payment confirmed by payer: {}", felloz_id);
    Ok(Json(CallbackResponse {
        felloz_id,
        result: "confirmed",
    }))
}

/// Payer came back from a failed or canceled checkout
#[instrument]
pub async fn payment_failed(Path(id): Path<String>) -> Result<Json<CallbackResponse>, HandlerError> {
    let felloz_id = parse_felloz_id(&id)?;
    warn!("Payment failed for payer: {}", felloz_id);
    Ok(Json(CallbackResponse {
        felloz_id,
        result: "failed",
    }))
}

/// Mollie webhook
///
/// The notification only carries the payment id, so the payment is fetched
/// before anything is dispatched. The path reference is free-form: callers
/// may register their own webhook URLs.
#[instrument(skip(state, notification), fields(payment_id = %notification.id))]
pub async fn payment_update(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Form(notification): Form<WebhookNotification>,
) -> Result<Json<Value>, HandlerError> {
    let update = state
        .dispatcher
        .check(&notification.id)
        .await
        .map_err(|e| {
            error!("Failed to check payment {}: {}", notification.id, e);
            mollie_error_to_response(e)
        })?;

    // Only our own references are comparable with the reply metadata
    let reference = match Uuid::parse_str(&reference) {
        Ok(id) => {
            let felloz_id = id.simple().to_string();
            if update.felloz_id.as_deref().is_some_and(|reported| reported != felloz_id) {
                warn!(
                    "Webhook reference mismatch: path={}, payment={:?}",
                    felloz_id, update.felloz_id
                );
            }
            felloz_id
        }
        Err(_) => reference,
    };

    info!("Payment update: id={}, status={}", update.id, update.status);

    dispatch_payment_update(state.webhook_handler.as_ref(), &update).map_err(|e| {
        error!("Webhook handler error: {}", e);
        mollie_error_to_response(e)
    })?;

    Ok(Json(json!({
        "reference": reference,
        "id": update.id,
        "status": update.status.as_str(),
    })))
}

/// Enabled payment methods with pricing and images
#[instrument(skip(state))]
pub async fn list_methods(State(state): State<AppState>) -> Result<Json<Value>, HandlerError> {
    let methods = state.dispatcher.methods().await.map_err(|e| {
        error!("Failed to list methods: {}", e);
        mollie_error_to_response(e)
    })?;

    Ok(Json(methods.to_object(true, true)))
}
