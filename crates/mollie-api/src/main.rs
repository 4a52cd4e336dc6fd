//! # mollie-pay
//!
//! Payment service in front of the Mollie API.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export MOLLIE_API_KEY=test_...
//! export PUBLIC_BASE_URL=https://pay.example.com
//!
//! # Run the server
//! mollie-pay
//! ```

use mollie_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    match &state.config.public_base_url {
        Some(base) => info!("Callback base URL: {}", base),
        None => info!("PUBLIC_BASE_URL not set, requests must carry redirect_url"),
    }

    let app = routes::create_router(state);

    info!(
        "mollie-pay {} starting on http://{}",
        env!("CARGO_PKG_VERSION"),
        addr
    );

    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!("Create: POST http://{}/payment_create", addr);
        info!("Methods: GET http://{}/methods", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
