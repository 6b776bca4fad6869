//! # Gadget-Shop RS
//!
//! E-commerce backend: catalog, per-user carts, checkout review, PayPal
//! capture, persisted orders.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export JWT_SECRET_KEY=...
//! export MONGODB_URI=mongodb://127.0.0.1:27017
//! export PAYPAL_CLIENT_ID=...
//! export PAYPAL_CLIENT_SECRET=...
//!
//! # Run the server
//! gadget-shop
//! ```

use shop_api::{routes, state::AppState};
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

    print_banner();

    // Initialize application state (MongoDB + PayPal)
    let state = AppState::new().await?;

    let addr = state.config.socket_addr();
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Database: {}", state.config.mongodb_database);

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("Gadget-Shop starting on http://{}", addr);

    if !is_prod {
        info!("Health: GET http://{}/health", addr);
        info!("Products: GET http://{}/products", addr);
        info!("Checkout: POST http://{}/checkout", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  Gadget-Shop RS
  ━━━━━━━━━━━━━━
  Catalog · Cart · Checkout · Orders
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
