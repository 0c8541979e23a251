//! # Ordenes API
//!
//! Self-service restaurant ordering. Customers register with name,
//! email and phone, authenticate with email+phone as a shared secret,
//! place dish orders and walk them through `pending` → `preparing` →
//! `delivered`.
//!
//! The whole service is CRUD over two Postgres tables; the store owns
//! uniqueness and referential integrity, the handlers own validation
//! and the transition gate. One parameterized query per request, no
//! multi-statement transactions.
//!
//! ## Endpoints
//!
//! | Method | Path | Purpose |
//! |---|---|---|
//! | POST | `/clientes/registrar` | create a customer |
//! | POST | `/clientes/login` | email+phone lookup |
//! | POST | `/ordenes` | place an order |
//! | GET | `/ordenes/{clienteId}` | a customer's orders, newest first |
//! | PUT | `/ordenes/{id}/estado` | advance an order's stage |
//! | GET | `/health` | liveness |
//!
//! Every failure becomes a JSON `{error}` body: 400 validation, 401
//! bad credentials, 404 unknown order, 409 duplicate or backward
//! transition, 500 anything else.
//!
//! ## Configuration
//!
//! - `RUST_PORT` — listen port, default 4000
//! - `DATABASE_URL` — Postgres connection string
//! - `RUST_LOG` — tracing filter
//!
//! Migrations under `migrations/` run at startup.
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post, put},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;

use routes::{
    create_order_handler, health_handler, list_orders_handler, login_handler, register_handler,
    update_status_handler,
};
use state::AppState;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(Any)
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/clientes/registrar", post(register_handler))
        .route("/clientes/login", post(login_handler))
        .route("/ordenes", post(create_order_handler))
        .route("/ordenes/{cliente_id}", get(list_orders_handler))
        .route("/ordenes/{id}/estado", put(update_status_handler))
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
