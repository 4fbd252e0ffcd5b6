use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use anyhow::Context;

use storage::AccountStore;

pub mod config;
pub mod provision;

pub use crate::config::{load_rest_api_config, RestApiConfig, StorageEngineType};
pub use crate::provision::{register_account, RegistrationError};

// Map every pipeline outcome onto the wire contract. Internal detail
// (bcrypt, storage backend messages) is logged here and never serialized
// into a response body.
impl IntoResponse for RegistrationError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            RegistrationError::InvalidInput(violations) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Invalid data", "errors": violations }),
            ),
            RegistrationError::DuplicateUsername => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Username already exists" }),
            ),
            RegistrationError::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Email address is already registered. Please use a different email or try logging in." }),
            ),
            RegistrationError::Hashing(err) => {
                tracing::error!(error = %err, "credential hashing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Registration failed" }),
                )
            }
            RegistrationError::Storage(err) => {
                tracing::error!(error = %err, "account persistence failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Registration failed" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

// Shared state for the Axum application
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn AccountStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        AppState { store }
    }
}

// Handler for /api/v1/register
async fn register_account_handler(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Value>), RegistrationError> {
    let user = provision::register_account(state.store.as_ref(), payload).await?;
    tracing::info!(username = %user.username, id = %user.id, "account registered");
    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

// Handler for the /api/v1/health endpoint
async fn health_check_handler() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "message": "REST API is healthy" })),
    )
}

// Handler for the /api/v1/version endpoint
async fn version_handler() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "version": env!("CARGO_PKG_VERSION"), "api_level": 1 })),
    )
}

/// Builds the application router over the given state.
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);

    Router::new()
        .route("/api/v1/register", post(register_account_handler))
        .route("/api/v1/health", get(health_check_handler))
        .route("/api/v1/version", get(version_handler))
        .with_state(state)
        .layer(cors)
}

/// Starts the REST API server and runs it until `shutdown_rx` fires.
pub async fn start_server(
    config: RestApiConfig,
    store: Arc<dyn AccountStore>,
    shutdown_rx: oneshot::Receiver<()>,
) -> Result<(), anyhow::Error> {
    let app = app_router(AppState::new(store));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid host/port in REST API configuration")?;
    let listener = TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind to address: {}", addr))?;
    tracing::info!(%addr, "REST API server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
            tracing::info!("Received shutdown signal.");
        })
        .await
        .context("REST API server failed to start or run")?;

    tracing::info!("REST API server stopped.");
    Ok(())
}
