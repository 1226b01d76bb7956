//! HTTP server for the document QA service

pub mod auth;
pub mod routes;
pub mod state;

use axum::{routing::get, Json, Router};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::DocQaConfig;
use crate::error::Result;
use state::AppState;

/// Document QA HTTP server
pub struct DocQaServer {
    config: DocQaConfig,
    state: AppState,
}

impl DocQaServer {
    /// Create a new server
    pub fn new(config: DocQaConfig) -> Result<Self> {
        let state = AppState::new(config.clone())?;
        Ok(Self { config, state })
    }

    /// Build the router with all routes
    fn build_router(&self) -> Router {
        let router = Router::new()
            .route("/", get(homepage))
            .route("/health", get(health_check))
            .route("/ready", get(readiness))
            .nest("/api/v1", routes::api_routes(self.state.clone()))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.server.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router.layer(cors)
        } else {
            router
        }
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.server.host, self.config.server.port)
            .parse()
            .map_err(|e| crate::error::Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.build_router();

        tracing::info!("Starting document QA server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| crate::error::Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| crate::error::Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Root route
async fn homepage() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to the document QA API. See /api/v1/info for endpoints."
    }))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Readiness check: both hosted collaborators must be reachable
async fn readiness(state: axum::extract::State<AppState>) -> axum::http::StatusCode {
    let llm_ok = state.llm().health_check().await.unwrap_or(false);
    let index_ok = state.index().health_check().await.unwrap_or(false);

    if llm_ok && index_ok {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    }
}
