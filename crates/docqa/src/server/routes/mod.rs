//! API routes for the QA server

pub mod run;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::server::auth;
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Query endpoint, with and without trailing slash
        .route("/hackrx/run", post(run::run_query))
        .route("/hackrx/run/", post(run::run_query))
        .route_layer(middleware::from_fn_with_state(state, auth::require_bearer))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "docqa",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Document question answering over retrieved context",
        "endpoints": {
            "POST /api/v1/hackrx/run": "Answer questions about a document URL (bearer auth)",
            "GET /api/v1/info": "This document",
            "GET /health": "Liveness check"
        }
    }))
}
