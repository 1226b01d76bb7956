//! Bearer token authentication middleware

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::{Error, Result};

use super::state::AppState;

/// Require a valid bearer token on protected routes
///
/// An empty configured token disables the endpoint rather than leaving it
/// open.
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let expected = &state.config().server.bearer_token;
    if expected.is_empty() {
        tracing::error!("Rejecting request: no bearer token configured");
        return Err(Error::Unauthorized);
    }

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    match header.strip_prefix("Bearer ") {
        Some(token) if token == expected.as_str() => Ok(next.run(request).await),
        _ => Err(Error::Unauthorized),
    }
}
