//! API middleware

use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;

/// Bound each request's unit of work. An elapsed deadline aborts the handler
/// and is reported as a server error.
pub async fn deadline(State(limit): State<Duration>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(method = %method, uri = %uri, "Request aborted after deadline");
            AppError::Timeout(limit.as_secs()).into_response()
        }
    }
}
