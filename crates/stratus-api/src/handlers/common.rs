//! Common API handler utilities.

use axum::http::header::HOST;
use axum::http::HeaderMap;
use axum::response::Json;
use stratus_core::SharedConfig;

use crate::models::ErrorResponse;

/// Result type for handlers returning a JSON body.
pub type HandlerResult<T> = Result<Json<T>, ErrorResponse>;

/// Result type for utility functions that return parsed values (not full responses).
pub type ExtractResult<T> = Result<T, ErrorResponse>;

/// Create a successful response with data.
pub fn ok<T: serde::Serialize>(data: T) -> HandlerResult<T> {
    Ok(Json(data))
}

/// Parse a query parameter that must be a non-negative integer.
pub fn extract_non_negative(name: &str, value: &str) -> ExtractResult<usize> {
    value.trim().parse::<usize>().map_err(|_| {
        ErrorResponse::bad_request(format!(
            "Invalid query parameter '{}': {} (must be a non-negative integer)",
            name, value
        ))
    })
}

/// Versioned base URL for links in responses.
///
/// Uses the configured public endpoint, or the request's `Host`.
pub fn request_base_url(config: &SharedConfig, headers: &HeaderMap) -> String {
    if let Some(endpoint) = config.read().public_endpoint.clone() {
        return endpoint;
    }
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("localhost");
    format!("http://{}/v3", host)
}
