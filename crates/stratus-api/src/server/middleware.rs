//! Server middleware.

use axum::body::Body;
use axum::http::header::VARY;
use axum::http::{HeaderName, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use stratus_core::context::generate_request_id;

use crate::context::REQUEST_ID_HEADER;
use crate::version::{ApiVersion, VERSION_HEADER};

/// Ensure every request carries a request ID and echo it on the response.
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| HeaderValue::to_str(v).ok())
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(generate_request_id);

    let value = HeaderValue::from_str(&request_id).ok();
    if let Some(value) = &value {
        request
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value.clone());
    }

    let mut response = next.run(request).await;
    if let Some(value) = value {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

/// Negotiate the API version and stash it in request extensions.
///
/// Successful responses echo the negotiated version and vary on the header.
pub async fn api_version_middleware(mut request: Request<Body>, next: Next) -> Response {
    let raw = request
        .headers()
        .get(VERSION_HEADER)
        .map(|v| v.to_str().unwrap_or_default().to_string());

    let version = match ApiVersion::negotiate(raw.as_deref()) {
        Ok(version) => version,
        Err(e) => {
            tracing::debug!("Rejected API version {:?}: {}", raw, e);
            return e.into_response();
        }
    };
    request.extensions_mut().insert(version);

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&version.header_value()) {
        let headers = response.headers_mut();
        headers.insert(HeaderName::from_static("openstack-api-version"), value);
        headers.insert(VARY, HeaderValue::from_static(VERSION_HEADER));
    }
    response
}
