//! Request identity extracted from upstream auth headers.
//!
//! An authenticating proxy in front of the service sets:
//!
//! | Header | Meaning |
//! |--------|---------|
//! | `X-Project-Id` | caller's project (required) |
//! | `X-User-Id` | caller's user |
//! | `X-Roles` | comma separated roles; `admin` grants an admin context |
//! | `X-Openstack-Request-Id` | correlation ID, generated when absent |

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use stratus_core::{context::generate_request_id, RequestContext};

use crate::models::ErrorResponse;

pub const PROJECT_ID_HEADER: &str = "x-project-id";
pub const USER_ID_HEADER: &str = "x-user-id";
pub const ROLES_HEADER: &str = "x-roles";
pub const REQUEST_ID_HEADER: &str = "x-openstack-request-id";

/// Extractor yielding the caller's [`RequestContext`].
#[derive(Debug, Clone)]
pub struct ApiContext(pub RequestContext);

impl ApiContext {
    /// Build a context from request headers.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ErrorResponse> {
        let request_id = header(headers, REQUEST_ID_HEADER).unwrap_or_else(generate_request_id);

        let Some(project_id) = header(headers, PROJECT_ID_HEADER) else {
            return Err(ErrorResponse::unauthorized("Missing project identity")
                .with_request_id(request_id));
        };

        let roles = header(headers, ROLES_HEADER)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let ctx = RequestContext::from_roles(header(headers, USER_ID_HEADER), Some(project_id), roles)
            .with_request_id(request_id);
        Ok(Self(ctx))
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl<S> FromRequestParts<S> for ApiContext
where
    S: Send + Sync,
{
    type Rejection = ErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}
