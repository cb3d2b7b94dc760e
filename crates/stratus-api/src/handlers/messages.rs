//! Message API handlers.
//!
//! GET    /v3/messages                       - List messages
//! GET    /v3/:project_id/messages           - List messages
//! GET    /v3/messages/:id                   - Get message
//! GET    /v3/:project_id/messages/:id       - Get message
//! DELETE /v3/messages/:id                   - Delete message
//! DELETE /v3/:project_id/messages/:id       - Delete message
//!
//! All routes need API version 3.3. Listing parameters (`limit`, `marker`,
//! `offset`, `sort`, `sort_key`, `sort_dir` and equality filters) take
//! effect from 3.5 and are ignored by older clients.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Extension, Router,
};
use stratus_storage::query::{DEFAULT_SORT_DIR, DEFAULT_SORT_KEY};
use stratus_storage::{MessageQuery, SortDir};

use super::common::{extract_non_negative, ok, request_base_url, ExtractResult, HandlerResult};
use crate::context::ApiContext;
use crate::models::{ErrorResponse, LinkBuilder, MessageDetail, MessageIndex};
use crate::server::middleware::api_version_middleware;
use crate::server::AppState;
use crate::version::ApiVersion;

/// Listing parameters resolved from a request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub query: MessageQuery,
    /// Page size used to decide whether a `next` link is due.
    pub page_size: usize,
}

impl ListParams {
    /// Parameters for clients that predate listing support.
    pub fn unbounded(max_limit: usize) -> Self {
        Self {
            query: MessageQuery::default(),
            page_size: max_limit,
        }
    }

    /// Parse request parameters. Unrecognized keys become equality filters.
    pub fn parse(params: &[(String, String)], max_limit: usize) -> ExtractResult<Self> {
        let mut query = MessageQuery::new();
        let mut sort = None;
        let mut sort_key = None;
        let mut sort_dir = None;

        for (key, value) in params {
            match key.as_str() {
                "limit" => query.limit = Some(extract_non_negative("limit", value)?),
                "offset" => query.offset = Some(extract_non_negative("offset", value)?),
                "marker" => query.marker = Some(value.clone()),
                "sort" => sort = Some(value.as_str()),
                "sort_key" => sort_key = Some(value.as_str()),
                "sort_dir" => sort_dir = Some(value.as_str()),
                _ => {
                    query.filters.insert(key.clone(), value.clone());
                }
            }
        }

        let (keys, dirs) = match (sort, sort_key, sort_dir) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(ErrorResponse::bad_request(
                    "The 'sort' parameter cannot be combined with 'sort_key' or 'sort_dir'",
                ));
            }
            (Some(sort), None, None) => parse_sort(sort)?,
            (None, None, None) => (Vec::new(), Vec::new()),
            (None, key, dir) => {
                let key = key.unwrap_or(DEFAULT_SORT_KEY).trim().to_string();
                let dir = dir.map(str::parse::<SortDir>).transpose()?;
                (vec![key], vec![dir.unwrap_or(DEFAULT_SORT_DIR)])
            }
        };
        if !keys.is_empty() {
            query.sort_keys = Some(keys);
            query.sort_dirs = Some(dirs);
        }

        let page_size = query.limit.map_or(max_limit, |limit| limit.min(max_limit));
        query.limit = Some(page_size);

        Ok(Self { query, page_size })
    }
}

/// Parse `key[:dir][,key[:dir]...]`.
fn parse_sort(raw: &str) -> ExtractResult<(Vec<String>, Vec<SortDir>)> {
    let mut keys = Vec::new();
    let mut dirs = Vec::new();
    for item in raw.split(',') {
        let (key, dir) = match item.split_once(':') {
            Some((key, dir)) => (key.trim(), Some(dir.parse::<SortDir>()?)),
            None => (item.trim(), None),
        };
        if key.is_empty() {
            return Err(ErrorResponse::bad_request(format!(
                "Invalid sort parameter: {}",
                raw
            )));
        }
        keys.push(key.to_string());
        dirs.push(dir.unwrap_or(DEFAULT_SORT_DIR));
    }
    Ok((keys, dirs))
}

/// Parameters to carry into a `next` link.
///
/// Drops `marker` and keeps only the last occurrence of a repeated key,
/// which is the one [`ListParams::parse`] applied.
fn carried_params(params: &[(String, String)]) -> Vec<(String, String)> {
    params
        .iter()
        .enumerate()
        .filter(|(i, (key, _))| {
            key != "marker" && !params[i + 1..].iter().any(|(later, _)| later == key)
        })
        .map(|(_, pair)| pair.clone())
        .collect()
}

fn require_messages(version: ApiVersion) -> ExtractResult<()> {
    if version.capabilities().messages() {
        Ok(())
    } else {
        Err(ErrorResponse::new(
            "NOT_FOUND",
            format!("API version {} does not support messages", version),
            StatusCode::NOT_FOUND,
        ))
    }
}

fn message_id(params: &HashMap<String, String>) -> ExtractResult<&str> {
    params
        .get("id")
        .map(String::as_str)
        .ok_or_else(|| ErrorResponse::bad_request("Missing message id"))
}

/// List messages.
/// GET /v3/messages
pub async fn list_messages_handler(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    ApiContext(ctx): ApiContext,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> HandlerResult<MessageIndex> {
    require_messages(version)?;

    let max_limit = state.config.read().osapi_max_limit;
    let listing = if version.capabilities().list_params() {
        ListParams::parse(&params, max_limit)?
    } else {
        ListParams::unbounded(max_limit)
    };

    let records = state.api.get_all(&ctx, &listing.query).await?;

    let links = LinkBuilder::new(request_base_url(&state.config, &headers));
    let mut messages_links = Vec::new();
    if let Some(last) = records.last() {
        if records.len() == listing.page_size {
            let project_id = ctx.project_id.as_deref().unwrap_or_default();
            messages_links.push(links.next(project_id, &carried_params(&params), &last.id));
        }
    }

    tracing::debug!(
        request_id = %ctx.request_id,
        count = records.len(),
        "Listed messages"
    );
    ok(MessageIndex {
        messages: records.into_iter().map(|r| links.view(r)).collect(),
        messages_links,
    })
}

/// Get a message.
/// GET /v3/messages/:id
pub async fn get_message_handler(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    ApiContext(ctx): ApiContext,
    headers: HeaderMap,
    Path(params): Path<HashMap<String, String>>,
) -> HandlerResult<MessageDetail> {
    require_messages(version)?;
    let id = message_id(&params)?;

    let record = state
        .api
        .get(&ctx, id)
        .await
        .map_err(|e| ErrorResponse::from(e).with_request_id(ctx.request_id.clone()))?;

    let links = LinkBuilder::new(request_base_url(&state.config, &headers));
    ok(MessageDetail {
        message: links.view(record),
    })
}

/// Delete a message.
/// DELETE /v3/messages/:id
pub async fn delete_message_handler(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    ApiContext(ctx): ApiContext,
    Path(params): Path<HashMap<String, String>>,
) -> Result<StatusCode, ErrorResponse> {
    require_messages(version)?;
    let id = message_id(&params)?;

    // Lookup runs in the caller's scope; the delete itself is elevated
    state
        .api
        .get(&ctx, id)
        .await
        .map_err(|e| ErrorResponse::from(e).with_request_id(ctx.request_id.clone()))?;
    state.api.delete(&ctx, id).await?;

    tracing::info!(request_id = %ctx.request_id, "Deleted message {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Routes for the messages resource, gated by API version.
pub fn messages_router() -> Router<AppState> {
    Router::new()
        .route("/v3/messages", get(list_messages_handler))
        .route("/v3/:project_id/messages", get(list_messages_handler))
        .route(
            "/v3/messages/:id",
            get(get_message_handler).delete(delete_message_handler),
        )
        .route(
            "/v3/:project_id/messages/:id",
            get(get_message_handler).delete(delete_message_handler),
        )
        .route_layer(axum::middleware::from_fn(api_version_middleware))
}
