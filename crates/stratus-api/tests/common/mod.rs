//! Common test utilities for API tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use http_body_util::BodyExt;
use mockable::Clock;
use serde_json::Value;
use stratus_api::{create_router, AppState};
use stratus_core::{RequestContext, StratusConfig};
use stratus_messages::{EventId, MessageApi};
use stratus_storage::{MemoryMessageStore, MessageQuery, MessageStore, SortDir};
use tower::ServiceExt;

pub const PROJECT: &str = "fake_project";

/// Clock that advances one second per reading.
pub struct SteppingClock {
    start: DateTime<Utc>,
    ticks: AtomicI64,
}

impl SteppingClock {
    pub fn new() -> Self {
        Self {
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.start + Duration::seconds(self.ticks.fetch_add(1, Ordering::SeqCst))
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub struct TestApp {
    pub router: Router,
    pub api: Arc<MessageApi>,
}

impl TestApp {
    pub fn new() -> Self {
        let clock = Arc::new(SteppingClock::new());
        Self::with_store(Arc::new(MemoryMessageStore::with_clock(clock.clone())), clock)
    }

    pub fn with_store(store: Arc<dyn MessageStore>, clock: Arc<SteppingClock>) -> Self {
        let config = StratusConfig::default().shared();
        let api = Arc::new(MessageApi::with_clock(store, config.clone(), clock));
        let router = create_router(AppState::new(api.clone(), config));
        Self { router, api }
    }

    /// Create one message per catalog event in `project`, oldest first.
    /// Returns their IDs in creation order.
    pub async fn seed(&self, project: &str) -> Vec<String> {
        let ctx = RequestContext::new("fake_user", project, false);
        for event_id in EventId::ALL {
            self.api
                .create(&ctx, event_id, project, Some("VOLUME"), Some("fake_uuid"))
                .await;
        }
        self.api
            .get_all(
                &ctx,
                &MessageQuery::new().with_sort("created_at", SortDir::Asc),
            )
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        version: Option<&str>,
        project: Option<&str>,
        roles: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(version) = version {
            builder = builder.header("OpenStack-API-Version", format!("volume {}", version));
        }
        if let Some(project) = project {
            builder = builder.header("X-Project-Id", project);
        }
        if let Some(roles) = roles {
            builder = builder.header("X-Roles", roles);
        }

        let response = self
            .router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// GET as a member of [`PROJECT`].
    pub async fn get(&self, uri: &str, version: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(version), Some(PROJECT), None)
            .await
    }
}

/// IDs of the messages in a listing body, in response order.
pub fn ids(body: &Value) -> Vec<String> {
    body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap().to_string())
        .collect()
}
