//! HTTP tests for the messages resource.

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use common::{ids, SteppingClock, TestApp, PROJECT};
use stratus_storage::RedbMessageStore;

#[tokio::test]
async fn test_index_requires_version_3_3() {
    let app = TestApp::new();
    app.seed(PROJECT).await;

    let response = app.get("/v3/messages", "3.2").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request(Method::GET, "/v3/messages", None, Some(PROJECT), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_index_default_order_is_newest_first() {
    let app = TestApp::new();
    let created = app.seed(PROJECT).await;

    let response = app.get("/v3/messages", "3.3").await;

    assert_eq!(response.status, StatusCode::OK);
    let mut expected = created.clone();
    expected.reverse();
    assert_eq!(ids(&response.body), expected);
    assert!(response.body.get("messages_links").is_none());
}

#[tokio::test]
async fn test_index_ignores_list_params_before_3_5() {
    let app = TestApp::new();
    app.seed(PROJECT).await;

    let response = app.get("/v3/messages?limit=1", "3.3").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(ids(&response.body).len(), 4);

    let response = app
        .get("/v3/messages?event_id=VOLUME_000002&sort=colour", "3.4")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(ids(&response.body).len(), 4);
}

#[tokio::test]
async fn test_index_with_limit() {
    let app = TestApp::new();
    app.seed(PROJECT).await;

    let response = app.get("/v3/messages?limit=1", "3.5").await;
    assert_eq!(ids(&response.body).len(), 1);

    let response = app.get("/v3/messages?limit=3", "3.5").await;
    assert_eq!(ids(&response.body).len(), 3);
}

#[tokio::test]
async fn test_index_with_offset() {
    let app = TestApp::new();
    let created = app.seed(PROJECT).await;

    let response = app.get("/v3/messages?offset=1", "3.5").await;

    // Newest first, skipping the newest
    assert_eq!(
        ids(&response.body),
        vec![created[2].clone(), created[1].clone(), created[0].clone()]
    );
}

#[tokio::test]
async fn test_index_with_limit_and_offset() {
    let app = TestApp::new();
    let created = app.seed(PROJECT).await;

    let response = app.get("/v3/messages?limit=2&offset=1", "3.5").await;

    assert_eq!(
        ids(&response.body),
        vec![created[2].clone(), created[1].clone()]
    );
}

#[tokio::test]
async fn test_index_with_filter() {
    let app = TestApp::new();
    let created = app.seed(PROJECT).await;

    let response = app.get("/v3/messages?event_id=VOLUME_000002", "3.5").await;

    assert_eq!(ids(&response.body), vec![created[1].clone()]);
    assert_eq!(response.body["messages"][0]["event_id"], "VOLUME_000002");
}

#[tokio::test]
async fn test_index_with_unknown_filter_is_empty() {
    let app = TestApp::new();
    app.seed(PROJECT).await;

    let response = app.get("/v3/messages?colour=blue", "3.5").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(ids(&response.body).is_empty());
}

#[tokio::test]
async fn test_index_with_sort() {
    let app = TestApp::new();
    app.seed(PROJECT).await;

    let response = app.get("/v3/messages?sort=event_id:asc", "3.5").await;

    let events: Vec<&str> = response.body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["event_id"].as_str().unwrap())
        .collect();
    assert_eq!(
        events,
        vec!["VOLUME_000001", "VOLUME_000002", "VOLUME_000003", "VOLUME_000004"]
    );
}

#[tokio::test]
async fn test_index_with_legacy_sort_params() {
    let app = TestApp::new();
    let created = app.seed(PROJECT).await;

    let response = app
        .get("/v3/messages?sort_key=created_at&sort_dir=asc", "3.5")
        .await;

    assert_eq!(ids(&response.body), created);
}

#[tokio::test]
async fn test_index_rejects_bad_listing_params() {
    let app = TestApp::new();
    app.seed(PROJECT).await;

    for uri in [
        "/v3/messages?sort=colour:asc",
        "/v3/messages?sort=event_id:up",
        "/v3/messages?limit=-1",
        "/v3/messages?offset=x",
        "/v3/messages?sort=event_id&sort_key=created_at",
    ] {
        let response = app.get(uri, "3.5").await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_index_paging_follows_next_links() {
    let app = TestApp::new();
    let created = app.seed(PROJECT).await;

    let first = app.get("/v3/messages?limit=2", "3.5").await;
    assert_eq!(
        ids(&first.body),
        vec![created[3].clone(), created[2].clone()]
    );
    let next = first.body["messages_links"][0].clone();
    assert_eq!(next["rel"], "next");
    let expected = format!(
        "http://localhost/v3/{}/messages?limit=2&marker={}",
        PROJECT, created[2]
    );
    assert_eq!(next["href"], expected.as_str());

    let path = expected.trim_start_matches("http://localhost");
    let second = app.get(path, "3.5").await;
    assert_eq!(
        ids(&second.body),
        vec![created[1].clone(), created[0].clone()]
    );
    let next = second.body["messages_links"][0]["href"].as_str().unwrap().to_string();

    let third = app.get(next.trim_start_matches("http://localhost"), "3.5").await;
    assert!(ids(&third.body).is_empty());
    assert!(third.body.get("messages_links").is_none());
}

#[tokio::test]
async fn test_next_link_keeps_request_params() {
    let app = TestApp::new();
    let created = app.seed(PROJECT).await;

    let response = app
        .get(
            &format!("/v3/messages?sort=event_id:asc&marker={}&limit=1", created[0]),
            "3.5",
        )
        .await;

    assert_eq!(ids(&response.body), vec![created[1].clone()]);
    assert_eq!(
        response.body["messages_links"][0]["href"],
        format!(
            "http://localhost/v3/{}/messages?sort=event_id%3Aasc&limit=1&marker={}",
            PROJECT, created[1]
        )
        .as_str()
    );
}

#[tokio::test]
async fn test_index_unknown_marker_is_empty() {
    let app = TestApp::new();
    app.seed(PROJECT).await;

    let response = app.get("/v3/messages?marker=missing", "3.5").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(ids(&response.body).is_empty());
}

#[tokio::test]
async fn test_index_project_route_and_scoping() {
    let app = TestApp::new();
    let mine = app.seed(PROJECT).await;
    app.seed("other_project").await;

    let response = app
        .get(&format!("/v3/{}/messages", PROJECT), "3.5")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let mut listed = ids(&response.body);
    listed.sort();
    let mut expected = mine.clone();
    expected.sort();
    assert_eq!(listed, expected);

    let admin = app
        .request(Method::GET, "/v3/messages", Some("3.5"), Some(PROJECT), Some("admin"))
        .await;
    assert_eq!(ids(&admin.body).len(), 8);
}

#[tokio::test]
async fn test_show_message() {
    let app = TestApp::new();
    let created = app.seed(PROJECT).await;

    let response = app
        .get(&format!("/v3/{}/messages/{}", PROJECT, created[1]), "3.3")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let message = &response.body["message"];
    assert_eq!(message["id"], created[1].as_str());
    assert_eq!(message["event_id"], "VOLUME_000002");
    assert_eq!(message["message_level"], "ERROR");
    assert_eq!(message["resource_type"], "VOLUME");
    assert_eq!(message["resource_uuid"], "fake_uuid");
    assert_eq!(
        message["user_message"],
        "No storage could be allocated for this volume request. \
         You may be able to try another size or volume type."
    );
    assert!(message["guaranteed_until"].is_string());
    assert!(message["created_at"].is_string());
    assert_eq!(
        message["links"][0]["href"],
        format!("http://localhost/v3/{}/messages/{}", PROJECT, created[1]).as_str()
    );
    assert_eq!(message["links"][1]["rel"], "bookmark");
}

#[tokio::test]
async fn test_show_other_project_is_not_found() {
    let app = TestApp::new();
    let theirs = app.seed("other_project").await;

    let response = app
        .get(&format!("/v3/messages/{}", theirs[0]), "3.3")
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_delete_message() {
    let app = TestApp::new();
    let created = app.seed(PROJECT).await;
    let uri = format!("/v3/messages/{}", created[0]);

    let response = app
        .request(Method::DELETE, &uri, Some("3.3"), Some(PROJECT), None)
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app.get(&uri, "3.3").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.get("/v3/messages", "3.3").await;
    assert_eq!(ids(&response.body).len(), 3);
}

#[tokio::test]
async fn test_delete_other_project_is_not_found() {
    let app = TestApp::new();
    let theirs = app.seed("other_project").await;
    let uri = format!("/v3/messages/{}", theirs[0]);

    let response = app
        .request(Method::DELETE, &uri, Some("3.3"), Some(PROJECT), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request(Method::GET, &uri, Some("3.3"), Some("other_project"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_project_is_unauthorized() {
    let app = TestApp::new();

    let response = app
        .request(Method::GET, "/v3/messages", Some("3.3"), None, None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_version_errors() {
    let app = TestApp::new();

    let response = app.get("/v3/messages", "three").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.get("/v3/messages", "3.9").await;
    assert_eq!(response.status, StatusCode::NOT_ACCEPTABLE);

    let response = app.get("/v3/messages", "latest").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers["openstack-api-version"], "volume 3.5");
}

#[tokio::test]
async fn test_response_headers() {
    let app = TestApp::new();

    let response = app.get("/v3/messages", "3.4").await;

    assert_eq!(response.headers["openstack-api-version"], "volume 3.4");
    assert_eq!(response.headers["vary"], "OpenStack-API-Version");
    let request_id = response.headers["x-openstack-request-id"].to_str().unwrap();
    assert!(request_id.starts_with("req-"));
}

#[tokio::test]
async fn test_persistent_store_backs_the_api() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(SteppingClock::new());
    let store = Arc::new(RedbMessageStore::open_with_clock(dir.path(), clock.clone()).unwrap());
    let app = TestApp::with_store(store, clock);
    let created = app.seed(PROJECT).await;

    let response = app.get("/v3/messages?limit=2", "3.5").await;

    assert_eq!(
        ids(&response.body),
        vec![created[3].clone(), created[2].clone()]
    );
    assert!(response.body["messages_links"][0]["href"]
        .as_str()
        .unwrap()
        .ends_with(&format!("marker={}", created[2])));
}

#[tokio::test]
async fn test_marker_page_matches_full_listing() {
    let app = TestApp::new();
    app.seed(PROJECT).await;

    let first = app.get("/v3/messages?limit=2", "3.5").await;
    let page = first.body["messages"].as_array().unwrap().clone();
    assert_eq!(page.len(), 2);

    let marker = page[0]["id"].as_str().unwrap();
    let response = app
        .get(&format!("/v3/messages?marker={}&limit=1", marker), "3.5")
        .await;

    assert_eq!(response.body["messages"].as_array().unwrap(), &vec![page[1].clone()]);
}

#[tokio::test]
async fn test_next_link_carries_applied_value_of_repeated_param() {
    let app = TestApp::new();
    let created = app.seed(PROJECT).await;

    let response = app.get("/v3/messages?limit=2&limit=3", "3.5").await;

    assert_eq!(ids(&response.body).len(), 3);
    assert_eq!(
        response.body["messages_links"][0]["href"],
        format!(
            "http://localhost/v3/{}/messages?limit=3&marker={}",
            PROJECT, created[1]
        )
        .as_str()
    );
}

#[tokio::test]
async fn test_index_decodes_query_params() {
    let app = TestApp::new();
    let created = app.seed(PROJECT).await;

    let response = app
        .get("/v3/messages?sort=event_id%3Aasc&resource_type=VOLUME&limit=1", "3.5")
        .await;

    assert_eq!(ids(&response.body), vec![created[0].clone()]);
    assert_eq!(
        response.body["messages_links"][0]["href"],
        format!(
            "http://localhost/v3/{}/messages?sort=event_id%3Aasc&resource_type=VOLUME&limit=1&marker={}",
            PROJECT, created[0]
        )
        .as_str()
    );
}
