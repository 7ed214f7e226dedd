//! End-to-end storefront flows against a wiremock API.

use std::sync::Arc;
use std::time::Duration;

use gymshop_client::{Session, StorefrontClient, TokenPair};
use gymshop_core::{Filter, MemoryStore};
use gymshop_storefront::{list, ChannelNotifier, ListController, ListOptions, NoticeLevel};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(base_url: &str) -> Arc<StorefrontClient> {
    let session = Session::new(Arc::new(MemoryStore::new()));
    session
        .set_tokens(&TokenPair {
            access_token: "tok".into(),
            refresh_token: "refresh".into(),
        })
        .unwrap();
    Arc::new(StorefrontClient::new(base_url, 5, "gymshop-test/0.1", session).unwrap())
}

fn options() -> ListOptions {
    ListOptions {
        debounce: Duration::from_millis(50),
        ..ListOptions::default()
    }
}

fn service_page(names: &[&str]) -> serde_json::Value {
    let body: Vec<_> = names
        .iter()
        .enumerate()
        .map(|(i, name)| json!({ "id": i + 1, "name": name, "price": 150000, "bookingTypeId": 1 }))
        .collect();
    json!({
        "message": "ok",
        "body": body,
        "meta": { "pagination": { "currentPage": 1, "limit": 10, "total": names.len(), "totalPages": 1 } }
    })
}

#[tokio::test]
async fn service_search_settles_into_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/service"))
        .and(query_param("search", "yoga"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(service_page(&["Yoga flow"])))
        .expect(1)
        .mount(&server)
        .await;

    let (notifier, _notices) = ChannelNotifier::new();
    let handle = ListController::spawn(
        list::services(client(&server.uri())),
        Filter::new(),
        options(),
        Arc::new(notifier),
    );
    for term in ["y", "yo", "yoga"] {
        handle.on_change_search(term);
    }

    let mut rx = handle.subscribe();
    let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| !s.list.is_empty()))
        .await
        .expect("services should load")
        .unwrap()
        .clone();

    assert_eq!(state.list[0].name, "Yoga flow");
    assert_eq!(state.pagination.total, 1);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn failed_list_fetch_is_surfaced_and_notified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/brand"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "message": "maintenance" })))
        .mount(&server)
        .await;

    let (notifier, mut notices) = ChannelNotifier::new();
    let handle = ListController::spawn(
        list::brands(client(&server.uri())),
        Filter::new(),
        options(),
        Arc::new(notifier),
    );

    let mut rx = handle.subscribe();
    let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.error.is_some()))
        .await
        .expect("error should surface")
        .unwrap()
        .clone();

    assert!(state.list.is_empty());
    assert!(state.error.unwrap().contains("maintenance"));
    let notice = notices.recv().await.unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
}
