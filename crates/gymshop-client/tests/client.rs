//! Integration tests for `StorefrontClient` using wiremock HTTP mocks.

use std::sync::Arc;

use gymshop_client::{ApiError, AuthEvent, Session, StorefrontClient, TokenPair};
use gymshop_core::{
    AvailabilityQuery, Brand, CartItemPatch, Filter, KeyValueStore, MemoryStore,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn signed_in_session() -> Session {
    let session = Session::new(Arc::new(MemoryStore::new()));
    session
        .set_tokens(&TokenPair {
            access_token: "tok".into(),
            refresh_token: "refresh".into(),
        })
        .unwrap();
    session
}

fn test_client(base_url: &str, session: Session) -> StorefrontClient {
    StorefrontClient::new(base_url, 5, "gymshop-test/0.1", session)
        .expect("client construction should not fail")
}

fn brand_page() -> serde_json::Value {
    json!({
        "message": "ok",
        "body": [ { "id": 1, "name": "Everlast" }, { "id": 2, "name": "Rogue" } ],
        "meta": { "pagination": { "currentPage": 1, "limit": 10, "total": 2, "totalPages": 1 } }
    })
}

#[tokio::test]
async fn list_sends_filter_as_query_and_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/brand"))
        .and(query_param("search", "ever"))
        .and(query_param("limit", "10"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(brand_page()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), signed_in_session());
    let filter = Filter::new().with("search", "ever").with_default_limit(10);
    let page = client
        .list::<Brand>("api/brand", &filter)
        .await
        .expect("should parse page");

    assert_eq!(page.body.len(), 2);
    assert_eq!(page.body[1].name, "Rogue");
    assert_eq!(page.meta.pagination.total, 2);
}

#[tokio::test]
async fn non_success_status_carries_api_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/service/99"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Service not found" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), signed_in_session());
    let err = client.get_service(99).await.unwrap_err();
    assert!(
        matches!(err, ApiError::Status { status: 404, ref message } if message == "Service not found"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn concurrent_401s_collapse_into_one_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/brand"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/storefront-auth/refresh-token"))
        .and(body_json(json!({ "refreshToken": "refresh" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": { "accessToken": "tok-2", "refreshToken": "refresh-2" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = signed_in_session();
    let client = test_client(&server.uri(), session.clone());
    let mut events = client.subscribe_auth_events();

    let filter = Filter::new();
    let (a, b) = tokio::join!(
        client.list::<Brand>("api/brand", &filter),
        client.list::<Brand>("api/brand", &filter),
    );

    assert!(matches!(a, Err(ApiError::Unauthorized)));
    assert!(matches!(b, Err(ApiError::Unauthorized)));
    assert_eq!(session.access_token().unwrap().as_deref(), Some("tok-2"));
    assert_eq!(events.try_recv().unwrap(), AuthEvent::Refreshed);
    assert!(events.try_recv().is_err(), "only one refresh event expected");
}

#[tokio::test]
async fn embedded_status_code_401_with_failed_refresh_wipes_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/brand"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": 401,
            "message": "jwt expired"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/storefront-auth/refresh-token"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store.set("userInfo", r#"{"id":42,"name":"Minh","email":"m@example.com"}"#).unwrap();
    let session = Session::new(store.clone());
    session
        .set_tokens(&TokenPair {
            access_token: "tok".into(),
            refresh_token: "refresh".into(),
        })
        .unwrap();

    let client = test_client(&server.uri(), session);
    let mut events = client.subscribe_auth_events();

    let result = client.list::<Brand>("api/brand", &Filter::new()).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert_eq!(events.try_recv().unwrap(), AuthEvent::SessionExpired);
    assert_eq!(store.get("accessToken").unwrap(), None);
    assert_eq!(store.get("refreshToken").unwrap(), None);
    assert_eq!(store.get("userInfo").unwrap(), None);
}

#[tokio::test]
async fn unauthorized_without_refresh_token_does_not_call_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/brand"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/storefront-auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), Session::new(Arc::new(MemoryStore::new())));
    let result = client.list::<Brand>("api/brand", &Filter::new()).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn unauthorized_with_access_token_but_no_refresh_token_wipes_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/brand"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/storefront-auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store.set("accessToken", "stale").unwrap();
    let client = test_client(&server.uri(), Session::new(store.clone()));
    let mut events = client.subscribe_auth_events();

    let result = client.list::<Brand>("api/brand", &Filter::new()).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert_eq!(store.get("accessToken").unwrap(), None);
    assert_eq!(events.try_recv().unwrap(), AuthEvent::SessionExpired);
}

#[tokio::test]
async fn login_stores_tokens_and_customer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/storefront-auth/login"))
        .and(body_json(json!({ "email": "minh@example.com", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "ok",
            "body": {
                "accessToken": "a1",
                "refreshToken": "r1",
                "customer": { "id": 42, "name": "Minh", "email": "minh@example.com" }
            }
        })))
        .mount(&server)
        .await;

    let session = Session::new(Arc::new(MemoryStore::new()));
    let client = test_client(&server.uri(), session.clone());
    let customer = client.login("minh@example.com", "pw").await.unwrap();

    assert_eq!(customer.id, 42);
    assert_eq!(session.access_token().unwrap().as_deref(), Some("a1"));
    assert_eq!(client.require_customer_id().unwrap(), 42);
}

#[tokio::test]
async fn update_cart_item_patches_selection_flag() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/cart-item/update"))
        .and(body_json(json!({ "customerId": 42, "serviceId": 7, "selected": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), signed_in_session());
    client
        .update_cart_item(&CartItemPatch::selected(42, 7, true))
        .await
        .expect("patch should succeed");
}

#[tokio::test]
async fn available_slots_rejects_inverted_window() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/booking/available-slots"))
        .and(query_param("serviceId", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": [ { "fromTime": 2000, "toTime": 1000 } ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), signed_in_session());
    let query = AvailabilityQuery {
        service_id: 7,
        variant_id: None,
        staff_id: None,
        from_time: 0,
        to_time: 86_399,
    };
    let result = client.available_slots(&query).await;
    assert!(matches!(result, Err(ApiError::Deserialize { .. })));
}

#[tokio::test]
async fn vnpay_verification_forwards_raw_query() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/payment/verify-checkout"))
        .and(body_json(json!({ "vnp_ResponseCode": "24", "vnp_TxnRef": "abc" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": { "checked": false, "message": "cancelled" }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), signed_in_session());
    let query = [
        ("vnp_ResponseCode".to_string(), "24".to_string()),
        ("vnp_TxnRef".to_string(), "abc".to_string()),
    ]
    .into_iter()
    .collect();
    let verification = client.verify_vnpay(&query).await.unwrap();
    assert!(!verification.checked);
}
