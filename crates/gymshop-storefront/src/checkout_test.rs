use gymshop_core::{MemoryStore, OrderItem};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::notify::NoticeLevel;
use crate::test_support::{channel_notifier, drain, signed_in_client, CUSTOMER_ID};

const RETURN_URL: &str = "https://shop.example.com/payment/return?lang=vi";

fn new_order() -> NewOrder {
    NewOrder {
        customer_id: CUSTOMER_ID,
        address_id: Some(1),
        payment_method: PaymentGateway::Cash,
        items: vec![OrderItem {
            service_id: 10,
            quantity: 2,
            price: Decimal::from(100_000),
        }],
        total_amount: Decimal::from(200_000),
        note: None,
    }
}

fn created_order() -> serde_json::Value {
    json!({ "body": { "id": 77, "customerId": CUSTOMER_ID, "totalAmount": 200000 } })
}

fn checkout(
    server: &MockServer,
    store: Arc<MemoryStore>,
) -> (Checkout, tokio::sync::mpsc::UnboundedReceiver<Notice>) {
    let (notifier, rx) = channel_notifier();
    let checkout = Checkout::new(signed_in_client(&server.uri()), notifier, store, RETURN_URL);
    (checkout, rx)
}

fn staged(store: &MemoryStore, gateway: PaymentGateway) -> Uuid {
    let mut order = new_order();
    order.payment_method = gateway;
    let pending = PendingOrder::new(gateway, order);
    save_json(store, &PendingOrder::storage_key(&pending.reference), &pending).unwrap();
    pending.reference
}

fn return_query(reference: &Uuid, extra: &[(&str, &str)]) -> BTreeMap<String, String> {
    let mut query: BTreeMap<String, String> = extra
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    query.insert(ORDER_REF_PARAM.to_owned(), reference.to_string());
    query
}

#[tokio::test]
async fn stage_writes_pending_record_and_embeds_reference_in_return_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payment/create-checkout"))
        .and(body_partial_json(json!({ "gateway": "vnpay" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": { "paymentUrl": "https://sandbox.vnpayment.vn/pay?x=1" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let store = Arc::new(MemoryStore::new());
    let (checkout, _rx) = checkout(&server, Arc::clone(&store));

    let start = checkout
        .stage(new_order(), PaymentGateway::Vnpay)
        .await
        .unwrap();
    let CheckoutStart::Redirect {
        reference,
        payment_url,
    } = start
    else {
        panic!("vnpay should redirect");
    };

    assert_eq!(payment_url, "https://sandbox.vnpayment.vn/pay?x=1");
    let pending = checkout.pending(&reference).unwrap().unwrap();
    assert_eq!(pending.gateway, PaymentGateway::Vnpay);
    assert_eq!(pending.order.payment_method, PaymentGateway::Vnpay);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let return_url = body["returnUrl"].as_str().unwrap();
    let parsed = parse_return_query(return_url);
    assert_eq!(parsed.get("lang").map(String::as_str), Some("vi"));
    assert_eq!(parsed.get(ORDER_REF_PARAM), Some(&reference.to_string()));
    assert_eq!(body["orderRef"], json!(reference.to_string()));
}

#[tokio::test]
async fn refused_checkout_drops_pending_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payment/create-checkout"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "amount too small" })),
        )
        .mount(&server)
        .await;
    let store = Arc::new(MemoryStore::new());
    let (checkout, _rx) = checkout(&server, Arc::clone(&store));

    assert!(checkout.stage(new_order(), PaymentGateway::Momo).await.is_err());
    assert!(checkout.pending_orders().unwrap().is_empty());
}

#[tokio::test]
async fn cash_order_is_created_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/order/create"))
        .and(body_partial_json(json!({ "paymentMethod": "cash" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_order()))
        .expect(1)
        .mount(&server)
        .await;
    let store = Arc::new(MemoryStore::new());
    let (checkout, _rx) = checkout(&server, Arc::clone(&store));

    let start = checkout.stage(new_order(), PaymentGateway::Cash).await.unwrap();
    assert!(matches!(start, CheckoutStart::Placed(ref o) if o.id == 77));
    assert!(checkout.pending_orders().unwrap().is_empty());
}

#[tokio::test]
async fn unverified_vnpay_return_creates_no_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payment/verify-checkout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": { "checked": false, "message": "Transaction cancelled" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/order/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_order()))
        .expect(0)
        .mount(&server)
        .await;
    let store = Arc::new(MemoryStore::new());
    let reference = staged(&store, PaymentGateway::Vnpay);
    let (checkout, mut rx) = checkout(&server, Arc::clone(&store));

    let outcome = checkout
        .handle_vnpay_return(&return_query(&reference, &[("vnp_ResponseCode", "24")]))
        .await
        .unwrap();

    assert!(matches!(outcome, PaymentOutcome::Failed { ref reason } if reason == "Transaction cancelled"));
    assert!(checkout.pending(&reference).unwrap().is_some());
    assert_eq!(drain(&mut rx)[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn verified_vnpay_return_creates_staged_order_and_clears_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payment/verify-checkout"))
        .and(body_partial_json(json!({ "vnp_ResponseCode": "00" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": { "checked": true }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/order/create"))
        .and(body_partial_json(json!({
            "customerId": CUSTOMER_ID,
            "addressId": 1,
            "paymentMethod": "vnpay"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_order()))
        .expect(1)
        .mount(&server)
        .await;
    let store = Arc::new(MemoryStore::new());
    let reference = staged(&store, PaymentGateway::Vnpay);
    let other = staged(&store, PaymentGateway::Momo);
    let (checkout, _rx) = checkout(&server, Arc::clone(&store));

    let outcome = checkout
        .handle_vnpay_return(&return_query(&reference, &[("vnp_ResponseCode", "00")]))
        .await
        .unwrap();

    assert!(matches!(outcome, PaymentOutcome::Success(ref o) if o.id == 77));
    assert!(checkout.pending(&reference).unwrap().is_none());
    assert!(checkout.pending(&other).unwrap().is_some(), "other checkouts untouched");
}

#[tokio::test]
async fn momo_nonzero_result_code_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payment/momo-callback"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": { "resultCode": 1006 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/order/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_order()))
        .expect(0)
        .mount(&server)
        .await;
    let store = Arc::new(MemoryStore::new());
    let reference = staged(&store, PaymentGateway::Momo);
    let (checkout, _rx) = checkout(&server, Arc::clone(&store));

    let outcome = checkout
        .handle_momo_return(&return_query(&reference, &[("resultCode", "1006")]))
        .await
        .unwrap();
    assert!(matches!(outcome, PaymentOutcome::Failed { .. }));
}

#[tokio::test]
async fn complete_without_pending_record_is_not_found() {
    let server = MockServer::start().await;
    let (checkout, _rx) = checkout(&server, Arc::new(MemoryStore::new()));

    let err = checkout.handle_complete(&Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, StorefrontError::NotFound(_)));
}

#[tokio::test]
async fn cancel_discards_pending_record() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let reference = staged(&store, PaymentGateway::Paypal);
    let (checkout, _rx) = checkout(&server, Arc::clone(&store));

    checkout.handle_cancel(&reference).unwrap();
    assert!(checkout.pending(&reference).unwrap().is_none());
}

#[test]
fn return_query_parses_urls_and_bare_queries() {
    let full = parse_return_query("https://shop.example.com/r?vnp_Amount=100&vnp_TxnRef=a%20b");
    assert_eq!(full.get("vnp_Amount").map(String::as_str), Some("100"));
    assert_eq!(full.get("vnp_TxnRef").map(String::as_str), Some("a b"));

    let bare = parse_return_query("?resultCode=0&orderId=9");
    assert_eq!(bare.get("resultCode").map(String::as_str), Some("0"));

    assert!(parse_return_query("").is_empty());
}
