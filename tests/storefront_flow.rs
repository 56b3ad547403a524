//! End-to-end storefront tests
//!
//! Drive the full router over `tower::ServiceExt::oneshot` with an
//! in-memory database and a recording fake payment provider; gateway
//! callbacks are simulated by signing payloads with the webhook secret.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use snackaroo_server::core::{Config, ServerState, build_app};
use snackaroo_server::db::DbService;
use snackaroo_server::db::repository::OrderRepository;
use snackaroo_server::payment::{
    IntentMetadata, PaymentError, PaymentIntent, PaymentProvider, SIGNATURE_HEADER,
    WebhookVerifier,
};

const WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Fake gateway that records the last intent request
struct RecordingProvider {
    last: Mutex<Option<(i64, IntentMetadata)>>,
}

impl RecordingProvider {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            last: Mutex::new(None),
        })
    }

    fn last_amount(&self) -> Option<i64> {
        self.last.lock().unwrap().as_ref().map(|(a, _)| *a)
    }

    fn last_metadata(&self) -> Option<IntentMetadata> {
        self.last.lock().unwrap().as_ref().map(|(_, m)| m.clone())
    }
}

#[async_trait]
impl PaymentProvider for RecordingProvider {
    async fn create_intent(
        &self,
        amount: i64,
        _currency: &str,
        metadata: IntentMetadata,
    ) -> Result<PaymentIntent, PaymentError> {
        *self.last.lock().unwrap() = Some((amount, metadata));
        Ok(PaymentIntent {
            id: "pi_test_1".to_string(),
            client_secret: "cs_test_secret".to_string(),
            amount,
        })
    }
}

struct TestHarness {
    app: Router,
    state: ServerState,
    payments: Arc<RecordingProvider>,
    // Upload directory, removed on drop
    _upload_dir: tempfile::TempDir,
}

async fn harness() -> TestHarness {
    let upload_dir = tempfile::tempdir().unwrap();

    let mut config = Config::from_env();
    config.stripe_webhook_secret = WEBHOOK_SECRET.to_string();
    config.upload_dir = upload_dir.path().to_string_lossy().into_owned();
    config.public_base_url = None;

    let db = DbService::memory().await.unwrap().db;
    let payments = RecordingProvider::new();
    let state = ServerState::with_parts(config, db, payments.clone());
    let app = build_app(state.clone());

    TestHarness {
        app,
        state,
        payments,
        _upload_dir: upload_dir,
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, body)
}

async fn post_json(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = token {
        builder = builder.header("auth-token", t);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();
    let (status, bytes) = send(app, req).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, bytes) = send(app, req).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn signup(app: &Router, email: &str) -> String {
    let (status, body) = post_json(
        app,
        "/signup",
        None,
        json!({ "username": "Tester", "email": email, "password": "hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn add_product(app: &Router, name: &str, category: &str, price: f64) -> i64 {
    let (status, _) = post_json(
        app,
        "/addproduct",
        None,
        json!({
            "name": name,
            "image": "http://example.com/img.png",
            "category": category,
            "new_price": price,
            "old_price": price + 2.0,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, products) = get_json(app, "/allproducts").await;
    products
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == name)
        .and_then(|p| p["id"].as_i64())
        .unwrap()
}

fn signed_webhook(body: &Value) -> Request<Body> {
    let payload = body.to_string();
    let header_value = WebhookVerifier::new(WEBHOOK_SECRET)
        .sign(payload.as_bytes(), Utc::now().timestamp());
    Request::builder()
        .method("POST")
        .uri("/webhook")
        .header(header::CONTENT_TYPE, "application/json")
        .header(SIGNATURE_HEADER, header_value)
        .body(Body::from(payload))
        .unwrap()
}

fn succeeded_event(intent_id: &str, amount: i64, user_id: &str) -> Value {
    json!({
        "type": "payment_intent.succeeded",
        "data": { "object": {
            "id": intent_id,
            "amount": amount,
            "metadata": {
                "userId": user_id,
                "shippingDetails": "{\"city\":\"Springfield\"}"
            }
        }}
    })
}

fn user_key_from_metadata(h: &TestHarness) -> String {
    h.payments.last_metadata().unwrap().user_id
}

#[tokio::test]
async fn signup_rejects_duplicate_email() {
    let h = harness().await;

    signup(&h.app, "a@x.com").await;

    let (status, body) = post_json(
        &h.app,
        "/signup",
        None,
        json!({ "username": "Again", "email": "a@x.com", "password": "other" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["errors"], json!("Existing User Found With Email/Password"));
}

#[tokio::test]
async fn login_reports_wrong_email_and_password_with_200() {
    let h = harness().await;
    signup(&h.app, "a@x.com").await;

    let (status, body) = post_json(
        &h.app,
        "/login",
        None,
        json!({ "email": "missing@x.com", "password": "hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["errors"], json!("Wrong Email"));

    let (status, body) = post_json(
        &h.app,
        "/login",
        None,
        json!({ "email": "a@x.com", "password": "wrong" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["errors"], json!("Wrong Password"));

    let (status, body) = post_json(
        &h.app,
        "/login",
        None,
        json!({ "email": "a@x.com", "password": "hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn cart_requires_valid_token() {
    let h = harness().await;

    let (status, body) = post_json(&h.app, "/getcart", None, json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errors"], json!("Please Authenticate Using Valid Token"));

    let (status, _) = post_json(&h.app, "/getcart", Some("not-a-jwt"), json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn add_to_cart_defaults_to_one_and_accumulates() {
    let h = harness().await;
    let token = signup(&h.app, "a@x.com").await;

    let (status, _) = post_json(
        &h.app,
        "/addtocart",
        Some(&token),
        json!({ "itemId": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    post_json(
        &h.app,
        "/addtocart",
        Some(&token),
        json!({ "itemId": "3", "quantity": 2 }),
    )
    .await;

    let (_, cart) = post_json(&h.app, "/getcart", Some(&token), json!({})).await;
    assert_eq!(cart["3"], json!(3));
    assert_eq!(cart["0"], json!(0));
}

#[tokio::test]
async fn remove_from_cart_never_goes_negative() {
    let h = harness().await;
    let token = signup(&h.app, "a@x.com").await;

    let (status, bytes) = send(
        &h.app,
        Request::builder()
            .method("POST")
            .uri("/removecart")
            .header(header::CONTENT_TYPE, "application/json")
            .header("auth-token", &token)
            .body(Body::from(json!({ "itemId": 5 }).to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"Removed");

    let (_, cart) = post_json(&h.app, "/getcart", Some(&token), json!({})).await;
    assert_eq!(cart["5"], json!(0));
}

#[tokio::test]
async fn checkout_recomputes_total_from_stored_prices() {
    let h = harness().await;
    let token = signup(&h.app, "a@x.com").await;

    let crisps = add_product(&h.app, "Crisps", "savory", 2.50).await;
    let fudge = add_product(&h.app, "Fudge", "sweets", 4.00).await;

    post_json(
        &h.app,
        "/addtocart",
        Some(&token),
        json!({ "itemId": crisps, "quantity": 2 }),
    )
    .await;
    post_json(
        &h.app,
        "/addtocart",
        Some(&token),
        json!({ "itemId": fudge }),
    )
    .await;

    // Client-supplied prices are not part of the request shape at all
    let (status, body) = post_json(
        &h.app,
        "/checkout",
        Some(&token),
        json!({ "shippingDetails": { "city": "Springfield" } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clientSecret"], json!("cs_test_secret"));

    // 2 x 2.50 + 1 x 4.00 = 9.00 -> 900 minor units
    assert_eq!(h.payments.last_amount(), Some(900));
    let metadata = h.payments.last_metadata().unwrap();
    assert!(metadata.shipping_details.contains("Springfield"));
}

#[tokio::test]
async fn webhook_with_bad_signature_creates_no_order() {
    let h = harness().await;
    let token = signup(&h.app, "a@x.com").await;
    post_json(&h.app, "/addtocart", Some(&token), json!({ "itemId": 3 })).await;
    post_json(&h.app, "/checkout", Some(&token), json!({})).await;
    let user_key = user_key_from_metadata(&h);

    let payload = succeeded_event("pi_forged", 1000, &user_key).to_string();
    let req = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header(header::CONTENT_TYPE, "application/json")
        .header(SIGNATURE_HEADER, "t=0,v1=deadbeef")
        .body(Body::from(payload))
        .unwrap();

    let (status, bytes) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8_lossy(&bytes).starts_with("Webhook Error:"));

    let orders = OrderRepository::new(h.state.get_db());
    assert!(orders.find_by_intent("pi_forged").await.unwrap().is_none());
}

#[tokio::test]
async fn webhook_for_unknown_user_creates_no_order() {
    let h = harness().await;

    let (status, bytes) = send(
        &h.app,
        signed_webhook(&succeeded_event("pi_ghost", 1000, "no-such-user")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8_lossy(&bytes).starts_with("Webhook Error:"));

    let orders = OrderRepository::new(h.state.get_db());
    assert!(orders.find_by_intent("pi_ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn webhook_finalizes_order_and_replay_is_deduplicated() {
    let h = harness().await;
    let token = signup(&h.app, "a@x.com").await;

    post_json(
        &h.app,
        "/addtocart",
        Some(&token),
        json!({ "itemId": 3, "quantity": 2 }),
    )
    .await;
    post_json(&h.app, "/checkout", Some(&token), json!({})).await;
    let user_key = user_key_from_metadata(&h);

    let event = succeeded_event("pi_paid", 1000, &user_key);
    let (status, body) = send(&h.app, signed_webhook(&event)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_slice::<Value>(&body).unwrap()["received"],
        json!(true)
    );

    let orders = OrderRepository::new(h.state.get_db());
    let order = orders.find_by_intent("pi_paid").await.unwrap().unwrap();
    assert_eq!(order.total_amount, 10.0);
    assert_eq!(order.items.get("3"), Some(&2));
    assert_eq!(
        order.shipping_details.city.as_deref(),
        Some("Springfield")
    );

    let (_, cart) = post_json(&h.app, "/getcart", Some(&token), json!({})).await;
    assert_eq!(cart, json!({}));

    // Same delivery again must not create a second order
    let (status, _) = send(&h.app, signed_webhook(&event)).await;
    assert_eq!(status, StatusCode::OK);
    let all = orders.find_by_user(&user_key).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn catalog_views_filter_and_limit() {
    let h = harness().await;

    for i in 0..10 {
        add_product(&h.app, &format!("Sweet {i}"), "sweets", 1.0 + i as f64).await;
    }
    add_product(&h.app, "Pretzel", "savory", 3.0).await;

    let (_, all) = get_json(&h.app, "/allproducts").await;
    assert_eq!(all.as_array().unwrap().len(), 11);

    let (_, fresh) = get_json(&h.app, "/newcollections").await;
    assert_eq!(fresh.as_array().unwrap().len(), 8);

    let (_, popular) = get_json(&h.app, "/popularsnacks").await;
    let popular = popular.as_array().unwrap();
    assert_eq!(popular.len(), 4);
    assert!(popular.iter().all(|p| p["category"] == json!("sweets")));
}

#[tokio::test]
async fn remove_product_is_idempotent() {
    let h = harness().await;
    let id = add_product(&h.app, "Crisps", "savory", 2.0).await;

    let (status, body) = post_json(&h.app, "/removeproduct", None, json!({ "id": id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    // Removing it again still succeeds
    let (status, _) = post_json(&h.app, "/removeproduct", None, json!({ "id": id })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, all) = get_json(&h.app, "/allproducts").await;
    assert!(all.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn upload_stores_image_and_returns_paths() {
    let h = harness().await;

    let boundary = "X-SNACKAROO-BOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"product\"; filename=\"snack.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         fake-png-bytes\r\n\
         --{boundary}--\r\n"
    );

    let req = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header("host", "shop.example.com")
        .body(Body::from(body))
        .unwrap();

    let (status, bytes) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);

    let resp: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(resp["success"], json!(1));

    let image_path = resp["image_path"].as_str().unwrap();
    assert!(image_path.starts_with("/images/product_"));
    assert!(image_path.ends_with(".png"));
    assert_eq!(
        resp["image_url"].as_str().unwrap(),
        format!("http://shop.example.com{image_path}")
    );

    // The stored file is served back under /images
    let (status, served) = send(
        &h.app,
        Request::builder()
            .uri(image_path)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, b"fake-png-bytes");
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let h = harness().await;

    let boundary = "X-SNACKAROO-BOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"other\"\r\n\r\n\
         value\r\n\
         --{boundary}--\r\n"
    );

    let req = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, bytes) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let resp: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(resp["success"], json!(0));
}

#[tokio::test]
async fn full_purchase_flow() {
    let h = harness().await;

    let fudge = add_product(&h.app, "Fudge", "sweets", 5.0).await;

    let token = signup(&h.app, "buyer@x.com").await;
    post_json(
        &h.app,
        "/addtocart",
        Some(&token),
        json!({ "itemId": fudge, "quantity": 2 }),
    )
    .await;

    let (_, cart) = post_json(&h.app, "/getcart", Some(&token), json!({})).await;
    assert_eq!(cart[fudge.to_string()], json!(2));

    let (status, body) = post_json(
        &h.app,
        "/checkout",
        Some(&token),
        json!({ "shippingDetails": { "city": "Springfield" } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clientSecret"], json!("cs_test_secret"));
    assert_eq!(h.payments.last_amount(), Some(1000));

    let user_key = user_key_from_metadata(&h);
    let (status, _) = send(
        &h.app,
        signed_webhook(&succeeded_event("pi_flow", 1000, &user_key)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, cart) = post_json(&h.app, "/getcart", Some(&token), json!({})).await;
    assert_eq!(cart, json!({}));

    let orders = OrderRepository::new(h.state.get_db());
    let all = orders.find_by_user(&user_key).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].total_amount, 10.0);
}
