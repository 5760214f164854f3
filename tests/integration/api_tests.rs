//! HTTP tests driving the real router

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use circulation_server::api;

use crate::common::app_state;

fn app() -> Router {
    let (state, _repository) = app_state();
    api::router(state)
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "admin", "password": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    body["token"].as_str().unwrap().to_string()
}

/// Register a member and a copy, returning the member id
async fn seed(app: &Router, token: &str, tier: &str, barcode: &str, status: &str) -> String {
    let (code, member) = send(
        app,
        Method::POST,
        "/members",
        Some(token),
        Some(json!({ "name": "Ada", "email": "ada@example.org", "tier": tier })),
    )
    .await;
    assert_eq!(code, StatusCode::CREATED);

    let (code, _) = send(
        app,
        Method::POST,
        "/copies",
        Some(token),
        Some(json!({ "isbn": "9780140449136", "barcode": barcode, "status": status })),
    )
    .await;
    assert_eq!(code, StatusCode::CREATED);

    member["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "admin", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthorized");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = app();
    let (status, _) = send(&app, Method::GET, "/books", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/books", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/checkin",
        None,
        Some(json!({ "copy_barcode": "C1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_book_crud_and_search() {
    let app = app();
    let token = login(&app).await;

    let book = json!({
        "isbn": "9780140449136",
        "title": "The Odyssey",
        "author": "Homer",
        "tags": ["epic"]
    });
    let (status, _) = send(&app, Method::POST, "/books", Some(&token), Some(book.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::POST, "/books", Some(&token), Some(book)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Duplicate");

    let (status, body) = send(&app, Method::GET, "/books/search?q=odys", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, _) = send(&app, Method::GET, "/books/search?status=BORROWED", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/books/9780140449136",
        Some(&token),
        Some(json!({ "publisher": "Penguin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["publisher"], "Penguin");
    assert_eq!(body["title"], "The Odyssey");

    let (status, _) = send(&app, Method::DELETE, "/books/9780140449136", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, "/books/9780140449136", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_member_validation() {
    let app = app();
    let token = login(&app).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/members",
        Some(&token),
        Some(json!({ "name": "Ada", "email": "ada@example.org", "tier": "GOLD" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/members/not-a-uuid", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/members/00000000-0000-0000-0000-000000000000/deactivate",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_checkin_over_http() {
    let app = app();
    let token = login(&app).await;
    let member_id = seed(&app, &token, "PREMIUM", "C1", "AVAILABLE").await;

    let (status, loan) = send(
        &app,
        Method::POST,
        "/checkout",
        Some(&token),
        Some(json!({ "member_id": member_id, "copy_barcode": "C1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loan["copy_barcode"], "C1");
    assert_eq!(loan["returned"], false);

    let (status, body) = send(
        &app,
        Method::POST,
        "/checkout",
        Some(&token),
        Some(json!({ "member_id": member_id, "copy_barcode": "C1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CopyNotAvailable");

    let (status, body) = send(
        &app,
        Method::POST,
        "/loan/renew",
        Some(&token),
        Some(json!({ "member_id": member_id, "copy_barcode": "C1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Loan renewed");
    assert_eq!(body["member_id"], member_id.as_str());

    let (status, body) = send(
        &app,
        Method::POST,
        "/checkin",
        Some(&token),
        Some(json!({ "copy_barcode": "C1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Check-in successful");
    assert_eq!(body["status"], "AVAILABLE");

    let (status, body) = send(
        &app,
        Method::POST,
        "/checkin",
        Some(&token),
        Some(json!({ "copy_barcode": "C1" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoActiveLoan");
}

#[tokio::test]
async fn test_circulation_input_errors() {
    let app = app();
    let token = login(&app).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/checkout",
        Some(&token),
        Some(json!({ "member_id": "bogus", "copy_barcode": "C1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/checkout",
        Some(&token),
        Some(json!({ "copy_barcode": "C1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/checkout",
        Some(&token),
        Some(json!({ "member_id": uuid::Uuid::new_v4(), "copy_barcode": "C1" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchMember");
}

#[tokio::test]
async fn test_holds_and_renewal_priority_over_http() {
    let app = app();
    let token = login(&app).await;
    let borrower = seed(&app, &token, "STANDARD", "C1", "AVAILABLE").await;
    let waiting = seed(&app, &token, "STANDARD", "C2", "AVAILABLE").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/holds/place",
        Some(&token),
        Some(json!({ "member_id": waiting, "copy_barcode": "C1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "CopyAvailable");

    let (status, _) = send(
        &app,
        Method::POST,
        "/checkout",
        Some(&token),
        Some(json!({ "member_id": borrower, "copy_barcode": "C1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::POST,
        "/holds/place",
        Some(&token),
        Some(json!({ "member_id": waiting, "copy_barcode": "C1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Hold placed successfully");

    let (status, _) = send(
        &app,
        Method::POST,
        "/holds/place",
        Some(&token),
        Some(json!({ "member_id": waiting, "copy_barcode": "C1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::POST,
        "/loan/renew",
        Some(&token),
        Some(json!({ "member_id": borrower, "copy_barcode": "C1" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "HoldsPending");

    let (status, body) = send(
        &app,
        Method::POST,
        "/checkin",
        Some(&token),
        Some(json!({ "copy_barcode": "C1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "RESERVED");
}

#[tokio::test]
async fn test_metrics_and_overdue_endpoints() {
    let app = app();
    let token = login(&app).await;
    let member_id = seed(&app, &token, "STANDARD", "C1", "AVAILABLE").await;

    send(
        &app,
        Method::POST,
        "/checkout",
        Some(&token),
        Some(json!({ "member_id": member_id, "copy_barcode": "C1" })),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/admin/metrics", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_books"], 1);
    assert_eq!(body["active_members"], 1);
    assert_eq!(body["loans_today"], 1);
    assert_eq!(body["overdue_count"], 0);
    assert_eq!(body["fine_revenue"].as_f64(), Some(0.0));

    let (status, body) = send(&app, Method::GET, "/loans/overdue", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_request_past_deadline_is_server_error() {
    let app = Router::new()
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "done"
            }),
        )
        .route("/fast", get(|| async { "done" }))
        .layer(axum::middleware::from_fn_with_state(
            Duration::from_millis(100),
            api::middleware::deadline,
        ));

    let (status, body) = send(&app, Method::GET, "/slow", None, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Timeout");

    let (status, _) = send(&app, Method::GET, "/fast", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
