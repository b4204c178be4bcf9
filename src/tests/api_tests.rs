use super::create_test_service;
use crate::api;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

fn test_app() -> Router {
    api::app(Arc::new(create_test_service()), Duration::from_secs(5))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn test_empty_collections_return_no_content() {
    let app = test_app();
    for uri in ["/api/users", "/api/transactions", "/api/summary", "/api/payments", "/api/balances"] {
        let (status, _) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT, "{}", uri);
    }
}

#[tokio::test]
async fn test_transaction_round_trip_over_http() {
    let app = test_app();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/transactions",
        Some(json!({ "payer_id": a, "amount": 50.0, "members": [a, b], "remark": "Taxi" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["is_deleted"], json!(false));

    let (status, fetched) = send(&app, Method::GET, &format!("/api/transactions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["remark"], json!("Taxi"));

    let (status, listed) = send(&app, Method::GET, "/api/transactions?page=0&limit=abc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["page"], json!(1));
    assert_eq!(listed["limit"], json!(20));
    assert_eq!(listed["transactions"].as_array().unwrap().len(), 1);

    let (status, summary) = send(&app, Method::GET, "/api/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_expenses"], json!(50.0));
    assert_eq!(summary["transaction_count"], json!(1));

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/transactions/{}/soft-delete", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, "/api/transactions", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_validation_and_lookup_errors() {
    let app = test_app();
    let payer = Uuid::new_v4();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/transactions",
        Some(json!({ "payer_id": payer, "amount": 0.0, "members": [payer] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::GET, "/api/transactions/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, &format!("/api/transactions/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/api/transactions?payer_id=nobody", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_edit_with_mismatched_id_is_rejected() {
    let app = test_app();
    let payer = Uuid::new_v4();
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/transactions",
        Some(json!({ "payer_id": payer, "amount": 10.0, "members": [payer] })),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/transactions/{}", id),
        Some(json!({ "id": Uuid::new_v4(), "payer_id": payer, "amount": 20.0, "members": [payer] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, edited) = send(
        &app,
        Method::PUT,
        &format!("/api/transactions/{}", id),
        Some(json!({ "id": id, "payer_id": payer, "amount": 20.0, "members": [payer] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["amount"], json!(20.0));
}

#[tokio::test]
async fn test_users_and_payments_over_http() {
    let app = test_app();
    let (status, alice) = send(&app, Method::POST, "/api/users", Some(json!({ "name": "Alice" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, bob) = send(&app, Method::POST, "/api/users", Some(json!({ "name": "Bob" }))).await;

    let (status, users) = send(&app, Method::GET, "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/payments",
        Some(json!({ "payer_id": alice["id"], "receiver_id": bob["id"], "amount": 15.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, summary) = send(&app, Method::GET, "/api/payment-summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_expenses"], json!(15.0));

    let (status, logs) = send(&app, Method::GET, "/api/logs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_period_filters_over_http() {
    let app = test_app();
    let payer = Uuid::new_v4();
    let (status, created) = send(
        &app,
        Method::POST,
        "/api/transactions",
        Some(json!({ "payer_id": payer, "amount": 30.0, "members": [payer], "remark": "taxi\nairport" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["remark"], json!("taxi\nairport"));

    let today = chrono::Utc::now().date_naive();
    let (status, _) = send(&app, Method::GET, "/api/balances?start_date=2000-01-01&end_date=2000-01-31", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, "/api/summary?end_date=2000-01-31", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let uri = format!("/api/balances?start_date={}&end_date={}", today, today);
    let (status, balances) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balances["total_expenses"], json!(30.0));

    let uri = format!("/api/transactions?start_date={}", today);
    let (status, listed) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["transactions"].as_array().unwrap().len(), 1);
}
