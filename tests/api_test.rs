// tests/api_test.rs
mod common;

use actix_web::{http::StatusCode, test, web, App};
use chrono::Duration;
use serde_json::{json, Value};
use std::sync::Arc;

use apolo_call_analytics::api;
use apolo_call_analytics::services::{AnalyticsEngine, CustomerAggregator};
use common::{ts, FakePlatform};

fn small_platform() -> Arc<FakePlatform> {
    let now = common::now_millis();
    let call = |id: &str, hours: i64, metadata: Value, number: Option<&str>| {
        let created = now - Duration::hours(hours);
        json!({
            "id": id,
            "status": "ended",
            "createdAt": ts(created),
            "startedAt": ts(created + Duration::seconds(1)),
            "endedAt": ts(created + Duration::seconds(121)),
            "cost": 0.5,
            "assistantId": "asst-1",
            "metadata": metadata,
            "customer": { "number": number }
        })
    };

    Arc::new(
        FakePlatform::new()
            .with_collection(
                "/call",
                vec![
                    call(
                        "c1",
                        1,
                        json!({ "customer_id": "cus_1", "customer_email": "a@b.test" }),
                        None,
                    ),
                    call("c2", 30, json!({ "customer_id": "cus_1" }), None),
                    call("c3", 24 * 20, json!({}), Some("+15551234567")),
                ],
            )
            .with_collection(
                "/assistant",
                vec![json!({
                    "id": "asst-1",
                    "name": "Front Desk",
                    "createdAt": ts(now - Duration::days(40))
                })],
            )
            .with_collection("/phone-number", vec![])
            .with_collection("/campaign", vec![]),
    )
}

macro_rules! app {
    ($platform:expr) => {{
        let paginator = common::paginator($platform, 1000);
        let engine = Arc::new(AnalyticsEngine::new(paginator.clone()));
        let aggregator = Arc::new(CustomerAggregator::new(paginator));
        test::init_service(
            App::new()
                .app_data(web::Data::new(engine))
                .app_data(web::Data::new(aggregator))
                .configure(api::routes::configure),
        )
        .await
    }};
}

#[actix_web::test]
async fn test_health_check() {
    let app = app!(small_platform());

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "apolo-call-analytics");
}

#[actix_web::test]
async fn test_system_analytics_route() {
    let app = app!(small_platform());

    let req = test::TestRequest::get().uri("/api/v1/analytics/system").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total_calls"], 3);
    assert_eq!(body["total_customers"], 2);
    assert_eq!(body["total_assistants"], 1);
    assert_eq!(body["calls_last_7_days"], 2);
    assert_eq!(body["calls_last_30_days"], 3);
}

#[actix_web::test]
async fn test_customer_listing_route() {
    let app = app!(small_platform());

    let req = test::TestRequest::get().uri("/api/v1/analytics/customers").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let customers = body.as_array().unwrap();
    assert_eq!(customers.len(), 2);
    assert_eq!(customers[0]["id"], "cus_1");
    assert_eq!(customers[0]["total_calls"], 2);
    assert_eq!(customers[1]["id"], "+15551234567");
}

#[actix_web::test]
async fn test_search_route() {
    let app = app!(small_platform());

    let req = test::TestRequest::get()
        .uri("/api/v1/analytics/customers/search?q=A@B.TEST")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["customer"]["customer_id"], "cus_1");
    // The email resolves the customer; every call of that customer counts
    assert_eq!(body["customer"]["total_calls"], 2);

    let req = test::TestRequest::get()
        .uri("/api/v1/analytics/customers/search?q=CUS_1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["customer"]["total_calls"], 2);
    assert_eq!(body["customer"]["email"], "a@b.test");

    let req = test::TestRequest::get()
        .uri("/api/v1/analytics/customers/search?q=nobody")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["customer"].is_null());
    assert!(body["message"].as_str().unwrap().contains("nobody"));

    let req = test::TestRequest::get()
        .uri("/api/v1/analytics/customers/search?q=%20")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_customer_usage_route() {
    let app = app!(small_platform());

    let req = test::TestRequest::get()
        .uri("/api/v1/analytics/customers/cus_1?period=7d")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total_calls"], 2);
    assert_eq!(body["period"]["label"], "7d");
    assert_eq!(body["assistant_breakdown"][0]["assistant_name"], "Front Desk");

    // Defaults to 30 days
    let req = test::TestRequest::get()
        .uri("/api/v1/analytics/customers/cus_1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["period"]["label"], "30d");

    let req = test::TestRequest::get()
        .uri("/api/v1/analytics/customers/cus_1?period=fortnight")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_request");
    assert_eq!(body["retryable"], false);
}

#[actix_web::test]
async fn test_upstream_rejection_maps_to_bad_gateway() {
    let platform = small_platform();
    platform.fail_request(1, 401);
    let app = app!(platform);

    let req = test::TestRequest::get().uri("/api/v1/analytics/customers").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "upstream_error");
    assert_eq!(body["retryable"], false);
}

#[actix_web::test]
async fn test_unknown_route_is_not_found() {
    let app = app!(small_platform());

    let req = test::TestRequest::get().uri("/api/v1/analytics/unknown/deep").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "not_found");
}
