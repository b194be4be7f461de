// gym-server/tests/ledger_scenarios.rs
// End-to-end ledger rules through the HTTP API

mod common;

use chrono::{TimeZone, Utc};
use common::{TestApp, code};
use http::StatusCode;
use serde_json::json;

fn ms(y: i32, m: u32, d: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap().timestamp_millis()
}

#[tokio::test]
async fn test_overlapping_payment_rejected() {
    let (app, token) = TestApp::logged_in().await;
    let client_id = app.client(&token, "Ana Lopez").await;

    let (status, first) = app
        .post(
            "/api/payments",
            &token,
            json!({
                "client_id": client_id,
                "subscription_period": "MONTHLY",
                "amount": 50.0,
                "payment_date": "2024-01-01",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{first}");
    assert_eq!(first["next_payment_date"], ms(2024, 2, 1));

    let (status, body) = app
        .post(
            "/api/payments",
            &token,
            json!({
                "client_id": client_id,
                "subscription_period": "MONTHLY",
                "amount": 50.0,
                "payment_date": "2024-01-15",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(code(&body), 5002);
    assert_eq!(body["details"]["payment_id"], first["id"]);

    // Back-to-back coverage is fine
    let (status, body) = app
        .post(
            "/api/payments",
            &token,
            json!({
                "client_id": client_id,
                "subscription_period": "MONTHLY",
                "amount": 50.0,
                "payment_date": "2024-02-01",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, list) = app
        .get(&format!("/api/clients/{client_id}/payments"), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(2));
    assert_eq!(list[0]["client_full_name"], "ANA LOPEZ");
}

#[tokio::test]
async fn test_second_check_in_same_day_rejected() {
    let (app, token) = TestApp::logged_in().await;
    let client_id = app.client(&token, "Ben Ortiz").await;

    let (status, body) = app
        .post(
            "/api/payments",
            &token,
            json!({ "client_id": client_id, "subscription_period": "MONTHLY", "amount": 40.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = app
        .post("/api/attendance", &token, json!({ "client_id": client_id }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = app
        .post("/api/attendance", &token, json!({ "client_id": client_id }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(code(&body), 7002);

    let (status, today) = app.get("/api/attendance", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(today.as_array().map(Vec::len), Some(1));
    assert_eq!(today[0]["client_full_name"], "BEN ORTIZ");
}

#[tokio::test]
async fn test_promotion_overrides_amount_and_length() {
    let (app, token) = TestApp::logged_in().await;
    let client_id = app.client(&token, "Carla Diaz").await;

    let (status, promo) = app
        .post(
            "/api/promotions",
            &token,
            json!({
                "name": "Summer",
                "fixed_price": 300.0,
                "subscription_months": 3,
                "start_date": "2024-01-01",
                "end_date": "2024-12-31",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{promo}");

    let (status, payment) = app
        .post(
            "/api/payments",
            &token,
            json!({
                "client_id": client_id,
                "promotion_id": promo["id"],
                "payment_date": "2024-06-01",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{payment}");
    assert_eq!(payment["amount"], 300.0);
    assert_eq!(payment["period"], "CUSTOM");
    assert_eq!(payment["next_payment_date"], ms(2024, 9, 1));

    // Outside the promotion window
    let (status, body) = app
        .post(
            "/api/payments",
            &token,
            json!({
                "client_id": client_id,
                "promotion_id": promo["id"],
                "payment_date": "2025-01-15",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(code(&body), 6002);
}

#[tokio::test]
async fn test_rename_within_cooldown_rejected() {
    let (app, token) = TestApp::logged_in().await;
    let client_id = app.client(&token, "Dario Fuentes").await;

    let (status, body) = app
        .put(
            &format!("/api/clients/{client_id}"),
            &token,
            json!({ "full_name": "Dario Fuentes Ruiz" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(code(&body), 3006);
    assert!(body["details"]["allowed_from"].is_i64());

    // Other fields still update, absent ones are kept
    let (status, body) = app
        .put(
            &format!("/api/clients/{client_id}"),
            &token,
            json!({ "notes": "prefers mornings" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["full_name"], "DARIO FUENTES");
    assert_eq!(body["notes"], "prefers mornings");

    let (status, history) = app
        .get(&format!("/api/clients/{client_id}/history"), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<_> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(actions, ["UPDATE", "CREATE"]);
}

#[tokio::test]
async fn test_check_in_with_expired_payment_forbidden() {
    let (app, token) = TestApp::logged_in().await;
    let client_id = app.client(&token, "Elena Gil").await;

    let (status, body) = app
        .post(
            "/api/payments",
            &token,
            json!({
                "client_id": client_id,
                "subscription_period": "MONTHLY",
                "amount": 35.0,
                "payment_date": "2020-01-01",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = app
        .post("/api/attendance", &token, json!({ "client_id": client_id }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(code(&body), 7003);
    assert_eq!(body["details"]["coverage_end"], ms(2020, 2, 1));

    let (status, body) = app
        .post("/api/attendance", &token, json!({ "client_id": client_id + 1000 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(code(&body), 3001);
}

#[tokio::test]
async fn test_soft_deleted_client_hidden() {
    let (app, token) = TestApp::logged_in().await;
    let client_id = app.client(&token, "Fabio Herrera").await;

    let (status, _) = app.delete(&format!("/api/clients/{client_id}"), &token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get(&format!("/api/clients/{client_id}"), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(code(&body), 3001);

    let (status, body) = app
        .get(&format!("/api/clients/{client_id}?include_deleted=1"), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["deleted_at"].is_i64());

    let (_, list) = app.get("/api/clients", &token).await;
    assert_eq!(list.as_array().map(Vec::len), Some(0));

    // The name is free again
    let again = app.client(&token, "Fabio Herrera").await;
    assert_ne!(again, client_id);
}

#[tokio::test]
async fn test_statistics_overview() {
    let (app, token) = TestApp::logged_in().await;
    let client_id = app.client(&token, "Gina Iglesias").await;
    app.post(
        "/api/payments",
        &token,
        json!({ "client_id": client_id, "subscription_period": "MONTHLY", "amount": 45.5 }),
    )
    .await;
    app.post("/api/attendance", &token, json!({ "client_id": client_id }))
        .await;

    let (status, stats) = app.get("/api/statistics/overview", &token).await;
    assert_eq!(status, StatusCode::OK, "{stats}");
    assert_eq!(stats["total_clients"], 1);
    assert_eq!(stats["revenue_total"], 45.5);
    assert_eq!(stats["revenue_day"], 45.5);
    assert_eq!(stats["up_to_date"], 1);
    assert_eq!(stats["attendance_day"], 1);
    assert_eq!(stats["monthly_revenue"].as_array().map(Vec::len), Some(12));

    let (status, body) = app
        .get("/api/statistics/overview?day=yesterday", &token)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(code(&body), 2);
}
