//! Integration tests for the seat HTTP API.

mod helpers;

use axum::http::StatusCode;
use chrono::TimeDelta;
use serde_json::json;

#[tokio::test]
async fn test_list_seats_all_available() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/seats", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    let seats = response.body["seats"].as_array().unwrap();
    let ids: Vec<_> = seats.iter().map(|s| s["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["A1", "A2", "A3"]);
    assert!(seats.iter().all(|s| s["state"] == "available"));
    assert!(seats.iter().all(|s| s.get("holder").is_none()));
}

#[tokio::test]
async fn test_lock_seat() {
    let app = helpers::TestApp::new();

    let response = app.lock("A1", "bob").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Seat A1 locked for bob");
    assert_eq!(response.body["seat"]["state"], "held");
    assert_eq!(response.body["seat"]["holder"], "bob");
    assert!(response.body["seat"]["leaseDeadline"].is_string());
}

#[tokio::test]
async fn test_lock_with_custom_ttl() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/seats/lock",
            Some(json!({ "seatId": "A2", "user": "amy", "ttlSeconds": 5 })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    app.clock.advance(TimeDelta::seconds(6));
    let seat = app.request("GET", "/api/seats/A2", None).await;
    assert_eq!(seat.body["seat"]["state"], "available");
}

#[tokio::test]
async fn test_lock_ttl_above_maximum_rejected() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/seats/lock",
            Some(json!({ "seatId": "A2", "user": "amy", "ttlSeconds": 100000 })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_lock_held_seat_conflicts() {
    let app = helpers::TestApp::new();
    app.lock("A1", "bob").await;

    let response = app.lock("A1", "amy").await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["error"], "CONFLICT");
    assert_eq!(response.reason(), Some("ALREADY_HELD"));
    assert_eq!(response.body["retryable"], true);
    assert_eq!(response.body["message"], "Seat A1 already locked");
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let app = helpers::TestApp::new();

    let response = app
        .request("POST", "/api/seats/lock", Some(json!({ "seatId": "A1" })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");

    let response = app
        .request("POST", "/api/seats/confirm", Some(json!({ "user": "bob" })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let list = app.request("GET", "/api/seats", None).await;
    assert!(
        list.body["seats"]
            .as_array()
            .unwrap()
            .iter()
            .all(|s| s["state"] == "available")
    );
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let app = helpers::TestApp::new();

    let response = app
        .raw_request("POST", "/api/seats/lock", "{not json".to_string())
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_unknown_seat_not_found() {
    let app = helpers::TestApp::new();

    assert_eq!(app.lock("Z9", "bob").await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.confirm("Z9", "bob").await.status, StatusCode::NOT_FOUND);
    let response = app.request("GET", "/api/seats/Z9", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_booking_flow() {
    let app = helpers::TestApp::new();

    assert_eq!(app.lock("A1", "bob").await.status, StatusCode::OK);

    let response = app.confirm("A1", "amy").await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.reason(), Some("NOT_HOLDER"));

    let response = app.confirm("A1", "bob").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Seat A1 booked by bob");
    assert_eq!(response.body["seat"]["state"], "committed");
    assert_eq!(response.body["seat"]["committedBy"], "bob");
    assert!(response.body["seat"].get("holder").is_none());

    let response = app.lock("A1", "amy").await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.reason(), Some("ALREADY_COMMITTED"));
    assert_eq!(response.body["retryable"], false);

    let response = app.confirm("A1", "bob").await;
    assert_eq!(response.reason(), Some("ALREADY_COMMITTED"));
}

#[tokio::test]
async fn test_expired_lease_flow() {
    let app = helpers::TestApp::new();
    app.request(
        "POST",
        "/api/seats/lock",
        Some(json!({ "seatId": "A2", "user": "carl", "ttlSeconds": 1 })),
    )
    .await;

    app.clock.advance(TimeDelta::seconds(2));

    let response = app.confirm("A2", "carl").await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.reason(), Some("EXPIRED"));

    let response = app.lock("A2", "dan").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["seat"]["holder"], "dan");
}

#[tokio::test]
async fn test_list_hides_lapsed_leases() {
    let app = helpers::TestApp::new();
    app.request(
        "POST",
        "/api/seats/lock",
        Some(json!({ "seatId": "A3", "user": "bob", "ttlSeconds": 1 })),
    )
    .await;
    app.clock.advance(TimeDelta::milliseconds(1500));

    let list = app.request("GET", "/api/seats", None).await;
    let a3 = &list.body["seats"][2];
    assert_eq!(a3["id"], "A3");
    assert_eq!(a3["state"], "available");
    assert!(a3.get("holder").is_none());
}

#[tokio::test]
async fn test_pool_status_counts() {
    let app = helpers::TestApp::new();
    app.lock("A1", "bob").await;
    app.confirm("A1", "bob").await;
    app.lock("A2", "amy").await;

    let response = app.request("GET", "/api/pool", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["data"],
        json!({ "total": 3, "available": 1, "held": 1, "committed": 1 })
    );
}

#[tokio::test]
async fn test_health() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_custom_seat_ids() {
    let app = helpers::TestApp::with_seats(&["B7", "B8"]);

    let list = app.request("GET", "/api/seats", None).await;
    assert_eq!(list.body["seats"].as_array().unwrap().len(), 2);
    assert_eq!(app.lock("B8", "bob").await.status, StatusCode::OK);
    assert_eq!(app.lock("A1", "bob").await.status, StatusCode::NOT_FOUND);
}
