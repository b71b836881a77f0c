use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use marquee_api::middleware::{AdminClaims, CustomerClaims};
use marquee_api::state::{AppState, AuthConfig};
use marquee_catalog::{CatalogService, FavoriteStore, ReviewBoard};
use marquee_core::payment::MockPaymentAdapter;
use marquee_ledger::BookingLedger;
use marquee_reserve::ReservationEngine;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "integration-test-secret";

fn test_app() -> Router {
    let catalog = Arc::new(CatalogService::new());
    let ledger = Arc::new(BookingLedger::new());
    let engine = Arc::new(ReservationEngine::new(
        catalog.clone(),
        ledger.clone(),
        6,
        "USD",
    ));
    let (sse_tx, _) = tokio::sync::broadcast::channel(16);

    marquee_api::app(AppState {
        catalog,
        engine,
        ledger,
        favorites: Arc::new(FavoriteStore::new()),
        reviews: Arc::new(ReviewBoard::new()),
        payments: Arc::new(MockPaymentAdapter),
        booking_repo: None,
        redis: None,
        sse_tx,
        auth: AuthConfig {
            secret: SECRET.to_string(),
            expiration: 3600,
        },
        business_rules: marquee_store::app_config::BusinessRules {
            hold_ttl_seconds: 600,
            sweep_interval_seconds: 30,
            max_seats_per_hold: 6,
            pending_payment_grace_seconds: 900,
            currency: "USD".to_string(),
        },
    })
}

fn customer_token(sub: &str) -> String {
    let claims = CustomerClaims {
        sub: sub.to_string(),
        email: Some(format!("{}@example.com", sub)),
        role: "CUSTOMER".to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn admin_token() -> String {
    let claims = AdminClaims {
        sub: "admin-1".to_string(),
        email: "admin@example.com".to_string(),
        role: "ADMIN".to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => Body::from(serde_json::to_vec(&value).unwrap()),
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Seeds a hall (rows A and B, two seats each), a movie and a show priced
/// at 1200 cents. Returns (hall_id, movie_id, show_id).
async fn seed_catalog(app: &Router, admin: &str) -> (String, String, String) {
    let (status, hall) = send(
        app,
        "POST",
        "/v1/admin/halls",
        Some(admin),
        Some(json!({
            "name": "Screen 1",
            "rows": [
                {"label": "A", "seat_count": 2},
                {"label": "B", "seat_count": 2}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, movie) = send(
        app,
        "POST",
        "/v1/admin/movies",
        Some(admin),
        Some(json!({"title": "The Conversation"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, show) = send(
        app,
        "POST",
        "/v1/admin/shows",
        Some(admin),
        Some(json!({
            "movie_id": movie["id"],
            "hall_id": hall["id"],
            "starts_at": "2026-09-01T19:30:00Z",
            "price_cents": 1200
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    (
        hall["id"].as_str().unwrap().to_string(),
        movie["id"].as_str().unwrap().to_string(),
        show["id"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn full_reservation_flow() {
    let app = test_app();
    let admin = admin_token();
    let u1 = customer_token("u1");
    let u2 = customer_token("u2");
    let (hall_id, _, show_id) = seed_catalog(&app, &admin).await;

    // Seat map is ordered row by row, 1-indexed.
    let (status, map) = send(
        &app,
        "GET",
        &format!("/v1/halls/{}/seat-map", hall_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(map["seats"], json!(["A1", "A2", "B1", "B2"]));

    // u1 holds two seats.
    let (status, hold) = send(
        &app,
        "POST",
        "/v1/holds",
        Some(&u1),
        Some(json!({
            "show_id": show_id,
            "seat_ids": ["A1", "B2"],
            "ttl_seconds": 600
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let batch_id = hold["hold_batch_id"].as_str().unwrap().to_string();

    // u2 races for an overlapping seat and loses with seat detail.
    let (status, conflict) = send(
        &app,
        "POST",
        "/v1/holds",
        Some(&u2),
        Some(json!({"show_id": show_id, "seat_ids": ["A1"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(conflict["kind"], "SEAT_UNAVAILABLE");
    assert_eq!(conflict["seats"], json!(["A1"]));

    // Both seats show as occupied.
    let (status, occupied) = send(
        &app,
        "GET",
        &format!("/v1/shows/{}/occupied-seats", show_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(occupied["occupied"], json!(["A1", "B2"]));

    // Confirm into a pending booking priced per seat.
    let (status, booking) = send(
        &app,
        "POST",
        &format!("/v1/holds/{}/confirm", batch_id),
        Some(&u1),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["seat_ids"], json!(["A1", "B2"]));
    assert_eq!(booking["amount_cents"], 2400);
    assert_eq!(booking["payment_state"], "PENDING");
    let booking_id = booking["booking_id"].as_str().unwrap().to_string();

    // Pay.
    let (status, paid) = send(
        &app,
        "POST",
        &format!("/v1/bookings/{}/pay", booking_id),
        Some(&u1),
        Some(json!({"payment_token": "tok-visa"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["payment_state"], "PAID");

    // Cancel (refund path) releases the seats.
    let (status, cancelled) = send(
        &app,
        "POST",
        &format!("/v1/bookings/{}/cancel", booking_id),
        Some(&u1),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["payment_state"], "CANCELLED");

    let (_, occupied) = send(
        &app,
        "GET",
        &format!("/v1/shows/{}/occupied-seats", show_id),
        None,
        None,
    )
    .await;
    assert_eq!(occupied["occupied"], json!([]));

    // Admin sees the booking and the dashboard reflects it.
    let (status, rows) = send(&app, "GET", "/v1/admin/bookings", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["movie_title"], "The Conversation");

    let (status, dashboard) = send(&app, "GET", "/v1/admin/dashboard", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["total_bookings"], 1);
    // Cancelled after payment, so no revenue is counted.
    assert_eq!(dashboard["total_revenue_cents"], 0);
}

#[tokio::test]
async fn declined_payment_leaves_booking_pending() {
    let app = test_app();
    let admin = admin_token();
    let u1 = customer_token("u1");
    let (_, _, show_id) = seed_catalog(&app, &admin).await;

    let (_, hold) = send(
        &app,
        "POST",
        "/v1/holds",
        Some(&u1),
        Some(json!({"show_id": show_id, "seat_ids": ["A2"]})),
    )
    .await;
    let batch_id = hold["hold_batch_id"].as_str().unwrap().to_string();

    let (_, booking) = send(
        &app,
        "POST",
        &format!("/v1/holds/{}/confirm", batch_id),
        Some(&u1),
        None,
    )
    .await;
    let booking_id = booking["booking_id"].as_str().unwrap().to_string();

    let (status, declined) = send(
        &app,
        "POST",
        &format!("/v1/bookings/{}/pay", booking_id),
        Some(&u1),
        Some(json!({"payment_token": "tok-declined"})),
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(declined["kind"], "PAYMENT_FAILED");

    // Still pending, seats still held.
    let (_, bookings) = send(&app, "GET", "/v1/bookings", Some(&u1), None).await;
    assert_eq!(bookings[0]["payment_state"], "PENDING");

    // A retry with a working card succeeds.
    let (status, paid) = send(
        &app,
        "POST",
        &format!("/v1/bookings/{}/pay", booking_id),
        Some(&u1),
        Some(json!({"payment_token": "tok-visa"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["payment_state"], "PAID");
}

#[tokio::test]
async fn release_hold_is_idempotent_over_http() {
    let app = test_app();
    let admin = admin_token();
    let u1 = customer_token("u1");
    let (_, _, show_id) = seed_catalog(&app, &admin).await;

    let (_, hold) = send(
        &app,
        "POST",
        "/v1/holds",
        Some(&u1),
        Some(json!({"show_id": show_id, "seat_ids": ["B1"]})),
    )
    .await;
    let batch_id = hold["hold_batch_id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let (status, released) = send(
            &app,
            "DELETE",
            &format!("/v1/holds/{}", batch_id),
            Some(&u1),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(released["status"], "RELEASED");
    }

    let (_, occupied) = send(
        &app,
        "GET",
        &format!("/v1/shows/{}/occupied-seats", show_id),
        None,
        None,
    )
    .await;
    assert_eq!(occupied["occupied"], json!([]));
}

#[tokio::test]
async fn auth_is_enforced() {
    let app = test_app();
    let u1 = customer_token("u1");

    // No token on a customer route.
    let (status, _) = send(
        &app,
        "POST",
        "/v1/holds",
        None,
        Some(json!({"show_id": "00000000-0000-0000-0000-000000000000", "seat_ids": ["A1"]})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Customer token on an admin route.
    let (status, _) = send(&app, "GET", "/v1/admin/dashboard", Some(&u1), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn guest_login_can_drive_the_hold_flow() {
    let app = test_app();
    let admin = admin_token();
    let (_, _, show_id) = seed_catalog(&app, &admin).await;

    let (status, auth) = send(&app, "POST", "/v1/auth/guest", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let token = auth["token"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        "/v1/holds",
        Some(&token),
        Some(json!({"show_id": show_id, "seat_ids": ["A1"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_hall_is_rejected() {
    let app = test_app();
    let admin = admin_token();

    let (status, body) = send(
        &app,
        "POST",
        "/v1/admin/halls",
        Some(&admin),
        Some(json!({
            "name": "Broken",
            "rows": [{"label": "A", "seat_count": 0}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "INVALID_CONFIGURATION");
}

#[tokio::test]
async fn favorites_and_reviews_round_trip() {
    let app = test_app();
    let admin = admin_token();
    let u1 = customer_token("u1");
    let (_, movie_id, _) = seed_catalog(&app, &admin).await;

    // Favorite, list, toggle off.
    let (status, fav) = send(
        &app,
        "PUT",
        &format!("/v1/favorites/{}", movie_id),
        Some(&u1),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fav["favorited"], true);

    let (_, favorites) = send(&app, "GET", "/v1/favorites", Some(&u1), None).await;
    assert_eq!(favorites.as_array().unwrap().len(), 1);
    assert_eq!(favorites[0]["movie"]["title"], "The Conversation");

    let (_, toggled) = send(
        &app,
        "POST",
        &format!("/v1/favorites/{}/toggle", movie_id),
        Some(&u1),
        None,
    )
    .await;
    assert_eq!(toggled["favorited"], false);

    // Review and aggregate.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/v1/reviews/{}", movie_id),
        Some(&u1),
        Some(json!({"rating": 5, "comment": "Hackman at his best"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, reviews) = send(
        &app,
        "GET",
        &format!("/v1/movies/{}/reviews", movie_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviews["average_rating"], 5.0);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/v1/reviews/{}", movie_id),
        Some(&u1),
        Some(json!({"rating": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
