use airbook_api::{app, AppState};
use airbook_core::testing::{MemoryCache, MemoryStore, RecordingPublisher};
use airbook_core::{Booking, BookingAccess, CallBudget, Flight, FlightAccess};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct Harness {
    router: Router,
    flights: Arc<MemoryStore<Flight>>,
    bookings: Arc<MemoryStore<Booking>>,
    cache: Arc<MemoryCache>,
    publisher: Arc<RecordingPublisher>,
}

fn harness() -> Harness {
    harness_with_budget(CallBudget::default())
}

fn harness_with_budget(budget: CallBudget) -> Harness {
    let flights = Arc::new(MemoryStore::<Flight>::new());
    let bookings = Arc::new(MemoryStore::<Booking>::new());
    let cache = Arc::new(MemoryCache::new());
    let publisher = Arc::new(RecordingPublisher::new());

    let state = AppState {
        flights: Arc::new(FlightAccess::new(flights.clone(), cache.clone()).with_budget(budget)),
        bookings: Arc::new(
            BookingAccess::new(bookings.clone(), cache.clone(), publisher.clone(), "bookings")
                .with_budget(budget),
        ),
    };

    Harness {
        router: app(state),
        flights,
        bookings,
        cache,
        publisher,
    }
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn alice_booking() -> Value {
    json!({
        "flight_id": 42,
        "passenger": "alice",
        "seats": 2,
        "total_price": 300.00,
        "status": "confirmed"
    })
}

#[tokio::test]
async fn test_flight_create_then_list() {
    let h = harness();

    let (status, body) = send(
        &h.router,
        "POST",
        "/flights",
        Some(json!({
            "airline": "IndiGo",
            "source": "DEL",
            "destination": "BOM",
            "departure": "2025-03-01T06:30:00Z",
            "arrival": "2025-03-01T08:40:00Z",
            "price": 5200.0,
            "available_seats": 180
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Flight added successfully");

    let (status, body) = send(&h.router, "GET", "/flights", None).await;
    assert_eq!(status, StatusCode::OK);
    let flights = body.as_array().unwrap();
    assert_eq!(flights.len(), 1);
    assert_eq!(flights[0]["airline"], "IndiGo");
}

#[tokio::test]
async fn test_duplicate_booking_is_conflict() {
    let h = harness();

    let (status, _) = send(&h.router, "POST", "/bookings", Some(alice_booking())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(h.publisher.attempts().len(), 1);

    let (status, body) = send(&h.router, "POST", "/bookings", Some(alice_booking())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("alice"));
    assert_eq!(h.bookings.insert_calls(), 1);
}

#[tokio::test]
async fn test_store_outage_is_internal_error() {
    let h = harness();
    h.bookings.set_failing(true);

    let (status, body) = send(&h.router, "GET", "/bookings", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal Server Error");
}

#[tokio::test]
async fn test_cache_outage_is_invisible_to_clients() {
    let h = harness();
    h.cache.set_failing(true);
    h.publisher.set_failing(true);

    let (status, _) = send(&h.router, "POST", "/bookings", Some(alice_booking())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&h.router, "GET", "/bookings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_store_timeout_is_gateway_timeout() {
    let h = harness_with_budget(CallBudget {
        store: Duration::from_millis(50),
        ..CallBudget::default()
    });
    h.flights.set_delay(Some(Duration::from_secs(10)));
    h.bookings.set_delay(Some(Duration::from_secs(10)));

    let (status, body) = send(&h.router, "GET", "/flights", None).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"], "Upstream timeout");

    let (status, _) = send(&h.router, "POST", "/bookings", Some(alice_booking())).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(h.publisher.attempts().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let h = harness();

    let request = Request::builder()
        .method("POST")
        .uri("/bookings")
        .header("content-type", "application/json")
        .body(Body::from("{\"passenger\": \"alice\""))
        .unwrap();
    let response = h.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Invalid payload");

    let (status, body) = send(&h.router, "POST", "/flights", Some(json!({ "airline": "IndiGo" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid payload");
    assert_eq!(h.flights.insert_calls(), 0);
    assert_eq!(h.bookings.insert_calls(), 0);
}
