//! End-to-end tests driving the router against the in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use varaamo::models::{
    BlockedTime, Booking, BookingStatus, Branch, DaySchedule, Service, Staff,
};
use varaamo::startup::{build_router, AppState};
use varaamo::store::{BookingStore, MemoryStore};

// 2025-06-02 is a Monday, 2025-06-01 a Sunday
const MONDAY: &str = "2025-06-02";
const SUNDAY: &str = "2025-06-01";

fn branch(id: &str, online: bool, visible: bool) -> Branch {
    Branch {
        id: id.to_string(),
        name: format!("Branch {}", id),
        address: "Mannerheimintie 1".to_string(),
        city: "Helsinki".to_string(),
        phone: None,
        email: None,
        online,
        visible,
    }
}

fn service(id: &str, duration: u32) -> Service {
    Service {
        id: id.to_string(),
        name: "Haircut".to_string(),
        description: String::new(),
        duration,
        price: 35.0,
        branches: vec!["b1".to_string()],
        staff_ids: vec!["staff-1".to_string()],
        available: true,
        visible: true,
    }
}

fn monday_staff(id: &str) -> Staff {
    let mut working_hours = HashMap::new();
    working_hours.insert(
        "Monday".to_string(),
        DaySchedule {
            start: "09:00".to_string(),
            end: "17:00".to_string(),
            is_working: true,
        },
    );
    Staff {
        id: id.to_string(),
        name: "Aino".to_string(),
        email: "aino@example.com".to_string(),
        phone: None,
        services: vec!["svc-1".to_string()],
        branches: vec!["b1".to_string()],
        working_hours,
    }
}

fn stored_booking(start_time: &str, status: BookingStatus) -> Booking {
    let now = Utc::now();
    Booking {
        id: None,
        branch_id: "b1".to_string(),
        branch_name: String::new(),
        service_id: "svc-1".to_string(),
        service_name: String::new(),
        staff_id: "staff-1".to_string(),
        staff_name: String::new(),
        date: MONDAY.to_string(),
        start_time: start_time.to_string(),
        duration: Some(60),
        customer_name: "Matti".to_string(),
        customer_email: "matti@example.com".to_string(),
        customer_phone: "+358 40 123 4567".to_string(),
        customer_notes: String::new(),
        booking_code: "4321".to_string(),
        status,
        channel: "web".to_string(),
        created_at: now,
        updated_at: now,
    }
}

/// Seed the standard fixture: one visible branch, one hidden, a one-hour
/// service and a staff member working Mondays 09:00-17:00.
async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::default());
    store.upsert_branch(&branch("b1", true, true)).await.unwrap();
    store.upsert_branch(&branch("b2", false, true)).await.unwrap();
    store.upsert_service(&service("svc-1", 60)).await.unwrap();
    store.upsert_staff(&monday_staff("staff-1")).await.unwrap();
    store
}

fn app_for(store: &Arc<MemoryStore>) -> Router {
    build_router(AppState {
        store: store.clone(),
    })
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn availability_request(date: &str) -> Value {
    json!({
        "staffId": "staff-1",
        "serviceId": "svc-1",
        "branchId": "b1",
        "date": date,
    })
}

fn booking_request(start_time: &str) -> Value {
    json!({
        "branchId": "b1",
        "serviceId": "svc-1",
        "staffId": "staff-1",
        "date": MONDAY,
        "startTime": start_time,
        "customerName": "Matti Meikäläinen",
        "customerEmail": "matti@example.com",
        "customerPhone": "+358 40 123 4567",
    })
}

fn slot_times(body: &Value) -> Vec<String> {
    body["slots"]
        .as_array()
        .expect("slots array")
        .iter()
        .map(|slot| slot["time"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health_endpoint_answers() {
    let store = seeded_store().await;
    let response = app_for(&store)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn availability_returns_full_grid_for_free_day() {
    let store = seeded_store().await;
    let (status, body) = post_json(
        &app_for(&store),
        "/api/availability",
        availability_request(MONDAY),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["workingHours"]["start"], "09:00");
    assert_eq!(body["workingHours"]["end"], "17:00");
    assert!(body.get("message").is_none());

    let times = slot_times(&body);
    assert_eq!(times.len(), 29);
    assert_eq!(times.first().unwrap(), "09:00");
    assert_eq!(times.last().unwrap(), "16:00");

    // Display rendering and date-qualified id come along
    assert_eq!(body["slots"][0]["display"], "9:00 AM");
    assert_eq!(body["slots"][0]["dateTimeId"], "2025-06-02T09:00");
}

#[tokio::test]
async fn availability_reports_day_off_with_message() {
    let store = seeded_store().await;
    let (status, body) = post_json(
        &app_for(&store),
        "/api/availability",
        availability_request(SUNDAY),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Sunday is not a working day");
    assert!(slot_times(&body).is_empty());
    assert!(body.get("workingHours").is_none());
}

#[tokio::test]
async fn availability_excludes_booked_and_legacy_intervals() {
    let store = seeded_store().await;
    store
        .insert_booking(&stored_booking("10:00", BookingStatus::Confirmed))
        .await
        .unwrap();
    // Legacy encoding still counts as occupied
    let mut legacy = stored_booking("2:00 PM", BookingStatus::Pending);
    legacy.duration = None;
    store.insert_booking(&legacy).await.unwrap();
    // Cancelled bookings do not block
    store
        .insert_booking(&stored_booking("12:00", BookingStatus::Cancelled))
        .await
        .unwrap();

    let (status, body) = post_json(
        &app_for(&store),
        "/api/availability",
        availability_request(MONDAY),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let times = slot_times(&body);
    assert!(times.contains(&"09:00".to_string()));
    assert!(!times.contains(&"10:00".to_string()));
    assert!(!times.contains(&"09:30".to_string()));
    assert!(times.contains(&"11:00".to_string()));
    // Cancelled booking's hour stays open
    assert!(times.contains(&"12:00".to_string()));
    // Legacy 2:00 PM booking occupies [14:00, 15:00)
    assert!(!times.contains(&"14:00".to_string()));
    assert!(times.contains(&"13:00".to_string()));
    assert!(times.contains(&"15:00".to_string()));
}

#[tokio::test]
async fn availability_empty_but_no_message_when_day_fully_blocked() {
    let store = seeded_store().await;
    store
        .insert_blocked_time(&BlockedTime {
            id: None,
            date: MONDAY.to_string(),
            all_day: true,
            start_time: None,
            end_time: None,
            reason: Some("Inventory".to_string()),
        })
        .await
        .unwrap();

    let (status, body) = post_json(
        &app_for(&store),
        "/api/availability",
        availability_request(MONDAY),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(slot_times(&body).is_empty());
    // Fully blocked is not the same as a day off
    assert!(body.get("message").is_none());
    assert_eq!(body["workingHours"]["start"], "09:00");
}

#[tokio::test]
async fn availability_validates_request() {
    let store = seeded_store().await;
    let app = app_for(&store);

    let (status, body) = post_json(
        &app,
        "/api/availability",
        json!({ "serviceId": "svc-1", "date": MONDAY }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = post_json(
        &app,
        "/api/availability",
        json!({ "staffId": "staff-1", "serviceId": "svc-1", "date": "02.06.2025" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn availability_distinguishes_missing_records() {
    let store = seeded_store().await;
    let app = app_for(&store);

    let (status, _) = post_json(
        &app,
        "/api/availability",
        json!({ "staffId": "ghost", "serviceId": "svc-1", "date": MONDAY }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post_json(
        &app,
        "/api/availability",
        json!({ "staffId": "staff-1", "serviceId": "ghost", "date": MONDAY }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn booking_persists_and_conflicts_on_second_attempt() {
    let store = seeded_store().await;
    let app = app_for(&store);

    let (status, body) = post_json(&app, "/api/book", booking_request("09:00")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let code = body["bookingCode"].as_str().unwrap();
    assert_eq!(code.len(), 4);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    let stored = store.bookings_for("staff-1", MONDAY).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, BookingStatus::Confirmed);
    assert_eq!(stored[0].duration, Some(60));
    assert_eq!(stored[0].channel, "web");

    // Same interval again: rejected instead of double-booked
    let (status, body) = post_json(&app, "/api/book", booking_request("09:30")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    // Touching interval is fine
    let (status, _) = post_json(&app, "/api/book", booking_request("10:00")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn booking_rejects_invalid_contact_details() {
    let store = seeded_store().await;
    let app = app_for(&store);

    let mut bad_email = booking_request("09:00");
    bad_email["customerEmail"] = json!("not-an-email");
    let (status, body) = post_json(&app, "/api/book", bad_email).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let mut bad_phone = booking_request("09:00");
    bad_phone["customerPhone"] = json!("call me maybe");
    let (status, _) = post_json(&app, "/api/book", bad_phone).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut missing_name = booking_request("09:00");
    missing_name["customerName"] = json!("");
    let (status, _) = post_json(&app, "/api/book", missing_name).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing got stored along the way
    assert!(store.bookings_for("staff-1", MONDAY).await.unwrap().is_empty());
}

#[tokio::test]
async fn booking_respects_blocked_times() {
    let store = seeded_store().await;
    store
        .insert_blocked_time(&BlockedTime {
            id: None,
            date: MONDAY.to_string(),
            all_day: false,
            start_time: Some("09:00".to_string()),
            end_time: Some("12:00".to_string()),
            reason: None,
        })
        .await
        .unwrap();

    let app = app_for(&store);
    let (status, _) = post_json(&app, "/api/book", booking_request("10:00")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = post_json(&app, "/api/book", booking_request("13:00")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn catalog_endpoints_filter_like_the_wizard() {
    let store = seeded_store().await;
    // A service whose only staff member works at a different branch
    let mut orphan = service("svc-2", 30);
    orphan.staff_ids = vec!["elsewhere".to_string()];
    store.upsert_service(&orphan).await.unwrap();

    let app = app_for(&store);

    let (status, body) = get_json(&app, "/api/branches").await;
    assert_eq!(status, StatusCode::OK);
    let branches = body["branches"].as_array().unwrap();
    assert_eq!(branches.len(), 1);
    assert_eq!(branches[0]["id"], "b1");

    let (status, body) = get_json(&app, "/api/services?branchId=b1").await;
    assert_eq!(status, StatusCode::OK);
    let services = body["services"].as_array().unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0]["id"], "svc-1");

    let (status, body) = get_json(&app, "/api/staff?serviceId=svc-1&branchId=b1").await;
    assert_eq!(status, StatusCode::OK);
    let staff = body["staff"].as_array().unwrap();
    assert_eq!(staff.len(), 1);
    assert_eq!(staff[0]["id"], "staff-1");

    // Missing selector is a validation error
    let (status, _) = get_json(&app, "/api/services").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
