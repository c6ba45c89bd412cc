use std::sync::Arc;

use airline_booking::{routes, BookingState};
use airline_common::testing::RecordingNotifier;
use airline_common::{JwtKeys, NotificationEvent};
use airline_config::{AppConfig, DatabaseConfig, JwtConfig};
use airline_db::models::{NewAirline, NewFlight, NewUser};
use airline_db::{
    init_schema, AirlineRepository, DbClient, FlightRepository, SqlAirlineRepository,
    SqlFlightRepository, SqlUserRepository, UserRepository,
};
use axum::{body::Body, Router};
use chrono::{Duration, TimeZone, Utc};
use http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "booking-test-secret";

struct TestApp {
    router: Router,
    notifier: Arc<RecordingNotifier>,
    token: String,
    other_token: String,
    flight_id: i64,
}

fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
        use_booking: true,
        database: Some(DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }),
        jwt: JwtConfig {
            secret: SECRET.to_string(),
            expiration_hours: 24,
        },
        ..AppConfig::default()
    })
}

async fn seed_flight(db: &DbClient, flight_number: &str, origin: &str, destination: &str, day: u32, seats: i64) -> i64 {
    let airlines = SqlAirlineRepository::new(db.clone());
    let airline = match airlines.find_by_code("9U").await.unwrap() {
        Some(airline) => airline,
        None => airlines
            .create(NewAirline {
                name: "Air Moldova".to_string(),
                code: "9U".to_string(),
                country: None,
            })
            .await
            .unwrap(),
    };
    let departure = Utc.with_ymd_and_hms(2030, 6, day, 8, 0, 0).unwrap();
    SqlFlightRepository::new(db.clone())
        .create(NewFlight {
            airline_id: airline.id,
            flight_number: flight_number.to_string(),
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure_time: departure,
            arrival_time: departure + Duration::hours(3),
            total_seats: seats,
            price: 120.0,
        })
        .await
        .unwrap()
        .id
}

async fn seed_user(db: &DbClient, email: &str) -> i64 {
    SqlUserRepository::new(db.clone())
        .create(NewUser {
            email: email.to_string(),
            password_hash: "unused".to_string(),
            first_name: "Test".to_string(),
            last_name: "Passenger".to_string(),
            phone: None,
        })
        .await
        .unwrap()
        .id
}

async fn app_with(notifier: RecordingNotifier) -> (TestApp, DbClient) {
    let config = test_config();
    let db = DbClient::new(&config).await.unwrap();
    init_schema(&db).await.unwrap();

    let keys = JwtKeys::new(SECRET, 24);
    let token = keys.issue(seed_user(&db, "ana@example.com").await).unwrap();
    let other_token = keys.issue(seed_user(&db, "ion@example.com").await).unwrap();
    let flight_id = seed_flight(&db, "9U101", "Chișinău", "Moscova", 1, 2).await;

    let notifier = Arc::new(notifier);
    let state = BookingState::new(config, db.clone(), notifier.clone());
    let app = TestApp {
        router: routes(Arc::new(state)),
        notifier,
        token,
        other_token,
        flight_id,
    };
    (app, db)
}

async fn app() -> (TestApp, DbClient) {
    app_with(RecordingNotifier::new()).await
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
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn book(app: &TestApp, token: &str, seat: &str) -> (StatusCode, Value) {
    send(
        &app.router,
        Method::POST,
        "/bookings",
        Some(token),
        Some(json!({ "flight_id": app.flight_id, "seat_number": seat })),
    )
    .await
}

#[tokio::test]
async fn search_understands_aliases_and_dates() {
    let (app, db) = app().await;
    seed_flight(&db, "9U202", "Chișinău", "Paris", 2, 10).await;
    seed_flight(&db, "9U303", "București", "London", 1, 10).await;

    let (status, body) = send(&app.router, Method::GET, "/flights?origin=%D0%BA%D0%B8%D1%88%D0%B8%D0%BD%D0%B5%D0%B2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let numbers: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["flight_number"].as_str().unwrap())
        .collect();
    assert_eq!(numbers, vec!["9U101", "9U202"]);

    let (_, body) = send(&app.router, Method::GET, "/flights?origin=Bucuresti", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send(&app.router, Method::GET, "/flights?departure_date=2030-06-02", None, None).await;
    assert_eq!(body[0]["flight_number"], "9U202");
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send(&app.router, Method::GET, "/flights?departure_date=junk", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn unknown_flight_is_404() {
    let (app, _db) = app().await;
    let (status, body) = send(&app.router, Method::GET, "/flights/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Flight not found");
}

#[tokio::test]
async fn booking_requires_a_token() {
    let (app, _db) = app().await;
    let (status, _) = send(
        &app.router,
        Method::POST,
        "/bookings",
        None,
        Some(json!({ "flight_id": app.flight_id, "seat_number": "1A" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn booking_takes_a_seat_and_notifies() {
    let (app, _db) = app().await;

    let (status, booking) = book(&app, &app.token, "1A").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["status"], "confirmed");
    assert_eq!(booking["seat_number"], "1A");

    let uri = format!("/flights/{}", app.flight_id);
    let (_, flight) = send(&app.router, Method::GET, &uri, None, None).await;
    assert_eq!(flight["available_seats"], 1);

    let uri = format!("/flights/{}/booked-seats", app.flight_id);
    let (_, seats) = send(&app.router, Method::GET, &uri, None, None).await;
    assert_eq!(seats, json!({ "booked_seats": ["1A"] }));

    let events = app.notifier.events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        NotificationEvent::BookingConfirmed(event) => {
            assert_eq!(event.flight_number, "9U101");
            assert_eq!(event.seat_number, "1A");
            assert_eq!(event.booking_id, booking["id"].as_i64());
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn seat_conflicts_and_full_flights_are_rejected() {
    let (app, _db) = app().await;

    book(&app, &app.token, "1A").await;
    let (status, body) = book(&app, &app.other_token, "1A").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Seat already booked");

    let (status, _) = book(&app, &app.other_token, "1B").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = book(&app, &app.other_token, "2A").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "No available seats on this flight");

    let (_, flights) = send(&app.router, Method::GET, "/flights", None, None).await;
    assert!(flights.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn bookings_are_private_to_their_owner() {
    let (app, _db) = app().await;
    let (_, booking) = book(&app, &app.token, "3C").await;
    let uri = format!("/bookings/{}", booking["id"]);

    let (status, body) = send(&app.router, Method::GET, &uri, Some(&app.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["flight"]["flight_number"], "9U101");
    assert_eq!(body["seat_number"], "3C");

    let (status, body) = send(&app.router, Method::GET, &uri, Some(&app.other_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Booking not found");

    let (_, mine) = send(&app.router, Method::GET, "/bookings", Some(&app.token), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    let (_, theirs) = send(&app.router, Method::GET, "/bookings", Some(&app.other_token), None).await;
    assert!(theirs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn cancelling_releases_the_seat_once() {
    let (app, _db) = app().await;
    let (_, booking) = book(&app, &app.token, "4D").await;
    let uri = format!("/bookings/{}", booking["id"]);

    let (status, _) = send(&app.router, Method::DELETE, &uri, Some(&app.other_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app.router, Method::DELETE, &uri, Some(&app.token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app.router, Method::DELETE, &uri, Some(&app.token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Booking already cancelled");

    let flight_uri = format!("/flights/{}", app.flight_id);
    let (_, flight) = send(&app.router, Method::GET, &flight_uri, None, None).await;
    assert_eq!(flight["available_seats"], 2);

    let (status, _) = book(&app, &app.other_token, "4D").await;
    assert_eq!(status, StatusCode::CREATED);

    let events = app.notifier.events();
    assert!(matches!(events[1], NotificationEvent::BookingCancelled(_)));
}

#[tokio::test]
async fn notification_failures_do_not_fail_the_booking() {
    let (app, _db) = app_with(RecordingNotifier::failing()).await;
    let (status, _) = book(&app, &app.token, "5E").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.notifier.events().len(), 1);
}
