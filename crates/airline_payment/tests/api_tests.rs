use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use airline_common::testing::RecordingNotifier;
use airline_common::{BoxFuture, JwtKeys, NotificationEvent};
use airline_config::{AppConfig, DatabaseConfig, JwtConfig};
use airline_db::models::{NewAirline, NewFlight, NewUser};
use airline_db::{
    init_schema, AirlineRepository, BookingRepository, DbClient, FlightRepository,
    ReserveOutcome, SqlAirlineRepository, SqlBookingRepository, SqlFlightRepository,
    SqlUserRepository, UserRepository,
};
use airline_payment::service::{ChargeOutcome, ChargeRequest, RefundReceipt};
use airline_payment::{routes, PaymentError, PaymentGateway, PaymentState, SimulatedGateway};
use axum::{body::Body, Router};
use chrono::{Duration, TimeZone, Utc};
use http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tokio::sync::Barrier;
use tower::ServiceExt;

const SECRET: &str = "payment-test-secret";

struct DecliningGateway;

impl PaymentGateway for DecliningGateway {
    fn charge(&self, _request: ChargeRequest) -> BoxFuture<'_, ChargeOutcome, PaymentError> {
        Box::pin(async { Ok(ChargeOutcome::Declined("insufficient funds".to_string())) })
    }

    fn refund(&self, _payment_id: &str, _amount: f64) -> BoxFuture<'_, RefundReceipt, PaymentError> {
        Box::pin(async { Err(PaymentError::Gateway("refunds disabled".to_string())) })
    }
}

/// Holds every charge until `parties` of them are in flight.
struct LockstepGateway {
    barrier: Barrier,
    refunds: AtomicUsize,
}

impl LockstepGateway {
    fn new(parties: usize) -> Self {
        Self {
            barrier: Barrier::new(parties),
            refunds: AtomicUsize::new(0),
        }
    }
}

impl PaymentGateway for LockstepGateway {
    fn charge(&self, _request: ChargeRequest) -> BoxFuture<'_, ChargeOutcome, PaymentError> {
        Box::pin(async move {
            self.barrier.wait().await;
            Ok(ChargeOutcome::Approved)
        })
    }

    fn refund(&self, _payment_id: &str, _amount: f64) -> BoxFuture<'_, RefundReceipt, PaymentError> {
        Box::pin(async move {
            self.refunds.fetch_add(1, Ordering::SeqCst);
            Ok(RefundReceipt {
                refund_id: "REF-000000000000".to_string(),
            })
        })
    }
}

struct TestApp {
    router: Router,
    notifier: Arc<RecordingNotifier>,
    token: String,
    other_token: String,
    booking_id: i64,
}

async fn app_with(gateway: Arc<dyn PaymentGateway>) -> TestApp {
    let config = Arc::new(AppConfig {
        use_payment: true,
        database: Some(DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }),
        jwt: JwtConfig {
            secret: SECRET.to_string(),
            expiration_hours: 24,
        },
        ..AppConfig::default()
    });
    let db = DbClient::new(&config).await.unwrap();
    init_schema(&db).await.unwrap();

    let users = SqlUserRepository::new(db.clone());
    let mut ids = Vec::new();
    for email in ["ana@example.com", "ion@example.com"] {
        let user = users
            .create(NewUser {
                email: email.to_string(),
                password_hash: "unused".to_string(),
                first_name: "Test".to_string(),
                last_name: "Payer".to_string(),
                phone: None,
            })
            .await
            .unwrap();
        ids.push(user.id);
    }

    let airline = SqlAirlineRepository::new(db.clone())
        .create(NewAirline {
            name: "Air Moldova".to_string(),
            code: "9U".to_string(),
            country: None,
        })
        .await
        .unwrap();
    let departure = Utc.with_ymd_and_hms(2030, 7, 1, 10, 0, 0).unwrap();
    let flight = SqlFlightRepository::new(db.clone())
        .create(NewFlight {
            airline_id: airline.id,
            flight_number: "9U404".to_string(),
            origin: "Chișinău".to_string(),
            destination: "Praga".to_string(),
            departure_time: departure,
            arrival_time: departure + Duration::hours(2),
            total_seats: 5,
            price: 150.0,
        })
        .await
        .unwrap();

    let booking_id = match SqlBookingRepository::new(db.clone())
        .reserve(ids[0], flight.id, "7A")
        .await
        .unwrap()
    {
        ReserveOutcome::Reserved { booking, .. } => booking.id,
        other => panic!("seed booking failed: {:?}", other),
    };

    let keys = JwtKeys::new(SECRET, 24);
    let notifier = Arc::new(RecordingNotifier::new());
    let state = PaymentState::new(config, db, gateway, notifier.clone());
    TestApp {
        router: routes(Arc::new(state)),
        notifier,
        token: keys.issue(ids[0]).unwrap(),
        other_token: keys.issue(ids[1]).unwrap(),
        booking_id,
    }
}

async fn app() -> TestApp {
    app_with(Arc::new(SimulatedGateway)).await
}

async fn send(app: &Router, method: Method, uri: &str, token: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
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

async fn pay(app: &TestApp, token: &str, amount: f64) -> (StatusCode, Value) {
    send(
        &app.router,
        Method::POST,
        "/payments",
        token,
        Some(json!({ "booking_id": app.booking_id, "payment_method": "card", "amount": amount })),
    )
    .await
}

#[tokio::test]
async fn paying_completes_and_notifies() {
    let app = app().await;

    let (status, payment) = pay(&app, &app.token, 150.004).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["status"], "completed");
    assert_eq!(payment["currency"], "USD");
    assert!(payment["completed_at"].is_string());
    let payment_id = payment["payment_id"].as_str().unwrap();
    assert!(payment_id.starts_with("PAY-"));
    assert_eq!(payment_id.len(), 16);

    let events = app.notifier.events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        NotificationEvent::PaymentCompleted(event) => {
            assert_eq!(event.payment_id, payment_id);
            assert_eq!(event.flight_number.as_deref(), Some("9U404"));
        }
        other => panic!("unexpected event: {:?}", other),
    }

    let (status, body) = pay(&app, &app.token, 150.0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Payment already completed for this booking");
}

#[tokio::test]
async fn wrong_amount_and_foreign_booking_are_rejected() {
    let app = app().await;

    let (status, body) = pay(&app, &app.token, 149.5).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Amount mismatch. Expected: 150.0, Got: 149.5");

    let (status, body) = pay(&app, &app.other_token, 150.0).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Booking not found or does not belong to you");

    assert!(app.notifier.events().is_empty());
}

#[tokio::test]
async fn payments_are_listed_and_looked_up_per_owner() {
    let app = app().await;
    let (_, payment) = pay(&app, &app.token, 150.0).await;
    let payment_id = payment["payment_id"].as_str().unwrap();

    let (status, list) = send(&app.router, Method::GET, "/payments", &app.token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let uri = format!("/payments/{}", payment_id);
    let (status, _) = send(&app.router, Method::GET, &uri, &app.token, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app.router, Method::GET, &uri, &app.other_token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Payment not found");

    let uri = format!("/payments/booking/{}", app.booking_id);
    let (status, latest) = send(&app.router, Method::GET, &uri, &app.token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["payment_id"], payment_id);
    let (status, _) = send(&app.router, Method::GET, &uri, &app.other_token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unpaid_booking_has_null_payment() {
    let app = app().await;
    let uri = format!("/payments/booking/{}", app.booking_id);
    let (status, body) = send(&app.router, Method::GET, &uri, &app.token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn refund_happens_once() {
    let app = app().await;
    let (_, payment) = pay(&app, &app.token, 150.0).await;
    let uri = format!("/payments/{}/refund", payment["payment_id"].as_str().unwrap());

    let (status, body) = send(&app.router, Method::POST, &uri, &app.token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "refunded");
    assert_eq!(body["amount"], 150.0);
    assert_eq!(body["message"], "Refund processed successfully");
    assert!(body["refund_id"].as_str().unwrap().starts_with("REF-"));

    let (status, body) = send(&app.router, Method::POST, &uri, &app.token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Payment already refunded");
}

#[tokio::test]
async fn declined_charges_are_stored_as_failed() {
    let app = app_with(Arc::new(DecliningGateway)).await;

    let (status, payment) = pay(&app, &app.token, 150.0).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["status"], "failed");
    assert!(app.notifier.events().is_empty());

    let uri = format!("/payments/{}/refund", payment["payment_id"].as_str().unwrap());
    let (status, body) = send(&app.router, Method::POST, &uri, &app.token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Only completed payments can be refunded");

    let (status, retry) = pay(&app, &app.token, 150.0).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(retry["status"], "failed");
}

#[tokio::test]
async fn concurrent_payments_complete_only_once() {
    let gateway = Arc::new(LockstepGateway::new(2));
    let app = app_with(gateway.clone()).await;

    let (first, second) = tokio::join!(pay(&app, &app.token, 150.0), pay(&app, &app.token, 150.0));
    let mut statuses = vec![first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::BAD_REQUEST]);
    let rejected = if first.0 == StatusCode::BAD_REQUEST { &first.1 } else { &second.1 };
    assert_eq!(rejected["detail"], "Payment already completed for this booking");
    assert_eq!(gateway.refunds.load(Ordering::SeqCst), 1);

    let (_, list) = send(&app.router, Method::GET, "/payments", &app.token, None).await;
    let mut stored: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["status"].as_str().unwrap())
        .collect();
    stored.sort();
    assert_eq!(stored, vec!["completed", "failed"]);
    assert_eq!(app.notifier.events().len(), 1);
}
