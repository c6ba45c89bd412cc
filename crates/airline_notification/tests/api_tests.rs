use std::sync::Arc;

use airline_common::models::EmailMessage;
use airline_config::{AppConfig, DatabaseConfig, NotificationConfig, SmtpConfig};
use airline_db::models::NewUser;
use airline_db::{init_schema, DbClient, SqlUserRepository, UserRepository};
use airline_notification::{routes, MailError, Mailer, NotificationState};
use axum::{body::Body, Router};
use http::{header, Method, Request, StatusCode};
use mockall::mock;
use serde_json::{json, Value};
use tower::ServiceExt;

const INTERNAL_SECRET: &str = "internal-test-secret";

mock! {
    pub TestMailer {}

    impl Mailer for TestMailer {
        fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
        fn name(&self) -> &'static str;
    }
}

struct TestApp {
    router: Router,
    ana: i64,
    ion: i64,
}

async fn app_with(mailer: MockTestMailer, internal_secret: Option<&str>) -> TestApp {
    let config = Arc::new(AppConfig {
        use_notification: true,
        database: Some(DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }),
        notification: NotificationConfig {
            internal_secret: internal_secret.map(str::to_string),
            ..NotificationConfig::default()
        },
        ..AppConfig::default()
    });
    let db = DbClient::new(&config).await.unwrap();
    init_schema(&db).await.unwrap();

    let users = SqlUserRepository::new(db.clone());
    let mut ids = Vec::new();
    for (email, first_name) in [("ana@example.com", "Ana"), ("ion@example.com", "Ion")] {
        let user = users
            .create(NewUser {
                email: email.to_string(),
                password_hash: "unused".to_string(),
                first_name: first_name.to_string(),
                last_name: "Traveller".to_string(),
                phone: None,
            })
            .await
            .unwrap();
        ids.push(user.id);
    }

    let state = NotificationState::with_mailer(config, db, Arc::new(mailer));
    TestApp {
        router: routes(Arc::new(state)),
        ana: ids[0],
        ion: ids[1],
    }
}

async fn send(app: &Router, method: Method, uri: &str, secret: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(secret) = secret {
        builder = builder.header("X-Internal-Auth-Secret", secret);
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

fn booking_confirmed(user_id: i64) -> Value {
    json!({
        "user_id": user_id,
        "booking_id": 1,
        "flight_number": "9U101",
        "origin": "Chișinău",
        "destination": "Paris",
        "departure_time": "2030-05-01T09:30:00Z",
        "seat_number": "12C"
    })
}

fn flight_change(user_ids: Vec<i64>) -> Value {
    json!({
        "flight_id": 3,
        "flight_number": "9U101",
        "origin": "Chișinău",
        "destination": "Paris",
        "departure_time": "2030-05-01T09:30:00Z",
        "change_type": "cancelled",
        "user_ids": user_ids
    })
}

#[tokio::test]
async fn internal_endpoints_require_the_shared_secret() {
    let mut mailer = MockTestMailer::new();
    mailer
        .expect_send()
        .withf(|m| m.to == "ana@example.com" && m.body.contains("- Seat: 12C"))
        .times(1)
        .returning(|_| Ok(()));
    let app = app_with(mailer, Some(INTERNAL_SECRET)).await;
    let uri = "/notifications/booking-confirmed";

    let (status, _) = send(&app.router, Method::POST, uri, None, Some(booking_confirmed(app.ana))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app.router, Method::POST, uri, Some("guess"), Some(booking_confirmed(app.ana))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app.router,
        Method::POST,
        uri,
        Some(INTERNAL_SECRET),
        Some(booking_confirmed(app.ana)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Booking notification sent", "to": "ana@example.com" }));
}

#[tokio::test]
async fn status_probe_stays_open_and_reports_log_mode() {
    let app = app_with(MockTestMailer::new(), Some(INTERNAL_SECRET)).await;
    let (status, body) = send(&app.router, Method::GET, "/notifications/status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "smtp_configured": false, "smtp_host": null }));
}

#[tokio::test]
async fn status_probe_reports_the_configured_relay() {
    let config = AppConfig {
        smtp: Some(SmtpConfig {
            host: "smtp.example.com".to_string(),
            user: "mailer".to_string(),
            password: "hunter2".to_string(),
            ..SmtpConfig::default()
        }),
        database: Some(DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }),
        ..AppConfig::default()
    };
    let db = DbClient::new(&config).await.unwrap();
    let state = NotificationState::with_mailer(Arc::new(config), db, Arc::new(MockTestMailer::new()));
    let router = routes(Arc::new(state));

    let (status, body) = send(&router, Method::GET, "/notifications/status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "smtp_configured": true, "smtp_host": "smtp.example.com" }));
}

#[tokio::test]
async fn unknown_recipient_is_not_found() {
    let mut mailer = MockTestMailer::new();
    mailer.expect_send().times(0);
    let app = app_with(mailer, None).await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/notifications/booking-confirmed",
        None,
        Some(booking_confirmed(9999)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "User not found");
}

#[tokio::test]
async fn mail_failures_surface_as_server_errors() {
    let mut mailer = MockTestMailer::new();
    mailer
        .expect_send()
        .returning(|_| Err(MailError::Transport("connection refused".to_string())));
    let app = app_with(mailer, None).await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/notifications/baggage-status",
        None,
        Some(json!({
            "user_id": app.ana,
            "baggage_tag": "KXQ042917",
            "status": "in_transit"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "Failed to send email");
}

#[tokio::test]
async fn flight_change_counts_delivered_mails() {
    let mut mailer = MockTestMailer::new();
    mailer
        .expect_send()
        .times(2)
        .returning(|m| {
            if m.to == "ion@example.com" {
                Err(MailError::Transport("mailbox full".to_string()))
            } else {
                Ok(())
            }
        });
    let app = app_with(mailer, None).await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/notifications/flight-change",
        None,
        Some(flight_change(vec![app.ana, 9999, app.ion])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Flight change notifications sent", "count": 1 }));

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/notifications/flight-change",
        None,
        Some(flight_change(Vec::new())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "No users to notify", "count": 0 }));
}

#[tokio::test]
async fn raw_email_is_passed_to_the_mailer() {
    let mut mailer = MockTestMailer::new();
    mailer
        .expect_send()
        .withf(|m| m.to == "ops@example.com" && m.subject == "Ping" && m.body == "pong")
        .times(1)
        .returning(|_| Ok(()));
    let app = app_with(mailer, None).await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/notifications/email",
        None,
        Some(json!({ "to": "ops@example.com", "subject": "Ping", "body": "pong" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["to"], "ops@example.com");
}
