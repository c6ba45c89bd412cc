use airline_db::models::{
    BookingStatus, NewAirline, NewFlight, NewPayment, NewUser, PaymentStatus,
};
use airline_db::{
    init_schema, AirlineRepository, BookingRepository, CancelOutcome, DbClient, FlightRepository,
    PaymentRepository, ReserveOutcome, SqlAirlineRepository, SqlBookingRepository,
    SqlFlightRepository, SqlPaymentRepository, SqlStatisticsRepository, SqlUserRepository,
    StatisticsRepository, StatusChange, UserRepository,
};
use chrono::{Duration, TimeZone, Utc};

struct Fixture {
    db: DbClient,
    user_id: i64,
    other_user_id: i64,
    flight_id: i64,
}

async fn setup(total_seats: i64) -> Fixture {
    let db = DbClient::from_url("sqlite::memory:").await.unwrap();
    seed(db, total_seats).await
}

async fn seed(db: DbClient, total_seats: i64) -> Fixture {
    init_schema(&db).await.unwrap();

    let users = SqlUserRepository::new(db.clone());
    let mut ids = Vec::new();
    for email in ["ana@example.com", "ion@example.com"] {
        let user = users
            .create(NewUser {
                email: email.to_string(),
                password_hash: "x".to_string(),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
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
            country: Some("Moldova".to_string()),
        })
        .await
        .unwrap();

    let departure = Utc.with_ymd_and_hms(2030, 5, 1, 9, 30, 0).unwrap();
    let flight = SqlFlightRepository::new(db.clone())
        .create(NewFlight {
            airline_id: airline.id,
            flight_number: "9U101".to_string(),
            origin: "Chișinău".to_string(),
            destination: "Moscova".to_string(),
            departure_time: departure,
            arrival_time: departure + Duration::hours(2),
            total_seats,
            price: 150.0,
        })
        .await
        .unwrap();

    Fixture {
        db,
        user_id: ids[0],
        other_user_id: ids[1],
        flight_id: flight.id,
    }
}

async fn available(fx: &Fixture) -> i64 {
    SqlFlightRepository::new(fx.db.clone())
        .find_by_id(fx.flight_id)
        .await
        .unwrap()
        .unwrap()
        .available_seats
}

#[tokio::test]
async fn reserve_takes_exactly_one_seat() {
    let fx = setup(3).await;
    let bookings = SqlBookingRepository::new(fx.db.clone());

    let outcome = bookings.reserve(fx.user_id, fx.flight_id, "1A").await.unwrap();
    let ReserveOutcome::Reserved { booking, flight } = outcome else {
        panic!("expected a reservation, got {:?}", outcome);
    };
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(flight.available_seats, 2);
    assert_eq!(available(&fx).await, 2);
}

#[tokio::test]
async fn held_seat_is_refused_without_touching_the_count() {
    let fx = setup(3).await;
    let bookings = SqlBookingRepository::new(fx.db.clone());

    bookings.reserve(fx.user_id, fx.flight_id, "1A").await.unwrap();
    let outcome = bookings
        .reserve(fx.other_user_id, fx.flight_id, "1A")
        .await
        .unwrap();
    assert_eq!(outcome, ReserveOutcome::SeatTaken);
    assert_eq!(available(&fx).await, 2);
}

#[tokio::test]
async fn racing_reservations_for_one_seat_book_it_once() {
    // A file database, so each reservation runs on its own pooled connection.
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("seats.db").display());
    let fx = seed(DbClient::from_url(&url).await.unwrap(), 5).await;
    let first = SqlBookingRepository::new(fx.db.clone());
    let second = SqlBookingRepository::new(fx.db.clone());

    let (a, b) = tokio::join!(
        first.reserve(fx.user_id, fx.flight_id, "4D"),
        second.reserve(fx.other_user_id, fx.flight_id, "4D"),
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let reserved = outcomes
        .iter()
        .filter(|o| matches!(o, ReserveOutcome::Reserved { .. }))
        .count();
    assert_eq!(reserved, 1);
    assert!(outcomes.contains(&ReserveOutcome::SeatTaken));
    assert_eq!(available(&fx).await, 4);
}

#[tokio::test]
async fn nullable_columns_read_back_as_none() {
    let fx = setup(2).await;
    let user = SqlUserRepository::new(fx.db.clone())
        .find_by_id(fx.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.phone, None);

    let found = SqlUserRepository::new(fx.db.clone())
        .find_by_email("ion@example.com")
        .await
        .unwrap();
    assert_eq!(found.map(|u| u.id), Some(fx.other_user_id));

    let ReserveOutcome::Reserved { booking, .. } =
        SqlBookingRepository::new(fx.db.clone())
            .reserve(fx.user_id, fx.flight_id, "5A")
            .await
            .unwrap()
    else {
        panic!("reservation failed");
    };
    let payment = SqlPaymentRepository::new(fx.db.clone())
        .create_pending(NewPayment {
            booking_id: booking.id,
            user_id: fx.user_id,
            payment_id: "PAY-0123456789AB".to_string(),
            amount: 150.0,
            currency: "USD".to_string(),
            payment_method: "card".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.completed_at, None);
    assert_eq!(payment.refund_id, None);
}

#[tokio::test]
async fn second_completed_payment_for_a_booking_is_refused() {
    let fx = setup(2).await;
    let ReserveOutcome::Reserved { booking, .. } =
        SqlBookingRepository::new(fx.db.clone())
            .reserve(fx.user_id, fx.flight_id, "6B")
            .await
            .unwrap()
    else {
        panic!("reservation failed");
    };
    let payments = SqlPaymentRepository::new(fx.db.clone());
    let mut pending = Vec::new();
    for payment_id in ["PAY-AAAAAAAAAAAA", "PAY-BBBBBBBBBBBB"] {
        let payment = payments
            .create_pending(NewPayment {
                booking_id: booking.id,
                user_id: fx.user_id,
                payment_id: payment_id.to_string(),
                amount: 150.0,
                currency: "USD".to_string(),
                payment_method: "card".to_string(),
            })
            .await
            .unwrap();
        pending.push(payment.id);
    }

    let completed = payments.mark_completed(pending[0], Utc::now()).await.unwrap();
    assert!(completed.completed_at.is_some());
    let err = payments.mark_completed(pending[1], Utc::now()).await.unwrap_err();
    assert!(err.is_unique_violation());
    assert!(payments.has_completed(booking.id).await.unwrap());
}

#[tokio::test]
async fn full_flight_and_missing_flight_are_reported() {
    let fx = setup(1).await;
    let bookings = SqlBookingRepository::new(fx.db.clone());

    bookings.reserve(fx.user_id, fx.flight_id, "1A").await.unwrap();
    assert_eq!(
        bookings.reserve(fx.other_user_id, fx.flight_id, "1B").await.unwrap(),
        ReserveOutcome::NoSeatsLeft
    );
    assert_eq!(
        bookings.reserve(fx.user_id, 9999, "1A").await.unwrap(),
        ReserveOutcome::FlightNotFound
    );
    assert_eq!(available(&fx).await, 0);
}

#[tokio::test]
async fn cancel_releases_the_seat_for_rebooking() {
    let fx = setup(2).await;
    let bookings = SqlBookingRepository::new(fx.db.clone());

    let ReserveOutcome::Reserved { booking, .. } =
        bookings.reserve(fx.user_id, fx.flight_id, "2C").await.unwrap()
    else {
        panic!("reservation failed");
    };

    // Someone else's booking looks absent.
    assert_eq!(
        bookings.cancel(booking.id, fx.other_user_id).await.unwrap(),
        CancelOutcome::NotFound
    );

    let outcome = bookings.cancel(booking.id, fx.user_id).await.unwrap();
    assert!(matches!(outcome, CancelOutcome::Cancelled { ref booking, .. } if booking.status == BookingStatus::Cancelled));
    assert_eq!(available(&fx).await, 2);

    assert_eq!(
        bookings.cancel(booking.id, fx.user_id).await.unwrap(),
        CancelOutcome::AlreadyCancelled
    );
    assert_eq!(available(&fx).await, 2);

    let rebooked = bookings
        .reserve(fx.other_user_id, fx.flight_id, "2C")
        .await
        .unwrap();
    assert!(matches!(rebooked, ReserveOutcome::Reserved { .. }));
}

#[tokio::test]
async fn deleting_a_flight_cancels_bookings_and_reports_passengers() {
    let fx = setup(5).await;
    let bookings = SqlBookingRepository::new(fx.db.clone());
    let flights = SqlFlightRepository::new(fx.db.clone());

    bookings.reserve(fx.user_id, fx.flight_id, "1A").await.unwrap();
    bookings.reserve(fx.user_id, fx.flight_id, "1B").await.unwrap();
    bookings.reserve(fx.other_user_id, fx.flight_id, "1C").await.unwrap();

    let removed = flights
        .delete_with_bookings(fx.flight_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(removed.flight.flight_number, "9U101");
    assert_eq!(removed.affected_user_ids, vec![fx.user_id, fx.other_user_id]);
    assert!(flights.find_by_id(fx.flight_id).await.unwrap().is_none());

    let mine = bookings.list_for_user(fx.user_id).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine
        .iter()
        .all(|b| b.flight.is_none() && b.booking.status == BookingStatus::Cancelled));

    assert!(flights.delete_with_bookings(fx.flight_id).await.unwrap().is_none());
}

#[tokio::test]
async fn admin_status_change_adjusts_seats() {
    let fx = setup(2).await;
    let bookings = SqlBookingRepository::new(fx.db.clone());

    let ReserveOutcome::Reserved { booking, .. } =
        bookings.reserve(fx.user_id, fx.flight_id, "3F").await.unwrap()
    else {
        panic!("reservation failed");
    };

    let change = bookings
        .set_status(booking.id, BookingStatus::Cancelled)
        .await
        .unwrap();
    assert!(matches!(change, StatusChange::Updated(ref b) if b.status == BookingStatus::Cancelled));
    assert_eq!(available(&fx).await, 2);

    // Seat was resold in the meantime.
    bookings
        .reserve(fx.other_user_id, fx.flight_id, "3F")
        .await
        .unwrap();
    assert_eq!(
        bookings
            .set_status(booking.id, BookingStatus::Confirmed)
            .await
            .unwrap(),
        StatusChange::SeatTaken
    );
    assert_eq!(available(&fx).await, 1);

    assert_eq!(
        bookings.set_status(4242, BookingStatus::Cancelled).await.unwrap(),
        StatusChange::NotFound
    );
}

#[tokio::test]
async fn statistics_count_confirmed_bookings_only() {
    let fx = setup(4).await;
    let bookings = SqlBookingRepository::new(fx.db.clone());

    bookings.reserve(fx.user_id, fx.flight_id, "1A").await.unwrap();
    let ReserveOutcome::Reserved { booking, .. } =
        bookings.reserve(fx.user_id, fx.flight_id, "1B").await.unwrap()
    else {
        panic!("reservation failed");
    };
    bookings.cancel(booking.id, fx.user_id).await.unwrap();

    let stats = SqlStatisticsRepository::new(fx.db.clone()).totals().await.unwrap();
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.total_flights, 1);
    assert_eq!(stats.total_bookings, 1);
    assert_eq!(stats.total_baggage, 0);
}
