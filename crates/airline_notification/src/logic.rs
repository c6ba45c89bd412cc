// --- File: crates/airline_notification/src/logic.rs ---
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use airline_common::error::not_found;
use airline_common::models::{
    BaggageStatusChanged, BookingCancelled, BookingConfirmed, EmailMessage, FlightChangeType,
    FlightChanged, PaymentCompleted,
};
use airline_common::AirlineError;
use airline_db::models::User;
use airline_db::UserRepository;

use crate::mailer::{deliver, Mailer};

const SIGNATURE: &str = "Best regards,\nThe Airline team";

#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NotificationResponse {
    pub message: String,
    pub to: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BroadcastResponse {
    pub message: String,
    pub count: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct MailStatusResponse {
    pub smtp_configured: bool,
    pub smtp_host: Option<String>,
}

// --- Message composition ---

pub fn booking_confirmed_email(user: &User, event: &BookingConfirmed) -> EmailMessage {
    EmailMessage {
        to: user.email.clone(),
        subject: format!("Booking confirmation for flight {}", event.flight_number),
        body: format!(
            "Hello, {name}!\n\n\
             Your booking is confirmed.\n\n\
             Flight details:\n\
             - Flight: {flight}\n\
             - Route: {origin} → {destination}\n\
             - Departure: {departure}\n\
             - Seat: {seat}\n\n\
             Thank you for flying with us!\n\n{SIGNATURE}\n",
            name = user.first_name,
            flight = event.flight_number,
            origin = event.origin,
            destination = event.destination,
            departure = event.departure_time,
            seat = event.seat_number,
        ),
    }
}

pub fn booking_cancelled_email(user: &User, event: &BookingCancelled) -> EmailMessage {
    EmailMessage {
        to: user.email.clone(),
        subject: format!("Booking cancelled for flight {}", event.flight_number),
        body: format!(
            "Hello, {name}!\n\n\
             Your booking #{booking} has been cancelled.\n\n\
             Flight details:\n\
             - Flight: {flight}\n\
             - Route: {origin} → {destination}\n\
             - Departure: {departure}\n\n\
             If you did not request this, please contact support.\n\n{SIGNATURE}\n",
            name = user.first_name,
            booking = event.booking_id,
            flight = event.flight_number,
            origin = event.origin,
            destination = event.destination,
            departure = event.departure_time,
        ),
    }
}

pub fn payment_completed_email(user: &User, event: &PaymentCompleted) -> EmailMessage {
    let mut body = format!(
        "Hello, {name}!\n\n\
         We received your payment.\n\n\
         Payment details:\n\
         - Payment ID: {payment}\n\
         - Amount: {amount:.2} {currency}\n\
         - Method: {method}\n\
         - Booking: #{booking}\n",
        name = user.first_name,
        payment = event.payment_id,
        amount = event.amount,
        currency = event.currency,
        method = event.payment_method,
        booking = event.booking_id,
    );
    if let Some(flight) = &event.flight_number {
        body.push_str(&format!("- Flight: {}\n", flight));
    }
    if let (Some(origin), Some(destination)) = (&event.origin, &event.destination) {
        body.push_str(&format!("- Route: {} → {}\n", origin, destination));
    }
    body.push_str(&format!("\n{SIGNATURE}\n"));

    EmailMessage {
        to: user.email.clone(),
        subject: format!("Payment confirmation {}", event.payment_id),
        body,
    }
}

/// Human-readable label for a stored baggage status; unknown values pass through.
pub fn baggage_status_label(status: &str) -> &str {
    match status {
        "checked_in" => "Checked in",
        "loaded" => "Loaded on the aircraft",
        "in_transit" => "In transit",
        "unloaded" => "Unloaded",
        "delivered" => "Delivered",
        "lost" => "Lost",
        other => other,
    }
}

pub fn baggage_status_email(user: &User, event: &BaggageStatusChanged) -> EmailMessage {
    EmailMessage {
        to: user.email.clone(),
        subject: format!("Baggage status update {}", event.baggage_tag),
        body: format!(
            "Hello, {name}!\n\n\
             The status of your baggage has changed.\n\n\
             - Tag: {tag}\n\
             - Status: {status}\n\
             - Location: {location}\n\n{SIGNATURE}\n",
            name = user.first_name,
            tag = event.baggage_tag,
            status = baggage_status_label(&event.status),
            location = event.location.as_deref().unwrap_or("Not specified"),
        ),
    }
}

pub fn flight_change_email(user: &User, event: &FlightChanged) -> EmailMessage {
    let route = format!("{} → {}", event.origin, event.destination);
    let (subject, body) = match event.change_type {
        FlightChangeType::Cancelled => (
            format!("Flight {} cancelled", event.flight_number),
            format!(
                "Hello, {name}!\n\n\
                 Unfortunately flight {flight} has been cancelled.\n\n\
                 Flight details:\n\
                 - Flight: {flight}\n\
                 - Route: {route}\n\
                 - Departure: {departure}\n\n\
                 Your booking has been cancelled and any payment will be refunded \
                 within 5-7 business days.\n\n{SIGNATURE}\n",
                name = user.first_name,
                flight = event.flight_number,
                departure = event.departure_time,
            ),
        ),
        FlightChangeType::Rescheduled => {
            let mut body = format!(
                "Hello, {name}!\n\n\
                 The schedule of flight {flight} has changed.\n\n\
                 Flight details:\n\
                 - Flight: {flight}\n\
                 - Route: {route}\n",
                name = user.first_name,
                flight = event.flight_number,
            );
            if let Some(departure) = &event.new_departure_time {
                body.push_str(&format!("- New departure: {}\n", departure));
            }
            if let Some(arrival) = &event.new_arrival_time {
                body.push_str(&format!("- New arrival: {}\n", arrival));
            }
            body.push_str(&format!(
                "\nPlease check the new schedule and contact support if it no longer suits you.\n\n{SIGNATURE}\n"
            ));
            (format!("Flight {} rescheduled", event.flight_number), body)
        }
    };
    EmailMessage {
        to: user.email.clone(),
        subject,
        body,
    }
}

// --- Delivery ---

pub async fn find_recipient<U: UserRepository>(users: &U, user_id: i64) -> Result<User, AirlineError> {
    users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| not_found("User not found"))
}

/// Resolves one recipient, composes the mail and sends it.
pub async fn notify_user<U, F>(
    users: &U,
    mailer: &Arc<dyn Mailer>,
    user_id: i64,
    success_message: &str,
    compose: F,
) -> Result<NotificationResponse, AirlineError>
where
    U: UserRepository,
    F: FnOnce(&User) -> EmailMessage,
{
    let user = find_recipient(users, user_id).await?;
    let message = compose(&user);
    deliver(mailer.clone(), message).await?;
    Ok(NotificationResponse {
        message: success_message.to_string(),
        to: user.email,
    })
}

/// Mails every affected passenger; missing users and failed sends are skipped.
pub async fn broadcast_flight_change<U: UserRepository>(
    users: &U,
    mailer: &Arc<dyn Mailer>,
    event: &FlightChanged,
) -> Result<BroadcastResponse, AirlineError> {
    if event.user_ids.is_empty() {
        return Ok(BroadcastResponse {
            message: "No users to notify".to_string(),
            count: 0,
        });
    }

    let mut sent = 0;
    for user_id in &event.user_ids {
        let Some(user) = users.find_by_id(*user_id).await? else {
            warn!("Flight {}: user {} no longer exists", event.flight_number, user_id);
            continue;
        };
        match deliver(mailer.clone(), flight_change_email(&user, event)).await {
            Ok(()) => sent += 1,
            Err(e) => warn!("Flight {}: mail to {} failed: {}", event.flight_number, user.email, e),
        }
    }
    info!(
        "Flight {} change notified to {}/{} passengers",
        event.flight_number,
        sent,
        event.user_ids.len()
    );

    Ok(BroadcastResponse {
        message: "Flight change notifications sent".to_string(),
        count: sent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> User {
        User {
            id: 7,
            email: "ana@example.com".to_string(),
            password_hash: String::new(),
            first_name: "Ana".to_string(),
            last_name: "Popescu".to_string(),
            phone: None,
            is_admin: false,
            created_at: Utc::now(),
        }
    }

    fn flight_change(change_type: FlightChangeType) -> FlightChanged {
        FlightChanged {
            flight_id: 3,
            flight_number: "9U101".to_string(),
            origin: "Chișinău".to_string(),
            destination: "Paris".to_string(),
            departure_time: "2030-05-01T09:30:00Z".to_string(),
            change_type,
            new_departure_time: Some("2030-05-01T12:00:00Z".to_string()),
            new_arrival_time: None,
            user_ids: vec![7],
        }
    }

    #[test]
    fn booking_confirmation_lists_the_seat() {
        let mail = booking_confirmed_email(
            &user(),
            &BookingConfirmed {
                user_id: 7,
                booking_id: Some(1),
                flight_number: "9U101".to_string(),
                origin: "Chișinău".to_string(),
                destination: "Paris".to_string(),
                departure_time: "2030-05-01T09:30:00Z".to_string(),
                seat_number: "12C".to_string(),
            },
        );
        assert_eq!(mail.to, "ana@example.com");
        assert_eq!(mail.subject, "Booking confirmation for flight 9U101");
        assert!(mail.body.starts_with("Hello, Ana!"));
        assert!(mail.body.contains("- Seat: 12C"));
        assert!(mail.body.contains("Chișinău → Paris"));
    }

    #[test]
    fn payment_mail_omits_unknown_flight() {
        let mail = payment_completed_email(
            &user(),
            &PaymentCompleted {
                user_id: 7,
                payment_id: "PAY-ABC".to_string(),
                amount: 150.0,
                currency: "USD".to_string(),
                payment_method: "card".to_string(),
                booking_id: 4,
                flight_number: None,
                origin: None,
                destination: None,
            },
        );
        assert!(mail.body.contains("- Amount: 150.00 USD"));
        assert!(!mail.body.contains("Flight:"));
    }

    #[test]
    fn baggage_labels_fall_back_to_raw_status() {
        assert_eq!(baggage_status_label("in_transit"), "In transit");
        assert_eq!(baggage_status_label("teleported"), "teleported");
    }

    #[test]
    fn flight_change_wording_depends_on_type() {
        let cancelled = flight_change_email(&user(), &flight_change(FlightChangeType::Cancelled));
        assert_eq!(cancelled.subject, "Flight 9U101 cancelled");
        assert!(cancelled.body.contains("refunded"));

        let moved = flight_change_email(&user(), &flight_change(FlightChangeType::Rescheduled));
        assert_eq!(moved.subject, "Flight 9U101 rescheduled");
        assert!(moved.body.contains("- New departure: 2030-05-01T12:00:00Z"));
        assert!(!moved.body.contains("New arrival"));
    }
}
