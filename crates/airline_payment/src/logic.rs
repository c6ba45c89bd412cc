// --- File: crates/airline_payment/src/logic.rs ---
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use airline_common::models::PaymentCompleted;
use airline_common::{notify_quietly, NotificationEvent, Notifier};
use airline_db::models::{NewPayment, Payment, PaymentStatus};
use airline_db::{BookingRepository, FlightRepository, PaymentRepository};

use crate::error::PaymentError;
use crate::service::{generate_reference, ChargeOutcome, ChargeRequest, PaymentGateway};

/// Largest accepted difference between the submitted amount and the flight price.
pub const AMOUNT_TOLERANCE: f64 = 0.01;

// --- Data Structures ---

#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreatePaymentRequest {
    pub booking_id: i64,
    #[cfg_attr(feature = "openapi", schema(example = "card"))]
    pub payment_method: String,
    #[cfg_attr(feature = "openapi", schema(example = 150.0))]
    pub amount: f64,
    #[serde(default = "default_currency")]
    #[cfg_attr(feature = "openapi", schema(example = "USD"))]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RefundResponse {
    pub payment_id: String,
    pub refund_id: String,
    pub amount: f64,
    pub status: PaymentStatus,
    pub message: String,
}

/// Repositories and collaborators a payment operation needs.
pub struct PaymentDeps<'a, P, B, F> {
    pub payments: &'a P,
    pub bookings: &'a B,
    pub flights: &'a F,
    pub gateway: &'a dyn PaymentGateway,
    pub notifier: &'a dyn Notifier,
}

// --- Core Logic Functions ---

pub async fn create_payment<P, B, F>(
    deps: PaymentDeps<'_, P, B, F>,
    user_id: i64,
    request: CreatePaymentRequest,
) -> Result<Payment, PaymentError>
where
    P: PaymentRepository,
    B: BookingRepository,
    F: FlightRepository,
{
    let booking = deps
        .bookings
        .find_owned(request.booking_id, user_id)
        .await?
        .ok_or(PaymentError::BookingNotOwned)?;

    if deps.payments.has_completed(booking.id).await? {
        return Err(PaymentError::AlreadyCompleted);
    }

    let flight = deps
        .flights
        .find_by_id(booking.flight_id)
        .await?
        .ok_or(PaymentError::PriceNotFound)?;

    if (request.amount - flight.price).abs() > AMOUNT_TOLERANCE {
        return Err(PaymentError::AmountMismatch {
            expected: flight.price,
            got: request.amount,
        });
    }

    let pending = deps
        .payments
        .create_pending(NewPayment {
            booking_id: booking.id,
            user_id,
            payment_id: generate_reference("PAY"),
            amount: request.amount,
            currency: request.currency.clone(),
            payment_method: request.payment_method.clone(),
        })
        .await?;

    let outcome = deps
        .gateway
        .charge(ChargeRequest {
            payment_id: pending.payment_id.clone(),
            amount: pending.amount,
            currency: pending.currency.clone(),
            payment_method: pending.payment_method.clone(),
        })
        .await;

    let payment = match outcome {
        Ok(ChargeOutcome::Approved) => {
            match deps.payments.mark_completed(pending.id, Utc::now()).await {
                Ok(payment) => payment,
                // A concurrent request completed a payment for this booking first.
                Err(e) if e.is_unique_violation() => {
                    warn!(
                        "Payment {} lost the race for booking {}, reversing the charge",
                        pending.payment_id, booking.id
                    );
                    if let Err(refund_err) =
                        deps.gateway.refund(&pending.payment_id, pending.amount).await
                    {
                        warn!(
                            "Reversing charge {} failed: {}",
                            pending.payment_id, refund_err
                        );
                    }
                    deps.payments.mark_failed(pending.id).await?;
                    return Err(PaymentError::AlreadyCompleted);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(ChargeOutcome::Declined(reason)) => {
            warn!("Payment {} declined: {}", pending.payment_id, reason);
            return Ok(deps.payments.mark_failed(pending.id).await?);
        }
        Err(e) => {
            deps.payments.mark_failed(pending.id).await?;
            return Err(e);
        }
    };

    notify_quietly(
        deps.notifier,
        NotificationEvent::PaymentCompleted(PaymentCompleted {
            user_id,
            payment_id: payment.payment_id.clone(),
            amount: payment.amount,
            currency: payment.currency.clone(),
            payment_method: payment.payment_method.clone(),
            booking_id: booking.id,
            flight_number: Some(flight.flight_number),
            origin: Some(flight.origin),
            destination: Some(flight.destination),
        }),
    )
    .await;

    Ok(payment)
}

pub async fn refund_payment<P: PaymentRepository>(
    payments: &P,
    gateway: &dyn PaymentGateway,
    user_id: i64,
    payment_id: &str,
) -> Result<RefundResponse, PaymentError> {
    let payment = payments
        .find_owned(payment_id, user_id)
        .await?
        .ok_or(PaymentError::NotFound)?;

    match payment.status {
        PaymentStatus::Refunded => return Err(PaymentError::AlreadyRefunded),
        PaymentStatus::Completed => {}
        PaymentStatus::Pending | PaymentStatus::Failed => return Err(PaymentError::NotRefundable),
    }

    let receipt = gateway.refund(&payment.payment_id, payment.amount).await?;
    let refunded = payments
        .mark_refunded(payment.id, &receipt.refund_id)
        .await?;
    info!("User {} refunded {}", user_id, refunded.payment_id);

    Ok(RefundResponse {
        payment_id: refunded.payment_id,
        refund_id: receipt.refund_id,
        amount: refunded.amount,
        status: refunded.status,
        message: "Refund processed successfully".to_string(),
    })
}

/// Latest payment of one of the caller's bookings, `None` if it was never paid.
pub async fn payment_for_booking<P, B>(
    payments: &P,
    bookings: &B,
    user_id: i64,
    booking_id: i64,
) -> Result<Option<Payment>, PaymentError>
where
    P: PaymentRepository,
    B: BookingRepository,
{
    bookings
        .find_owned(booking_id, user_id)
        .await?
        .ok_or(PaymentError::BookingNotOwned)?;
    Ok(payments.latest_for_booking(booking_id).await?)
}
