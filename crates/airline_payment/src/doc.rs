// --- File: crates/airline_payment/src/doc.rs ---
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{CreatePaymentRequest, RefundResponse};
use airline_db::models::{Payment, PaymentStatus};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::create_payment_handler,
        crate::handlers::list_payments_handler,
        crate::handlers::get_payment_handler,
        crate::handlers::booking_payment_handler,
        crate::handlers::refund_payment_handler
    ),
    components(
        schemas(CreatePaymentRequest, RefundResponse, Payment, PaymentStatus)
    ),
    tags(
        (name = "Payments", description = "Booking payments and refunds")
    )
)]
pub struct PaymentApiDoc;
