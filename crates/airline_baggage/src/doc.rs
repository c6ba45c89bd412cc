// --- File: crates/airline_baggage/src/doc.rs ---
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{BaggageStatusResponse, BaggageUpdateRequest, CheckInRequest};
use airline_db::models::{Baggage, BaggageStatus};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::check_in_handler,
        crate::handlers::status_handler,
        crate::handlers::booking_baggage_handler,
        crate::handlers::my_baggage_handler,
        crate::handlers::update_baggage_handler
    ),
    components(
        schemas(Baggage, BaggageStatus, CheckInRequest, BaggageUpdateRequest, BaggageStatusResponse)
    ),
    tags(
        (name = "Baggage", description = "Checked baggage and its whereabouts")
    )
)]
pub struct BaggageApiDoc;
