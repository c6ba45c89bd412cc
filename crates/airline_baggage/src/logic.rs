// --- File: crates/airline_baggage/src/logic.rs ---
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use airline_common::error::{forbidden, internal_error, not_found, validation_error};
use airline_common::models::BaggageStatusChanged;
use airline_common::{notify_quietly, AirlineError, NotificationEvent, Notifier};
use airline_db::models::{Baggage, BaggageStatus, NewBaggage, OwnedBaggage};
use airline_db::{BaggageRepository, BookingRepository};

pub const CHECK_IN_LOCATION: &str = "Airport Check-in";

const MAX_TAG_ATTEMPTS: usize = 20;

const BOOKING_NOT_OWNED: &str = "Booking not found or does not belong to you";

#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CheckInRequest {
    pub booking_id: i64,
    #[cfg_attr(feature = "openapi", schema(example = 23.5))]
    pub weight: Option<f64>,
}

/// Partial update; blank or missing fields keep their stored value.
#[derive(Deserialize, Debug, Clone, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BaggageUpdateRequest {
    pub status: Option<BaggageStatus>,
    pub location: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BaggageStatusResponse {
    pub baggage_tag: String,
    pub status: BaggageStatus,
    pub location: Option<String>,
    pub booking_id: i64,
}

impl From<Baggage> for BaggageStatusResponse {
    fn from(baggage: Baggage) -> Self {
        Self {
            baggage_tag: baggage.baggage_tag,
            status: baggage.status,
            location: baggage.location,
            booking_id: baggage.booking_id,
        }
    }
}

/// Three uppercase letters followed by six digits, e.g. `KXQ042917`.
pub fn generate_tag<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut tag: String = (0..3).map(|_| rng.gen_range(b'A'..=b'Z') as char).collect();
    tag.extend((0..6).map(|_| rng.gen_range(b'0'..=b'9') as char));
    tag
}

async fn unique_tag<G: BaggageRepository>(baggage: &G) -> Result<String, AirlineError> {
    for _ in 0..MAX_TAG_ATTEMPTS {
        let tag = generate_tag(&mut rand::thread_rng());
        if !baggage.tag_exists(&tag).await? {
            return Ok(tag);
        }
        debug!("Baggage tag {} already issued, drawing another", tag);
    }
    Err(internal_error("could not allocate a unique baggage tag"))
}

pub async fn check_in<G, B>(
    baggage: &G,
    bookings: &B,
    user_id: i64,
    request: CheckInRequest,
) -> Result<Baggage, AirlineError>
where
    G: BaggageRepository,
    B: BookingRepository,
{
    bookings
        .find_owned(request.booking_id, user_id)
        .await?
        .ok_or_else(|| not_found(BOOKING_NOT_OWNED))?;

    if request.weight.is_some_and(|w| w <= 0.0 || !w.is_finite()) {
        return Err(validation_error("Weight must be positive"));
    }

    let tag = unique_tag(baggage).await?;
    let created = baggage
        .create(NewBaggage {
            booking_id: request.booking_id,
            baggage_tag: tag,
            weight: request.weight,
            location: CHECK_IN_LOCATION.to_string(),
        })
        .await?;
    info!(
        "Checked in bag {} for booking {}",
        created.baggage_tag, created.booking_id
    );
    Ok(created)
}

pub async fn status_by_tag<G: BaggageRepository>(
    baggage: &G,
    user_id: i64,
    tag: &str,
) -> Result<BaggageStatusResponse, AirlineError> {
    let OwnedBaggage { baggage, owner_id } = baggage
        .find_by_tag(tag)
        .await?
        .ok_or_else(|| not_found("Baggage not found"))?;
    if owner_id != user_id {
        return Err(forbidden("You don't have access to this baggage"));
    }
    Ok(baggage.into())
}

pub async fn list_for_booking<G, B>(
    baggage: &G,
    bookings: &B,
    user_id: i64,
    booking_id: i64,
) -> Result<Vec<Baggage>, AirlineError>
where
    G: BaggageRepository,
    B: BookingRepository,
{
    bookings
        .find_owned(booking_id, user_id)
        .await?
        .ok_or_else(|| not_found(BOOKING_NOT_OWNED))?;
    Ok(baggage.list_for_booking(booking_id).await?)
}

pub async fn update<G: BaggageRepository>(
    baggage: &G,
    notifier: &dyn Notifier,
    user_id: i64,
    id: i64,
    request: BaggageUpdateRequest,
) -> Result<Baggage, AirlineError> {
    let OwnedBaggage {
        baggage: current,
        owner_id,
    } = baggage
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found("Baggage not found"))?;
    if owner_id != user_id {
        return Err(forbidden("You don't have permission to update this baggage"));
    }

    let location = request
        .location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty());
    let updated = baggage.update(id, request.status, location).await?;

    if request.status.is_some_and(|s| s != current.status) {
        notify_quietly(
            notifier,
            NotificationEvent::BaggageStatusChanged(BaggageStatusChanged {
                user_id: owner_id,
                baggage_tag: updated.baggage_tag.clone(),
                status: updated.status.to_string(),
                location: updated.location.clone(),
            }),
        )
        .await;
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn tags_are_three_letters_and_six_digits() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let tag = generate_tag(&mut rng);
            assert_eq!(tag.len(), 9);
            assert!(tag[..3].chars().all(|c| c.is_ascii_uppercase()));
            assert!(tag[3..].chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn update_request_accepts_snake_case_status() {
        let request: BaggageUpdateRequest =
            serde_json::from_str(r#"{"status":"in_transit"}"#).unwrap();
        assert_eq!(request.status, Some(BaggageStatus::InTransit));
        assert!(request.location.is_none());
        assert!(serde_json::from_str::<BaggageUpdateRequest>(r#"{"status":"teleported"}"#).is_err());
    }
}
