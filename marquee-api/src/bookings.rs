use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use marquee_core::identity::UserIdentity;
use marquee_core::payment::PaymentRequest;
use marquee_ledger::PaymentState;
use serde::Deserialize;
use uuid::Uuid;

use crate::holds::{mirror_booking, publish_release, BookingResponse};
use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", get(list_bookings))
        .route("/v1/bookings/{booking_id}/pay", post(pay_booking))
        .route("/v1/bookings/{booking_id}/cancel", post(cancel_booking))
}

#[derive(Debug, Deserialize)]
struct PayRequest {
    payment_token: String,
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> Json<Vec<BookingResponse>> {
    let bookings = state
        .ledger
        .list_for_user(&identity.id)
        .into_iter()
        .map(BookingResponse::from)
        .collect();
    Json(bookings)
}

/// Charge a pending booking. Paying an already paid booking is a no-op
/// success; a declined charge leaves the booking pending with its seats
/// held until the grace-period sweep reclaims them.
async fn pay_booking(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<PayRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .ledger
        .get(&booking_id)
        .ok_or_else(|| AppError::NotFoundError(format!("Booking not found: {}", booking_id)))?;

    if booking.customer_id != identity.id {
        return Err(AppError::AuthorizationError(
            "Booking does not belong to you".to_string(),
        ));
    }

    if booking.payment_state == PaymentState::Paid {
        return Ok(Json(booking.into()));
    }

    let outcome = state
        .payments
        .process(&PaymentRequest {
            booking_id: booking.id,
            amount_cents: booking.amount_cents,
            currency: booking.currency.clone(),
            payment_token: req.payment_token,
        })
        .await
        .map_err(|e| AppError::InternalServerError(format!("Payment provider error: {}", e)))?;

    if !outcome.succeeded() {
        return Err(AppError::PaymentFailed(
            outcome
                .decline_reason
                .unwrap_or_else(|| "payment declined".to_string()),
        ));
    }

    let paid = state.ledger.mark_paid(&booking.id, outcome.reference)?;
    mirror_booking(&state, &paid).await;

    tracing::info!(booking_id = %paid.id, customer = %identity.masked_email(), "booking paid");
    Ok(Json(paid.into()))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .ledger
        .get(&booking_id)
        .ok_or_else(|| AppError::NotFoundError(format!("Booking not found: {}", booking_id)))?;

    if booking.customer_id != identity.id {
        return Err(AppError::AuthorizationError(
            "Booking does not belong to you".to_string(),
        ));
    }

    let (cancelled, released) = state.engine.cancel_booking(&booking_id)?;
    if let Some(released) = released {
        publish_release(&state, &released).await;
    }
    mirror_booking(&state, &cancelled).await;

    Ok(Json(cancelled.into()))
}
