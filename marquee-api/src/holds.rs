use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use futures_util::{Stream, StreamExt};
use marquee_core::identity::UserIdentity;
use marquee_ledger::Booking;
use marquee_reserve::ReleasedBatch;
use marquee_shared::{SeatActivity, SeatHeldEvent, SeatReleasedEvent};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/holds", post(create_hold))
        .route("/v1/holds/{batch_id}/confirm", post(confirm_hold))
        .route("/v1/holds/{batch_id}", delete(release_hold))
        .route("/v1/shows/{show_id}/stream", get(stream_seat_activity))
}

#[derive(Debug, Deserialize)]
struct CreateHoldRequest {
    show_id: Uuid,
    seat_ids: Vec<String>,
    /// Optional shorter TTL; capped at the configured hold TTL.
    ttl_seconds: Option<u64>,
}

#[derive(Debug, Serialize)]
struct CreateHoldResponse {
    hold_batch_id: Uuid,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booking_id: Uuid,
    pub booking_reference: String,
    pub show_id: Uuid,
    pub seat_ids: Vec<String>,
    pub amount_cents: i32,
    pub currency: String,
    pub payment_state: String,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            booking_id: booking.id,
            booking_reference: booking.reference(),
            show_id: booking.show_id,
            seat_ids: booking.seat_ids.clone(),
            amount_cents: booking.amount_cents,
            currency: booking.currency.clone(),
            payment_state: booking.payment_state.as_str().to_string(),
            created_at: booking.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct ReleaseResponse {
    status: String,
}

async fn create_hold(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<CreateHoldRequest>,
) -> Result<Json<CreateHoldResponse>, AppError> {
    let max_ttl = state.business_rules.hold_ttl_seconds;
    let ttl_seconds = req.ttl_seconds.unwrap_or(max_ttl).min(max_ttl);

    let receipt =
        state
            .engine
            .place_provisional_hold(req.show_id, &req.seat_ids, &identity.id, ttl_seconds)?;

    // Best effort: mirror the batch into the distributed seat-lock store.
    // The in-process table is authoritative, so a mirror failure is logged
    // and must not fail the customer's hold.
    if let Some(redis) = &state.redis {
        if let Err(e) = redis
            .mirror_hold_batch(&req.show_id, &req.seat_ids, &receipt.batch_id, ttl_seconds)
            .await
        {
            tracing::warn!("Failed to mirror hold batch: {}", e);
        }
    }

    let _ = state.sse_tx.send(SeatActivity::Held(SeatHeldEvent {
        show_id: req.show_id,
        seat_ids: req.seat_ids.clone(),
        batch_id: receipt.batch_id,
        held_at: Utc::now().timestamp(),
    }));

    Ok(Json(CreateHoldResponse {
        hold_batch_id: receipt.batch_id,
        expires_at: receipt.expires_at,
    }))
}

async fn confirm_hold(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(batch_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.engine.confirm_hold(&batch_id, &identity)?;

    if let Some(redis) = &state.redis {
        if let Err(e) = redis
            .persist_seat_keys(&booking.show_id, &booking.seat_ids)
            .await
        {
            tracing::warn!("Failed to persist mirrored seat keys: {}", e);
        }
    }
    mirror_booking(&state, &booking).await;

    tracing::info!(
        booking_id = %booking.id,
        customer = %identity.masked_email(),
        "booking committed"
    );
    Ok(Json(booking.into()))
}

async fn release_hold(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> Result<Json<ReleaseResponse>, AppError> {
    if let Some(released) = state.engine.release_hold(&batch_id) {
        publish_release(&state, &released).await;
    }
    // Idempotent: a second release of the same batch lands here with
    // nothing to do and still reports success.
    Ok(Json(ReleaseResponse {
        status: "RELEASED".to_string(),
    }))
}

/// Live seat updates for one show. Watchers use this to flip seats in the
/// picker without polling occupancy.
async fn stream_seat_activity(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.sse_tx.subscribe();

    let stream = tokio_stream::wrappers::BroadcastStream::new(rx).filter_map(move |result| {
        async move {
            match result {
                Ok(activity) if activity.show_id() == show_id => {
                    match Event::default()
                        .event(activity.event_name())
                        .json_data(&activity)
                    {
                        Ok(event) => Some(Ok::<_, Infallible>(event)),
                        Err(_) => None,
                    }
                }
                _ => None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Shared helpers for the booking-side handlers.
pub(crate) async fn publish_release(state: &AppState, released: &ReleasedBatch) {
    if let Some(redis) = &state.redis {
        if let Err(e) = redis
            .release_seat_keys(&released.show_id, &released.seat_ids)
            .await
        {
            tracing::warn!("Failed to release mirrored seat keys: {}", e);
        }
    }

    let _ = state.sse_tx.send(SeatActivity::Released(SeatReleasedEvent {
        show_id: released.show_id,
        seat_ids: released.seat_ids.clone(),
        batch_id: released.batch_id,
        released_at: Utc::now().timestamp(),
    }));
}

pub(crate) async fn mirror_booking(state: &AppState, booking: &Booking) {
    if let Some(repo) = &state.booking_repo {
        if let Err(e) = repo.upsert(booking).await {
            tracing::warn!(booking_id = %booking.id, "Failed to mirror booking: {}", e);
        }
    }
}
