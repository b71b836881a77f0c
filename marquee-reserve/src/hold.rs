use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State of a single seat hold. A seat has at most one active hold at any
/// time; that uniqueness is what the whole engine exists to protect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HoldState {
    Provisional,
    Confirmed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatHold {
    pub batch_id: Uuid,
    pub holder_id: String,
    pub state: HoldState,
    /// Only meaningful while `Provisional`; confirmed holds live until the
    /// booking is cancelled.
    pub expires_at: DateTime<Utc>,
}

impl SeatHold {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.state == HoldState::Provisional && self.expires_at <= now
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchState {
    Provisional,
    Confirmed,
    Released,
}

/// A customer's multi-seat hold request, committed or rejected as a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldBatch {
    pub id: Uuid,
    pub show_id: Uuid,
    pub holder_id: String,
    pub seat_ids: Vec<String>,
    pub state: BatchState,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Set once the batch is confirmed into a booking.
    pub booking_id: Option<Uuid>,
}

/// What the caller gets back from a successful hold request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldReceipt {
    pub batch_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Seats freed by a release, expiry or cancellation, with enough context
/// for availability watchers to update their view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleasedBatch {
    pub show_id: Uuid,
    pub batch_id: Uuid,
    pub seat_ids: Vec<String>,
}
