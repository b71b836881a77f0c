use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct SeatHeldEvent {
    pub show_id: Uuid,
    pub seat_ids: Vec<String>,
    pub batch_id: Uuid,
    pub held_at: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct SeatReleasedEvent {
    pub show_id: Uuid,
    pub seat_ids: Vec<String>,
    pub batch_id: Uuid,
    pub released_at: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingConfirmedEvent {
    pub booking_id: Uuid,
    pub show_id: Uuid,
    pub customer_id: String,
    pub amount_cents: i32,
    pub timestamp: i64,
}

/// Fan-out payload for seat map subscribers. One channel per process,
/// consumers filter by show id.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeatActivity {
    Held(SeatHeldEvent),
    Released(SeatReleasedEvent),
}

impl SeatActivity {
    pub fn show_id(&self) -> Uuid {
        match self {
            SeatActivity::Held(e) => e.show_id,
            SeatActivity::Released(e) => e.show_id,
        }
    }

    /// SSE event name for this activity.
    pub fn event_name(&self) -> &'static str {
        match self {
            SeatActivity::Held(_) => "seats_held",
            SeatActivity::Released(_) => "seats_released",
        }
    }
}
