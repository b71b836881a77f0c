use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShowStatus {
    Active,
    Cancelled,
    Completed,
}

/// A scheduled screening. Shows are created and mutated by administrators
/// only, and are never deleted while bookings reference them; cancellation
/// is a soft state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Show {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub hall_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub price_cents: i32,
    pub status: ShowStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Show {
    pub fn new(movie_id: Uuid, hall_id: Uuid, starts_at: DateTime<Utc>, price_cents: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            movie_id,
            hall_id,
            starts_at,
            price_cents,
            status: ShowStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ShowStatus::Active
    }

    pub fn set_status(&mut self, status: ShowStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
