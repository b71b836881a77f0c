use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment lifecycle of a booking. `Paid` and `Cancelled` are terminal in
/// the sense that nothing ever returns to `Pending`; a paid booking may
/// still move to `Cancelled` on the refund path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    Pending,
    Paid,
    Cancelled,
}

impl PaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Pending => "PENDING",
            PaymentState::Paid => "PAID",
            PaymentState::Cancelled => "CANCELLED",
        }
    }
}

/// The durable record of a committed reservation. Seats listed here were
/// all confirmed holds under `hold_batch_id` at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: String,
    pub customer_email: String,
    pub show_id: Uuid,
    pub seat_ids: Vec<String>,
    pub hold_batch_id: Uuid,
    pub amount_cents: i32,
    pub currency: String,
    pub payment_state: PaymentState,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        customer_id: String,
        customer_email: String,
        show_id: Uuid,
        seat_ids: Vec<String>,
        hold_batch_id: Uuid,
        amount_cents: i32,
        currency: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            customer_email,
            show_id,
            seat_ids,
            hold_batch_id,
            amount_cents,
            currency,
            payment_state: PaymentState::Pending,
            payment_reference: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Short human-facing reference, the tail of the id.
    pub fn reference(&self) -> String {
        let simple = self.id.simple().to_string();
        simple[simple.len() - 8..].to_string()
    }

    pub fn is_pending(&self) -> bool {
        self.payment_state == PaymentState::Pending
    }

    pub(crate) fn set_state(&mut self, state: PaymentState) {
        self.payment_state = state;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_is_last_eight_chars() {
        let booking = Booking::new(
            "user-1".to_string(),
            "user-1@example.com".to_string(),
            Uuid::new_v4(),
            vec!["A1".to_string()],
            Uuid::new_v4(),
            1200,
            "USD".to_string(),
        );
        let reference = booking.reference();
        assert_eq!(reference.len(), 8);
        assert!(booking.id.simple().to_string().ends_with(&reference));
    }
}
