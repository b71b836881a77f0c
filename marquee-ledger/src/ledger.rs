use crate::booking::{Booking, PaymentState};
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory booking ledger. All state transitions go through here so the
/// payment state machine is enforced in one place.
pub struct BookingLedger {
    bookings: RwLock<HashMap<Uuid, Booking>>,
}

impl BookingLedger {
    pub fn new() -> Self {
        Self {
            bookings: RwLock::new(HashMap::new()),
        }
    }

    /// Record a freshly committed reservation. The caller has already
    /// confirmed the seat holds; the booking starts out `Pending`.
    pub fn create(&self, booking: Booking) -> Booking {
        let mut bookings = self.bookings.write().unwrap();
        bookings.insert(booking.id, booking.clone());
        tracing::info!(booking_id = %booking.id, seats = booking.seat_ids.len(), "booking created");
        booking
    }

    pub fn get(&self, booking_id: &Uuid) -> Option<Booking> {
        self.bookings.read().unwrap().get(booking_id).cloned()
    }

    /// Transition: Pending -> Paid. Re-confirming an already paid booking
    /// is a no-op success so a replayed payment confirmation cannot
    /// double-apply.
    pub fn mark_paid(
        &self,
        booking_id: &Uuid,
        reference: Option<String>,
    ) -> Result<Booking, LedgerError> {
        let mut bookings = self.bookings.write().unwrap();
        let booking = bookings
            .get_mut(booking_id)
            .ok_or_else(|| LedgerError::NotFound(booking_id.to_string()))?;

        match booking.payment_state {
            PaymentState::Pending => {
                booking.set_state(PaymentState::Paid);
                booking.payment_reference = reference;
                Ok(booking.clone())
            }
            PaymentState::Paid => Ok(booking.clone()),
            PaymentState::Cancelled => Err(LedgerError::InvalidTransition {
                from: "CANCELLED".to_string(),
                to: "PAID".to_string(),
            }),
        }
    }

    /// Transition: Pending -> Cancelled, or Paid -> Cancelled (refund
    /// path). Cancelling twice is a no-op success; the associated seat
    /// release is idempotent on the engine side as well.
    pub fn cancel(&self, booking_id: &Uuid) -> Result<Booking, LedgerError> {
        let mut bookings = self.bookings.write().unwrap();
        let booking = bookings
            .get_mut(booking_id)
            .ok_or_else(|| LedgerError::NotFound(booking_id.to_string()))?;

        match booking.payment_state {
            PaymentState::Pending => {
                booking.set_state(PaymentState::Cancelled);
                Ok(booking.clone())
            }
            PaymentState::Paid => {
                tracing::info!(booking_id = %booking.id, amount_cents = booking.amount_cents, "refunding paid booking");
                booking.set_state(PaymentState::Cancelled);
                Ok(booking.clone())
            }
            PaymentState::Cancelled => Ok(booking.clone()),
        }
    }

    pub fn list_for_user(&self, customer_id: &str) -> Vec<Booking> {
        let mut result: Vec<Booking> = self
            .bookings
            .read()
            .unwrap()
            .values()
            .filter(|b| b.customer_id == customer_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    pub fn list_all(&self) -> Vec<Booking> {
        let mut result: Vec<Booking> = self.bookings.read().unwrap().values().cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    /// Cancel every `Pending` booking older than the payment grace period
    /// and hand the cancelled records back so the caller can release their
    /// seats.
    pub fn cancel_stale_pending(&self, grace_seconds: u64) -> Vec<Booking> {
        let cutoff = Utc::now() - Duration::seconds(grace_seconds as i64);
        let mut bookings = self.bookings.write().unwrap();
        let mut cancelled = Vec::new();

        for booking in bookings.values_mut() {
            if booking.payment_state == PaymentState::Pending && booking.created_at < cutoff {
                booking.set_state(PaymentState::Cancelled);
                cancelled.push(booking.clone());
            }
        }

        if !cancelled.is_empty() {
            tracing::info!(count = cancelled.len(), "cancelled stale pending bookings");
        }
        cancelled
    }
}

impl Default for BookingLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Booking not found: {0}")]
    NotFound(String),

    #[error("Invalid payment transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}
