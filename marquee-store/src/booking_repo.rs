use async_trait::async_trait;
use marquee_ledger::{Booking, BookingRepository};
use sqlx::PgPool;

/// Write-through mirror of the ledger. Seat ids are stored as a
/// comma-joined string; the in-memory ledger remains the read authority.
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn upsert(
        &self,
        booking: &Booking,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let seat_ids = booking.seat_ids.join(",");

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, customer_id, customer_email, show_id, seat_ids,
                hold_batch_id, amount_cents, currency, payment_state,
                payment_reference, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO UPDATE SET
                payment_state = EXCLUDED.payment_state,
                payment_reference = EXCLUDED.payment_reference,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(booking.id)
        .bind(&booking.customer_id)
        .bind(&booking.customer_email)
        .bind(booking.show_id)
        .bind(seat_ids)
        .bind(booking.hold_batch_id)
        .bind(booking.amount_cents)
        .bind(&booking.currency)
        .bind(booking.payment_state.as_str())
        .bind(&booking.payment_reference)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(booking_id = %booking.id, "booking mirrored to Postgres");
        Ok(())
    }
}
