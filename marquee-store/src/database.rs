use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    /// Idempotent schema bootstrap for the booking mirror table.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        info!("Ensuring bookings schema...");
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bookings (
                id UUID PRIMARY KEY,
                customer_id TEXT NOT NULL,
                customer_email TEXT NOT NULL,
                show_id UUID NOT NULL,
                seat_ids TEXT NOT NULL,
                hold_batch_id UUID NOT NULL,
                amount_cents INTEGER NOT NULL,
                currency TEXT NOT NULL,
                payment_state TEXT NOT NULL,
                payment_reference TEXT,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        info!("Schema ready.");
        Ok(())
    }
}
