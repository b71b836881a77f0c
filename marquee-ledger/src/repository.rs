use crate::booking::Booking;
use async_trait::async_trait;

/// Write-through persistence seam for the ledger. The in-memory ledger
/// stays authoritative for reads; implementations mirror state changes to
/// durable storage.
///
/// TODO: hydrate the ledger from the repository on boot so paid bookings
/// survive a restart.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn upsert(
        &self,
        booking: &Booking,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
