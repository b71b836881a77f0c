use marquee_catalog::{CatalogService, FavoriteStore, ReviewBoard};
use marquee_core::payment::PaymentAdapter;
use marquee_ledger::{BookingLedger, BookingRepository};
use marquee_reserve::ReservationEngine;
use marquee_shared::SeatActivity;
use marquee_store::RedisClient;
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub engine: Arc<ReservationEngine>,
    pub ledger: Arc<BookingLedger>,
    pub favorites: Arc<FavoriteStore>,
    pub reviews: Arc<ReviewBoard>,
    pub payments: Arc<dyn PaymentAdapter>,
    /// Durable mirror of the ledger, wired when a database is configured.
    pub booking_repo: Option<Arc<dyn BookingRepository>>,
    /// Distributed seat-lock mirror and rate-limit counters, wired when
    /// Redis is configured.
    pub redis: Option<Arc<RedisClient>>,
    pub sse_tx: broadcast::Sender<SeatActivity>,
    pub auth: AuthConfig,
    pub business_rules: marquee_store::app_config::BusinessRules,
}
