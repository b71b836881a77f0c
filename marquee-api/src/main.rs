use marquee_api::{
    app,
    state::{AppState, AuthConfig},
    worker,
};
use marquee_catalog::{CatalogService, FavoriteStore, ReviewBoard};
use marquee_core::payment::MockPaymentAdapter;
use marquee_ledger::{BookingLedger, BookingRepository};
use marquee_reserve::ReservationEngine;
use marquee_store::{DbClient, PgBookingRepository, RedisClient};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marquee_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = marquee_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Marquee API on port {}", config.server.port);

    // Postgres mirror, optional
    let booking_repo: Option<Arc<dyn BookingRepository>> = match &config.database {
        Some(db_config) => {
            let db = DbClient::new(&db_config.url)
                .await
                .expect("Failed to connect to Postgres");
            db.ensure_schema()
                .await
                .expect("Failed to prepare bookings schema");
            Some(Arc::new(PgBookingRepository::new(db.pool.clone())))
        }
        None => {
            tracing::warn!("No database configured, bookings are in-memory only");
            None
        }
    };

    // Redis mirror, optional
    let redis = match &config.redis {
        Some(redis_config) => {
            let client = RedisClient::new(&redis_config.url)
                .await
                .expect("Failed to connect to Redis");
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("No Redis configured, rate limiting and lock mirroring disabled");
            None
        }
    };

    let catalog = Arc::new(CatalogService::new());
    let ledger = Arc::new(BookingLedger::new());
    let engine = Arc::new(ReservationEngine::new(
        catalog.clone(),
        ledger.clone(),
        config.business_rules.max_seats_per_hold,
        config.business_rules.currency.clone(),
    ));

    let (sse_tx, _) = tokio::sync::broadcast::channel(100);

    let app_state = AppState {
        catalog,
        engine: engine.clone(),
        ledger,
        favorites: Arc::new(FavoriteStore::new()),
        reviews: Arc::new(ReviewBoard::new()),
        payments: Arc::new(MockPaymentAdapter),
        booking_repo,
        redis,
        sse_tx: sse_tx.clone(),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        business_rules: config.business_rules.clone(),
    };

    tokio::spawn(worker::start_sweeper(
        engine,
        sse_tx,
        config.business_rules.sweep_interval_seconds,
        config.business_rules.pending_payment_grace_seconds,
    ));

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
