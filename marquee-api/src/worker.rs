use chrono::Utc;
use marquee_reserve::ReservationEngine;
use marquee_shared::{SeatActivity, SeatReleasedEvent};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{interval, Duration};
use tracing::info;

/// Periodic cleanup: releases expired provisional holds and reclaims seats
/// from pending bookings that never paid. Freed seats are announced on the
/// broadcast channel so open seat pickers refresh.
pub async fn start_sweeper(
    engine: Arc<ReservationEngine>,
    sse_tx: broadcast::Sender<SeatActivity>,
    sweep_interval_seconds: u64,
    pending_grace_seconds: u64,
) {
    let mut ticker = interval(Duration::from_secs(sweep_interval_seconds.max(1)));
    info!(
        sweep_interval_seconds,
        pending_grace_seconds, "hold sweeper started"
    );

    loop {
        ticker.tick().await;

        let mut released = engine.sweep().released;
        released.extend(engine.expire_stale_pending(pending_grace_seconds));

        if released.is_empty() {
            continue;
        }

        let freed: usize = released.iter().map(|r| r.seat_ids.len()).sum();
        info!(batches = released.len(), seats = freed, "sweeper released holds");

        for batch in released {
            let _ = sse_tx.send(SeatActivity::Released(SeatReleasedEvent {
                show_id: batch.show_id,
                seat_ids: batch.seat_ids,
                batch_id: batch.batch_id,
                released_at: Utc::now().timestamp(),
            }));
        }
    }
}
