use crate::engine::ReservationEngine;
use chrono::Utc;
use std::collections::HashSet;
use uuid::Uuid;

impl ReservationEngine {
    /// Union of all seats with an active hold for the show, provisional or
    /// confirmed. Reads go straight to the hold table under its lock after
    /// a lazy expiry pass, so occupancy is never served stale.
    pub fn occupied_seats(&self, show_id: &Uuid) -> HashSet<String> {
        let now = Utc::now();
        let mut table = self.table_for_read();
        table.prune_show(*show_id, now);
        table
            .seats
            .get(show_id)
            .map(|seats| seats.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests_support::engine_with_show;

    #[test]
    fn occupancy_tracks_holds_and_releases_immediately() {
        let (engine, show_id) = engine_with_show();

        let receipt = engine
            .place_provisional_hold(
                show_id,
                &["A1".to_string(), "B1".to_string()],
                "u1",
                600,
            )
            .unwrap();
        let occupied = engine.occupied_seats(&show_id);
        assert_eq!(
            occupied,
            HashSet::from(["A1".to_string(), "B1".to_string()])
        );

        engine.release_hold(&receipt.batch_id);
        assert!(engine.occupied_seats(&show_id).is_empty());
    }

    #[test]
    fn unknown_show_has_no_occupancy() {
        let (engine, _) = engine_with_show();
        assert!(engine.occupied_seats(&Uuid::new_v4()).is_empty());
    }
}
