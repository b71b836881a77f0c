use crate::booking::{Booking, PaymentState};
use crate::ledger::BookingLedger;
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One day of booking activity. Revenue counts paid bookings only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub total_bookings: usize,
    pub total_revenue_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_bookings: usize,
    pub total_revenue_cents: i64,
    pub unique_customers: usize,
    pub daily: Vec<DailyStat>,
}

/// Recomputes dashboard numbers from the ledger on demand. There is no
/// cached counter to drift out of sync; the ledger is the only input.
pub fn dashboard_stats(ledger: &BookingLedger) -> DashboardStats {
    let bookings = ledger.list_all();
    compute(&bookings)
}

fn compute(bookings: &[Booking]) -> DashboardStats {
    let total_revenue_cents = bookings
        .iter()
        .filter(|b| b.payment_state == PaymentState::Paid)
        .map(|b| b.amount_cents as i64)
        .sum();

    let unique_customers = bookings
        .iter()
        .map(|b| b.customer_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    // Trailing seven days, oldest first.
    let today = Utc::now().date_naive();
    let daily = (0..7)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let day_bookings: Vec<&Booking> = bookings
                .iter()
                .filter(|b| b.created_at.date_naive() == date)
                .collect();
            DailyStat {
                date,
                total_bookings: day_bookings.len(),
                total_revenue_cents: day_bookings
                    .iter()
                    .filter(|b| b.payment_state == PaymentState::Paid)
                    .map(|b| b.amount_cents as i64)
                    .sum(),
            }
        })
        .collect();

    DashboardStats {
        total_bookings: bookings.len(),
        total_revenue_cents,
        unique_customers,
        daily,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn booking_for(customer: &str, amount: i32) -> Booking {
        Booking::new(
            customer.to_string(),
            format!("{}@example.com", customer),
            Uuid::new_v4(),
            vec!["A1".to_string()],
            Uuid::new_v4(),
            amount,
            "USD".to_string(),
        )
    }

    #[test]
    fn revenue_counts_paid_only() {
        let ledger = BookingLedger::new();
        let paid = ledger.create(booking_for("user-1", 1200));
        ledger.create(booking_for("user-2", 3600));
        ledger.mark_paid(&paid.id, None).unwrap();

        let stats = dashboard_stats(&ledger);
        assert_eq!(stats.total_bookings, 2);
        assert_eq!(stats.total_revenue_cents, 1200);
        assert_eq!(stats.unique_customers, 2);
    }

    #[test]
    fn daily_buckets_cover_seven_days() {
        let ledger = BookingLedger::new();
        let booking = ledger.create(booking_for("user-1", 1200));
        ledger.mark_paid(&booking.id, None).unwrap();

        let stats = dashboard_stats(&ledger);
        assert_eq!(stats.daily.len(), 7);
        // Today's bucket is last and carries the booking.
        let today = stats.daily.last().unwrap();
        assert_eq!(today.total_bookings, 1);
        assert_eq!(today.total_revenue_cents, 1200);
    }
}
