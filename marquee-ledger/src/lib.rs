pub mod analytics;
pub mod booking;
pub mod ledger;
pub mod repository;

pub use analytics::{DailyStat, DashboardStats};
pub use booking::{Booking, PaymentState};
pub use ledger::{BookingLedger, LedgerError};
pub use repository::BookingRepository;
