pub mod availability;
pub mod engine;
pub mod hold;

pub use engine::{ReservationEngine, ReserveError, SweepOutcome};
pub use hold::{BatchState, HoldBatch, HoldReceipt, HoldState, ReleasedBatch, SeatHold};
