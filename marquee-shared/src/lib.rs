pub mod events;
pub mod pii;

pub use events::{BookingConfirmedEvent, SeatActivity, SeatHeldEvent, SeatReleasedEvent};
pub use pii::Masked;
