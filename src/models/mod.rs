pub mod booking;
pub mod session;

pub use booking::{Booking, BookingDraft, MAX_GUESTS, MIN_GUESTS};
pub use session::{Session, Slots, Step};
