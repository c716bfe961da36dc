use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const MIN_GUESTS: u8 = 1;
pub const MAX_GUESTS: u8 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingDraft {
    pub name: String,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub guests: u8,
    pub breakfast: bool,
    pub payment_method: String,
}

impl BookingDraft {
    pub fn nights(&self) -> i64 {
        (self.checkout - self.checkin).num_days()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub session_id: String,
    pub name: String,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub guests: u8,
    pub breakfast: bool,
    pub payment_method: String,
    pub created_at: NaiveDateTime,
}

impl Booking {
    pub fn nights(&self) -> i64 {
        (self.checkout - self.checkin).num_days()
    }
}
