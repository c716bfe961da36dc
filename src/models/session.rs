use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::booking::{BookingDraft, MAX_GUESTS, MIN_GUESTS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Name,
    Checkin,
    Checkout,
    Guests,
    Breakfast,
    Payment,
    Confirm,
    Complete,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Name => "name",
            Step::Checkin => "checkin",
            Step::Checkout => "checkout",
            Step::Guests => "guests",
            Step::Breakfast => "breakfast",
            Step::Payment => "payment",
            Step::Confirm => "confirm",
            Step::Complete => "complete",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "checkin" => Step::Checkin,
            "checkout" => Step::Checkout,
            "guests" => Step::Guests,
            "breakfast" => Step::Breakfast,
            "payment" => Step::Payment,
            "confirm" => Step::Confirm,
            "complete" => Step::Complete,
            _ => Step::Name,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Step::Name => Step::Checkin,
            Step::Checkin => Step::Checkout,
            Step::Checkout => Step::Guests,
            Step::Guests => Step::Breakfast,
            Step::Breakfast => Step::Payment,
            Step::Payment => Step::Confirm,
            Step::Confirm | Step::Complete => Step::Complete,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Slots {
    pub name: Option<String>,
    pub checkin: Option<NaiveDate>,
    pub checkout: Option<NaiveDate>,
    pub guests: Option<u8>,
    pub breakfast: Option<bool>,
    pub payment_method: Option<String>,
}

impl Slots {
    /// Yields a draft only when every slot is filled and the stay is valid.
    pub fn to_draft(&self) -> Option<BookingDraft> {
        let checkin = self.checkin?;
        let checkout = self.checkout?;
        let guests = self.guests?;

        if checkout <= checkin || !(MIN_GUESTS..=MAX_GUESTS).contains(&guests) {
            return None;
        }

        Some(BookingDraft {
            name: self.name.clone().filter(|n| !n.trim().is_empty())?,
            checkin,
            checkout,
            guests,
            breakfast: self.breakfast?,
            payment_method: self.payment_method.clone()?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub step: Step,
    pub slots: Slots,
    pub booking_id: Option<i64>,
    pub created_at: NaiveDateTime,
    pub last_activity: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

impl Session {
    pub fn new(ttl_minutes: i64) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            step: Step::Name,
            slots: Slots::default(),
            booking_id: None,
            created_at: now,
            last_activity: now,
            expires_at: now + Duration::minutes(ttl_minutes),
        }
    }

    pub fn reset(&mut self) {
        self.step = Step::Name;
        self.slots = Slots::default();
        self.booking_id = None;
    }

    pub fn touch(&mut self, ttl_minutes: i64) {
        let now = Utc::now().naive_utc();
        self.last_activity = now;
        self.expires_at = now + Duration::minutes(ttl_minutes);
    }
}
