//! Stay period validation
//!
//! Normalizes the dates of a requested stay and checks them, together with
//! the guest counts, before anything is sent upstream.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::parser;

/// Longest stay accepted, in nights
pub const MAX_NIGHTS: i64 = 30;

/// Bounds on guest counts. Together they cap a stay at 20 guests.
pub const MIN_ADULTS: u32 = 1;
pub const MAX_ADULTS: u32 = 10;
pub const MAX_CHILDREN: u32 = 10;

/// Reasons a requested stay is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateValidationError {
    #[error("Invalid check-in date: '{0}'. Accepted formats: YYYY-MM-DD, \"6 février\", \"début mars\", \"demain\"")]
    InvalidCheckIn(String),

    #[error("Invalid check-out date: '{0}'. Accepted formats: YYYY-MM-DD, \"12 février\", \"fin mars\", \"dans une semaine\"")]
    InvalidCheckOut(String),

    #[error("Check-out ({check_out}) must be after check-in ({check_in})")]
    CheckOutNotAfterCheckIn {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("Check-in date ({0}) is in the past")]
    CheckInInPast(NaiveDate),

    #[error("Stay too long ({0} nights). Maximum is 30 nights")]
    StayTooLong(i64),

    #[error("Adults must be between 1 and 10, got {0}")]
    AdultsOutOfRange(u32),

    #[error("Children must be at most 10, got {0}")]
    ChildrenOutOfRange(u32),
}

/// A stay as typed by a user, before normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayRequest {
    pub check_in: String,
    pub check_out: String,
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
}

/// A validated stay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayPeriod {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub nights: i64,
}

impl StayRequest {
    pub fn new(
        check_in: impl Into<String>,
        check_out: impl Into<String>,
        adults: u32,
        children: u32,
    ) -> Self {
        Self {
            check_in: check_in.into(),
            check_out: check_out.into(),
            adults,
            children,
        }
    }

    /// Normalizes both dates against `today` and validates the stay
    ///
    /// # Returns
    /// * `Ok(StayPeriod)` when every check passes
    /// * `Err(DateValidationError)` naming the first failed check
    pub fn validate(&self, today: NaiveDate) -> Result<StayPeriod, DateValidationError> {
        let check_in = parser::parse(&self.check_in, today);
        let check_in = parse_canonical(&check_in)
            .ok_or_else(|| DateValidationError::InvalidCheckIn(self.check_in.clone()))?;

        let check_out = parser::parse(&self.check_out, today);
        let check_out = parse_canonical(&check_out)
            .ok_or_else(|| DateValidationError::InvalidCheckOut(self.check_out.clone()))?;

        StayPeriod::new(check_in, check_out, self.adults, self.children, today)
    }
}

impl StayPeriod {
    /// Builds a stay from calendar dates, enforcing every invariant
    pub fn new(
        check_in: NaiveDate,
        check_out: NaiveDate,
        adults: u32,
        children: u32,
        today: NaiveDate,
    ) -> Result<Self, DateValidationError> {
        if check_out <= check_in {
            return Err(DateValidationError::CheckOutNotAfterCheckIn {
                check_in,
                check_out,
            });
        }
        if check_in < today {
            return Err(DateValidationError::CheckInInPast(check_in));
        }

        let nights = nights_between(check_in, check_out);
        if nights > MAX_NIGHTS {
            return Err(DateValidationError::StayTooLong(nights));
        }

        if !(MIN_ADULTS..=MAX_ADULTS).contains(&adults) {
            return Err(DateValidationError::AdultsOutOfRange(adults));
        }
        if children > MAX_CHILDREN {
            return Err(DateValidationError::ChildrenOutOfRange(children));
        }

        Ok(Self {
            check_in,
            check_out,
            adults,
            children,
            nights,
        })
    }

    pub fn guests(&self) -> u32 {
        self.adults + self.children
    }
}

/// Whole nights between two dates
pub fn nights_between(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}

/// True only for a `YYYY-MM-DD` string naming a real calendar day
pub fn is_canonical_date(s: &str) -> bool {
    parse_canonical(s).is_some()
}

fn parse_canonical(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Formats a canonical date as `DD/MM/YYYY`; anything else is returned as is
pub fn format_french(s: &str) -> String {
    match parse_canonical(s) {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => s.to_string(),
    }
}
