//! Date handling for stay requests
//!
//! `parser` normalizes French date expressions to `YYYY-MM-DD`; `stay`
//! validates a full check-in/check-out request built on top of it.

pub mod parser;
pub mod stay;

pub use parser::{parse, DateParser};
pub use stay::{
    format_french, is_canonical_date, nights_between, DateValidationError, StayPeriod,
    StayRequest,
};
