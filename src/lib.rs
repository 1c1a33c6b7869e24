//! hotel-desk library
//!
//! A resilient client for a hotel booking API (token refresh, single-flight
//! login, retry on 401, response caching) and a parser for French date
//! expressions used to validate stay requests.

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod dates;
