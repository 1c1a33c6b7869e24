//! Cache module for storing API responses in memory
//!
//! This module provides a TTL cache that keeps idempotent lookup results for a
//! configurable time-to-live. Entries never outlive the process; expired ones
//! are dropped the next time they are read.

mod ttl;

pub use ttl::{make_key, TtlCache};
