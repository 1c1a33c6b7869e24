//! Booking API access layer
//!
//! `ApiClient` wraps a [`Transport`], keeps a bearer token fresh through
//! [`TokenManager`], retries once after an authorization failure, and caches
//! idempotent lookups.

mod client;
mod error;
mod hotel;
mod observer;
mod response;
mod token;
mod transport;

pub use client::ApiClient;
pub use error::{AuthenticationError, ClientError, TransportError};
pub use hotel::{AVAILABILITY_PATH, E_RESERVATIONS_PATH, ROOMS_PATH, ROOM_TYPES_PATH};
pub use observer::{
    CacheStatus, NoopObserver, RecordingObserver, RequestEvent, RequestObserver, TracingObserver,
};
pub use response::{decode, extract_json};
pub use token::{Credentials, Token, TokenManager, TokenPolicy};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
