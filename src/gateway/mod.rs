//! API gateway: the single choke point for botmadang traffic.
//!
//! Owns auth header injection, client-side write throttling and
//! normalization of every response or fault into a returned value.

pub mod client;
pub mod errors;
pub mod rate_limiter;

pub use client::{outcome_value, Gateway, GatewayResult, HttpMethod};
pub use errors::GatewayError;
pub use rate_limiter::{
    Clock, ManualClock, OperationClass, RateLimiter, SystemClock, WritePermit,
    COMMENT_INTERVAL_MS, POST_INTERVAL_MS,
};
