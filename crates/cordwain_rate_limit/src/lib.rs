//! Rate limit bookkeeping for Discord's REST API.
//!
//! Discord scopes rate limits to buckets: an endpoint plus the major resource
//! id (channel, guild, webhook) in its path. Every response reports how many
//! requests remain in the bucket and when it resets, and a 429 response says
//! exactly how long to back off. This crate keeps that state:
//!
//! - [`RateLimitHeaders`] parses the `X-RateLimit-*`, `Retry-After` and `Date` headers
//! - [`RateLimiter`] admits requests per [`BucketKey`] and for the global limit
//! - [`CordwainConfig`] loads the layered TOML configuration
//!
//! The server is always authoritative: local counters are optimistic
//! predictions that every response overwrites.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bucket;
mod config;
mod headers;
mod limiter;

pub use bucket::{BucketKey, BucketSnapshot};
pub use config::{CordwainConfig, RateLimitConfig, RestConfig};
pub use headers::RateLimitHeaders;
pub use limiter::{RateLimitPermit, RateLimiter};
