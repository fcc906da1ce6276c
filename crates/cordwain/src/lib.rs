//! Cordwain - rate-limited Discord REST client
//!
//! Cordwain sends Discord REST requests the way Discord wants them sent:
//! bucketed rate limits are tracked from response headers, 429s are honored
//! exactly, transient failures are retried within a per-request budget, and
//! bulk message deletion respects the endpoint's batch and age limits.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cordwain::{CordwainConfig, RestClient, Snowflake};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CordwainConfig::load()?;
//!     let client = RestClient::new(std::env::var("DISCORD_TOKEN")?, &config)?;
//!
//!     let channel = Snowflake::parse("41771983423143937")?;
//!     client.delete_message(channel, Snowflake::new(1001)).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Cordwain is organized as a workspace with focused crates:
//!
//! - `cordwain_error` - Error types and Discord error codes
//! - `cordwain_core` - Snowflake ids and telemetry setup
//! - `cordwain_rate_limit` - Rate limit headers, buckets and configuration
//! - `cordwain_rest` - Endpoints, requests, dispatcher and bulk deletion
//!
//! This crate re-exports the public API of all of them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

// Re-export error types
pub use cordwain_error::{
    ConfigError, ConfigErrorKind, CordwainError, CordwainErrorKind, CordwainResult,
    DiscordErrorCode, RestError, RestErrorKind, RestResult, RetryableError,
};

// Re-export core types
pub use cordwain_core::{DISCORD_EPOCH_MS, Snowflake, init_telemetry, init_telemetry_with_level};

// Re-export rate limiting
pub use cordwain_rate_limit::{
    BucketKey, BucketSnapshot, CordwainConfig, RateLimitConfig, RateLimitHeaders,
    RateLimitPermit, RateLimiter, RestConfig,
};

// Re-export REST dispatch
pub use cordwain_rest::{
    ADD_REACTION_RETRIES, AUDIT_LOG_REASON_HEADER, BULK_DELETE_MAX_AGE_DAYS, BulkDeletePlan,
    Decoder, FileAttachment, HttpRequest, MAX_BULK_DELETE, ReactionEmoji, RequestBody,
    ReqwestTransport, RestClient, RestEndpoint, RestMethod, RestRequest, RestResponse, Transport,
};
