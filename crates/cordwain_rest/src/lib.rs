//! Discord REST dispatch for Cordwain.
//!
//! This crate turns logical operations into rate-limited, retried HTTP calls:
//!
//! - [`RestEndpoint`] is the static route catalog (templates, major parameters)
//! - [`RestRequest`] is a pending request with a typed decoder
//! - [`RestClient`] executes requests against a [`Transport`], consulting the
//!   [`cordwain_rate_limit::RateLimiter`] before every attempt
//! - [`BulkDeletePlan`] and [`RestClient::delete_messages`] implement bulk
//!   message deletion within Discord's batch and age limits
//!
//! # Example
//!
//! ```no_run
//! use cordwain_core::Snowflake;
//! use cordwain_rate_limit::CordwainConfig;
//! use cordwain_rest::RestClient;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RestClient::new(std::env::var("DISCORD_TOKEN")?, &CordwainConfig::load()?)?;
//! let channel = Snowflake::parse("41771983423143937")?;
//! client
//!     .delete_messages(channel, [Snowflake::new(1001), Snowflake::new(1002)])
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod body;
mod bulk;
mod client;
mod endpoint;
mod operations;
mod request;
mod transport;

pub use body::{FileAttachment, RequestBody};
pub use bulk::{BULK_DELETE_MAX_AGE_DAYS, BulkDeletePlan, MAX_BULK_DELETE};
pub use client::RestClient;
pub use endpoint::{RestEndpoint, RestMethod};
pub use operations::{ADD_REACTION_RETRIES, ReactionEmoji};
pub use request::{AUDIT_LOG_REASON_HEADER, Decoder, RestRequest};
pub use transport::{HttpRequest, ReqwestTransport, RestResponse, Transport};
