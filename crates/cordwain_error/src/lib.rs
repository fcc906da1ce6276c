//! Error types for the Cordwain library.
//!
//! This crate provides the foundation error types used throughout the Cordwain workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! REST failures carry the taxonomy the dispatcher needs to decide on retries:
//! client errors, rate limits, server errors, transport failures, malformed
//! input, decode failures and aggregated failures from fan-out operations.
//!
//! # Examples
//!
//! ```
//! use cordwain_error::{CordwainResult, RestError, RestErrorKind};
//!
//! fn parse_id(raw: &str) -> CordwainResult<u64> {
//!     raw.parse::<u64>()
//!         .map_err(|_| RestError::new(RestErrorKind::MalformedInput(raw.to_string())).into())
//! }
//!
//! assert!(parse_id("123").is_ok());
//! assert!(parse_id("abc").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod discord_code;
mod error;
mod rest;
mod retry;

pub use config::{ConfigError, ConfigErrorKind};
pub use discord_code::DiscordErrorCode;
pub use error::{CordwainError, CordwainErrorKind, CordwainResult};
pub use rest::{RestError, RestErrorKind, RestResult};
pub use retry::RetryableError;
