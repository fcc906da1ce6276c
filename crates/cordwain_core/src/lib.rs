//! Core data types for the Cordwain Discord REST library.
//!
//! This crate provides the foundation types shared by the rate limiter and the
//! REST dispatcher: the [`Snowflake`] identifier and telemetry setup.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod snowflake;
mod telemetry;

pub use snowflake::{DISCORD_EPOCH_MS, Snowflake};
pub use telemetry::{init_telemetry, init_telemetry_with_level};
