//! Test utilities for cordwain_rest tests.
//!
//! This module provides a scripted transport and client helpers.

pub mod mock_transport;

#[allow(unused_imports)]
pub use mock_transport::{MockResponse, MockTransport};

use cordwain_core::Snowflake;
use cordwain_rate_limit::CordwainConfig;
use cordwain_rest::RestClient;
use std::sync::Arc;

/// Configuration for tests: no jitter, short backoff, no governor quota.
pub fn test_config() -> CordwainConfig {
    let mut config = CordwainConfig::default();
    config.rest.base_url = "https://discord.test/api".to_string();
    config.rest.jitter = false;
    config.rest.initial_backoff_ms = 10;
    config.rest.max_backoff_secs = 1;
    config.rate_limit.global_requests_per_second = None;
    config
}

/// A client wired to the given mock.
pub fn test_client(mock: &Arc<MockTransport>) -> RestClient {
    RestClient::with_transport("test-token", &test_config(), mock.clone())
}

/// A message id created `age` ago, offset by `n` to keep ids distinct.
#[allow(dead_code)]
pub fn message_aged(age: chrono::Duration, n: u64) -> Snowflake {
    let base = Snowflake::from_datetime(chrono::Utc::now() - age);
    Snowflake::new(base.get() + n)
}
