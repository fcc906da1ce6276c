//! Extraction of rate limit information from Discord response headers.
//!
//! Discord reports limits on every response:
//! - `x-ratelimit-limit`: requests allowed per window in the bucket
//! - `x-ratelimit-remaining`: requests left in the current window
//! - `x-ratelimit-reset`: Unix time (seconds, fractional) the window resets
//! - `x-ratelimit-reset-after`: seconds until the window resets
//! - `x-ratelimit-bucket`: opaque bucket hash
//! - `x-ratelimit-global`: present on 429s caused by the global limit
//! - `x-ratelimit-scope`: `user`, `global` or `shared`
//! - `retry-after`: seconds to wait after a 429
//!
//! The `Date` header is kept as well so the limiter can estimate the offset
//! between the local clock and Discord's.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::time::Duration;

/// Rate limit information carried by one response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateLimitHeaders {
    /// Requests allowed per window
    pub limit: Option<u32>,
    /// Requests left in the current window
    pub remaining: Option<u32>,
    /// Unix time in seconds at which the window resets
    pub reset: Option<f64>,
    /// Seconds until the window resets
    pub reset_after: Option<f64>,
    /// Opaque bucket hash
    pub bucket: Option<String>,
    /// Whether the response concerns the global limit
    pub global: bool,
    /// Scope of an exceeded limit (`user`, `global`, `shared`)
    pub scope: Option<String>,
    /// Seconds to wait before retrying
    pub retry_after: Option<f64>,
    /// Server time the response was produced
    pub date: Option<DateTime<Utc>>,
}

impl RateLimitHeaders {
    /// Parse rate limit headers; absent or unparsable values become `None`.
    ///
    /// # Example
    ///
    /// ```
    /// use cordwain_rate_limit::RateLimitHeaders;
    /// use reqwest::header::{HeaderMap, HeaderValue};
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("x-ratelimit-limit", HeaderValue::from_static("5"));
    /// headers.insert("x-ratelimit-remaining", HeaderValue::from_static("4"));
    /// headers.insert("x-ratelimit-reset-after", HeaderValue::from_static("1.5"));
    ///
    /// let parsed = RateLimitHeaders::from_headers(&headers);
    /// assert_eq!(parsed.limit, Some(5));
    /// assert_eq!(parsed.remaining, Some(4));
    /// assert!(parsed.has_bucket_info());
    /// ```
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            limit: parse_header(headers, "x-ratelimit-limit"),
            remaining: parse_header(headers, "x-ratelimit-remaining"),
            reset: parse_header(headers, "x-ratelimit-reset"),
            reset_after: parse_header(headers, "x-ratelimit-reset-after"),
            bucket: header_str(headers, "x-ratelimit-bucket").map(str::to_string),
            global: header_str(headers, "x-ratelimit-global")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            scope: header_str(headers, "x-ratelimit-scope").map(str::to_string),
            retry_after: parse_header(headers, "retry-after"),
            date: header_str(headers, "date")
                .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
                .map(|d| d.with_timezone(&Utc)),
        }
    }

    /// Whether the response described the state of its bucket.
    pub fn has_bucket_info(&self) -> bool {
        self.remaining.is_some() || self.reset.is_some() || self.reset_after.is_some()
    }

    /// `reset-after` as a duration.
    pub fn reset_after_duration(&self) -> Option<Duration> {
        self.reset_after.and_then(seconds)
    }

    /// `retry-after` as a duration.
    pub fn retry_after_duration(&self) -> Option<Duration> {
        self.retry_after.and_then(seconds)
    }
}

/// Convert non-negative fractional seconds to a duration.
pub(crate) fn seconds(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value.max(0.0)).ok()
}

fn header_str<'a>(headers: &'a HeaderMap, key: &str) -> Option<&'a str> {
    headers.get(key)?.to_str().ok()
}

fn parse_header<T: std::str::FromStr>(headers: &HeaderMap, key: &str) -> Option<T> {
    header_str(headers, key)?.trim().parse().ok()
}
