//! Bucket identity and per-bucket state.

use std::time::Duration;
use tokio::time::Instant;

/// Identity of a rate limit bucket: a route plus its major parameter.
///
/// Two requests share a bucket when they hit the same route with the same
/// major parameter (the channel, guild or webhook id Discord scopes limits to).
///
/// # Example
///
/// ```
/// use cordwain_rate_limit::BucketKey;
///
/// let a = BucketKey::new("MESSAGE_DELETE", Some("41771983423143937".to_string()));
/// let b = BucketKey::new("MESSAGE_DELETE", Some("41771983423143937".to_string()));
/// let c = BucketKey::new("MESSAGE_DELETE", Some("80351110224678912".to_string()));
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_getters::Getters)]
#[display("{}:{}", route, major.as_deref().unwrap_or("none"))]
pub struct BucketKey {
    route: String,
    major: Option<String>,
}

impl BucketKey {
    /// Create a bucket key.
    pub fn new(route: impl Into<String>, major: Option<String>) -> Self {
        Self {
            route: route.into(),
            major,
        }
    }
}

/// Mutable accounting for one bucket.
///
/// `remaining == None` means no response has described the bucket yet, so
/// requests are admitted without prediction.
#[derive(Debug, Clone, Default)]
pub(crate) struct BucketState {
    pub(crate) limit: Option<u32>,
    pub(crate) remaining: Option<u32>,
    pub(crate) reset_at: Option<Instant>,
    pub(crate) hash: Option<String>,
}

impl BucketState {
    /// Refill the bucket if its window has passed.
    pub(crate) fn refresh(&mut self, now: Instant) {
        if self.reset_at.is_some_and(|reset| now >= reset) {
            self.remaining = self.limit;
            self.reset_at = None;
        }
    }

    /// Take a slot, or report how long until one frees up.
    pub(crate) fn try_take(&mut self, now: Instant) -> Result<(), Duration> {
        self.refresh(now);
        match (self.remaining, self.reset_at) {
            (Some(0), Some(reset)) => Err(reset.saturating_duration_since(now)),
            (Some(n), _) if n > 0 => {
                self.remaining = Some(n - 1);
                Ok(())
            }
            // Exhausted with no known reset, or never described: nothing to wait for.
            _ => Ok(()),
        }
    }

    /// Apply the server's view of the bucket.
    pub(crate) fn reconcile(
        &mut self,
        limit: Option<u32>,
        remaining: Option<u32>,
        reset_at: Option<Instant>,
    ) {
        if limit.is_some() {
            self.limit = limit;
        }
        if let Some(remaining) = remaining {
            let clamped = match self.limit {
                Some(limit) => remaining.min(limit),
                None => remaining,
            };
            self.remaining = Some(clamped);
        }
        if reset_at.is_some() {
            self.reset_at = reset_at;
        }
    }

    pub(crate) fn snapshot(&self, now: Instant) -> BucketSnapshot {
        BucketSnapshot {
            limit: self.limit,
            remaining: self.remaining,
            reset_in: self
                .reset_at
                .map(|reset| reset.saturating_duration_since(now)),
            hash: self.hash.clone(),
        }
    }
}

/// Point-in-time view of a bucket, for logging and inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSnapshot {
    /// Requests allowed per window, once known
    pub limit: Option<u32>,
    /// Requests the limiter still expects to be allowed
    pub remaining: Option<u32>,
    /// Time until the window resets
    pub reset_in: Option<Duration>,
    /// Discord's bucket hash, once reported
    pub hash: Option<String>,
}
