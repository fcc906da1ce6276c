//! Rate limiter implementation driven by Discord's response headers.
//!
//! This module provides the `RateLimiter` struct which admits requests using:
//! - Per-bucket counters reconciled against `X-RateLimit-*` headers
//! - A global reset instant set by global 429 responses
//! - An optional governor quota (GCRA) capping global requests per second
//!
//! Waiting is always a tokio timer; no worker thread is parked.

use crate::bucket::{BucketKey, BucketSnapshot, BucketState};
use crate::config::CordwainConfig;
use crate::headers::RateLimitHeaders;
use chrono::{DateTime, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::{Instant, sleep};
use tracing::{debug, instrument, warn};

// Type alias for our direct rate limiter
type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

type SharedBucket = Arc<Mutex<BucketState>>;

/// Admission control for Discord REST requests.
///
/// One limiter belongs to one client session and is shared by every request it
/// issues. Cloning is cheap and clones share state.
///
/// # Example
///
/// ```rust,ignore
/// use cordwain_rate_limit::{BucketKey, RateLimitHeaders, RateLimiter};
///
/// let limiter = RateLimiter::new(Some(50));
/// let key = BucketKey::new("MESSAGE", Some(channel_id.to_string()));
///
/// let permit = limiter.acquire(&key, true).await;
/// let response = send(request).await?;
/// limiter.update(&key, &RateLimitHeaders::from_headers(response.headers()), None).await;
/// ```
#[derive(Clone)]
pub struct RateLimiter {
    // Bucket key -> state; the map lock is only held to find or insert an entry
    buckets: Arc<RwLock<HashMap<BucketKey, SharedBucket>>>,

    // Reference point for the global reset timestamp
    origin: Instant,

    // Global reset as milliseconds after `origin`; 0 means not limited
    global_until_ms: Arc<AtomicU64>,

    // Discord clock minus local clock, in milliseconds
    clock_offset_ms: Arc<std::sync::Mutex<Option<i64>>>,

    // Proactive global requests-per-second cap
    global_quota: Option<Arc<DirectRateLimiter>>,
}

impl RateLimiter {
    /// Create a limiter, optionally capping global requests per second.
    ///
    /// # Example
    ///
    /// ```
    /// use cordwain_rate_limit::RateLimiter;
    ///
    /// let capped = RateLimiter::new(Some(50));
    /// let uncapped = RateLimiter::new(None);
    /// ```
    pub fn new(global_requests_per_second: Option<u32>) -> Self {
        let global_quota = global_requests_per_second
            .and_then(NonZeroU32::new)
            .map(|rps| Arc::new(GovernorRateLimiter::direct(Quota::per_second(rps))));

        Self {
            buckets: Arc::new(RwLock::new(HashMap::new())),
            origin: Instant::now(),
            global_until_ms: Arc::new(AtomicU64::new(0)),
            clock_offset_ms: Arc::new(std::sync::Mutex::new(None)),
            global_quota,
        }
    }

    /// Create a limiter from loaded configuration.
    pub fn from_config(config: &CordwainConfig) -> Self {
        Self::new(config.global_requests_per_second())
    }

    /// Wait until a request to `key` may be sent, then claim a slot.
    ///
    /// Unknown buckets are admitted immediately. When `consumes_global` is
    /// false the global reset and the global quota are skipped entirely.
    #[instrument(skip(self), fields(bucket = %key))]
    pub async fn acquire(&self, key: &BucketKey, consumes_global: bool) -> RateLimitPermit {
        let started = Instant::now();
        let bucket = self.bucket(key).await;

        loop {
            if consumes_global {
                if let Some(wait) = self.global_wait(Instant::now()) {
                    debug!(
                        delay_ms = wait.as_millis() as u64,
                        "Global ratelimit active, delaying request"
                    );
                    sleep(wait).await;
                    continue;
                }
            }

            let verdict = bucket.lock().await.try_take(Instant::now());
            match verdict {
                Ok(()) => break,
                Err(wait) => {
                    debug!(
                        delay_ms = wait.as_millis() as u64,
                        "Delaying request to prevent hitting ratelimits"
                    );
                    sleep(wait).await;
                }
            }
        }

        if consumes_global {
            if let Some(quota) = &self.global_quota {
                quota.until_ready().await;
            }
        }

        RateLimitPermit {
            key: key.clone(),
            waited: started.elapsed(),
        }
    }

    /// Reconcile a bucket with the headers of a response.
    ///
    /// `reset_override` replaces the server-reported window for endpoints whose
    /// reported limits are known to be wrong.
    #[instrument(skip(self, headers), fields(bucket = %key))]
    pub async fn update(
        &self,
        key: &BucketKey,
        headers: &RateLimitHeaders,
        reset_override: Option<Duration>,
    ) {
        if let Some(date) = headers.date {
            self.record_server_date(date);
        }

        if !headers.has_bucket_info() && reset_override.is_none() {
            return;
        }

        let now = Instant::now();
        let reset_at = reset_override
            .or_else(|| headers.reset_after_duration())
            .map(|after| now + after)
            .or_else(|| headers.reset.map(|epoch| self.instant_for_epoch(epoch, now)));

        let bucket = self.bucket(key).await;
        let mut state = bucket.lock().await;
        if headers.bucket.is_some() {
            state.hash = headers.bucket.clone();
        }
        state.reconcile(headers.limit, headers.remaining, reset_at);
        debug!(
            limit = ?state.limit,
            remaining = ?state.remaining,
            "Updated bucket from response headers"
        );
    }

    /// Apply a 429: nothing more goes to `key` until `retry_after` has passed.
    ///
    /// A global 429 also blocks every request that consumes the global limit.
    /// The clock offset is discarded so the next response recomputes it.
    #[instrument(skip(self), fields(bucket = %key))]
    pub async fn penalize(&self, key: &BucketKey, retry_after: Duration, global: bool) {
        let now = Instant::now();
        let reset_at = now + retry_after;
        {
            let bucket = self.bucket(key).await;
            let mut state = bucket.lock().await;
            state.remaining = Some(0);
            state.reset_at = Some(reset_at);
        }

        if global {
            let until = reset_at.saturating_duration_since(self.origin).as_millis() as u64;
            self.global_until_ms.fetch_max(until.max(1), Ordering::SeqCst);
            warn!(
                retry_after_ms = retry_after.as_millis() as u64,
                "Hit the global ratelimit"
            );
        }

        self.reset_clock_offset();
    }

    /// Current view of a bucket, if any response described it.
    pub async fn snapshot(&self, key: &BucketKey) -> Option<BucketSnapshot> {
        let bucket = self.buckets.read().await.get(key).cloned()?;
        let state = bucket.lock().await;
        Some(state.snapshot(Instant::now()))
    }

    /// Time left until the global limit lifts, if it is active.
    pub fn global_reset_in(&self) -> Option<Duration> {
        self.global_wait(Instant::now())
    }

    /// Estimated Discord clock minus local clock, in milliseconds.
    pub fn clock_offset_ms(&self) -> Option<i64> {
        self.clock_offset_ms.lock().ok().and_then(|offset| *offset)
    }

    /// Record Discord's `Date` header; only the first value after a reset is kept.
    pub fn record_server_date(&self, date: DateTime<Utc>) {
        if let Ok(mut offset) = self.clock_offset_ms.lock() {
            if offset.is_none() {
                let computed = date.timestamp_millis() - unix_now_ms();
                debug!(offset_ms = computed, "Calculated offset to the Discord clock");
                *offset = Some(computed);
            }
        }
    }

    /// Forget the clock offset.
    pub fn reset_clock_offset(&self) {
        if let Ok(mut offset) = self.clock_offset_ms.lock() {
            *offset = None;
        }
    }

    async fn bucket(&self, key: &BucketKey) -> SharedBucket {
        if let Some(bucket) = self.buckets.read().await.get(key) {
            return bucket.clone();
        }
        self.buckets
            .write()
            .await
            .entry(key.clone())
            .or_default()
            .clone()
    }

    fn global_wait(&self, now: Instant) -> Option<Duration> {
        let until = self.global_until_ms.load(Ordering::SeqCst);
        if until == 0 {
            return None;
        }
        let elapsed = now.saturating_duration_since(self.origin).as_millis() as u64;
        (until > elapsed).then(|| Duration::from_millis(until - elapsed))
    }

    /// Map an absolute Discord reset time onto the local monotonic clock.
    fn instant_for_epoch(&self, epoch_secs: f64, now: Instant) -> Instant {
        let offset = self.clock_offset_ms().unwrap_or(0);
        let discord_now_ms = unix_now_ms() + offset;
        let reset_ms = (epoch_secs * 1000.0) as i64;
        let delta = reset_ms - discord_now_ms;
        if delta <= 0 {
            now
        } else {
            now + Duration::from_millis(delta as u64)
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("global_quota", &self.global_quota.is_some())
            .field("global_reset_in", &self.global_reset_in())
            .field("clock_offset_ms", &self.clock_offset_ms())
            .finish()
    }
}

fn unix_now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Proof that a request was admitted by the limiter.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct RateLimitPermit {
    key: BucketKey,
    waited: Duration,
}
