//! Retry classification for errors.

use std::time::Duration;

/// Trait for errors that support retry logic.
///
/// The dispatcher consults this to decide whether a failed attempt is worth
/// another try, and whether the server dictated the delay before it.
///
/// # Examples
///
/// ```
/// use cordwain_error::{RestError, RestErrorKind, RetryableError};
/// use std::time::Duration;
///
/// let err = RestError::new(RestErrorKind::RateLimited {
///     retry_after: Duration::from_secs(2),
///     global: false,
/// });
///
/// assert!(err.is_retryable());
/// assert_eq!(err.retry_after(), Some(Duration::from_secs(2)));
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Rate limits (429), server errors (5xx) and transport failures return
    /// true. Client errors (other 4xx) and malformed input return false.
    fn is_retryable(&self) -> bool;

    /// Delay the server requested before the next attempt.
    ///
    /// `None` means the retry strategy picks the delay.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}
