//! REST dispatch errors.

use crate::{DiscordErrorCode, RetryableError};
use std::fmt;
use std::time::Duration;

/// Failure conditions of a single REST request or of a fan-out of requests.
#[derive(Debug, Clone)]
pub enum RestErrorKind {
    /// Discord rejected the request with a 4xx other than 429.
    Client {
        /// HTTP status code
        status: u16,
        /// Discord JSON error code, if the body carried one
        code: Option<u32>,
        /// Discord error message, if the body carried one
        message: Option<String>,
        /// Raw response body
        body: String,
    },
    /// Discord answered 429 and the retry budget ran out.
    RateLimited {
        /// Delay Discord asked for before the next attempt
        retry_after: Duration,
        /// Whether the limit hit was the global one
        global: bool,
    },
    /// Discord answered with a 5xx.
    Server {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },
    /// The request never produced an HTTP response (timeout, reset, DNS).
    Transport(String),
    /// Caller input was rejected before anything was sent.
    MalformedInput(String),
    /// A successful response body could not be decoded.
    Decode(String),
    /// Several sub-requests of one operation failed.
    Aggregate(Vec<RestError>),
}

impl fmt::Display for RestErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestErrorKind::Client {
                status,
                code,
                message,
                body,
            } => {
                write!(f, "Received a {} response from Discord", status)?;
                if let Some(code) = code {
                    write!(f, " with code {}", code)?;
                }
                match message {
                    Some(message) => write!(f, ": {}", message),
                    None if body.is_empty() => write!(f, " with empty body"),
                    None => write!(f, ": {}", body),
                }
            }
            RestErrorKind::RateLimited {
                retry_after,
                global,
            } => write!(
                f,
                "Ratelimited{} and ran out of retries (retry after {}ms)",
                if *global { " globally" } else { "" },
                retry_after.as_millis()
            ),
            RestErrorKind::Server { status, body } => {
                write!(f, "Discord server error {}: {}", status, body)
            }
            RestErrorKind::Transport(msg) => write!(f, "Transport error: {}", msg),
            RestErrorKind::MalformedInput(msg) => write!(f, "Malformed input: {}", msg),
            RestErrorKind::Decode(msg) => write!(f, "Failed to decode response: {}", msg),
            RestErrorKind::Aggregate(errors) => {
                write!(f, "{} requests failed", errors.len())?;
                for (i, err) in errors.iter().enumerate() {
                    write!(f, "; [{}] {}", i, err.kind())?;
                }
                Ok(())
            }
        }
    }
}

impl RestErrorKind {
    /// Check if this failure should be retried by the dispatcher.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RestErrorKind::RateLimited { .. }
                | RestErrorKind::Server { .. }
                | RestErrorKind::Transport(_)
        )
    }
}

/// REST error with source location tracking.
///
/// # Examples
///
/// ```
/// use cordwain_error::{RestError, RestErrorKind, RetryableError};
///
/// let err = RestError::new(RestErrorKind::Server {
///     status: 502,
///     body: String::new(),
/// });
/// assert!(err.is_retryable());
/// assert_eq!(err.status(), Some(502));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("REST Error: {} at line {} in {}", kind, line, file)]
pub struct RestError {
    kind: RestErrorKind,
    line: u32,
    file: &'static str,
}

impl RestError {
    /// Create a new RestError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RestErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a [`RestErrorKind::MalformedInput`] error.
    #[track_caller]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(RestErrorKind::MalformedInput(message.into()))
    }

    /// Shorthand for a [`RestErrorKind::Transport`] error.
    #[track_caller]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(RestErrorKind::Transport(message.into()))
    }

    /// Combine several failures into one.
    ///
    /// A single failure is returned unchanged; nested aggregates are flattened.
    #[track_caller]
    pub fn aggregate(errors: Vec<RestError>) -> Self {
        let mut flat = Vec::with_capacity(errors.len());
        for err in errors {
            match err.kind {
                RestErrorKind::Aggregate(inner) => flat.extend(inner),
                _ => flat.push(err),
            }
        }
        if flat.len() == 1 {
            if let Some(only) = flat.pop() {
                return only;
            }
        }
        Self::new(RestErrorKind::Aggregate(flat))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RestErrorKind {
        &self.kind
    }

    /// Source line where the error was created.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Source file where the error was created.
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// HTTP status of the response that caused this error, if any.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            RestErrorKind::Client { status, .. } | RestErrorKind::Server { status, .. } => {
                Some(*status)
            }
            RestErrorKind::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// The known Discord JSON error code carried by a client error.
    pub fn discord_code(&self) -> Option<DiscordErrorCode> {
        match &self.kind {
            RestErrorKind::Client {
                code: Some(code), ..
            } => DiscordErrorCode::from_code(*code),
            _ => None,
        }
    }

    /// All individual failures: the inner list of an aggregate, or `self`.
    pub fn failures(&self) -> Vec<&RestError> {
        match &self.kind {
            RestErrorKind::Aggregate(errors) => errors.iter().collect(),
            _ => vec![self],
        }
    }
}

impl RetryableError for RestError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_after(&self) -> Option<Duration> {
        match &self.kind {
            RestErrorKind::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Result type for REST operations.
pub type RestResult<T> = Result<T, RestError>;
