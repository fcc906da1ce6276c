//! Request dispatcher.
//!
//! `RestClient::execute` drives one [`RestRequest`] to completion:
//! - acquire a permit from the rate limiter for the request's bucket
//! - send through the [`Transport`]
//! - feed the response headers back into the limiter
//! - classify the outcome and retry 429s, 5xx and transport failures
//!
//! 429s are retried after exactly the delay Discord asks for. Server and
//! transport failures back off exponentially with jitter.

use crate::request::RestRequest;
use crate::transport::{HttpRequest, ReqwestTransport, RestResponse, Transport};
use cordwain_error::{RestError, RestErrorKind, RestResult, RetryableError};
use cordwain_rate_limit::{BucketKey, CordwainConfig, RateLimitHeaders, RateLimiter, RestConfig};
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialFactorBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, instrument, warn};

/// Delay used when a 429 names no retry-after at all.
const FALLBACK_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Body of a 429 response.
#[derive(Debug, Deserialize)]
struct RateLimitBody {
    retry_after: Option<f64>,
    #[serde(default)]
    global: bool,
}

/// Body of any other error response.
#[derive(Debug, Deserialize)]
struct DiscordErrorBody {
    code: Option<u32>,
    message: Option<String>,
}

/// Discord REST client with rate limiting and retries.
///
/// The client owns its [`RateLimiter`]; clones share it, so every request made
/// through one client (or its clones) is accounted together.
///
/// # Example
///
/// ```no_run
/// use cordwain_rate_limit::CordwainConfig;
/// use cordwain_rest::{RestClient, RestEndpoint, RestMethod, RestRequest};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CordwainConfig::load()?;
/// let client = RestClient::new(std::env::var("DISCORD_TOKEN")?, &config)?;
///
/// let me: serde_json::Value = client
///     .execute(RestRequest::new(RestMethod::Get, RestEndpoint::CurrentUser).expect_json())
///     .await?;
/// println!("Logged in as {}", me["username"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RestClient {
    authorization: String,
    config: RestConfig,
    limiter: RateLimiter,
    transport: Arc<dyn Transport>,
}

impl RestClient {
    /// Create a client talking to Discord over HTTPS.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: impl AsRef<str>, config: &CordwainConfig) -> RestResult<Self> {
        let transport = ReqwestTransport::new(&config.rest)?;
        Ok(Self::with_transport(token, config, Arc::new(transport)))
    }

    /// Create a client with a custom transport.
    pub fn with_transport(
        token: impl AsRef<str>,
        config: &CordwainConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            authorization: authorization_value(token.as_ref()),
            config: config.rest.clone(),
            limiter: RateLimiter::from_config(config),
            transport,
        }
    }

    /// Replace the rate limiter, e.g. to share one between clients of the same bot.
    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// The client's rate limiter.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// REST settings in use.
    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Execute a request, retrying per its budget.
    ///
    /// At most `retries + 1` attempts are made. Malformed requests fail before
    /// anything is sent.
    ///
    /// # Errors
    ///
    /// - `Client` for 4xx responses other than 429, without retrying
    /// - `RateLimited`, `Server` or `Transport` once the budget is spent
    /// - `MalformedInput` for requests that cannot be built
    /// - `Decode` if the decoder rejects a successful response
    #[instrument(
        skip(self, request),
        fields(method = %request.method(), endpoint = %request.endpoint())
    )]
    pub async fn execute<T>(&self, request: RestRequest<T>) -> RestResult<T> {
        let http = request.to_http(&self.config.api_url(), &self.authorization)?;
        let key = request.bucket_key();
        let retries = request
            .retry_budget()
            .unwrap_or(self.config.default_retries);
        let consumes_global = request.consumes_global();
        let reset_override = request.endpoint().hardcoded_ratelimit();

        debug!(
            bucket = %key,
            retries,
            body = %request.request_body().describe(),
            "Dispatching request"
        );

        let use_jitter = self.config.jitter;
        let strategy = ExponentialFactorBackoff::from_millis(self.config.initial_backoff_ms, 2.0)
            .max_delay(self.config.max_backoff())
            .map(move |delay| if use_jitter { jitter(delay) } else { delay })
            .take(retries as usize);

        let attempts = AtomicU32::new(0);
        let key = &key;
        let http = &http;
        let attempts_ref = &attempts;

        let response = Retry::spawn(strategy, || async move {
            let attempt = attempts_ref.fetch_add(1, Ordering::SeqCst) + 1;
            self.attempt(key, consumes_global, reset_override, http.clone())
                .await
                .map_err(|err| classify(err, attempt))
        })
        .await?;

        debug!(
            status = response.status,
            attempts = attempts.load(Ordering::SeqCst),
            "Request succeeded"
        );
        request.decode(&response)
    }

    /// One attempt: permit, send, reconcile, classify status.
    async fn attempt(
        &self,
        key: &BucketKey,
        consumes_global: bool,
        reset_override: Option<Duration>,
        http: HttpRequest,
    ) -> RestResult<RestResponse> {
        let permit = self.limiter.acquire(key, consumes_global).await;
        if !permit.waited().is_zero() {
            debug!(waited_ms = permit.waited().as_millis() as u64, "Permit granted");
        }

        let response = self.transport.send(http).await?;
        let headers = RateLimitHeaders::from_headers(&response.headers);
        self.limiter.update(key, &headers, reset_override).await;

        match response.status {
            200..=299 => Ok(response),
            429 => {
                let (retry_after, global) = rate_limit_details(&response, &headers);
                self.limiter.penalize(key, retry_after, global).await;
                Err(RestError::new(RestErrorKind::RateLimited {
                    retry_after,
                    global,
                }))
            }
            500..=599 => Err(RestError::new(RestErrorKind::Server {
                status: response.status,
                body: response.text(),
            })),
            status => {
                let parsed = response
                    .json_value()
                    .and_then(|v| serde_json::from_value::<DiscordErrorBody>(v).ok());
                let (code, message) = parsed
                    .map(|body| (body.code, body.message))
                    .unwrap_or((None, None));
                Err(RestError::new(RestErrorKind::Client {
                    status,
                    code,
                    message,
                    body: response.text(),
                }))
            }
        }
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("api_url", &self.config.api_url())
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

/// Map a failed attempt onto the retry policy.
fn classify(err: RestError, attempt: u32) -> RetryError<RestError> {
    if err.is_retryable() {
        let retry_after = err.retry_after();
        warn!(attempt, error = %err.kind(), "Request failed, will retry if budget remains");
        RetryError::Transient { err, retry_after }
    } else {
        debug!(attempt, error = %err.kind(), "Request failed permanently");
        RetryError::Permanent(err)
    }
}

/// Retry-after and global flag of a 429, preferring the JSON body.
fn rate_limit_details(response: &RestResponse, headers: &RateLimitHeaders) -> (Duration, bool) {
    let body = response
        .json_value()
        .and_then(|v| serde_json::from_value::<RateLimitBody>(v).ok());

    let retry_after = body
        .as_ref()
        .and_then(|b| b.retry_after)
        .and_then(|secs| Duration::try_from_secs_f64(secs.max(0.0)).ok())
        .or_else(|| headers.retry_after_duration())
        .or_else(|| headers.reset_after_duration())
        .unwrap_or(FALLBACK_RETRY_AFTER);

    let global = body.is_some_and(|b| b.global)
        || headers.global
        || headers.scope.as_deref() == Some("global");

    (retry_after, global)
}

/// `Authorization` header value for a token, adding the `Bot` prefix if missing.
fn authorization_value(token: &str) -> String {
    let token = token.trim();
    if token.starts_with("Bot ") || token.starts_with("Bearer ") {
        token.to_string()
    } else {
        format!("Bot {}", token)
    }
}
