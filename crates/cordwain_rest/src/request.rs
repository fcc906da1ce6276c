//! Pending REST requests.

use crate::body::RequestBody;
use crate::endpoint::{RestEndpoint, RestMethod};
use crate::transport::{HttpRequest, RestResponse};
use cordwain_error::{RestError, RestResult};
use cordwain_rate_limit::BucketKey;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use std::fmt;

/// Header Discord records in the guild audit log.
pub const AUDIT_LOG_REASON_HEADER: &str = "x-audit-log-reason";

/// Turns a successful response into the caller's value.
pub type Decoder<T> = Box<dyn Fn(&RestResponse) -> RestResult<T> + Send + Sync>;

/// A request waiting to be executed by a [`crate::RestClient`].
///
/// Built with chained setters and consumed by `execute`. The decoder runs
/// only on 2xx responses.
///
/// # Examples
///
/// ```
/// use cordwain_rest::{RestEndpoint, RestMethod, RestRequest};
///
/// let request = RestRequest::new(RestMethod::Delete, RestEndpoint::MessageDelete)
///     .url_params(["41771983423143937", "1001"])
///     .audit_log_reason("spam")
///     .retries(250);
///
/// assert_eq!(request.major_parameter(), Some("41771983423143937"));
/// assert_eq!(
///     request.resolve_url("https://discord.com/api/v10").unwrap(),
///     "https://discord.com/api/v10/channels/41771983423143937/messages/1001"
/// );
/// ```
pub struct RestRequest<T> {
    method: RestMethod,
    endpoint: RestEndpoint,
    url_params: Vec<String>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: RequestBody,
    audit_log_reason: Option<String>,
    include_authorization: bool,
    consumes_global: bool,
    custom_major: Option<String>,
    retries: Option<u32>,
    decoder: Decoder<T>,
}

impl RestRequest<()> {
    /// Create a request whose response body is ignored.
    pub fn new(method: RestMethod, endpoint: RestEndpoint) -> Self {
        Self {
            method,
            endpoint,
            url_params: Vec::new(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
            audit_log_reason: None,
            include_authorization: true,
            consumes_global: endpoint.consumes_global(),
            custom_major: None,
            retries: endpoint.default_retries(),
            decoder: Box::new(|_| Ok(())),
        }
    }
}

impl<T> RestRequest<T> {
    /// Replace the decoder, changing the result type.
    pub fn decode_with<U, F>(self, decoder: F) -> RestRequest<U>
    where
        F: Fn(&RestResponse) -> RestResult<U> + Send + Sync + 'static,
    {
        RestRequest {
            method: self.method,
            endpoint: self.endpoint,
            url_params: self.url_params,
            query: self.query,
            headers: self.headers,
            body: self.body,
            audit_log_reason: self.audit_log_reason,
            include_authorization: self.include_authorization,
            consumes_global: self.consumes_global,
            custom_major: self.custom_major,
            retries: self.retries,
            decoder: Box::new(decoder),
        }
    }

    /// Decode the response body as JSON.
    pub fn expect_json<U: DeserializeOwned + 'static>(self) -> RestRequest<U> {
        self.decode_with(RestResponse::json::<U>)
    }

    /// Set the path parameters, in template order.
    pub fn url_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.url_params = params.into_iter().map(|p| p.to_string()).collect();
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the body.
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Set the audit log reason; empty reasons are not sent.
    pub fn audit_log_reason(mut self, reason: impl Into<String>) -> Self {
        self.audit_log_reason = Some(reason.into());
        self
    }

    /// Set the audit log reason if one is given.
    pub fn maybe_audit_log_reason(self, reason: Option<&str>) -> Self {
        match reason {
            Some(reason) => self.audit_log_reason(reason),
            None => self,
        }
    }

    /// Send the bot token or not.
    ///
    /// Webhook executions and interaction callbacks authenticate with the
    /// token in their URL instead.
    pub fn include_authorization_header(mut self, include: bool) -> Self {
        self.include_authorization = include;
        self
    }

    /// Whether the request counts toward the global rate limit.
    pub fn consumes_global_ratelimit(mut self, consumes: bool) -> Self {
        self.consumes_global = consumes;
        self
    }

    /// Scope the rate limit to a parameter not present in the URL.
    pub fn custom_major_parameter(mut self, major: impl Into<String>) -> Self {
        self.custom_major = Some(major.into());
        self
    }

    /// Set the retry budget: at most `retries + 1` attempts are made.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// HTTP method.
    pub fn method(&self) -> RestMethod {
        self.method
    }

    /// Endpoint.
    pub fn endpoint(&self) -> RestEndpoint {
        self.endpoint
    }

    /// Path parameters.
    pub fn url_parameters(&self) -> &[String] {
        &self.url_params
    }

    /// Request body.
    pub fn request_body(&self) -> &RequestBody {
        &self.body
    }

    /// Whether the bot token will be sent.
    pub fn includes_authorization(&self) -> bool {
        self.include_authorization
    }

    /// Whether the request counts toward the global rate limit.
    pub fn consumes_global(&self) -> bool {
        self.consumes_global
    }

    /// Explicit retry budget, if one was set.
    pub fn retry_budget(&self) -> Option<u32> {
        self.retries
    }

    /// The parameter Discord scopes this request's rate limit to.
    pub fn major_parameter(&self) -> Option<&str> {
        self.custom_major
            .as_deref()
            .or_else(|| self.endpoint.major_parameter(&self.url_params))
    }

    /// Rate limit bucket of this request.
    pub fn bucket_key(&self) -> BucketKey {
        BucketKey::new(
            self.endpoint.as_ref(),
            self.major_parameter().map(str::to_string),
        )
    }

    /// Absolute URL including the query string.
    ///
    /// # Errors
    ///
    /// Returns a malformed-input error when path parameters are missing.
    #[track_caller]
    pub fn resolve_url(&self, api_url: &str) -> RestResult<String> {
        let path = self.endpoint.resolve_path(&self.url_params)?;
        let mut url = format!("{}{}", api_url.trim_end_matches('/'), path);
        for (i, (key, value)) in self.query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        Ok(url)
    }

    /// Headers for the wire, given the `Authorization` value of the client.
    ///
    /// # Errors
    ///
    /// Returns a malformed-input error when a header name or value is invalid.
    #[track_caller]
    pub fn build_headers(&self, authorization: &str) -> RestResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        if self.include_authorization {
            headers.insert(AUTHORIZATION, header_value(authorization)?);
        }

        if let Some(reason) = self.audit_log_reason.as_deref().filter(|r| !r.is_empty()) {
            headers.insert(
                HeaderName::from_static(AUDIT_LOG_REASON_HEADER),
                header_value(&urlencoding::encode(reason))?,
            );
        }

        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RestError::malformed(format!("Invalid header name '{}': {}", name, e)))?;
            headers.insert(name, header_value(value)?);
        }

        Ok(headers)
    }

    /// Resolve everything needed to send the request.
    #[track_caller]
    pub fn to_http(&self, api_url: &str, authorization: &str) -> RestResult<HttpRequest> {
        Ok(HttpRequest {
            method: self.method,
            url: self.resolve_url(api_url)?,
            headers: self.build_headers(authorization)?,
            body: self.body.clone(),
        })
    }

    /// Run the decoder on a successful response.
    pub fn decode(&self, response: &RestResponse) -> RestResult<T> {
        (self.decoder)(response)
    }
}

impl<T> fmt::Debug for RestRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestRequest")
            .field("method", &self.method)
            .field("endpoint", &self.endpoint)
            .field("url_params", &self.url_params)
            .field("query", &self.query)
            .field("body", &self.body.describe())
            .field("include_authorization", &self.include_authorization)
            .field("consumes_global", &self.consumes_global)
            .field("custom_major", &self.custom_major)
            .field("retries", &self.retries)
            .finish_non_exhaustive()
    }
}

#[track_caller]
fn header_value(value: &str) -> RestResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| RestError::malformed(format!("Invalid header value: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_parameters_are_encoded() {
        let request = RestRequest::new(RestMethod::Get, RestEndpoint::Reaction)
            .url_params(["1", "2", "👍"])
            .query("limit", 100)
            .query("after", "a b");
        assert_eq!(
            request.resolve_url("https://discord.com/api/v10/").unwrap(),
            "https://discord.com/api/v10/channels/1/messages/2/reactions/%F0%9F%91%8D?limit=100&after=a%20b"
        );
    }

    #[test]
    fn audit_log_reason_is_percent_encoded() {
        let headers = RestRequest::new(RestMethod::Delete, RestEndpoint::MessageDelete)
            .url_params(["1", "2"])
            .audit_log_reason("cleaning up spam")
            .build_headers("Bot abc")
            .unwrap();
        assert_eq!(headers[AUDIT_LOG_REASON_HEADER], "cleaning%20up%20spam");
        assert_eq!(headers[AUTHORIZATION], "Bot abc");
    }

    #[test]
    fn empty_reason_and_suppressed_auth_send_nothing() {
        let headers = RestRequest::new(RestMethod::Post, RestEndpoint::WebhookSend)
            .url_params(["1", "token"])
            .audit_log_reason("")
            .include_authorization_header(false)
            .build_headers("Bot abc")
            .unwrap();
        assert!(headers.is_empty());
    }

    #[test]
    fn custom_major_parameter_wins() {
        let request = RestRequest::new(RestMethod::Get, RestEndpoint::User)
            .url_params(["5"])
            .custom_major_parameter("guild-7");
        assert_eq!(request.bucket_key(), BucketKey::new("USER", Some("guild-7".into())));

        let plain = RestRequest::new(RestMethod::Get, RestEndpoint::User).url_params(["5"]);
        assert_eq!(plain.bucket_key(), BucketKey::new("USER", None));
    }

    #[test]
    fn endpoint_defaults_apply() {
        let delete = RestRequest::new(RestMethod::Delete, RestEndpoint::MessageDelete);
        assert_eq!(delete.retry_budget(), Some(250));
        let callback = RestRequest::new(RestMethod::Post, RestEndpoint::InteractionResponse);
        assert!(!callback.consumes_global());
        assert_eq!(callback.retry_budget(), None);
    }

    #[test]
    fn decoder_runs_on_response() {
        let request = RestRequest::new(RestMethod::Get, RestEndpoint::CurrentUser)
            .expect_json::<serde_json::Value>();
        let response = RestResponse::new(200, HeaderMap::new(), br#"{"id":"1"}"#.to_vec());
        assert_eq!(request.decode(&response).unwrap()["id"], "1");

        let garbage = RestResponse::new(200, HeaderMap::new(), b"nope".to_vec());
        assert!(request.decode(&garbage).is_err());
    }
}
