//! Scripted transport for testing.

use async_trait::async_trait;
use cordwain_error::{RestError, RestResult};
use cordwain_rest::{HttpRequest, RestResponse, Transport};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;

/// A single scripted outcome.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// An HTTP response
    Http(RestResponse),
    /// A failure to get any response
    Transport(String),
}

impl MockResponse {
    /// 204 No Content.
    pub fn no_content() -> Self {
        Self::status(204, "")
    }

    /// Response with a status and raw body.
    pub fn status(status: u16, body: &str) -> Self {
        MockResponse::Http(RestResponse::new(status, HeaderMap::new(), body.as_bytes().to_vec()))
    }

    /// Response with a JSON body.
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self::status(status, &body.to_string())
    }

    /// Discord error body `{code, message}`.
    pub fn discord_error(status: u16, code: u32, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "code": code, "message": message }))
    }

    /// 429 with a retry-after in seconds.
    pub fn rate_limited(retry_after: f64, global: bool) -> Self {
        Self::json(
            429,
            serde_json::json!({
                "message": "You are being rate limited.",
                "retry_after": retry_after,
                "global": global,
            }),
        )
        .with_header("retry-after", &retry_after.ceil().to_string())
    }

    /// Transport-level failure.
    pub fn transport(message: &str) -> Self {
        MockResponse::Transport(message.to_string())
    }

    /// Add a response header.
    pub fn with_header(self, name: &str, value: &str) -> Self {
        match self {
            MockResponse::Http(mut response) => {
                response.headers.insert(
                    HeaderName::from_bytes(name.as_bytes()).unwrap(),
                    HeaderValue::from_str(value).unwrap(),
                );
                MockResponse::Http(response)
            }
            other => other,
        }
    }

    fn into_result(self) -> RestResult<RestResponse> {
        match self {
            MockResponse::Http(response) => Ok(response),
            MockResponse::Transport(message) => Err(RestError::transport(message)),
        }
    }
}

type Responder = Box<dyn Fn(&HttpRequest) -> MockResponse + Send + Sync>;

enum Behavior {
    /// Pop scripted responses in order, then repeat the fallback
    Sequence {
        queue: Mutex<VecDeque<MockResponse>>,
        fallback: MockResponse,
    },
    /// Compute the response from the request
    Responder(Responder),
}

/// Transport that replays scripted responses and records every request.
pub struct MockTransport {
    behavior: Behavior,
    requests: Mutex<Vec<(Instant, HttpRequest)>>,
}

impl MockTransport {
    /// Replay `responses` in order, then answer 204 forever.
    pub fn new_sequence(responses: Vec<MockResponse>) -> Self {
        Self::new_sequence_then(responses, MockResponse::no_content())
    }

    /// Replay `responses` in order, then answer `fallback` forever.
    pub fn new_sequence_then(responses: Vec<MockResponse>, fallback: MockResponse) -> Self {
        Self {
            behavior: Behavior::Sequence {
                queue: Mutex::new(responses.into()),
                fallback,
            },
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `response`.
    pub fn new_always(response: MockResponse) -> Self {
        Self::new_sequence_then(Vec::new(), response)
    }

    /// Answer each request with the result of `responder`.
    pub fn new_responder<F>(responder: F) -> Self
    where
        F: Fn(&HttpRequest) -> MockResponse + Send + Sync + 'static,
    {
        Self {
            behavior: Behavior::Responder(Box::new(responder)),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of requests sent.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request sent, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, r)| r.clone())
            .collect()
    }

    /// When each request was sent.
    #[allow(dead_code)]
    pub fn call_times(&self) -> Vec<Instant> {
        self.requests.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> RestResult<RestResponse> {
        let response = match &self.behavior {
            Behavior::Sequence { queue, fallback } => queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| fallback.clone()),
            Behavior::Responder(responder) => responder(&request),
        };
        self.requests
            .lock()
            .unwrap()
            .push((Instant::now(), request));
        response.into_result()
    }
}
