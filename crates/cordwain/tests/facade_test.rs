//! End-to-end tests through the facade re-exports.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use cordwain::{
    CordwainConfig, CordwainError, CordwainErrorKind, DiscordErrorCode, HttpRequest, ReactionEmoji, RestClient,
    RestErrorKind, RestMethod, RestResponse, RestResult, Snowflake, Transport,
};
use std::sync::{Arc, Mutex};

/// Answers every request with one status and records method and URL.
struct RecordingTransport {
    status: u16,
    seen: Mutex<Vec<(RestMethod, String)>>,
}

impl RecordingTransport {
    fn new(status: u16) -> Arc<Self> {
        Arc::new(Self {
            status,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<(RestMethod, String)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> RestResult<RestResponse> {
        self.seen
            .lock()
            .unwrap()
            .push((request.method, request.url.clone()));
        let body = if self.status == 404 {
            br#"{"code":10008,"message":"Unknown Message"}"#.to_vec()
        } else {
            Vec::new()
        };
        Ok(RestResponse::new(self.status, Default::default(), body))
    }
}

fn config() -> CordwainConfig {
    let mut config = CordwainConfig::default();
    config.rest.base_url = "https://discord.test/api".to_string();
    config.rest.jitter = false;
    config.rate_limit.global_requests_per_second = None;
    config
}

#[tokio::test(start_paused = true)]
async fn test_mixed_age_deletion_through_facade() {
    let transport = RecordingTransport::new(204);
    let client = RestClient::with_transport("token", &config(), transport.clone());

    let now = Utc::now();
    let young: Vec<Snowflake> = (0..3)
        .map(|n| Snowflake::new(Snowflake::from_datetime(now - Duration::hours(2)).get() + n))
        .collect();
    let old = Snowflake::from_datetime(now - Duration::days(40));

    let mut ids = young.clone();
    ids.push(old);
    client
        .delete_messages(Snowflake::new(77), ids)
        .await
        .unwrap();

    let mut seen = transport.seen();
    seen.sort_by(|a, b| a.1.cmp(&b.1));
    assert_eq!(
        seen,
        vec![
            (
                RestMethod::Delete,
                format!("https://discord.test/api/v10/channels/77/messages/{}", old)
            ),
            (
                RestMethod::Post,
                "https://discord.test/api/v10/channels/77/messages/bulk-delete".to_string()
            ),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_custom_emoji_reaction_url() {
    let transport = RecordingTransport::new(204);
    let client = RestClient::with_transport("token", &config(), transport.clone());

    client
        .add_reaction_str("77", "1001", &ReactionEmoji::parse("<:blobwave:41771983423143937>"))
        .await
        .unwrap();

    assert_eq!(
        transport.seen(),
        vec![(
            RestMethod::Put,
            "https://discord.test/api/v10/channels/77/messages/1001/reactions/blobwave:41771983423143937/@me"
                .to_string()
        )]
    );
}

#[tokio::test(start_paused = true)]
async fn test_rest_errors_convert_to_cordwain_error() {
    let transport = RecordingTransport::new(404);
    let client = RestClient::with_transport("token", &config(), transport.clone());

    let err: CordwainError = client
        .delete_message(Snowflake::new(77), Snowflake::new(1001))
        .await
        .unwrap_err()
        .into();

    match err.kind() {
        CordwainErrorKind::Rest(rest) => {
            assert!(matches!(
                rest.kind(),
                RestErrorKind::Client { status: 404, .. }
            ));
            assert_eq!(rest.discord_code(), Some(DiscordErrorCode::UnknownMessage));
        }
        other => panic!("expected a REST error, got {other}"),
    }
    assert_eq!(transport.seen().len(), 1);
}

#[tokio::test]
async fn test_bad_id_fails_without_request() {
    let transport = RecordingTransport::new(204);
    let client = RestClient::with_transport("token", &config(), transport.clone());

    let err = client
        .delete_messages_str("77", ["1001", "not-an-id"])
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), RestErrorKind::MalformedInput(_)));
    assert!(transport.seen().is_empty());
}
