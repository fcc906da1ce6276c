//! Tests for request dispatch, classification and retries.

mod test_utils;

use cordwain_error::{DiscordErrorCode, RestErrorKind};
use cordwain_rate_limit::BucketKey;
use cordwain_rest::{RestClient, RestEndpoint, RestMethod, RestRequest};
use std::sync::Arc;
use std::time::Duration;
use test_utils::{MockResponse, MockTransport, test_client};
use tokio::time::Instant;

fn delete_request(channel: &str, message: &str) -> RestRequest<()> {
    RestRequest::new(RestMethod::Delete, RestEndpoint::MessageDelete).url_params([channel, message])
}

#[tokio::test(start_paused = true)]
async fn test_success_makes_one_attempt() {
    let mock = Arc::new(MockTransport::new_always(MockResponse::no_content()));
    let client = test_client(&mock);

    client.execute(delete_request("1", "2")).await.unwrap();

    assert_eq!(mock.call_count(), 1);
    let request = &mock.requests()[0];
    assert_eq!(request.method, RestMethod::Delete);
    assert_eq!(request.url, "https://discord.test/api/v10/channels/1/messages/2");
    assert_eq!(request.header("authorization"), Some("Bot test-token"));
}

#[tokio::test(start_paused = true)]
async fn test_server_errors_stop_after_budget() {
    let mock = Arc::new(MockTransport::new_always(MockResponse::status(503, "unavailable")));
    let client = test_client(&mock);

    let err = client
        .execute(delete_request("1", "2").retries(3))
        .await
        .unwrap_err();

    assert_eq!(mock.call_count(), 4);
    assert!(matches!(err.kind(), RestErrorKind::Server { status: 503, .. }));
}

#[tokio::test(start_paused = true)]
async fn test_zero_budget_makes_single_attempt() {
    let mock = Arc::new(MockTransport::new_always(MockResponse::status(500, "")));
    let client = test_client(&mock);

    let err = client
        .execute(delete_request("1", "2").retries(0))
        .await
        .unwrap_err();

    assert_eq!(mock.call_count(), 1);
    assert_eq!(err.status(), Some(500));
}

#[tokio::test(start_paused = true)]
async fn test_server_error_then_success_recovers() {
    let mock = Arc::new(MockTransport::new_sequence(vec![
        MockResponse::status(502, "bad gateway"),
        MockResponse::status(500, ""),
    ]));
    let client = test_client(&mock);

    client.execute(delete_request("1", "2")).await.unwrap();
    assert_eq!(mock.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_transport_errors_are_retried() {
    let mock = Arc::new(MockTransport::new_sequence(vec![
        MockResponse::transport("connection reset by peer"),
        MockResponse::transport("operation timed out"),
    ]));
    let client = test_client(&mock);

    client.execute(delete_request("1", "2")).await.unwrap();
    assert_eq!(mock.call_count(), 3);

    let failing = Arc::new(MockTransport::new_always(MockResponse::transport("timed out")));
    let err = test_client(&failing)
        .execute(delete_request("1", "2").retries(2))
        .await
        .unwrap_err();
    assert_eq!(failing.call_count(), 3);
    assert!(matches!(err.kind(), RestErrorKind::Transport(_)));
}

#[tokio::test(start_paused = true)]
async fn test_client_error_is_not_retried() {
    let mock = Arc::new(MockTransport::new_always(MockResponse::discord_error(
        403,
        50013,
        "Missing Permissions",
    )));
    let client = test_client(&mock);

    let err = client.execute(delete_request("1", "2")).await.unwrap_err();

    assert_eq!(mock.call_count(), 1);
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.discord_code(), Some(DiscordErrorCode::MissingPermissions));
    match err.kind() {
        RestErrorKind::Client { message, body, .. } => {
            assert_eq!(message.as_deref(), Some("Missing Permissions"));
            assert!(body.contains("50013"));
        }
        other => panic!("expected client error, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_429_retries_once_after_retry_after() {
    let mock = Arc::new(MockTransport::new_sequence(vec![MockResponse::rate_limited(
        2.0, false,
    )]));
    let client = test_client(&mock);

    let start = Instant::now();
    client.execute(delete_request("1", "2")).await.unwrap();

    assert_eq!(mock.call_count(), 2);
    let times = mock.call_times();
    assert!(times[1] - times[0] >= Duration::from_secs(2));
    assert!(start.elapsed() >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_429_zeroes_bucket_until_reset() {
    let mock = Arc::new(MockTransport::new_always(MockResponse::rate_limited(2.0, false)));
    let client = test_client(&mock);

    let err = client
        .execute(delete_request("1", "2").retries(0))
        .await
        .unwrap_err();

    assert_eq!(mock.call_count(), 1);
    assert!(matches!(
        err.kind(),
        RestErrorKind::RateLimited { global: false, .. }
    ));

    let key = BucketKey::new("MESSAGE_DELETE", Some("1".to_string()));
    let snapshot = client.limiter().snapshot(&key).await.unwrap();
    assert_eq!(snapshot.remaining, Some(0));
    assert_eq!(snapshot.reset_in, Some(Duration::from_secs(2)));
}

#[tokio::test(start_paused = true)]
async fn test_429_budget_exhaustion_surfaces_rate_limited() {
    let mock = Arc::new(MockTransport::new_always(MockResponse::rate_limited(0.5, false)));
    let client = test_client(&mock);

    let err = client
        .execute(delete_request("1", "2").retries(2))
        .await
        .unwrap_err();

    assert_eq!(mock.call_count(), 3);
    assert_eq!(err.status(), Some(429));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_bucket_delays_next_request() {
    let mock = Arc::new(MockTransport::new_sequence(vec![
        MockResponse::no_content()
            .with_header("x-ratelimit-limit", "5")
            .with_header("x-ratelimit-remaining", "0")
            .with_header("x-ratelimit-reset-after", "3"),
    ]));
    let client = test_client(&mock);

    client.execute(delete_request("1", "2")).await.unwrap();
    // A different channel is a different bucket
    client.execute(delete_request("9", "2")).await.unwrap();
    client.execute(delete_request("1", "3")).await.unwrap();

    let times = mock.call_times();
    assert_eq!(times[1] - times[0], Duration::ZERO);
    assert!(times[2] - times[0] >= Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_global_429_spares_interaction_callbacks() {
    let mock = Arc::new(MockTransport::new_sequence(vec![MockResponse::rate_limited(
        5.0, true,
    )]));
    let client = test_client(&mock);

    let err = client
        .execute(delete_request("1", "2").retries(0))
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), RestErrorKind::RateLimited { global: true, .. }));

    let start = Instant::now();
    client
        .create_interaction_response(
            cordwain_core::Snowflake::new(77),
            "interaction-token",
            serde_json::json!({ "type": 4, "data": { "content": "pong" } }),
        )
        .await
        .unwrap();
    assert_eq!(start.elapsed(), Duration::ZERO);

    client.execute(delete_request("2", "3")).await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_global_429_spares_webhook_sends() {
    let mock = Arc::new(MockTransport::new_sequence(vec![
        MockResponse::rate_limited(5.0, true),
        MockResponse::json(200, serde_json::json!({ "id": "500", "content": "hi" })),
    ]));
    let client = test_client(&mock);

    let err = client
        .execute(delete_request("1", "2").retries(0))
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), RestErrorKind::RateLimited { global: true, .. }));

    let start = Instant::now();
    let message = client
        .execute_webhook(
            cordwain_core::Snowflake::new(9),
            "webhook-token",
            serde_json::json!({ "content": "hi" }),
            Vec::new(),
        )
        .await
        .unwrap();
    assert_eq!(message["id"], "500");
    assert_eq!(start.elapsed(), Duration::ZERO);

    client.execute(delete_request("2", "3")).await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_server_error_backoff_starts_at_initial_delay_and_doubles() {
    let mock = Arc::new(MockTransport::new_sequence(vec![
        MockResponse::status(502, "bad gateway"),
        MockResponse::status(502, "bad gateway"),
        MockResponse::status(502, "bad gateway"),
    ]));
    let mut config = test_utils::test_config();
    config.rest.initial_backoff_ms = 500;
    config.rest.max_backoff_secs = 30;
    let client = RestClient::with_transport("test-token", &config, mock.clone());

    client
        .execute(delete_request("1", "2").retries(5))
        .await
        .unwrap();

    let times = mock.call_times();
    let gaps: Vec<Duration> = times.windows(2).map(|w| w[1] - w[0]).collect();
    assert_eq!(
        gaps,
        vec![
            Duration::from_millis(500),
            Duration::from_secs(1),
            Duration::from_secs(2),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_backoff_is_capped_at_max_delay() {
    let mock = Arc::new(MockTransport::new_sequence(vec![
        MockResponse::status(503, ""),
        MockResponse::status(503, ""),
        MockResponse::status(503, ""),
    ]));
    let mut config = test_utils::test_config();
    config.rest.initial_backoff_ms = 600;
    config.rest.max_backoff_secs = 1;
    let client = RestClient::with_transport("test-token", &config, mock.clone());

    client
        .execute(delete_request("1", "2").retries(5))
        .await
        .unwrap();

    let times = mock.call_times();
    let gaps: Vec<Duration> = times.windows(2).map(|w| w[1] - w[0]).collect();
    assert_eq!(
        gaps,
        vec![
            Duration::from_millis(600),
            Duration::from_secs(1),
            Duration::from_secs(1),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_malformed_request_never_reaches_network() {
    let mock = Arc::new(MockTransport::new_always(MockResponse::no_content()));
    let client = test_client(&mock);

    let request = RestRequest::new(RestMethod::Get, RestEndpoint::ServerMember).url_params(["1"]);
    let err = client.execute(request).await.unwrap_err();

    assert!(matches!(err.kind(), RestErrorKind::MalformedInput(_)));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_decoder_failure_is_decode_error() {
    let mock = Arc::new(MockTransport::new_always(MockResponse::status(200, "not json")));
    let client = test_client(&mock);

    let request = RestRequest::new(RestMethod::Get, RestEndpoint::CurrentUser)
        .expect_json::<serde_json::Value>();
    let err = client.execute(request).await.unwrap_err();

    assert!(matches!(err.kind(), RestErrorKind::Decode(_)));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_json_response_is_decoded() {
    let mock = Arc::new(MockTransport::new_always(MockResponse::json(
        200,
        serde_json::json!({ "id": "80351110224678912", "username": "Nelly" }),
    )));
    let client = test_client(&mock);

    #[derive(serde::Deserialize)]
    struct User {
        id: cordwain_core::Snowflake,
        username: String,
    }

    let user: User = client
        .execute(RestRequest::new(RestMethod::Get, RestEndpoint::CurrentUser).expect_json())
        .await
        .unwrap();
    assert_eq!(user.id.get(), 80351110224678912);
    assert_eq!(user.username, "Nelly");
}

#[tokio::test(start_paused = true)]
async fn test_headers_and_query_reach_transport() {
    let mock = Arc::new(MockTransport::new_always(MockResponse::no_content()));
    let client = test_client(&mock);

    let request = delete_request("1", "2")
        .audit_log_reason("raid cleanup")
        .header("x-custom", "yes")
        .query("limit", 5);
    client.execute(request).await.unwrap();

    let sent = &mock.requests()[0];
    assert_eq!(sent.header("x-audit-log-reason"), Some("raid%20cleanup"));
    assert_eq!(sent.header("x-custom"), Some("yes"));
    assert!(sent.url.ends_with("/channels/1/messages/2?limit=5"));
}
