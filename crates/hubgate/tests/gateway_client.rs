//! Integration tests for the gateway client against a wiremock server.

mod common;

use std::sync::Arc;
use std::time::Duration;

use hubgate::{
    ApiHubTokenProvider, ClientConfig, Error, GatewayClient, Method, TokenCredentials,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::StaticTokenSource;

fn unauthenticated_client(server: &MockServer) -> GatewayClient {
    GatewayClient::new(ClientConfig::builder(server.uri()).build(), None).unwrap()
}

#[tokio::test]
async fn ping_round_trip_returns_raw_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = unauthenticated_client(&server);
    let body = client.send(Method::GET, "/ping", None, None).await.unwrap();

    assert_eq!(body, r#"{"ok":true}"#);
    server.verify().await;
}

#[tokio::test]
async fn sends_gateway_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/kb/status"))
        .and(header("x-api-key", "gateway-key"))
        .and(header("km-verse-key", "verse-key"))
        .and(header("content-type", "application/json; charset=utf-8"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::builder(server.uri())
        .path_prefix("/kb")
        .api_key("gateway-key")
        .header("km-verse-key", "verse-key")
        .unwrap()
        .build();
    let client =
        GatewayClient::new(config, Some(Arc::new(StaticTokenSource::new("abc123")))).unwrap();

    client.send(Method::GET, "/status", None, None).await.unwrap();
    server.verify().await;
}

#[tokio::test]
async fn bearer_token_comes_from_the_token_endpoint() {
    let token_server = MockServer::start().await;
    let domain_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("x-api-key", "token-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"access_token":"abc123"}"#),
        )
        .expect(1)
        .mount(&token_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&domain_server)
        .await;

    let provider = ApiHubTokenProvider::new(TokenCredentials::new(
        format!("{}/token", token_server.uri()),
        "token-key",
        "svc",
        "secret",
    ))
    .unwrap();

    let client = GatewayClient::new(
        ClientConfig::builder(domain_server.uri()).build(),
        Some(Arc::new(provider)),
    )
    .unwrap();

    client.send(Method::GET, "/ping", None, None).await.unwrap();

    token_server.verify().await;
    domain_server.verify().await;
}

#[tokio::test]
async fn fetches_a_fresh_token_per_call() {
    let token_server = MockServer::start().await;
    let domain_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"access_token":"abc123"}"#),
        )
        .expect(3)
        .mount(&token_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(3)
        .mount(&domain_server)
        .await;

    let provider = ApiHubTokenProvider::new(TokenCredentials::new(
        format!("{}/token", token_server.uri()),
        "k",
        "svc",
        "secret",
    ))
    .unwrap();

    let client = GatewayClient::new(
        ClientConfig::builder(domain_server.uri()).build(),
        Some(Arc::new(provider)),
    )
    .unwrap();

    for _ in 0..3 {
        client.send(Method::GET, "/ping", None, None).await.unwrap();
    }

    token_server.verify().await;
}

#[tokio::test]
async fn query_params_are_appended() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/documents"))
        .and(query_param("page", "2"))
        .and(query_param("rows", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let client = unauthenticated_client(&server);
    let query = [("page", "2".to_string()), ("rows", "50".to_string())];
    client
        .send(Method::GET, "/documents", Some(&query[..]), None)
        .await
        .unwrap();

    server.verify().await;
}

#[tokio::test]
async fn not_found_surfaces_status_error_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such thing"))
        .expect(1)
        .mount(&server)
        .await;

    // Retries are configured, but a 4xx must not consume them.
    let config = ClientConfig::builder(server.uri())
        .retry(2, Duration::from_millis(1))
        .build();
    let client = GatewayClient::new(config, None).unwrap();

    let err = client
        .send(Method::GET, "/missing", None, None)
        .await
        .unwrap_err();
    match err {
        Error::Status { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "no such thing");
        }
        other => panic!("expected Status error, got {other:?}"),
    }

    server.verify().await;
}

#[tokio::test]
async fn server_errors_retry_up_to_the_configured_bound() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(3) // initial attempt + 2 retries
        .mount(&server)
        .await;

    let config = ClientConfig::builder(server.uri())
        .retry(2, Duration::from_millis(1))
        .build();
    let client = GatewayClient::new(config, None).unwrap();

    let err = client
        .send(Method::GET, "/flaky", None, None)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));

    server.verify().await;
}

#[tokio::test]
async fn server_error_recovers_when_a_retry_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::builder(server.uri())
        .retry(1, Duration::from_millis(1))
        .build();
    let client = GatewayClient::new(config, None).unwrap();

    let body = client.send(Method::GET, "/flaky", None, None).await.unwrap();
    assert_eq!(body, "recovered");

    server.verify().await;
}

#[tokio::test]
async fn default_policy_does_not_retry_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = unauthenticated_client(&server);
    let err = client.send(Method::GET, "/down", None, None).await.unwrap_err();
    assert_eq!(err.status(), Some(500));

    server.verify().await;
}

#[tokio::test]
async fn connection_refused_maps_to_transport_error() {
    // Nothing is listening on this port.
    let client = GatewayClient::new(
        ClientConfig::builder("http://127.0.0.1:9")
            .connect_timeout(Duration::from_millis(200))
            .total_timeout(Duration::from_millis(500))
            .build(),
        None,
    )
    .unwrap();

    let err = client.send(Method::GET, "/ping", None, None).await.unwrap_err();
    assert!(
        matches!(err, Error::Transport(_) | Error::Timeout(_)),
        "expected a transport-level error, got {err:?}"
    );
}

#[tokio::test]
async fn concurrent_sends_share_one_pool_and_all_succeed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(32)
        .mount(&server)
        .await;

    let config = ClientConfig::builder(server.uri()).pool_limit(4).build();
    let client = GatewayClient::new(config, None).unwrap();

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.send(Method::GET, "/ping", None, None).await })
        })
        .collect();

    for task in tasks {
        let body = task.await.unwrap().unwrap();
        assert_eq!(body, r#"{"ok":true}"#);
    }

    server.verify().await;
}

#[tokio::test]
async fn close_is_idempotent_and_terminal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let client = unauthenticated_client(&server);
    client.send(Method::GET, "/ping", None, None).await.unwrap();

    client.close();
    client.close();

    let err = client.send(Method::GET, "/ping", None, None).await.unwrap_err();
    assert!(matches!(err, Error::Closed));
}

#[test]
fn blocking_client_drives_the_same_pipeline() {
    // The mock server needs a runtime of its own; the blocking client brings
    // a separate dedicated one.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();
    let server = runtime.block_on(MockServer::start());

    runtime.block_on(
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
            .expect(1)
            .mount(&server),
    );

    let client =
        hubgate::blocking::GatewayClient::new(ClientConfig::builder(server.uri()).build(), None)
            .unwrap();

    let body = client.send(Method::GET, "/ping", None, None).unwrap();
    assert_eq!(body, r#"{"ok":true}"#);

    client.close();
    assert!(matches!(
        client.send(Method::GET, "/ping", None, None),
        Err(Error::Closed)
    ));

    runtime.block_on(server.verify());
}
