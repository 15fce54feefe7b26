//! Integration tests for the token provider against a wiremock server.

use std::time::Duration;

use hubgate::{ApiHubTokenProvider, Error, TokenCredentials};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials(server: &MockServer) -> TokenCredentials {
    TokenCredentials::new(
        format!("{}/token", server.uri()),
        "gateway-key",
        "svc_account",
        "hunter2",
    )
}

#[tokio::test]
async fn exchanges_form_credentials_for_a_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("x-api-key", "gateway-key"))
        .and(header("accept", "application/json;odata=verbose"))
        .and(body_string_contains("username=svc_account"))
        .and(body_string_contains("password=hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"access_token":"abc123","token_type":"Bearer","expires_in":3600}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let provider = ApiHubTokenProvider::new(credentials(&server)).unwrap();
    let token = provider.fetch_token().await.unwrap();

    assert_eq!(token.access_token, "abc123");
    assert_eq!(token.claims["token_type"], "Bearer");
    assert_eq!(token.claims["expires_in"], 3600);

    server.verify().await;
}

#[tokio::test]
async fn each_fetch_is_one_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"access_token":"abc123"}"#),
        )
        .expect(2)
        .mount(&server)
        .await;

    let provider = ApiHubTokenProvider::new(credentials(&server)).unwrap();
    provider.fetch_token().await.unwrap();
    provider.fetch_token().await.unwrap();

    server.verify().await;
}

#[tokio::test]
async fn server_errors_are_retried_then_surface_as_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
        .expect(2) // initial attempt + the default single retry
        .mount(&server)
        .await;

    let provider = ApiHubTokenProvider::builder(credentials(&server))
        .retry(1, Duration::from_millis(1))
        .build()
        .unwrap();

    let err = provider.fetch_token().await.unwrap_err();
    match err {
        Error::Auth(message) => {
            assert!(message.contains("503"), "message was: {message}");
            assert!(message.contains("try later"), "message was: {message}");
        }
        other => panic!("expected Auth error, got {other:?}"),
    }

    server.verify().await;
}

#[tokio::test]
async fn client_errors_fail_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = ApiHubTokenProvider::builder(credentials(&server))
        .retry(3, Duration::from_millis(1))
        .build()
        .unwrap();

    let err = provider.fetch_token().await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)), "got {err:?}");

    server.verify().await;
}

#[tokio::test]
async fn transient_failure_recovers_on_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"access_token":"abc123"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = ApiHubTokenProvider::builder(credentials(&server))
        .retry(1, Duration::from_millis(1))
        .build()
        .unwrap();

    let token = provider.fetch_token().await.unwrap();
    assert_eq!(token.access_token, "abc123");

    server.verify().await;
}

#[tokio::test]
async fn non_json_body_is_an_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login page</html>"))
        .mount(&server)
        .await;

    let provider = ApiHubTokenProvider::new(credentials(&server)).unwrap();
    let err = provider.fetch_token().await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)), "got {err:?}");
}

#[tokio::test]
async fn missing_access_token_is_an_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"detail":"ok"}"#))
        .mount(&server)
        .await;

    let provider = ApiHubTokenProvider::new(credentials(&server)).unwrap();
    let err = provider.fetch_token().await.unwrap_err();
    match err {
        Error::Auth(message) => assert!(message.contains("access_token")),
        other => panic!("expected Auth error, got {other:?}"),
    }
}

#[tokio::test]
async fn multibyte_access_token_survives_debug_logging() {
    // The token is opaque and may be arbitrary UTF-8; the refresh log
    // truncates it, which must not split a multi-byte character. A debug
    // subscriber forces the log fields to actually be rendered.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::io::sink)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"access_token":"中中中中"}"#),
        )
        .mount(&server)
        .await;

    let provider = ApiHubTokenProvider::new(credentials(&server)).unwrap();
    let handle = tokio::spawn(async move { provider.fetch_token().await });

    let token = handle.await.expect("fetch task panicked").unwrap();
    assert_eq!(token.access_token, "中中中中");
}

#[tokio::test]
async fn empty_access_token_is_an_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"access_token":""}"#))
        .mount(&server)
        .await;

    let provider = ApiHubTokenProvider::new(credentials(&server)).unwrap();
    let err = provider.fetch_token().await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)), "got {err:?}");
}
