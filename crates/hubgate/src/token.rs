//! Token acquisition against the gateway's token endpoint.
//!
//! [`ApiHubTokenProvider`] exchanges credentials for a bearer token over a
//! single retried call. It performs a fresh exchange on every call — there
//! is no implicit caching. Callers that want caching wrap any
//! [`TokenSource`] in [`CachedTokenSource`], which is an explicit, visible
//! strategy rather than hidden client behavior.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use http::header;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use hubgate_core::retry::{Backoff, ExponentialJitter};

use crate::error::{Error, Result, preview, truncate_utf8};
use crate::transport::{PoolSettings, TransportCell, classify_request_error};

/// Credentials for the token endpoint. Immutable after construction and
/// owned exclusively by one provider instance.
#[derive(Clone)]
pub struct TokenCredentials {
    /// Full URL of the token endpoint.
    pub token_url: String,
    /// Value for the `X-API-KEY` header.
    pub api_key: SecretString,
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: SecretString,
}

impl TokenCredentials {
    /// Build credentials from owned strings; secrets are wrapped so they
    /// never appear in `Debug` output.
    pub fn new(
        token_url: impl Into<String>,
        api_key: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            token_url: token_url.into(),
            api_key: SecretString::new(api_key.into().into_boxed_str()),
            username: username.into(),
            password: SecretString::new(password.into().into_boxed_str()),
        }
    }
}

impl fmt::Debug for TokenCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCredentials")
            .field("token_url", &self.token_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// A bearer token plus the raw claims it arrived with.
///
/// The token has no lifecycle of its own: it is produced by a
/// [`TokenSource`] and consumed once per request.
#[derive(Clone)]
pub struct Token {
    /// The opaque bearer credential.
    pub access_token: String,
    /// The full JSON response the token endpoint returned.
    pub claims: serde_json::Value,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Anything that can produce a bearer token for a request.
///
/// The gateway client consumes this seam; [`ApiHubTokenProvider`] is the
/// standard implementation and [`CachedTokenSource`] the optional caching
/// decorator.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Produce a token for one request.
    async fn token(&self) -> Result<Token>;
}

/// Token client for the shared API gateway.
///
/// Owns its own lazily created pooled transport and retry policy; safe for
/// concurrent reuse. Every [`fetch_token`](Self::fetch_token) call posts the
/// credentials form-encoded with the API key header and parses the JSON
/// response for `access_token`.
pub struct ApiHubTokenProvider {
    credentials: TokenCredentials,
    connect_timeout: Duration,
    total_timeout: Duration,
    pool_limit: usize,
    verify_tls: bool,
    backoff: ExponentialJitter,
    transport: TransportCell,
}

impl ApiHubTokenProvider {
    /// Create a provider with default timeouts (5s connect, 10s total), a
    /// pool of 100 connections, and a single jittered retry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the token URL does not parse or has
    /// a non-HTTP scheme.
    pub fn new(credentials: TokenCredentials) -> Result<Self> {
        Self::builder(credentials).build()
    }

    /// Create a builder for custom timeouts and retry policy.
    pub fn builder(credentials: TokenCredentials) -> ApiHubTokenProviderBuilder {
        ApiHubTokenProviderBuilder {
            credentials,
            connect_timeout: Duration::from_secs(5),
            total_timeout: Duration::from_secs(10),
            pool_limit: 100,
            verify_tls: true,
            retry_attempts: 1,
            retry_base_delay: Duration::from_millis(500),
        }
    }

    /// Exchange the credentials for a fresh token.
    ///
    /// Transport failures and 5xx responses are retried up to the configured
    /// bound with exponential jitter; any non-2xx left standing after that
    /// surfaces as [`Error::Auth`], as do malformed token responses.
    pub async fn fetch_token(&self) -> Result<Token> {
        let transport = self.transport.get_or_init(&self.pool_settings())?;

        self.backoff
            .run(|| self.request_token(&transport), Error::is_retryable)
            .await
            .map_err(|err| match err {
                Error::Status { status, body } => Error::Auth(format!(
                    "token endpoint returned status {status}: {}",
                    preview(&body)
                )),
                other => other,
            })
    }

    /// Release the pooled transport. Idempotent; later calls to
    /// [`fetch_token`](Self::fetch_token) fail with [`Error::Closed`].
    pub fn close(&self) {
        self.transport.close();
    }

    async fn request_token(&self, transport: &reqwest::Client) -> Result<Token> {
        debug!(username = %self.credentials.username, "requesting gateway token");

        let response = transport
            .post(&self.credentials.token_url)
            .header("X-API-KEY", self.credentials.api_key.expose_secret())
            .header(header::ACCEPT, "application/json;odata=verbose")
            .form(&[
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| classify_request_error(e, self.total_timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        let claims: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| Error::Auth(format!("token response was not valid JSON: {e}")))?;
        let access_token = claims
            .get("access_token")
            .and_then(serde_json::Value::as_str)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Auth("token response missing access_token".into()))?
            .to_string();

        debug!(
            token_prefix = %truncate_utf8(&access_token, 8),
            "access token refreshed"
        );

        Ok(Token {
            access_token,
            claims,
        })
    }

    fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            connect_timeout: self.connect_timeout,
            total_timeout: self.total_timeout,
            pool_limit: self.pool_limit,
            verify_tls: self.verify_tls,
        }
    }
}

#[async_trait]
impl TokenSource for ApiHubTokenProvider {
    async fn token(&self) -> Result<Token> {
        self.fetch_token().await
    }
}

/// Builder for [`ApiHubTokenProvider`].
pub struct ApiHubTokenProviderBuilder {
    credentials: TokenCredentials,
    connect_timeout: Duration,
    total_timeout: Duration,
    pool_limit: usize,
    verify_tls: bool,
    retry_attempts: u32,
    retry_base_delay: Duration,
}

impl ApiHubTokenProviderBuilder {
    /// Set the TCP connect timeout. Default: 5s.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the end-to-end request timeout. Default: 10s.
    pub fn total_timeout(mut self, timeout: Duration) -> Self {
        self.total_timeout = timeout;
        self
    }

    /// Set the connection pool bound. Default: 100.
    pub fn pool_limit(mut self, limit: usize) -> Self {
        self.pool_limit = limit;
        self
    }

    /// Set the retry policy for token requests. Default: 1 retry, 500ms
    /// base delay.
    pub fn retry(mut self, attempts: u32, base_delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_base_delay = base_delay;
        self
    }

    /// Disable TLS certificate verification (explicit, logged opt-in).
    pub fn danger_accept_invalid_certs(mut self) -> Self {
        self.verify_tls = false;
        self
    }

    /// Build the provider, validating the token URL.
    pub fn build(self) -> Result<ApiHubTokenProvider> {
        let url: Url = self
            .credentials
            .token_url
            .parse()
            .map_err(|e| Error::InvalidUrl(format!("{}: {e}", self.credentials.token_url)))?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(Error::InvalidUrl(format!(
                    "unsupported URL scheme '{scheme}', expected http or https"
                )));
            }
        }

        Ok(ApiHubTokenProvider {
            credentials: self.credentials,
            connect_timeout: self.connect_timeout,
            total_timeout: self.total_timeout,
            pool_limit: self.pool_limit,
            verify_tls: self.verify_tls,
            backoff: ExponentialJitter::builder()
                .max_retries(self.retry_attempts)
                .base_delay(self.retry_base_delay)
                .build(),
            transport: TransportCell::new(),
        })
    }
}

/// Caching decorator around any [`TokenSource`].
///
/// Holds the last token for `ttl` and re-fetches after it lapses. The inner
/// source still sees exactly one request per cache miss.
pub struct CachedTokenSource {
    inner: Arc<dyn TokenSource>,
    ttl: Duration,
    cached: tokio::sync::Mutex<Option<(Instant, Token)>>,
}

impl CachedTokenSource {
    /// Wrap `inner`, caching each token for `ttl`.
    pub fn new(inner: Arc<dyn TokenSource>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cached: tokio::sync::Mutex::new(None),
        }
    }
}

#[async_trait]
impl TokenSource for CachedTokenSource {
    async fn token(&self) -> Result<Token> {
        let mut slot = self.cached.lock().await;

        if let Some((fetched_at, token)) = &*slot
            && fetched_at.elapsed() < self.ttl
        {
            return Ok(token.clone());
        }

        let fresh = self.inner.token().await?;
        *slot = Some((Instant::now(), fresh.clone()));
        Ok(fresh)
    }
}
