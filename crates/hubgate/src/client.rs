//! The authenticated gateway client.
//!
//! [`GatewayClient`] is the single integration point between a catalog and
//! the network: it owns the pooled transport, injects the auth headers, and
//! maps every outcome onto the unified error contract. One client instance
//! is meant to be shared by many concurrent callers.

use std::sync::Arc;

use http::{Method, header};
use secrecy::ExposeSecret;
use tracing::{debug, info};
use url::Url;

use hubgate_core::retry::{Backoff, ExponentialJitter};

use crate::config::ClientConfig;
use crate::error::{Error, Result, preview};
use crate::token::TokenSource;
use crate::transport::{PoolSettings, TransportCell, classify_request_error};

/// Authenticated, connection-pooled HTTP client for one gateway catalog.
///
/// Cloning is cheap and clones share the transport, configuration, and
/// lifecycle: closing any handle closes them all.
///
/// # Example
///
/// ```rust,no_run
/// use hubgate::{ClientConfig, GatewayClient};
/// use http::Method;
///
/// # async fn example() -> hubgate::Result<()> {
/// let config = ClientConfig::builder("https://gateway.example.com")
///     .path_prefix("/tpass/kmverse/outerapi/v1")
///     .api_key("...")
///     .build();
/// let client = GatewayClient::new(config, None)?;
///
/// let body = client.send(Method::GET, "/ping", None, None).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    token_source: Option<Arc<dyn TokenSource>>,
    transport: TransportCell,
    backoff: ExponentialJitter,
}

impl GatewayClient {
    /// Create a client from a config plus an optional token source.
    ///
    /// With a token source, every request fetches a token through it and
    /// carries `Authorization: Bearer <token>`. Without one, requests go out
    /// with only the API key and fixed headers (some catalogs are deployed
    /// unauthenticated behind the gateway).
    ///
    /// The pooled transport is not created here; it is built lazily on the
    /// first `send`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] for an empty, unparsable, or
    /// non-HTTP(S) base URL.
    pub fn new(
        mut config: ClientConfig,
        token_source: Option<Arc<dyn TokenSource>>,
    ) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(Error::InvalidUrl("base URL cannot be empty".into()));
        }

        config.base_url = config.base_url.trim_end_matches('/').to_string();

        let parsed: Url = config
            .base_url
            .parse()
            .map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(Error::InvalidUrl(format!(
                    "unsupported URL scheme '{scheme}', expected http or https"
                )));
            }
        }

        let backoff = ExponentialJitter::builder()
            .max_retries(config.retry.attempts)
            .base_delay(config.retry.base_delay)
            .build();

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                token_source,
                transport: TransportCell::new(),
                backoff,
            }),
        })
    }

    /// Issue one request and return the raw response body text.
    ///
    /// The target URL is `base_url + path_prefix + path_suffix`. A fresh
    /// token is fetched per call (and per retry) when a token source is
    /// configured. The body, if any, is serialized to JSON once up front.
    ///
    /// Response bodies are returned verbatim; deserializing them is the
    /// caller's business. Non-2xx statuses surface as [`Error::Status`],
    /// transport failures as [`Error::Transport`] / [`Error::Timeout`], and
    /// both are retried only within the configured [`RetryConfig`] bound
    /// (zero by default).
    ///
    /// [`RetryConfig`]: crate::config::RetryConfig
    #[tracing::instrument(skip(self, query, json_body))]
    pub async fn send(
        &self,
        method: Method,
        path_suffix: &str,
        query: Option<&[(&str, String)]>,
        json_body: Option<&(dyn erased_serde::Serialize + Send + Sync)>,
    ) -> Result<String> {
        let transport = self.ensure_transport()?;
        let url = self.compose_url(path_suffix)?;
        let body_bytes = json_body.map(serialize_body).transpose()?;

        self.inner
            .backoff
            .run(
                || self.dispatch(&transport, &method, &url, query, body_bytes.as_deref()),
                Error::is_retryable,
            )
            .await
    }

    /// Release the pooled transport.
    ///
    /// Never fails and may be called more than once; any `send` after the
    /// first `close` fails with [`Error::Closed`]. A `send` racing a `close`
    /// either completes against the still-open pool or gets
    /// [`Error::Closed`].
    pub fn close(&self) {
        self.inner.transport.close();
    }

    /// The normalized gateway origin this client talks to.
    pub fn base_url(&self) -> &str {
        &self.inner.config.base_url
    }

    /// The fixed per-catalog path prefix.
    pub fn path_prefix(&self) -> &str {
        &self.inner.config.path_prefix
    }

    fn ensure_transport(&self) -> Result<reqwest::Client> {
        let config = &self.inner.config;
        self.inner.transport.get_or_init(&PoolSettings {
            connect_timeout: config.connect_timeout,
            total_timeout: config.total_timeout,
            pool_limit: config.pool_limit,
            verify_tls: config.verify_tls,
        })
    }

    fn compose_url(&self, path_suffix: &str) -> Result<Url> {
        let config = &self.inner.config;
        let joined = format!("{}{}{}", config.base_url, config.path_prefix, path_suffix);
        joined
            .parse()
            .map_err(|e| Error::InvalidUrl(format!("{joined}: {e}")))
    }

    async fn dispatch(
        &self,
        transport: &reqwest::Client,
        method: &Method,
        url: &Url,
        query: Option<&[(&str, String)]>,
        body: Option<&[u8]>,
    ) -> Result<String> {
        let config = &self.inner.config;

        let mut request = transport
            .request(method.clone(), url.clone())
            .timeout(config.total_timeout)
            .header(header::CONTENT_TYPE, "application/json; charset=utf-8");

        if let Some(api_key) = &config.api_key {
            request = request.header("X-API-KEY", api_key.expose_secret());
        }
        for (name, value) in &config.extra_headers {
            request = request.header(name, value);
        }

        // A fresh token per dispatch, not cached here; see CachedTokenSource
        // for the opt-in caching strategy.
        if let Some(source) = &self.inner.token_source {
            let token = source.token().await?;
            request = request.bearer_auth(&token.access_token);
        }

        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(bytes) = body {
            request = request.body(bytes.to_vec());
        }

        info!(%method, %url, "dispatching gateway request");

        let response = request
            .send()
            .await
            .map_err(|e| classify_request_error(e, config.total_timeout))?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body: body_text,
            });
        }

        debug!(body = %preview(&body_text), "gateway response");
        Ok(body_text)
    }
}

fn serialize_body(body: &(dyn erased_serde::Serialize + Send + Sync)) -> Result<Vec<u8>> {
    serde_json::to_vec(body).map_err(Error::Protocol)
}
