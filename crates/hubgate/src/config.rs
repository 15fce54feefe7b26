//! Configuration for the gateway client.
//!
//! All tunables live in explicit config values passed at construction; there
//! are no module-level mutable globals. Defaults mirror the gateway's
//! production settings: 5s connect / 20s total timeouts, a pool of 100
//! connections, no domain-call retries, strict TLS.

use http::{HeaderMap, HeaderName, HeaderValue};
use secrecy::SecretString;
use std::time::Duration;

use crate::error::{Error, Result};

/// Configuration for a [`GatewayClient`](crate::GatewayClient).
///
/// `base_url` is the gateway origin; `path_prefix` is the fixed per-catalog
/// segment every request path is appended to. Both are immutable for the
/// lifetime of the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Gateway origin, e.g. `https://gateway.example.com` (no trailing slash).
    pub base_url: String,

    /// Fixed path prefix for this catalog, e.g. `/tpass/kmverse/outerapi/v1`.
    pub path_prefix: String,

    /// Value for the `X-API-KEY` header, when the gateway requires one.
    pub api_key: Option<SecretString>,

    /// Fixed extra headers sent with every request (e.g. `km-verse-key`).
    pub extra_headers: HeaderMap,

    /// TCP connect timeout.
    pub connect_timeout: Duration,

    /// End-to-end request timeout.
    pub total_timeout: Duration,

    /// Maximum idle connections kept per host in the pool.
    pub pool_limit: usize,

    /// Retry policy for domain calls. Defaults to no retries.
    pub retry: RetryConfig,

    /// Verify TLS certificates. Turning this off is an explicit, logged
    /// opt-in; never disable it against production endpoints.
    pub verify_tls: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            path_prefix: String::new(),
            api_key: None,
            extra_headers: HeaderMap::new(),
            connect_timeout: Duration::from_secs(5),
            total_timeout: Duration::from_secs(20),
            pool_limit: 100,
            retry: RetryConfig::default(),
            verify_tls: true,
        }
    }
}

impl ClientConfig {
    /// Start building a config for the given gateway origin.
    pub fn builder(base_url: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: ClientConfig {
                base_url: base_url.into(),
                ..Default::default()
            },
        }
    }
}

/// Retry policy for domain calls.
///
/// The reference gateway behavior retries 5xx at the transport-adapter
/// level; here it is an explicit client policy instead. The default is zero
/// retries — domain calls surface their first failure.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum re-attempts after the initial one.
    pub attempts: u32,

    /// Delay before the first retry; grows exponentially with jitter.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 0,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the fixed per-catalog path prefix.
    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.path_prefix = prefix.into();
        self
    }

    /// Set the `X-API-KEY` header value.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(SecretString::new(api_key.into().into_boxed_str()));
        self
    }

    /// Add a fixed header sent with every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key_str = key.into();
        let value_str = value.into();

        let key: HeaderName = key_str
            .parse()
            .map_err(|_| Error::InvalidHeaderName(key_str.clone()))?;
        let value: HeaderValue = value_str
            .parse()
            .map_err(|_| Error::InvalidHeaderValue(value_str.clone()))?;

        self.config.extra_headers.insert(key, value);
        Ok(self)
    }

    /// Set the TCP connect timeout. Default: 5s.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the end-to-end request timeout. Default: 20s.
    pub fn total_timeout(mut self, timeout: Duration) -> Self {
        self.config.total_timeout = timeout;
        self
    }

    /// Set the connection pool bound. Default: 100.
    pub fn pool_limit(mut self, limit: usize) -> Self {
        self.config.pool_limit = limit;
        self
    }

    /// Set the retry policy for domain calls. Default: no retries.
    pub fn retry(mut self, attempts: u32, base_delay: Duration) -> Self {
        self.config.retry = RetryConfig {
            attempts,
            base_delay,
        };
        self
    }

    /// Disable TLS certificate verification. Logged as a warning when the
    /// transport is built.
    pub fn danger_accept_invalid_certs(mut self) -> Self {
        self.config.verify_tls = false;
        self
    }

    /// Finish building.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
