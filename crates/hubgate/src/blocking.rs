//! Blocking surface over the async client.
//!
//! There is exactly one implementation of the request pipeline — the async
//! one in [`crate::client`]. This module is a thin adapter that drives it to
//! completion on a dedicated current-thread runtime, for callers that do not
//! run an async scheduler of their own.
//!
//! Calling into this module from inside a tokio runtime would park that
//! runtime's carrier thread for the full duration of the request, so both
//! construction and every call refuse with [`Error::RuntimeContext`] when an
//! ambient runtime is detected.

use std::sync::Arc;

use http::Method;
use tokio::runtime::{Builder, Handle, Runtime};

use crate::client::GatewayClient as AsyncGatewayClient;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::token::{Token, TokenSource};

fn ensure_not_in_runtime() -> Result<()> {
    if Handle::try_current().is_ok() {
        return Err(Error::RuntimeContext);
    }
    Ok(())
}

fn dedicated_runtime() -> Result<Runtime> {
    Ok(Builder::new_current_thread().enable_all().build()?)
}

/// Blocking counterpart of [`GatewayClient`](crate::GatewayClient).
///
/// Every method is the async method driven by `block_on`; semantics
/// (per-call token fetch, lazy transport, close-once, error taxonomy) are
/// identical.
pub struct GatewayClient {
    inner: AsyncGatewayClient,
    runtime: Runtime,
}

impl GatewayClient {
    /// Create a blocking client.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::RuntimeContext`] when called from inside an async
    /// runtime, and with the same errors as the async constructor otherwise.
    pub fn new(config: ClientConfig, token_source: Option<Arc<dyn TokenSource>>) -> Result<Self> {
        ensure_not_in_runtime()?;
        Ok(Self {
            inner: AsyncGatewayClient::new(config, token_source)?,
            runtime: dedicated_runtime()?,
        })
    }

    /// Issue one request and block until the response body is available.
    ///
    /// See [`GatewayClient::send`](crate::GatewayClient::send) for the full
    /// contract.
    pub fn send(
        &self,
        method: Method,
        path_suffix: &str,
        query: Option<&[(&str, String)]>,
        json_body: Option<&(dyn erased_serde::Serialize + Send + Sync)>,
    ) -> Result<String> {
        ensure_not_in_runtime()?;
        self.runtime
            .block_on(self.inner.send(method, path_suffix, query, json_body))
    }

    /// Release the pooled transport; idempotent, never fails.
    pub fn close(&self) {
        self.inner.close();
    }

    /// The async client this adapter drives. Useful for handing the same
    /// pool to async code paths.
    pub fn as_async(&self) -> &AsyncGatewayClient {
        &self.inner
    }
}

/// Blocking adapter over any [`TokenSource`].
pub struct TokenClient {
    source: Arc<dyn TokenSource>,
    runtime: Runtime,
}

impl TokenClient {
    /// Wrap a token source for use from synchronous code.
    pub fn new(source: Arc<dyn TokenSource>) -> Result<Self> {
        ensure_not_in_runtime()?;
        Ok(Self {
            source,
            runtime: dedicated_runtime()?,
        })
    }

    /// Fetch a token, blocking until the exchange completes.
    pub fn token(&self) -> Result<Token> {
        ensure_not_in_runtime()?;
        self.runtime.block_on(self.source.token())
    }
}
