//! Lazy pooled-transport management.
//!
//! Both the gateway client and the token provider own a pooled HTTP
//! transport that is created on first use and torn down exactly once by an
//! explicit `close()`. This module holds that shared state machine:
//! `Uninitialized -> Ready -> Closed`, with `Closed` terminal.

use std::sync::RwLock;
use std::time::Duration;

use tracing::warn;

use crate::error::{Error, Result};

/// Pool parameters shared by every transport the SDK builds.
#[derive(Debug, Clone)]
pub(crate) struct PoolSettings {
    pub connect_timeout: Duration,
    pub total_timeout: Duration,
    pub pool_limit: usize,
    pub verify_tls: bool,
}

/// Build a pooled reqwest client from the given settings.
pub(crate) fn build_transport(settings: &PoolSettings) -> Result<reqwest::Client> {
    if !settings.verify_tls {
        warn!("TLS certificate verification is disabled for this transport");
    }

    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.total_timeout)
        .pool_max_idle_per_host(settings.pool_limit)
        .danger_accept_invalid_certs(!settings.verify_tls)
        .user_agent(concat!("hubgate/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::Transport(e.to_string()))
}

/// Map a reqwest dispatch failure onto the SDK taxonomy.
pub(crate) fn classify_request_error(err: reqwest::Error, total_timeout: Duration) -> Error {
    if err.is_timeout() {
        Error::Timeout(total_timeout)
    } else {
        Error::Transport(err.to_string())
    }
}

enum State {
    Uninitialized,
    Ready(reqwest::Client),
    Closed,
}

/// Lazily initialized transport slot with close-once semantics.
///
/// Initialization is synchronized: under concurrent first use exactly one
/// pool is created. A request racing `close()` either gets a handle to the
/// still-open pool or fails with [`Error::Closed`].
pub(crate) struct TransportCell {
    state: RwLock<State>,
}

impl TransportCell {
    pub(crate) fn new() -> Self {
        Self {
            state: RwLock::new(State::Uninitialized),
        }
    }

    /// Get the transport, creating it on first use.
    pub(crate) fn get_or_init(&self, settings: &PoolSettings) -> Result<reqwest::Client> {
        {
            let state = self.state.read().expect("transport lock poisoned");
            match &*state {
                State::Ready(client) => return Ok(client.clone()),
                State::Closed => return Err(Error::Closed),
                State::Uninitialized => {}
            }
        }

        let mut state = self.state.write().expect("transport lock poisoned");
        // Re-check: another caller may have initialized (or closed) while we
        // waited for the write lock.
        match &*state {
            State::Ready(client) => Ok(client.clone()),
            State::Closed => Err(Error::Closed),
            State::Uninitialized => {
                let client = build_transport(settings)?;
                *state = State::Ready(client.clone());
                Ok(client)
            }
        }
    }

    /// Release the transport. Infallible and idempotent; all subsequent
    /// `get_or_init` calls fail with [`Error::Closed`].
    pub(crate) fn close(&self) {
        let mut state = self.state.write().expect("transport lock poisoned");
        *state = State::Closed;
    }

    #[cfg(test)]
    pub(crate) fn is_ready(&self) -> bool {
        matches!(
            &*self.state.read().expect("transport lock poisoned"),
            State::Ready(_)
        )
    }
}
