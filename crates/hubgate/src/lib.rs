//! # hubgate
//!
//! Authenticated, connection-pooled client for the knowledge-base and
//! prompt-share services behind a shared API gateway.
//!
//! The crate is three layers, leaf-first:
//!
//! 1. [`token`] — exchanges credentials for a bearer token, with bounded
//!    retry and its own pooled transport.
//! 2. [`GatewayClient`] — owns a lazily created pooled transport bound to a
//!    base URL; on every call asks a [`token::TokenSource`] for a fresh
//!    token, composes the gateway headers, dispatches, and returns the raw
//!    body text or a typed [`Error`].
//! 3. [`catalogs`] — thin per-service operation catalogs, each method one
//!    `send` call with a fixed path template and body shape.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hubgate::{ApiHubTokenProvider, ClientConfig, TokenCredentials};
//! use hubgate::catalogs::KnowledgeBases;
//!
//! #[tokio::main]
//! async fn main() -> hubgate::Result<()> {
//!     let provider = ApiHubTokenProvider::new(TokenCredentials::new(
//!         "https://gateway.example.com/token",
//!         std::env::var("GATEWAY_API_KEY").expect("GATEWAY_API_KEY"),
//!         std::env::var("GATEWAY_USERNAME").expect("GATEWAY_USERNAME"),
//!         std::env::var("GATEWAY_PASSWORD").expect("GATEWAY_PASSWORD"),
//!     ))?;
//!
//!     let kb = KnowledgeBases::new(
//!         ClientConfig::builder("https://gateway.example.com")
//!             .api_key(std::env::var("GATEWAY_API_KEY").expect("GATEWAY_API_KEY"))
//!             .build(),
//!         std::env::var("KM_VERSE_KEY").expect("KM_VERSE_KEY"),
//!         Arc::new(provider),
//!     )?;
//!
//!     let body = kb.retrieve(520, 153247729047877, "release notes").await?;
//!     println!("{body}");
//!
//!     kb.close();
//!     Ok(())
//! }
//! ```
//!
//! Synchronous callers use [`blocking::GatewayClient`], a thin adapter that
//! drives the same implementation on a dedicated runtime.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub use client::GatewayClient;
pub use config::{ClientConfig, ClientConfigBuilder, RetryConfig};
pub use error::{Error, Result};
pub use token::{
    ApiHubTokenProvider, ApiHubTokenProviderBuilder, CachedTokenSource, Token, TokenCredentials,
    TokenSource,
};

pub mod blocking;
pub mod catalogs;
pub mod client;
pub mod config;
pub mod error;
pub mod token;

mod transport;

// Re-export the HTTP method type used by `GatewayClient::send`.
pub use http::Method;

/// SDK version, taken from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
