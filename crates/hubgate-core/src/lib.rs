//! Core primitives for the hubgate SDK crates.
//!
//! Today this is just the retry layer: a [`retry::Backoff`] trait and an
//! exponential-with-jitter implementation used by both the token provider
//! and the gateway client.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod retry;

pub use retry::{Backoff, ExponentialJitter, ExponentialJitterBuilder};
