//! Retry strategies with exponential backoff and jitter.
//!
//! The gateway retries only transport-level failures and retryable status
//! codes; which errors qualify is decided by the caller through a predicate,
//! not baked into the strategy.
//!
//! # Examples
//!
//! ```rust
//! use hubgate_core::retry::{Backoff, ExponentialJitter};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), std::io::Error> {
//! let backoff = ExponentialJitter::builder()
//!     .max_retries(2)
//!     .base_delay(Duration::from_millis(500))
//!     .build();
//!
//! let value = backoff
//!     .run(|| async { Ok::<_, std::io::Error>(42) }, |_err| true)
//!     .await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

mod exponential;
mod strategy;

pub use exponential::{ExponentialJitter, ExponentialJitterBuilder};
pub use strategy::Backoff;
