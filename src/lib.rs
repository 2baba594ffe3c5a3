//! Client-side admission control for Tokio.
//!
//! A [`Throttler`] bounds how many operations may be admitted within a
//! rolling time window for one resource. A [`ThrottlerPool`] load-balances
//! admission across several homogeneous rate-limited resources by scanning
//! them round-robin. Both are purely in-process: limits apply per limiter
//! instance, with no cross-process coordination and no persisted state.
//!
//! ```rust
//! use std::time::Duration;
//! use throttle_pool::Throttler;
//!
//! # async fn example() -> Result<(), throttle_pool::ThrottleError> {
//! // At most 10 requests per second against one upstream.
//! let throttler = Throttler::new(10, Duration::from_secs(1), "upstream")?;
//!
//! throttler.throttled(async {
//!     // rate-limited work
//! }).await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod throttle;

pub use config::{PoolConfig, ThrottleConfig};
pub use error::{Result, ThrottleError};
pub use throttle::{Throttler, ThrottlerPool};
