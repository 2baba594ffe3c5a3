//! Sliding-window admission control and pooling.

mod pool;
mod throttler;
mod window;

pub use pool::ThrottlerPool;
pub use throttler::Throttler;
