//! Work queue and producer-side rate limiting

pub mod rate_limiter;
pub mod work_queue;

pub use rate_limiter::SlidingWindowLimiter;
pub use work_queue::{bounded, work_queue, Dequeued, WorkConsumer, WorkProducer};
