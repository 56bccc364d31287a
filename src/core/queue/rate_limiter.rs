//! Sliding-window rate limiter
//!
//! Admits at most `limit` events in any window of `window` length. Uses
//! `tokio::time::Instant` so tests can drive it with paused time.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Sliding-window admission gate for the queue producer
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    limit: usize,
    window: Duration,
    admitted: VecDeque<Instant>,
}

impl SlidingWindowLimiter {
    /// `limit` is clamped to at least 1
    pub fn new(limit: usize, window: Duration) -> Self {
        let limit = limit.max(1);
        Self {
            limit,
            window,
            admitted: VecDeque::with_capacity(limit.min(1024)),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.admitted.front() {
            if now.duration_since(oldest) >= self.window {
                self.admitted.pop_front();
            } else {
                break;
            }
        }
    }

    /// Admits one event if the window has room.
    pub fn try_acquire(&mut self) -> bool {
        let now = Instant::now();
        self.prune(now);
        if self.admitted.len() < self.limit {
            self.admitted.push_back(now);
            true
        } else {
            false
        }
    }

    /// Waits until the window has room, then admits one event.
    pub async fn acquire(&mut self) {
        loop {
            if self.try_acquire() {
                return;
            }
            let Some(&oldest) = self.admitted.front() else {
                continue;
            };
            let ready_at = oldest + self.window;
            tracing::debug!(
                limit = self.limit,
                window_ms = self.window.as_millis() as u64,
                wait_ms = ready_at.saturating_duration_since(Instant::now()).as_millis() as u64,
                "Rate limit reached, waiting for window"
            );
            tokio::time::sleep_until(ready_at).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_admits_up_to_limit_immediately() {
        let mut limiter = SlidingWindowLimiter::new(3, Duration::from_secs(60));
        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(!limiter.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocks_until_window_slides() {
        let mut limiter = SlidingWindowLimiter::new(2, Duration::from_millis(60_000));
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::from_millis(60_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_is_sliding_not_fixed() {
        let mut limiter = SlidingWindowLimiter::new(2, Duration::from_secs(10));
        let start = Instant::now();
        limiter.acquire().await;
        tokio::time::advance(Duration::from_secs(6)).await;
        limiter.acquire().await;
        // The first slot frees at t=10, the second only at t=16.
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::from_secs(10));
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::from_secs(16));
    }

    #[test]
    fn test_zero_limit_is_clamped() {
        let limiter = SlidingWindowLimiter::new(0, Duration::from_secs(1));
        assert_eq!(limiter.limit(), 1);
    }
}
