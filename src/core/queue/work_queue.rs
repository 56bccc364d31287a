//! Rate-limited work queue between the producer and the worker pool
//!
//! A bounded mpsc channel carries [`WorkItem`]s. The single producer passes
//! every item through a [`SlidingWindowLimiter`] before it is admitted;
//! consumers are not limited. Consumers share the receiving end, so each
//! item is delivered to exactly one worker.

use super::rate_limiter::SlidingWindowLimiter;
use crate::config::QueueConfig;
use crate::domain::{HarvesterError, Result, WorkItem};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

/// Outcome of a [`WorkConsumer::dequeue`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dequeued {
    Item(WorkItem),
    /// Nothing arrived within the timeout
    TimedOut,
    /// Producer is gone and the queue is drained
    Closed,
}

/// Creates a queue sized and rate limited from `config`
pub fn work_queue(config: &QueueConfig) -> (WorkProducer, WorkConsumer) {
    let limiter =
        SlidingWindowLimiter::new(config.rate_limit, Duration::from_millis(config.rate_window_ms));
    bounded(config.capacity, limiter)
}

/// Creates a queue with an explicit capacity and limiter
pub fn bounded(capacity: usize, limiter: SlidingWindowLimiter) -> (WorkProducer, WorkConsumer) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        WorkProducer {
            tx,
            limiter,
            admitted: 0,
        },
        WorkConsumer {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Sending half, owned by the coordinator
pub struct WorkProducer {
    tx: mpsc::Sender<WorkItem>,
    limiter: SlidingWindowLimiter,
    admitted: usize,
}

impl WorkProducer {
    /// Admits one item, waiting for the rate limiter and then for capacity.
    ///
    /// # Errors
    ///
    /// Returns [`HarvesterError::Queue`] once every consumer has been dropped.
    pub async fn enqueue(&mut self, item: WorkItem) -> Result<()> {
        self.limiter.acquire().await;
        self.send(item).await
    }

    /// Admits one item without consulting the rate limiter.
    ///
    /// Still waits for capacity. Used for sentinels after a shutdown request.
    pub async fn enqueue_unthrottled(&mut self, item: WorkItem) -> Result<()> {
        self.send(item).await
    }

    async fn send(&mut self, item: WorkItem) -> Result<()> {
        self.tx
            .send(item)
            .await
            .map_err(|_| HarvesterError::Queue("no workers left to receive work".to_string()))?;
        self.admitted += 1;
        Ok(())
    }

    /// Number of items admitted so far
    pub fn admitted(&self) -> usize {
        self.admitted
    }

    /// Closes the sending side; consumers see [`Dequeued::Closed`] once drained.
    pub fn close(self) {
        tracing::debug!(admitted = self.admitted, "Work queue closed");
    }
}

/// Receiving half, cloned into every worker
#[derive(Clone)]
pub struct WorkConsumer {
    rx: Arc<Mutex<mpsc::Receiver<WorkItem>>>,
}

impl WorkConsumer {
    /// Waits up to `timeout` for the next item.
    ///
    /// Time spent waiting behind another consumer counts toward the timeout.
    pub async fn dequeue(&self, timeout: Duration) -> Dequeued {
        let next = async {
            let mut rx = self.rx.lock().await;
            rx.recv().await
        };
        match tokio::time::timeout(timeout, next).await {
            Ok(Some(item)) => Dequeued::Item(item),
            Ok(None) => Dequeued::Closed,
            Err(_) => Dequeued::TimedOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PageRequest, PoolQuery};
    use tokio::time::Instant;

    fn page(n: u32) -> WorkItem {
        let query = PoolQuery {
            group_id: "g".to_string(),
            per_page: 10,
            ..Default::default()
        };
        WorkItem::PageFetch(PageRequest::new(&query, n).unwrap())
    }

    fn unlimited(capacity: usize) -> (WorkProducer, WorkConsumer) {
        bounded(
            capacity,
            SlidingWindowLimiter::new(usize::MAX, Duration::from_millis(1)),
        )
    }

    #[tokio::test]
    async fn test_fifo_for_single_producer() {
        let (mut producer, consumer) = unlimited(8);
        for n in 1..=3 {
            producer.enqueue(page(n)).await.unwrap();
        }
        producer.enqueue(WorkItem::Terminate).await.unwrap();
        assert_eq!(producer.admitted(), 4);

        let timeout = Duration::from_millis(100);
        for n in 1..=3 {
            assert_eq!(consumer.dequeue(timeout).await, Dequeued::Item(page(n)));
        }
        assert_eq!(
            consumer.dequeue(timeout).await,
            Dequeued::Item(WorkItem::Terminate)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dequeue_times_out_when_empty() {
        let (_producer, consumer) = unlimited(1);
        assert_eq!(
            consumer.dequeue(Duration::from_secs(10)).await,
            Dequeued::TimedOut
        );
    }

    #[tokio::test]
    async fn test_dequeue_reports_closed_after_drain() {
        let (mut producer, consumer) = unlimited(2);
        producer.enqueue(WorkItem::Terminate).await.unwrap();
        producer.close();
        let timeout = Duration::from_millis(100);
        assert_eq!(
            consumer.dequeue(timeout).await,
            Dequeued::Item(WorkItem::Terminate)
        );
        assert_eq!(consumer.dequeue(timeout).await, Dequeued::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unthrottled_enqueue_skips_the_limiter() {
        let (mut producer, consumer) = bounded(
            8,
            SlidingWindowLimiter::new(1, Duration::from_secs(60)),
        );
        let start = Instant::now();
        producer.enqueue(page(1)).await.unwrap();
        producer.enqueue_unthrottled(WorkItem::Terminate).await.unwrap();
        producer.enqueue_unthrottled(WorkItem::Terminate).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(producer.admitted(), 3);

        let timeout = Duration::from_millis(100);
        assert_eq!(consumer.dequeue(timeout).await, Dequeued::Item(page(1)));
        assert_eq!(
            consumer.dequeue(timeout).await,
            Dequeued::Item(WorkItem::Terminate)
        );
    }

    #[tokio::test]
    async fn test_enqueue_fails_without_consumers() {
        let (mut producer, consumer) = unlimited(1);
        drop(consumer);
        assert!(producer.enqueue(WorkItem::Terminate).await.is_err());
    }

    #[tokio::test]
    async fn test_each_item_delivered_once() {
        let (mut producer, consumer) = unlimited(64);
        for n in 1..=50 {
            producer.enqueue(page(n)).await.unwrap();
        }
        producer.close();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let consumer = consumer.clone();
            handles.push(tokio::spawn(async move {
                let mut pages = Vec::new();
                while let Dequeued::Item(WorkItem::PageFetch(req)) =
                    consumer.dequeue(Duration::from_millis(200)).await
                {
                    pages.push(req.page());
                }
                pages
            }));
        }

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.await.unwrap());
        }
        all.sort_unstable();
        assert_eq!(all, (1..=50).collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_producer_is_rate_limited() {
        let (mut producer, consumer) = bounded(
            16,
            SlidingWindowLimiter::new(10, Duration::from_millis(60_000)),
        );
        let start = Instant::now();
        for n in 1..=11 {
            producer.enqueue(page(n)).await.unwrap();
        }
        assert_eq!(start.elapsed(), Duration::from_millis(60_000));
        drop(consumer);
    }
}
