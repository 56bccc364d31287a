//! Harvest coordinator - main orchestrator for the harvest process
//!
//! This module wires the photo source, the rate-limited queue, the worker
//! pool and the CSV sink together for one run.

use super::summary::{HarvestError, HarvestErrorType, HarvestSummary};
use super::worker::{run_worker, WorkerContext, WorkerReport};
use crate::adapters::flickr::{FlickrClient, PhotoSource};
use crate::config::HarvesterConfig;
use crate::core::queue::{work_queue, WorkProducer};
use crate::core::sink::{CsvSink, SinkOptions};
use crate::core::transform::UpdateWindow;
use crate::domain::{HarvesterError, PageRequest, PoolQuery, Result, WorkItem};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinSet;

/// Harvest coordinator
pub struct HarvestCoordinator {
    config: HarvesterConfig,
    source: Arc<dyn PhotoSource>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl HarvestCoordinator {
    /// Create a coordinator over an existing photo source
    pub fn new(config: HarvesterConfig, source: Arc<dyn PhotoSource>) -> Self {
        Self {
            config,
            source,
            shutdown: None,
        }
    }

    /// Stop enqueueing pages once `signal` turns `true`.
    ///
    /// Pages already queued are still processed and every worker still
    /// receives its sentinel.
    pub fn with_shutdown(mut self, signal: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(signal);
        self
    }

    /// Create a coordinator backed by the Flickr REST API
    pub fn from_config(config: HarvesterConfig) -> Result<Self> {
        let client = FlickrClient::new(config.flickr.clone())?;
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Execute the harvest
    ///
    /// This is the main entry point for the harvest process. It:
    /// 1. Validates configuration
    /// 2. Counts the pages of the group pool
    /// 3. Loads the license table
    /// 4. Opens the output file and writes the header
    /// 5. Starts the worker pool
    /// 6. Enqueues every page followed by one sentinel per worker
    /// 7. Waits for the workers, warning each supervision interval
    /// 8. Closes the output and generates the summary
    ///
    /// An invalid configuration is fatal, as is failing to count pages, load
    /// licenses or open the output. Everything after that is recorded in the
    /// summary.
    pub async fn execute_harvest(&self) -> Result<HarvestSummary> {
        let start_time = Instant::now();
        let mut summary = HarvestSummary::new();

        tracing::info!(
            group_id = %self.config.flickr.group_id,
            workers = self.config.harvest.workers,
            output = %self.config.harvest.output_path().display(),
            "Starting harvest"
        );

        self.config.validate().map_err(|e| {
            HarvesterError::Configuration(format!("Configuration validation failed: {e}"))
        })?;
        let window = UpdateWindow::from_bounds(&self.config.flickr.dates)?;

        let query = self.config.pool_query();
        let total_pages = self.source.count_pages(&query).await?;
        summary.total_pages = total_pages;
        tracing::info!(total_pages, "Counted pool pages");

        let licenses = Arc::new(self.source.fetch_licenses().await?);
        tracing::info!(licenses = licenses.len(), "Loaded license table");

        let sink = CsvSink::open(
            self.config.harvest.output_path(),
            SinkOptions {
                unique_key_terms: self.config.harvest.unique_key_terms.clone(),
            },
        )?;
        sink.handle().write_header().await?;

        let (mut producer, consumer) = work_queue(&self.config.queue);
        let worker_count = self.config.harvest.workers;
        let mut workers = JoinSet::new();
        for worker_id in 0..worker_count {
            let ctx = WorkerContext {
                source: Arc::clone(&self.source),
                licenses: Arc::clone(&licenses),
                window,
                queue: consumer.clone(),
                sink: sink.handle(),
                dequeue_timeout: Duration::from_millis(self.config.harvest.dequeue_timeout_ms),
                total_pages,
            };
            workers.spawn(run_worker(worker_id, ctx));
        }
        // Workers hold the only consumers, so enqueue fails if they all exit.
        drop(consumer);
        summary.workers_started = worker_count;

        // Production runs alongside supervision so the maximum wait covers it.
        let shutdown = self.shutdown.clone();
        let producer_task = tokio::spawn(async move {
            let result = enqueue_all(
                &mut producer,
                &query,
                total_pages,
                worker_count,
                shutdown.as_ref(),
            )
            .await;
            producer.close();
            result
        });

        let all_exited = self.supervise(&mut workers, &mut summary).await;
        if !all_exited {
            producer_task.abort();
        }
        match producer_task.await {
            Ok(Ok(interrupted)) => summary.interrupted = interrupted,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Stopped enqueueing work");
                summary.add_error(HarvestError::new(HarvestErrorType::Queue, e.to_string()));
            }
            Err(e) if e.is_cancelled() => {
                tracing::warn!("Stopped enqueueing work after workers were aborted");
            }
            Err(e) => {
                tracing::error!(error = %e, "Producer task failed");
                summary.add_error(HarvestError::new(
                    HarvestErrorType::Queue,
                    format!("Producer task failed: {e}"),
                ));
            }
        }

        match sink.close().await {
            Ok(stats) => summary.apply_sink_stats(&stats),
            Err(e) => {
                tracing::error!(error = %e, "Failed to close output");
                summary.add_error(HarvestError::new(HarvestErrorType::Sink, e.to_string()));
            }
        }

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    /// Collects worker reports until every worker exits or the maximum wait
    /// elapses, then aborts the stragglers.
    ///
    /// Returns `false` when workers had to be aborted.
    async fn supervise(
        &self,
        workers: &mut JoinSet<WorkerReport>,
        summary: &mut HarvestSummary,
    ) -> bool {
        let interval = Duration::from_secs(self.config.harvest.supervision_interval_secs);
        let max_wait = Duration::from_secs(self.config.harvest.max_wait_secs);
        let started = tokio::time::Instant::now();

        loop {
            match tokio::time::timeout(interval, workers.join_next()).await {
                Ok(Some(Ok(report))) => summary.add_worker_report(report),
                Ok(Some(Err(e))) => {
                    tracing::error!(error = %e, "Worker task failed");
                    summary.add_error(HarvestError::new(
                        HarvestErrorType::Supervision,
                        format!("Worker task failed: {e}"),
                    ));
                }
                Ok(None) => return true,
                Err(_) => {
                    let waited = started.elapsed();
                    if waited >= max_wait {
                        tracing::error!(
                            running = workers.len(),
                            waited_secs = waited.as_secs(),
                            "Workers did not finish in time, aborting"
                        );
                        summary.add_error(HarvestError::new(
                            HarvestErrorType::Supervision,
                            format!(
                                "{} worker(s) still running after {}s",
                                workers.len(),
                                waited.as_secs()
                            ),
                        ));
                        workers.abort_all();
                        while workers.join_next().await.is_some() {}
                        return false;
                    }
                    tracing::warn!(
                        running = workers.len(),
                        waited_secs = waited.as_secs(),
                        "Workers still running, waiting again"
                    );
                }
            }
        }
    }
}

/// Resolves once `signal` reads `true`; never resolves without a signal.
async fn shutdown_requested(signal: Option<&watch::Receiver<bool>>) {
    let Some(signal) = signal else {
        return std::future::pending().await;
    };
    let mut signal = signal.clone();
    if signal.wait_for(|stop| *stop).await.is_err() {
        // Sender dropped without requesting a shutdown
        std::future::pending::<()>().await;
    }
}

/// Enqueues pages `1..=total_pages`, then one sentinel per worker.
///
/// A shutdown request also cuts short a wait on the rate limiter. Once it
/// is seen, no further pages are queued and the remaining sentinels skip
/// the limiter.
///
/// Returns `true` when a shutdown signal cut the page run short.
async fn enqueue_all(
    producer: &mut WorkProducer,
    query: &PoolQuery,
    total_pages: u32,
    workers: usize,
    shutdown: Option<&watch::Receiver<bool>>,
) -> Result<bool> {
    let mut interrupted = false;
    for page in 1..=total_pages {
        let item = WorkItem::PageFetch(PageRequest::new(query, page)?);
        tokio::select! {
            biased;
            _ = shutdown_requested(shutdown) => {
                tracing::warn!(
                    next_page = page,
                    total_pages,
                    "Shutdown requested, no further pages will be enqueued"
                );
                interrupted = true;
                break;
            }
            result = producer.enqueue(item) => result?,
        }
        tracing::debug!(page, total_pages, "Enqueued page");
    }
    for _ in 0..workers {
        let admitted = tokio::select! {
            biased;
            _ = shutdown_requested(shutdown) => false,
            result = producer.enqueue(WorkItem::Terminate) => {
                result?;
                true
            }
        };
        if !admitted {
            producer.enqueue_unthrottled(WorkItem::Terminate).await?;
        }
    }
    tracing::info!(
        pages = total_pages,
        sentinels = workers,
        interrupted,
        "All work enqueued"
    );
    Ok(interrupted)
}
