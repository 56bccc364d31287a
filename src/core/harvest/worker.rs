//! Harvest worker loop
//!
//! Each worker pulls work items until it receives a sentinel. A page fetch
//! failure is recorded and the worker moves on to the next item; a sink
//! failure ends the worker since nothing more can be written.

use super::summary::{HarvestError, HarvestErrorType};
use crate::adapters::flickr::PhotoSource;
use crate::core::queue::{Dequeued, WorkConsumer};
use crate::core::sink::SinkHandle;
use crate::core::transform::{transform_photo, Transformed, UpdateWindow};
use crate::domain::{LicenseTable, PageRequest, WorkItem};
use std::sync::Arc;
use std::time::Duration;

/// Shared inputs handed to every worker
#[derive(Clone)]
pub struct WorkerContext {
    pub source: Arc<dyn PhotoSource>,
    pub licenses: Arc<LicenseTable>,
    pub window: UpdateWindow,
    pub queue: WorkConsumer,
    pub sink: SinkHandle,
    pub dequeue_timeout: Duration,
    /// Used for progress logging only
    pub total_pages: u32,
}

/// Counters returned by a worker when it exits
#[derive(Debug, Clone, Default)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub pages_processed: usize,
    pub pages_failed: usize,
    pub photos_seen: usize,
    pub records_emitted: usize,
    pub records_excluded: usize,
    pub errors: Vec<HarvestError>,
}

impl WorkerReport {
    fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            ..Default::default()
        }
    }
}

enum PageOutcome {
    Continue,
    Stop,
}

/// Runs one worker until a sentinel, a closed queue or a sink failure.
pub async fn run_worker(worker_id: usize, ctx: WorkerContext) -> WorkerReport {
    let mut report = WorkerReport::new(worker_id);
    tracing::debug!(worker = worker_id, "Worker started");

    loop {
        match ctx.queue.dequeue(ctx.dequeue_timeout).await {
            Dequeued::Item(WorkItem::Terminate) => {
                tracing::debug!(worker = worker_id, "Received termination sentinel");
                break;
            }
            Dequeued::Item(WorkItem::PageFetch(request)) => {
                if let PageOutcome::Stop = process_page(&ctx, &request, &mut report).await {
                    break;
                }
            }
            Dequeued::TimedOut => {
                tracing::warn!(
                    worker = worker_id,
                    timeout_ms = ctx.dequeue_timeout.as_millis() as u64,
                    "No work received within timeout, polling again"
                );
            }
            Dequeued::Closed => {
                tracing::warn!(
                    worker = worker_id,
                    "Work queue closed without a termination sentinel"
                );
                break;
            }
        }
    }

    tracing::info!(
        worker = worker_id,
        pages_processed = report.pages_processed,
        pages_failed = report.pages_failed,
        records_emitted = report.records_emitted,
        records_excluded = report.records_excluded,
        "Worker finished"
    );
    report
}

async fn process_page(
    ctx: &WorkerContext,
    request: &PageRequest,
    report: &mut WorkerReport,
) -> PageOutcome {
    let page = match ctx.source.fetch_page(request).await {
        Ok(page) => page,
        Err(e) => {
            tracing::error!(
                worker = report.worker_id,
                page = request.page(),
                error = %e,
                "Failed to fetch page"
            );
            report.pages_failed += 1;
            report.errors.push(
                HarvestError::new(HarvestErrorType::Fetch, e.to_string())
                    .with_context(format!("page={}", request.page())),
            );
            return PageOutcome::Continue;
        }
    };

    report.photos_seen += page.photos.len();
    let mut emitted = 0usize;
    for photo in &page.photos {
        match transform_photo(photo, &ctx.licenses, &ctx.window) {
            Transformed::Accepted(record) => {
                if let Err(e) = ctx.sink.write(record).await {
                    tracing::error!(
                        worker = report.worker_id,
                        page = request.page(),
                        error = %e,
                        "Failed to write record, stopping worker"
                    );
                    report.errors.push(
                        HarvestError::new(HarvestErrorType::Sink, e.to_string())
                            .with_context(format!("page={}", request.page())),
                    );
                    return PageOutcome::Stop;
                }
                emitted += 1;
            }
            Transformed::Excluded(reason) => {
                tracing::debug!(photo_id = %photo.id, reason = %reason, "Photo excluded");
                report.records_excluded += 1;
            }
        }
    }

    report.records_emitted += emitted;
    report.pages_processed += 1;
    crate::log_page_progress!(report.worker_id, request.page(), emitted, ctx.total_pages);
    PageOutcome::Continue
}
