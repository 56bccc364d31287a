//! Harvest orchestration
//!
//! - Coordinator: page counting, queue production and worker supervision
//! - Worker: fetch, transform and emit one page at a time
//! - Summary and reporting

pub mod coordinator;
pub mod summary;
pub mod worker;

pub use coordinator::HarvestCoordinator;
pub use summary::{HarvestError, HarvestErrorType, HarvestSummary};
pub use worker::{run_worker, WorkerContext, WorkerReport};
