use super::processor::{ParallelConfig, ParallelProcessor};
use crate::error::ScanError;

/// How a batch of independent work items is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Run every item on the calling thread
    Sequential,
    /// Fan items out over a bounded worker pool
    Parallel { workers: usize },
}

impl ExecutionStrategy {
    /// Pick a strategy for `work_item_count` items.
    ///
    /// `max_threads` of 0 means one worker per available core. A single
    /// worker (or a single item) runs sequentially.
    pub fn auto(work_item_count: usize, max_threads: usize) -> Self {
        let workers = Self::calculate_optimal_workers(max_threads, work_item_count);
        if workers <= 1 {
            ExecutionStrategy::Sequential
        } else {
            ExecutionStrategy::Parallel { workers }
        }
    }

    /// Worker count bounded by the configured limit, the available cores
    /// and the amount of work.
    pub fn calculate_optimal_workers(max_threads: usize, work_item_count: usize) -> usize {
        let max_workers = if max_threads > 0 { max_threads } else { num_cpus::get() };
        max_workers.max(1).min(work_item_count.max(1))
    }

    /// Apply `worker_fn` to every item; results come back in input order.
    pub fn execute<T, R, F>(&self, work_items: Vec<T>, worker_fn: F, label: &'static str) -> Result<Vec<R>, ScanError>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
    {
        match *self {
            ExecutionStrategy::Sequential => Ok(work_items.into_iter().map(worker_fn).collect()),
            ExecutionStrategy::Parallel { workers } => {
                let processor = ParallelProcessor::new(ParallelConfig {
                    workers,
                    ..ParallelConfig::default()
                });
                processor.process(work_items, worker_fn, label)
            }
        }
    }
}
