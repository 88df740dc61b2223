use crossbeam::channel::{Receiver, Sender, bounded};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

use crate::error::ScanError;

/// Configuration for parallel processing
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of worker threads
    pub workers: usize,
    /// Channel buffer size multiplier (buffer = workers * multiplier)
    pub channel_buffer_multiplier: usize,
    /// Progress is logged every N items
    pub progress_update_frequency: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            channel_buffer_multiplier: 2,
            progress_update_frequency: 25,
        }
    }
}

/// Bounded worker pool that hands back results in input order.
///
/// Each worker owns the result it produces and sends it over a channel; the
/// calling thread is the only one that ever sees all results.
pub struct ParallelProcessor {
    config: ParallelConfig,
}

impl ParallelProcessor {
    pub fn new(config: ParallelConfig) -> Self {
        Self { config }
    }

    /// Process work items in parallel using a worker function
    ///
    /// # Arguments
    /// * `work_items` - Items to process
    /// * `worker_fn` - Function that processes each work item
    /// * `label` - Name of the batch used in log messages
    ///
    /// # Returns
    /// One result per item, in the order the items were given
    pub fn process<T, R, F>(&self, work_items: Vec<T>, worker_fn: F, label: &'static str) -> Result<Vec<R>, ScanError>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
    {
        let work_count = work_items.len();
        if work_count == 0 {
            return Ok(Vec::new());
        }

        let workers = self.config.workers.clamp(1, work_count);
        let buffer = workers * self.config.channel_buffer_multiplier.max(1);
        debug!("{}: {} items on {} workers", label, work_count, workers);

        let (work_tx, work_rx): (Sender<(usize, T)>, Receiver<(usize, T)>) = bounded(buffer);
        let (result_tx, result_rx): (Sender<(usize, R)>, Receiver<(usize, R)>) = bounded(buffer * 2);

        let progress_counter = AtomicUsize::new(0);
        let worker_fn = &worker_fn;
        let progress_counter = &progress_counter;
        let progress_every = self.config.progress_update_frequency.max(1);

        let mut indexed_results = crossbeam::thread::scope(|s| {
            for worker_id in 0..workers {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();

                s.spawn(move |_| {
                    while let Ok((index, work_item)) = work_rx.recv() {
                        if result_tx.send((index, worker_fn(work_item))).is_err() {
                            break; // Collector dropped
                        }

                        let current = progress_counter.fetch_add(1, Ordering::Relaxed) + 1;
                        if current % progress_every == 0 || current == work_count {
                            trace!("{}: {}/{} done [worker-{}]", label, current, work_count, worker_id);
                        }
                    }
                });
            }

            // Producer thread: send work to workers
            s.spawn(move |_| {
                for item in work_items.into_iter().enumerate() {
                    if work_tx.send(item).is_err() {
                        break; // Workers dropped
                    }
                }
            });

            // Drop the original handles so the channels close when work is done
            drop(work_rx);
            drop(result_tx);

            Self::collect_results(result_rx, work_count)
        })
        .map_err(|_| ScanError::WorkerPanic(label))?;

        if indexed_results.len() != work_count {
            return Err(ScanError::WorkerPanic(label));
        }

        indexed_results.sort_by_key(|(index, _)| *index);
        Ok(indexed_results.into_iter().map(|(_, result)| result).collect())
    }

    /// Collect results from workers
    fn collect_results<R>(result_rx: Receiver<(usize, R)>, total_work: usize) -> Vec<(usize, R)> {
        let mut results = Vec::with_capacity(total_work);
        while let Ok(result) = result_rx.recv() {
            results.push(result);
        }
        results
    }
}
