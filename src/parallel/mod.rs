//! Generic parallel execution framework
//!
//! Runs independent work items over a bounded pool of worker threads and
//! returns the results in the order the items were submitted, no matter in
//! which order the workers finished them.
//!
//! # Architecture Responsibilities
//!
//! ## What This Module Does:
//! - **Resource Discovery**: Detects available CPU cores using `num_cpus::get()`
//! - **Execution Strategy**: Sequential vs Parallel execution with worker management
//! - **Ordering**: Tags each item with its index and sorts the results back
//!
//! ## What This Module Does NOT Do:
//! - **Domain Logic**: It knows nothing about log files, patterns or reports
//! - **Error Policy**: Per-item failures are whatever the worker function returns
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │   Producer      │    │   Workers (N)    │    │   Collector     │
//! │                 │───▶│                  │───▶│                 │
//! │ (index, item)   │    │ (index, result)  │    │ sort by index   │
//! └─────────────────┘    └──────────────────┘    └─────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use logmonitor::parallel::ExecutionStrategy;
//!
//! let strategy = ExecutionStrategy::auto(100, 4);
//! let doubled = strategy.execute((0..100).collect(), |x: u32| x * 2, "doubling").unwrap();
//! assert_eq!(doubled[10], 20);
//! ```

pub mod core;
pub mod processor;

// Re-export main types for easier access
pub use self::core::ExecutionStrategy;
pub use processor::{ParallelConfig, ParallelProcessor};
