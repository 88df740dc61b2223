//! Command implementations for the logmonitor CLI
//!
//! Each command lives in its own module.

pub mod config;
pub mod run;
pub mod version;
