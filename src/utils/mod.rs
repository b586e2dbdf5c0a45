//! Utility functions shared by the evaluators
//!
//! Logging helpers, elapsed-time arithmetic and robust statistics.

pub mod logging;
pub mod stats;
pub mod time;

pub use logging::{init_logging, log_evaluation_complete, log_evaluation_start};
pub use time::{elapsed_days, elapsed_whole_days, MILLIS_PER_DAY};
