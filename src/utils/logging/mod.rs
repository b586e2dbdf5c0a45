//! Logging utilities
//!
//! The engine logs through the `log` facade. Binaries and tests call
//! [`init_logging`] to install `env_logger`.

pub mod log;

pub use self::log::{init_logging, log_evaluation_complete, log_evaluation_start, log_warning};
