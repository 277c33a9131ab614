//! Logging utilities.
//!
//! Centralizes logger initialization. Library code only uses the `log` facade.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
