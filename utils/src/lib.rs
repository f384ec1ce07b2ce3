//! Shared utilities for governance hosts.

pub mod error;
pub mod logging;
pub mod time;

pub use error::UtilsError;
pub use logging::{init_logging, LogFormat};
pub use time::{format_duration, remaining_secs};
