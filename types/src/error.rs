//! Top-level error type shared across crates.

use thiserror::Error;

/// Errors raised while constructing or parsing the fundamental types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermitError {
    #[error("invalid account identity: {0}")]
    InvalidAccount(String),

    #[error("invalid slot key: {0}")]
    InvalidSlotKey(String),

    #[error("unknown quorum policy: {0}")]
    UnknownQuorumPolicy(String),
}
