//! Fundamental types for the permissioning governance layer.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account identities, registry slot keys, timestamps and the clock seam,
//! and the governance parameters with their floors.

pub mod address;
pub mod error;
pub mod params;
pub mod slot;
pub mod time;

pub use address::AccountId;
pub use error::PermitError;
pub use params::{GovernanceParams, QuorumPolicy, ONE_DAY_SECS};
pub use slot::SlotKey;
pub use time::{Clock, SystemClock, Timestamp};
