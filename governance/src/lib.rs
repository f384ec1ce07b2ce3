//! Quorum-voted governance for a permissioned network.
//!
//! A single owned [`Governance`] object holds the admin set, the super
//! admin elected from it, quarantine stamps, open election ledgers and the
//! registry of slot pointers that rule contracts resolve through.
//!
//! Flow: Membership → Quarantine → Election / Registry → Setup lock
//!
//! - Admins add and remove admins, each change starting a cooldown.
//! - Admins vote to install or depose the single super admin.
//! - The super admin alone tunes quorum policy and durations.
//! - Admins vote registry slots to new values under the same quorum.
//! - Bulk seeding and direct slot wiring exist only until setup is locked.

pub mod authority;
pub mod config;
pub mod election;
pub mod engine;
pub mod error;
pub mod event;
pub mod membership;
pub mod params;
pub mod quarantine;
pub mod quorum;
pub mod registry;
pub mod setup;
pub mod shared;
pub mod snapshot;

pub use authority::Authority;
pub use config::{GovernanceConfig, SelfTargetPolicy};
pub use election::{Direction, ElectionEngine, ElectionOutcome, SuperAdminCause, VoteTally};
pub use engine::{Governance, SanitizeReport};
pub use error::GovernanceError;
pub use event::{EventBus, GovernanceEvent};
pub use membership::{AdminRecord, ChangeReason, MembershipChange, MembershipStore};
pub use params::ParamChange;
pub use quarantine::{QuarantineGuard, QuarantineScope};
pub use quorum::required_votes;
pub use registry::{ProposalOutcome, RegistryConsensus, RegistryProposal};
pub use setup::SetupGate;
pub use shared::SharedGovernance;
pub use snapshot::{GovernanceSnapshot, SNAPSHOT_VERSION};
