use permit_types::{AccountId, PermitError, Timestamp};
use thiserror::Error;

/// Every way a governance operation can be rejected.
///
/// A rejected operation leaves the state exactly as it was. Use
/// [`GovernanceError::code`] for a stable, machine-readable reason.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("caller {0} is not an admin")]
    NotAdmin(AccountId),

    #[error("caller {0} is not the super admin")]
    NotSuperAdmin(AccountId),

    #[error("caller {0} is not the bootstrap authority")]
    NotBootstrapAuthority(AccountId),

    #[error("cannot invoke method with own account {0} as parameter")]
    SelfTarget(AccountId),

    #[error("account {account} is quarantined until {until}")]
    Quarantined { account: AccountId, until: Timestamp },

    #[error("batch admin seeding is only allowed during setup")]
    SetupClosed,

    #[error("batch must contain at least one account")]
    EmptyBatch,

    #[error("{voter} already has a live vote for this proposal")]
    AlreadyVoted { voter: AccountId },

    #[error("{voter} does not have a live vote for this proposal")]
    NoActiveVote { voter: AccountId },

    #[error("{0} is not an admin, so cannot be a super admin")]
    NotCandidateAdmin(AccountId),

    #[error("{0} is already the super admin")]
    AlreadySuperAdmin(AccountId),

    #[error("there is no sitting super admin matching {0} to remove")]
    NoActiveSuperAdmin(AccountId),

    #[error("{0} is the sitting super admin and cannot be removed as admin")]
    SuperAdminProtected(AccountId),

    #[error("duration {secs}s is below the minimum of {min_secs}s")]
    InvalidDuration { secs: u64, min_secs: u64 },

    #[error("fixed quorum number {number} must be within 1..={admin_count}")]
    InvalidQuorum { number: u32, admin_count: usize },

    #[error("registry value must not be the zero address")]
    InvalidSlotValue,

    #[error("invalid input: {0}")]
    Input(#[from] PermitError),

    #[error("config error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl GovernanceError {
    /// Stable identifier for this rejection class. Dashboards switch on
    /// these; they never change once published.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAdmin(_) => "not_admin",
            Self::NotSuperAdmin(_) => "not_super_admin",
            Self::NotBootstrapAuthority(_) => "not_bootstrap_authority",
            Self::SelfTarget(_) => "self_target",
            Self::Quarantined { .. } => "quarantined",
            Self::SetupClosed => "setup_closed",
            Self::EmptyBatch => "empty_batch",
            Self::AlreadyVoted { .. } => "already_voted",
            Self::NoActiveVote { .. } => "no_active_vote",
            Self::NotCandidateAdmin(_) => "not_candidate_admin",
            Self::AlreadySuperAdmin(_) => "already_super_admin",
            Self::NoActiveSuperAdmin(_) => "no_active_super_admin",
            Self::SuperAdminProtected(_) => "super_admin_protected",
            Self::InvalidDuration { .. } => "invalid_duration",
            Self::InvalidQuorum { .. } => "invalid_quorum",
            Self::InvalidSlotValue => "invalid_slot_value",
            Self::Input(_) => "invalid_input",
            Self::Config(_) => "config",
            Self::Snapshot(_) => "snapshot",
        }
    }

    /// Whether the caller lacked the role the operation requires.
    pub fn is_authorization_failure(&self) -> bool {
        matches!(
            self,
            Self::NotAdmin(_)
                | Self::NotSuperAdmin(_)
                | Self::NotBootstrapAuthority(_)
        )
    }
}
