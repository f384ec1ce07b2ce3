//! Governance parameters: quorum policy, durations and their floors.
//!
//! Every field is changeable at runtime by the super-admin; the floors
//! below are hard limits no setter may cross.

use crate::error::PermitError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seconds in one day. Both the quarantine window and the vote duration
/// may never be configured below this.
pub const ONE_DAY_SECS: u64 = 24 * 3600;

/// Rule used to compute how many live votes resolve an election or a
/// registry proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuorumPolicy {
    /// ⌊n/2⌋ + 1
    Majority,
    /// ⌈2n/3⌉
    TwoThirds,
    /// ⌈2n/3⌉ + 1
    TwoThirdsPlusOne,
    /// The configured fixed number.
    Fixed,
}

impl QuorumPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Majority => "majority",
            Self::TwoThirds => "two_thirds",
            Self::TwoThirdsPlusOne => "two_thirds_plus_one",
            Self::Fixed => "fixed",
        }
    }
}

impl fmt::Display for QuorumPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuorumPolicy {
    type Err = PermitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "majority" => Ok(Self::Majority),
            "two_thirds" => Ok(Self::TwoThirds),
            "two_thirds_plus_one" => Ok(Self::TwoThirdsPlusOne),
            "fixed" => Ok(Self::Fixed),
            _ => Err(PermitError::UnknownQuorumPolicy(s.to_string())),
        }
    }
}

/// Live governance parameters held by every instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceParams {
    /// Cooldown (seconds) started by a structural action.
    pub quarantine_secs: u64,

    /// Lifetime (seconds) of a vote or registry proposal. Shared by
    /// super-admin elections and registry proposals.
    pub vote_duration_secs: u64,

    /// Active quorum policy.
    pub quorum_policy: QuorumPolicy,

    /// Votes required under [`QuorumPolicy::Fixed`]. Kept within
    /// `[1, admin count]`.
    pub fixed_quorum_number: u32,
}

impl GovernanceParams {
    pub const DEFAULT_QUARANTINE_SECS: u64 = ONE_DAY_SECS;
    pub const DEFAULT_VOTE_DURATION_SECS: u64 = 7 * ONE_DAY_SECS;
    pub const MIN_DURATION_SECS: u64 = ONE_DAY_SECS;
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            quarantine_secs: Self::DEFAULT_QUARANTINE_SECS,
            vote_duration_secs: Self::DEFAULT_VOTE_DURATION_SECS,
            quorum_policy: QuorumPolicy::Majority,
            fixed_quorum_number: 1,
        }
    }
}
