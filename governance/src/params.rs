//! Runtime parameter changes.
//!
//! Only the super-admin may change a parameter, and every accepted change
//! is published as a [`crate::GovernanceEvent::ParameterChanged`].

use permit_types::{GovernanceParams, QuorumPolicy};
use serde::{Deserialize, Serialize};

/// A parameter change together with its new value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "param", content = "value", rename_all = "snake_case")]
pub enum ParamChange {
    QuorumPolicy(QuorumPolicy),
    FixedQuorumNumber(u32),
    VoteDurationSecs(u64),
    QuarantineSecs(u64),
}

impl ParamChange {
    /// Human-readable name of the changed parameter.
    pub fn name(&self) -> &'static str {
        match self {
            Self::QuorumPolicy(_) => "quorum_policy",
            Self::FixedQuorumNumber(_) => "fixed_quorum_number",
            Self::VoteDurationSecs(_) => "vote_duration_secs",
            Self::QuarantineSecs(_) => "quarantine_secs",
        }
    }

    /// Write the new value into `params`. Bounds are checked by the caller.
    pub(crate) fn apply(&self, params: &mut GovernanceParams) {
        match *self {
            Self::QuorumPolicy(policy) => params.quorum_policy = policy,
            Self::FixedQuorumNumber(n) => params.fixed_quorum_number = n,
            Self::VoteDurationSecs(secs) => params.vote_duration_secs = secs,
            Self::QuarantineSecs(secs) => params.quarantine_secs = secs,
        }
    }
}
