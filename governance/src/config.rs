//! Governance configuration with TOML file support.

use crate::error::GovernanceError;
use crate::quarantine::QuarantineScope;
use permit_types::{GovernanceParams, QuorumPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How `add_admin` / `remove_admin` treat a caller naming itself as target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfTargetPolicy {
    /// Abort with [`GovernanceError::SelfTarget`].
    #[default]
    Reject,
    /// Succeed without changing membership, carrying the
    /// "self-target not permitted" reason and emitting a notification.
    Soft,
}

/// Initial parameters and fixed policy choices for a governance instance.
///
/// Can be loaded from a TOML file via [`GovernanceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Initial quarantine window in seconds.
    #[serde(default = "default_quarantine_secs")]
    pub quarantine_secs: u64,

    /// Initial vote / proposal lifetime in seconds.
    #[serde(default = "default_vote_duration_secs")]
    pub vote_duration_secs: u64,

    /// Initial quorum policy.
    #[serde(default = "default_quorum_policy")]
    pub quorum_policy: QuorumPolicy,

    /// Initial fixed quorum number (only consulted under `fixed`).
    #[serde(default = "default_fixed_quorum_number")]
    pub fixed_quorum_number: u32,

    /// Treatment of self-targeting membership calls.
    #[serde(default)]
    pub self_target: SelfTargetPolicy,

    /// Who is quarantined by a successful `add_admin`.
    #[serde(default)]
    pub quarantine_scope: QuarantineScope,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_quarantine_secs() -> u64 {
    GovernanceParams::DEFAULT_QUARANTINE_SECS
}

fn default_vote_duration_secs() -> u64 {
    GovernanceParams::DEFAULT_VOTE_DURATION_SECS
}

fn default_quorum_policy() -> QuorumPolicy {
    QuorumPolicy::Majority
}

fn default_fixed_quorum_number() -> u32 {
    1
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GovernanceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, GovernanceError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GovernanceError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, GovernanceError> {
        let config: Self = toml::from_str(s).map_err(|e| GovernanceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, GovernanceError> {
        toml::to_string_pretty(self).map_err(|e| GovernanceError::Config(e.to_string()))
    }

    /// Check the hard floors.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        for secs in [self.quarantine_secs, self.vote_duration_secs] {
            if secs < GovernanceParams::MIN_DURATION_SECS {
                return Err(GovernanceError::InvalidDuration {
                    secs,
                    min_secs: GovernanceParams::MIN_DURATION_SECS,
                });
            }
        }
        if self.fixed_quorum_number == 0 {
            return Err(GovernanceError::InvalidQuorum {
                number: 0,
                admin_count: 1,
            });
        }
        Ok(())
    }

    /// The initial runtime parameters described by this config.
    pub fn params(&self) -> GovernanceParams {
        GovernanceParams {
            quarantine_secs: self.quarantine_secs,
            vote_duration_secs: self.vote_duration_secs,
            quorum_policy: self.quorum_policy,
            fixed_quorum_number: self.fixed_quorum_number,
        }
    }
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            quarantine_secs: default_quarantine_secs(),
            vote_duration_secs: default_vote_duration_secs(),
            quorum_policy: default_quorum_policy(),
            fixed_quorum_number: default_fixed_quorum_number(),
            self_target: SelfTargetPolicy::default(),
            quarantine_scope: QuarantineScope::default(),
        }
    }
}
