//! Whole-state persistence with bincode.

use crate::config::GovernanceConfig;
use crate::election::ElectionEngine;
use crate::engine::Governance;
use crate::error::GovernanceError;
use crate::event::EventBus;
use crate::membership::MembershipStore;
use crate::registry::RegistryConsensus;
use crate::setup::SetupGate;
use permit_types::GovernanceParams;
use serde::{Deserialize, Serialize};

/// Bumped whenever the snapshot layout changes.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable copy of a [`Governance`] instance, minus its listeners.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GovernanceSnapshot {
    pub version: u32,
    pub config: GovernanceConfig,
    pub params: GovernanceParams,
    pub members: MembershipStore,
    pub elections: ElectionEngine,
    pub registry: RegistryConsensus,
    pub setup: SetupGate,
}

impl Governance {
    pub fn snapshot(&self) -> GovernanceSnapshot {
        GovernanceSnapshot {
            version: SNAPSHOT_VERSION,
            config: self.config.clone(),
            params: self.params.clone(),
            members: self.members.clone(),
            elections: self.elections.clone(),
            registry: self.registry.clone(),
            setup: self.setup.clone(),
        }
    }

    /// Serialize the full state. Subscribed listeners are not included.
    pub fn save_state(&self) -> Result<Vec<u8>, GovernanceError> {
        bincode::serialize(&self.snapshot()).map_err(|e| GovernanceError::Snapshot(e.to_string()))
    }

    /// Restore an instance from [`Governance::save_state`] output.
    pub fn load_state(data: &[u8]) -> Result<Self, GovernanceError> {
        let snapshot: GovernanceSnapshot =
            bincode::deserialize(data).map_err(|e| GovernanceError::Snapshot(e.to_string()))?;
        Self::from_snapshot(snapshot)
    }

    pub fn from_snapshot(snapshot: GovernanceSnapshot) -> Result<Self, GovernanceError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(GovernanceError::Snapshot(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        Ok(Self {
            config: snapshot.config,
            params: snapshot.params,
            members: snapshot.members,
            elections: snapshot.elections,
            registry: snapshot.registry,
            setup: snapshot.setup,
            bus: EventBus::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permit_types::{AccountId, QuorumPolicy, SlotKey, Timestamp};

    fn account(seed: u8) -> AccountId {
        AccountId::new([seed; 20])
    }

    #[test]
    fn save_and_load_preserves_state() {
        let now = Timestamp::new(1_000);
        let mut gov = Governance::new(account(1), GovernanceConfig::default(), now).unwrap();
        gov.add_admins(account(1), &[account(2), account(3)], now).unwrap();
        gov.register_slot(account(1), SlotKey::rules(), account(0xA0)).unwrap();
        gov.set_quorum_type(account(1), QuorumPolicy::TwoThirds).unwrap();
        gov.vote_for_super_admin(account(2), account(3), now).unwrap();

        let bytes = gov.save_state().unwrap();
        let restored = Governance::load_state(&bytes).unwrap();

        assert_eq!(restored.admins(), gov.admins());
        assert_eq!(restored.super_admin(), Some(account(1)));
        assert_eq!(restored.params(), gov.params());
        assert_eq!(restored.resolved_slot_value(&SlotKey::rules()), Some(account(0xA0)));
        assert_eq!(restored.votes_for(&account(3), now).install, 1);
        assert!(restored.is_setup_open());
    }

    #[test]
    fn corrupt_bytes_are_rejected() {
        let err = Governance::load_state(&[0xFF, 0x01, 0x02]).unwrap_err();
        assert_eq!(err.code(), "snapshot");
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let gov = Governance::new(account(1), GovernanceConfig::default(), Timestamp::EPOCH).unwrap();
        let mut snapshot = gov.snapshot();
        snapshot.version = SNAPSHOT_VERSION + 1;
        let err = Governance::from_snapshot(snapshot).unwrap_err();
        assert!(matches!(err, GovernanceError::Snapshot(_)));
    }
}
