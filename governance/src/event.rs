//! Governance notifications and the bus that fans them out to observers.

use crate::election::{Direction, SuperAdminCause};
use crate::membership::MembershipChange;
use crate::params::ParamChange;
use permit_types::{AccountId, SlotKey, Timestamp};
use serde::Serialize;

/// Observable outcome of an accepted operation.
///
/// Every accepted mutating call yields at least one of these, in commit
/// order, both as its return value and on the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GovernanceEvent {
    /// Admin added or removed, or a no-op membership call with its reason.
    MembershipChanged(MembershipChange),
    /// A registry slot now points at `value`.
    RegistrySlotResolved {
        slot: SlotKey,
        value: AccountId,
        previous: Option<AccountId>,
    },
    SuperAdminChanged {
        previous: Option<AccountId>,
        current: Option<AccountId>,
        cause: SuperAdminCause,
    },
    /// A super-admin election vote was recorded without resolving.
    VoteCast {
        voter: AccountId,
        candidate: AccountId,
        direction: Direction,
        live_votes: usize,
        required: usize,
    },
    VoteReverted {
        voter: AccountId,
        candidate: AccountId,
        direction: Direction,
        remaining: usize,
    },
    /// A registry proposal vote that did not reach quorum.
    RegistryVoteCast {
        voter: AccountId,
        slot: SlotKey,
        value: AccountId,
        votes: usize,
        required: usize,
    },
    ParameterChanged {
        by: AccountId,
        change: ParamChange,
    },
    SetupLocked {
        by: AccountId,
        timestamp: Timestamp,
    },
}

impl GovernanceEvent {
    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MembershipChanged(_) => "membership_changed",
            Self::RegistrySlotResolved { .. } => "registry_slot_resolved",
            Self::SuperAdminChanged { .. } => "super_admin_changed",
            Self::VoteCast { .. } => "vote_cast",
            Self::VoteReverted { .. } => "vote_reverted",
            Self::RegistryVoteCast { .. } => "registry_vote_cast",
            Self::ParameterChanged { .. } => "parameter_changed",
            Self::SetupLocked { .. } => "setup_locked",
        }
    }
}

/// Synchronous fan-out event bus for governance events.
///
/// Listeners are invoked inline after the emitting operation has committed.
/// A listener must not call back into the instance that emitted the event.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&GovernanceEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&GovernanceEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &GovernanceEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
