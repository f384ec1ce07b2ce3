//! Membership store: active admins and their quarantine stamps.
//!
//! Records are never deleted: removing an admin only marks the record
//! inactive, so the identity stays addressable for history and events.

use permit_types::{AccountId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-identity record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRecord {
    pub identity: AccountId,
    /// Whether the identity is currently in the active admin set.
    pub active: bool,
    /// Structural actions by this identity are blocked before this time.
    pub quarantined_until: Timestamp,
    /// When the identity last became active (epoch if never).
    pub admitted_at: Timestamp,
}

impl AdminRecord {
    fn new(identity: AccountId) -> Self {
        Self {
            identity,
            active: false,
            quarantined_until: Timestamp::EPOCH,
            admitted_at: Timestamp::EPOCH,
        }
    }
}

/// Why a membership call ended the way it did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeReason {
    AdminAdded,
    AdminRemoved,
    AlreadyAdmin,
    NotAdmin,
    SelfTargetNotPermitted,
}

impl ChangeReason {
    /// Stable machine-readable form.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AdminAdded => "admin_added",
            Self::AdminRemoved => "admin_removed",
            Self::AlreadyAdmin => "already_admin",
            Self::NotAdmin => "not_admin",
            Self::SelfTargetNotPermitted => "self_target_not_permitted",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::AdminAdded => "Admin account added successfully",
            Self::AdminRemoved => "Admin account removed successfully",
            Self::AlreadyAdmin => "Account is already an Admin",
            Self::NotAdmin => "Account is not an Admin",
            Self::SelfTargetNotPermitted => "Own account is not permitted as target",
        }
    }

    /// Whether membership actually changed.
    pub fn is_change(&self) -> bool {
        matches!(self, Self::AdminAdded | Self::AdminRemoved)
    }
}

/// Membership-changed notification payload.
///
/// `added` is true only for a committed add; no-op outcomes carry
/// `added = false` and the reason explaining why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipChange {
    pub grantor: AccountId,
    pub grantee: AccountId,
    pub added: bool,
    pub timestamp: Timestamp,
    pub reason: ChangeReason,
}

impl MembershipChange {
    pub fn new(
        grantor: AccountId,
        grantee: AccountId,
        reason: ChangeReason,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            grantor,
            grantee,
            added: reason == ChangeReason::AdminAdded,
            timestamp,
            reason,
        }
    }
}

/// The admin set plus quarantine stamps.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MembershipStore {
    records: BTreeMap<AccountId, AdminRecord>,
    /// Active admins in admission order.
    active: Vec<AccountId>,
}

impl MembershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authorized(&self, identity: &AccountId) -> bool {
        self.records.get(identity).is_some_and(|r| r.active)
    }

    /// Active admins in admission order.
    pub fn admins(&self) -> &[AccountId] {
        &self.active
    }

    pub fn admin_count(&self) -> usize {
        self.active.len()
    }

    pub fn record(&self, identity: &AccountId) -> Option<&AdminRecord> {
        self.records.get(identity)
    }

    /// Quarantine end for `identity`; epoch if it was never stamped.
    pub fn quarantined_until(&self, identity: &AccountId) -> Timestamp {
        self.records
            .get(identity)
            .map(|r| r.quarantined_until)
            .unwrap_or(Timestamp::EPOCH)
    }

    /// Activate `identity`. Returns false if it was already active.
    pub fn insert(&mut self, identity: AccountId, now: Timestamp) -> bool {
        let record = self
            .records
            .entry(identity)
            .or_insert_with(|| AdminRecord::new(identity));
        if record.active {
            return false;
        }
        record.active = true;
        record.admitted_at = now;
        self.active.push(identity);
        true
    }

    /// Deactivate `identity`. Returns false if it was not active.
    pub fn remove(&mut self, identity: &AccountId) -> bool {
        match self.records.get_mut(identity) {
            Some(record) if record.active => {
                record.active = false;
                self.active.retain(|a| a != identity);
                true
            }
            _ => false,
        }
    }

    /// Start a quarantine window for `identity` ending at `until`.
    pub fn stamp_quarantine(&mut self, identity: AccountId, until: Timestamp) {
        self.records
            .entry(identity)
            .or_insert_with(|| AdminRecord::new(identity))
            .quarantined_until = until;
    }

    /// Reset every window that has ended. Returns how many were reset.
    pub fn clear_expired_quarantines(&mut self, now: Timestamp) -> usize {
        let mut cleared = 0;
        for record in self.records.values_mut() {
            if record.quarantined_until != Timestamp::EPOCH && now >= record.quarantined_until {
                record.quarantined_until = Timestamp::EPOCH;
                cleared += 1;
            }
        }
        cleared
    }
}
