//! Read-only view consumed by rule contracts and other collaborators.

use permit_types::{AccountId, SlotKey};

/// Authorization decisions exposed to collaborators.
///
/// Collaborators never mutate governance state; they only ask.
pub trait Authority {
    fn is_authorized(&self, identity: &AccountId) -> bool;
    fn is_super_admin(&self, identity: &AccountId) -> bool;
    fn resolved_slot_value(&self, slot: &SlotKey) -> Option<AccountId>;
}

impl Authority for crate::engine::Governance {
    fn is_authorized(&self, identity: &AccountId) -> bool {
        Self::is_authorized(self, identity)
    }

    fn is_super_admin(&self, identity: &AccountId) -> bool {
        Self::is_super_admin(self, identity)
    }

    fn resolved_slot_value(&self, slot: &SlotKey) -> Option<AccountId> {
        Self::resolved_slot_value(self, slot)
    }
}
