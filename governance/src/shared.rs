//! Thread-safe handle for hosts that submit calls from many threads.

use crate::authority::Authority;
use crate::engine::Governance;
use permit_types::{AccountId, SlotKey};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A cloneable handle to one governance instance.
///
/// Every call holds the lock for its whole duration, so operations are
/// applied one at a time in the order the lock is acquired.
#[derive(Clone)]
pub struct SharedGovernance {
    inner: Arc<Mutex<Governance>>,
}

impl SharedGovernance {
    pub fn new(governance: Governance) -> Self {
        Self {
            inner: Arc::new(Mutex::new(governance)),
        }
    }

    // Operations never panic while holding the lock, so a poisoned mutex
    // still guards a consistent state.
    fn lock(&self) -> MutexGuard<'_, Governance> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access.
    pub fn with<R>(&self, f: impl FnOnce(&mut Governance) -> R) -> R {
        f(&mut self.lock())
    }

    /// Run a read-only `f`.
    pub fn read<R>(&self, f: impl FnOnce(&Governance) -> R) -> R {
        f(&self.lock())
    }
}

impl Authority for SharedGovernance {
    fn is_authorized(&self, identity: &AccountId) -> bool {
        self.read(|g| g.is_authorized(identity))
    }

    fn is_super_admin(&self, identity: &AccountId) -> bool {
        self.read(|g| g.is_super_admin(identity))
    }

    fn resolved_slot_value(&self, slot: &SlotKey) -> Option<AccountId> {
        self.read(|g| g.resolved_slot_value(slot))
    }
}
