//! One-way setup gate guarding bulk admin seeding and direct slot wiring.

use crate::error::GovernanceError;
use permit_types::AccountId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupGate {
    open: bool,
    authority: AccountId,
}

impl SetupGate {
    pub fn new(authority: AccountId) -> Self {
        Self {
            open: true,
            authority,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The identity allowed to lock setup and wire slots directly.
    pub fn authority(&self) -> AccountId {
        self.authority
    }

    pub fn ensure_open(&self) -> Result<(), GovernanceError> {
        if self.open {
            Ok(())
        } else {
            Err(GovernanceError::SetupClosed)
        }
    }

    pub fn ensure_authority(&self, caller: &AccountId) -> Result<(), GovernanceError> {
        if *caller == self.authority {
            Ok(())
        } else {
            Err(GovernanceError::NotBootstrapAuthority(*caller))
        }
    }

    /// Close the gate for good.
    pub fn lock(&mut self, caller: &AccountId) -> Result<(), GovernanceError> {
        self.ensure_authority(caller)?;
        self.ensure_open()?;
        self.open = false;
        Ok(())
    }
}
