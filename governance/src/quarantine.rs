//! Quarantine guard, the cooldown consulted before every structural change.
//!
//! An identity that just added or removed an admin may not perform another
//! structural action until its window ends. Quarantine never affects
//! existing authority: a quarantined admin still votes and still counts.

use crate::error::GovernanceError;
use permit_types::{AccountId, Timestamp};
use serde::{Deserialize, Serialize};

/// Who is stamped with a fresh window after a successful `add_admin`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarantineScope {
    /// Only the admin who performed the add.
    GrantorOnly,
    /// The performing admin and the admin just added.
    #[default]
    GrantorAndGrantee,
}

impl QuarantineScope {
    pub fn stamps_grantee(&self) -> bool {
        matches!(self, Self::GrantorAndGrantee)
    }
}

/// Stateless quarantine decisions.
pub struct QuarantineGuard;

impl QuarantineGuard {
    /// Whether a structural action is allowed at `now`.
    pub fn allowed(now: Timestamp, quarantined_until: Timestamp) -> bool {
        now >= quarantined_until
    }

    /// Reject `account` if its window is still open.
    pub fn check(
        account: &AccountId,
        quarantined_until: Timestamp,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        if Self::allowed(now, quarantined_until) {
            Ok(())
        } else {
            Err(GovernanceError::Quarantined {
                account: *account,
                until: quarantined_until,
            })
        }
    }

    /// End of a window that starts at `now`.
    pub fn window_end(now: Timestamp, quarantine_secs: u64) -> Timestamp {
        now.plus_secs(quarantine_secs)
    }
}
