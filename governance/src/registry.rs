//! Registry consensus: quorum-gated updates to named slot pointers.
//!
//! Each slot collects competing proposals, one per proposed value. A
//! proposal commits once the live votes for that exact value reach the
//! quorum against the current admin count; committing clears every
//! proposal for the slot. A proposal older than the vote duration is inert
//! and the next vote for its value starts over.

use crate::error::GovernanceError;
use crate::membership::MembershipStore;
use crate::quorum;
use permit_types::{AccountId, GovernanceParams, SlotKey, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Votes for one proposed value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryProposal {
    pub votes: BTreeSet<AccountId>,
    pub created_at: Timestamp,
}

impl RegistryProposal {
    fn new(created_at: Timestamp) -> Self {
        Self {
            votes: BTreeSet::new(),
            created_at,
        }
    }

    pub fn is_expired(&self, now: Timestamp, duration_secs: u64) -> bool {
        self.created_at.has_expired(duration_secs, now)
    }
}

/// Result of an accepted `propose_or_vote`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProposalOutcome {
    /// The proposal is still below quorum. `recorded` is false when the
    /// caller had already voted for it.
    Pending {
        votes: usize,
        required: usize,
        recorded: bool,
    },
    /// The value became the slot's resolved pointer.
    Committed {
        slot: SlotKey,
        value: AccountId,
        previous: Option<AccountId>,
    },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RegistryConsensus {
    resolved: BTreeMap<SlotKey, AccountId>,
    /// Resolved slots in first-registration order.
    order: Vec<SlotKey>,
    proposals: BTreeMap<SlotKey, BTreeMap<AccountId, RegistryProposal>>,
}

impl RegistryConsensus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolved(&self, slot: &SlotKey) -> Option<AccountId> {
        self.resolved.get(slot).copied()
    }

    pub fn slot_keys(&self) -> &[SlotKey] {
        &self.order
    }

    /// Live votes for `value` under `slot`; 0 once the proposal expired.
    pub fn proposal_votes(
        &self,
        slot: &SlotKey,
        value: &AccountId,
        now: Timestamp,
        duration_secs: u64,
    ) -> usize {
        self.proposals
            .get(slot)
            .and_then(|p| p.get(value))
            .filter(|p| !p.is_expired(now, duration_secs))
            .map(|p| p.votes.len())
            .unwrap_or(0)
    }

    pub fn pending_proposals(&self) -> usize {
        self.proposals.values().map(BTreeMap::len).sum()
    }

    /// Add `caller`'s vote for `value` under `slot`, committing on quorum.
    pub fn propose_or_vote(
        &mut self,
        members: &MembershipStore,
        params: &GovernanceParams,
        caller: AccountId,
        slot: SlotKey,
        value: AccountId,
        now: Timestamp,
    ) -> Result<ProposalOutcome, GovernanceError> {
        if !members.is_authorized(&caller) {
            return Err(GovernanceError::NotAdmin(caller));
        }
        if value.is_zero() {
            return Err(GovernanceError::InvalidSlotValue);
        }

        let duration = params.vote_duration_secs;
        let proposals = self.proposals.entry(slot.clone()).or_default();
        let proposal = proposals
            .entry(value)
            .or_insert_with(|| RegistryProposal::new(now));
        if proposal.is_expired(now, duration) {
            *proposal = RegistryProposal::new(now);
        }
        let recorded = proposal.votes.insert(caller);
        let votes = proposal.votes.len();
        let required = quorum::required_for(params, members.admin_count());

        if votes < required {
            return Ok(ProposalOutcome::Pending {
                votes,
                required,
                recorded,
            });
        }

        self.proposals.remove(&slot);
        let previous = self.register(slot.clone(), value);
        Ok(ProposalOutcome::Committed {
            slot,
            value,
            previous,
        })
    }

    /// Point `slot` at `value` directly. Returns the previous value.
    pub fn register(&mut self, slot: SlotKey, value: AccountId) -> Option<AccountId> {
        let previous = self.resolved.insert(slot.clone(), value);
        if previous.is_none() {
            self.order.push(slot);
        }
        previous
    }

    /// Drop `identity` from every proposal. Returns the votes removed.
    pub fn forget_voter(&mut self, identity: &AccountId) -> usize {
        let mut dropped = 0;
        for proposals in self.proposals.values_mut() {
            proposals.retain(|_, p| {
                if p.votes.remove(identity) {
                    dropped += 1;
                }
                !p.votes.is_empty()
            });
        }
        self.proposals.retain(|_, p| !p.is_empty());
        dropped
    }

    /// Remove expired proposals. Returns how many were removed.
    pub fn purge_expired(&mut self, now: Timestamp, duration_secs: u64) -> usize {
        let mut purged = 0;
        for proposals in self.proposals.values_mut() {
            let before = proposals.len();
            proposals.retain(|_, p| !p.is_expired(now, duration_secs));
            purged += before - proposals.len();
        }
        self.proposals.retain(|_, p| !p.is_empty());
        purged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(seed: u8) -> AccountId {
        AccountId::new([seed; 20])
    }

    fn members(seeds: &[u8]) -> MembershipStore {
        let mut store = MembershipStore::new();
        for seed in seeds {
            store.insert(account(*seed), Timestamp::EPOCH);
        }
        store
    }

    #[test]
    fn commits_on_quorum_and_clears_slot() {
        let store = members(&[1, 2, 3]);
        let params = GovernanceParams::default();
        let mut registry = RegistryConsensus::new();
        let now = Timestamp::new(1);
        let slot = SlotKey::rules();

        registry
            .propose_or_vote(&store, &params, account(1), slot.clone(), account(0xB0), now)
            .unwrap();
        registry
            .propose_or_vote(&store, &params, account(1), slot.clone(), account(0xA0), now)
            .unwrap();
        let outcome = registry
            .propose_or_vote(&store, &params, account(2), slot.clone(), account(0xA0), now)
            .unwrap();
        assert_eq!(
            outcome,
            ProposalOutcome::Committed {
                slot: slot.clone(),
                value: account(0xA0),
                previous: None,
            }
        );
        assert_eq!(registry.resolved(&slot), Some(account(0xA0)));
        assert_eq!(registry.pending_proposals(), 0);
        assert_eq!(registry.slot_keys(), &[slot]);
    }

    #[test]
    fn repeated_vote_is_idempotent() {
        let store = members(&[1, 2, 3]);
        let params = GovernanceParams::default();
        let mut registry = RegistryConsensus::new();
        let now = Timestamp::new(1);
        registry
            .propose_or_vote(&store, &params, account(1), SlotKey::rules(), account(0xA0), now)
            .unwrap();
        let outcome = registry
            .propose_or_vote(&store, &params, account(1), SlotKey::rules(), account(0xA0), now)
            .unwrap();
        assert_eq!(
            outcome,
            ProposalOutcome::Pending {
                votes: 1,
                required: 2,
                recorded: false,
            }
        );
    }

    #[test]
    fn rejects_non_admin_and_zero_value() {
        let store = members(&[1]);
        let params = GovernanceParams::default();
        let mut registry = RegistryConsensus::new();
        let now = Timestamp::new(1);
        assert_eq!(
            registry.propose_or_vote(&store, &params, account(9), SlotKey::rules(), account(0xA0), now),
            Err(GovernanceError::NotAdmin(account(9)))
        );
        assert_eq!(
            registry.propose_or_vote(&store, &params, account(1), SlotKey::rules(), AccountId::ZERO, now),
            Err(GovernanceError::InvalidSlotValue)
        );
        assert_eq!(registry.pending_proposals(), 0);
    }

    #[test]
    fn expired_proposal_restarts_from_empty() {
        let store = members(&[1, 2, 3, 4, 5]);
        let params = GovernanceParams::default();
        let duration = params.vote_duration_secs;
        let mut registry = RegistryConsensus::new();
        let slot = SlotKey::rules();
        for voter in [1, 2] {
            registry
                .propose_or_vote(&store, &params, account(voter), slot.clone(), account(0xA0), Timestamp::new(0))
                .unwrap();
        }
        let later = Timestamp::new(duration);
        assert_eq!(registry.proposal_votes(&slot, &account(0xA0), later, duration), 0);

        let outcome = registry
            .propose_or_vote(&store, &params, account(3), slot.clone(), account(0xA0), later)
            .unwrap();
        assert_eq!(
            outcome,
            ProposalOutcome::Pending {
                votes: 1,
                required: 3,
                recorded: true,
            }
        );
    }

    #[test]
    fn register_keeps_first_registration_order() {
        let mut registry = RegistryConsensus::new();
        let admin = SlotKey::administration();
        registry.register(SlotKey::rules(), account(1));
        registry.register(admin.clone(), account(2));
        assert_eq!(registry.register(SlotKey::rules(), account(3)), Some(account(1)));
        assert_eq!(registry.slot_keys(), &[SlotKey::rules(), admin]);
    }

    #[test]
    fn forget_voter_drops_empty_proposals() {
        let store = members(&[1, 2, 3, 4, 5]);
        let params = GovernanceParams::default();
        let mut registry = RegistryConsensus::new();
        let now = Timestamp::new(1);
        registry
            .propose_or_vote(&store, &params, account(1), SlotKey::rules(), account(0xA0), now)
            .unwrap();
        registry
            .propose_or_vote(&store, &params, account(1), SlotKey::rules(), account(0xB0), now)
            .unwrap();
        registry
            .propose_or_vote(&store, &params, account(2), SlotKey::rules(), account(0xB0), now)
            .unwrap();

        assert_eq!(registry.forget_voter(&account(1)), 2);
        assert_eq!(registry.pending_proposals(), 1);
        let duration = params.vote_duration_secs;
        assert_eq!(registry.proposal_votes(&SlotKey::rules(), &account(0xB0), now, duration), 1);
    }

    #[test]
    fn purge_expired_counts_proposals() {
        let store = members(&[1, 2, 3, 4, 5]);
        let params = GovernanceParams::default();
        let duration = params.vote_duration_secs;
        let mut registry = RegistryConsensus::new();
        registry
            .propose_or_vote(&store, &params, account(1), SlotKey::rules(), account(0xA0), Timestamp::new(0))
            .unwrap();
        registry
            .propose_or_vote(&store, &params, account(1), SlotKey::rules(), account(0xB0), Timestamp::new(duration))
            .unwrap();
        assert_eq!(registry.purge_expired(Timestamp::new(duration), duration), 1);
        assert_eq!(registry.pending_proposals(), 1);
    }
}
