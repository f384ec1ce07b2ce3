//! Election engine: quorum votes that install or remove the single super admin.
//!
//! Each (candidate, direction) pair owns a vote ledger created on the first
//! vote. A vote is live for `vote_duration_secs` after it was cast; expired
//! votes never count, even if nobody reverted them. Resolution is checked
//! synchronously after every vote against the *current* admin count, and a
//! resolved ledger is discarded entirely.

use crate::error::GovernanceError;
use crate::membership::MembershipStore;
use crate::quorum;
use permit_types::{AccountId, GovernanceParams, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which way a candidacy points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Elect the candidate as super admin.
    Install,
    /// Depose the sitting super admin.
    Remove,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Install => "install",
            Self::Remove => "remove",
        })
    }
}

/// Why the super admin changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuperAdminCause {
    Elected,
    RemovedByVote,
    Resigned,
}

/// Voter → time the vote was cast.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteLedger {
    votes: BTreeMap<AccountId, Timestamp>,
}

impl VoteLedger {
    fn is_live(cast_at: Timestamp, now: Timestamp, duration_secs: u64) -> bool {
        !cast_at.has_expired(duration_secs, now)
    }

    pub fn has_live_vote(&self, voter: &AccountId, now: Timestamp, duration_secs: u64) -> bool {
        self.votes
            .get(voter)
            .is_some_and(|t| Self::is_live(*t, now, duration_secs))
    }

    pub fn live_count(&self, now: Timestamp, duration_secs: u64) -> usize {
        self.votes
            .values()
            .filter(|t| Self::is_live(**t, now, duration_secs))
            .count()
    }

    /// Record (or refresh an expired) vote.
    fn cast(&mut self, voter: AccountId, now: Timestamp) {
        self.votes.insert(voter, now);
    }

    fn revert(&mut self, voter: &AccountId) -> bool {
        self.votes.remove(voter).is_some()
    }

    fn purge_expired(&mut self, now: Timestamp, duration_secs: u64) -> usize {
        let before = self.votes.len();
        self.votes.retain(|_, t| Self::is_live(*t, now, duration_secs));
        before - self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}

/// Live votes for one candidate, by direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub install: usize,
    pub remove: usize,
}

impl VoteTally {
    pub fn total(&self) -> usize {
        self.install + self.remove
    }
}

/// Result of an accepted vote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElectionOutcome {
    /// The vote was recorded; the threshold is not reached yet.
    Pending { live_votes: usize, required: usize },
    /// The vote reached the threshold and the super admin changed.
    Resolved {
        previous: Option<AccountId>,
        current: Option<AccountId>,
        cause: SuperAdminCause,
    },
}

/// Super-admin state plus every open vote ledger.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ElectionEngine {
    super_admin: Option<AccountId>,
    ledgers: BTreeMap<(AccountId, Direction), VoteLedger>,
}

impl ElectionEngine {
    pub fn new(super_admin: Option<AccountId>) -> Self {
        Self {
            super_admin,
            ledgers: BTreeMap::new(),
        }
    }

    pub fn super_admin(&self) -> Option<AccountId> {
        self.super_admin
    }

    pub fn is_super_admin(&self, identity: &AccountId) -> bool {
        self.super_admin.as_ref() == Some(identity)
    }

    /// Live votes for `candidate` at `now`.
    pub fn votes_for(&self, candidate: &AccountId, now: Timestamp, duration_secs: u64) -> VoteTally {
        let count = |direction| {
            self.ledgers
                .get(&(*candidate, direction))
                .map(|l| l.live_count(now, duration_secs))
                .unwrap_or(0)
        };
        VoteTally {
            install: count(Direction::Install),
            remove: count(Direction::Remove),
        }
    }

    /// Cast `caller`'s vote and resolve the election if the threshold is met.
    pub fn vote(
        &mut self,
        members: &MembershipStore,
        params: &GovernanceParams,
        caller: AccountId,
        candidate: AccountId,
        direction: Direction,
        now: Timestamp,
    ) -> Result<ElectionOutcome, GovernanceError> {
        if !members.is_authorized(&caller) {
            return Err(GovernanceError::NotAdmin(caller));
        }
        match direction {
            Direction::Install => {
                if !members.is_authorized(&candidate) {
                    return Err(GovernanceError::NotCandidateAdmin(candidate));
                }
                if self.is_super_admin(&candidate) {
                    return Err(GovernanceError::AlreadySuperAdmin(candidate));
                }
            }
            Direction::Remove => {
                if !self.is_super_admin(&candidate) {
                    return Err(GovernanceError::NoActiveSuperAdmin(candidate));
                }
            }
        }

        let key = (candidate, direction);
        let duration = params.vote_duration_secs;
        if self
            .ledgers
            .get(&key)
            .is_some_and(|l| l.has_live_vote(&caller, now, duration))
        {
            return Err(GovernanceError::AlreadyVoted { voter: caller });
        }

        let ledger = self.ledgers.entry(key).or_default();
        ledger.cast(caller, now);
        let live_votes = ledger.live_count(now, duration);
        let required = quorum::required_for(params, members.admin_count());

        if live_votes < required {
            return Ok(ElectionOutcome::Pending {
                live_votes,
                required,
            });
        }

        self.ledgers.remove(&key);
        let previous = self.super_admin;
        let (current, cause) = match direction {
            Direction::Install => (Some(candidate), SuperAdminCause::Elected),
            Direction::Remove => (None, SuperAdminCause::RemovedByVote),
        };
        self.replace_super_admin(current);
        Ok(ElectionOutcome::Resolved {
            previous,
            current,
            cause,
        })
    }

    /// Withdraw `caller`'s live vote. Returns the remaining live votes.
    pub fn revert_vote(
        &mut self,
        caller: AccountId,
        candidate: AccountId,
        direction: Direction,
        now: Timestamp,
        duration_secs: u64,
    ) -> Result<usize, GovernanceError> {
        let key = (candidate, direction);
        let ledger = match self.ledgers.get_mut(&key) {
            Some(ledger) if ledger.has_live_vote(&caller, now, duration_secs) => ledger,
            _ => return Err(GovernanceError::NoActiveVote { voter: caller }),
        };
        ledger.revert(&caller);
        let remaining = ledger.live_count(now, duration_secs);
        if ledger.is_empty() {
            self.ledgers.remove(&key);
        }
        Ok(remaining)
    }

    /// The sitting super admin steps down.
    pub fn resign(&mut self, caller: AccountId) -> Result<(), GovernanceError> {
        if !self.is_super_admin(&caller) {
            return Err(GovernanceError::NotSuperAdmin(caller));
        }
        self.replace_super_admin(None);
        Ok(())
    }

    /// Drop every vote cast by `identity` and every install ledger naming it.
    /// Returns the number of votes dropped.
    pub fn forget_participant(&mut self, identity: &AccountId) -> usize {
        let mut dropped = 0;
        self.ledgers.retain(|(candidate, direction), ledger| {
            if candidate == identity && *direction == Direction::Install {
                dropped += ledger.votes.len();
                return false;
            }
            if ledger.revert(identity) {
                dropped += 1;
            }
            !ledger.is_empty()
        });
        dropped
    }

    /// Remove expired votes and empty ledgers. Returns the number of votes removed.
    pub fn purge_expired(&mut self, now: Timestamp, duration_secs: u64) -> usize {
        let mut purged = 0;
        self.ledgers.retain(|_, ledger| {
            purged += ledger.purge_expired(now, duration_secs);
            !ledger.is_empty()
        });
        purged
    }

    // Removal votes against an outgoing super admin must not carry over if
    // the same identity is elected again later.
    fn replace_super_admin(&mut self, next: Option<AccountId>) {
        if let Some(outgoing) = self.super_admin {
            self.ledgers.remove(&(outgoing, Direction::Remove));
        }
        self.super_admin = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permit_types::QuorumPolicy;

    const DAY: u64 = 86_400;

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
    fn majority_of_four_needs_three() {
        let store = members(&[1, 2, 3, 4]);
        let params = GovernanceParams::default();
        let mut engine = ElectionEngine::new(None);
        let now = Timestamp::new(100);

        let first = engine
            .vote(&store, &params, account(2), account(1), Direction::Install, now)
            .unwrap();
        assert_eq!(first, ElectionOutcome::Pending { live_votes: 1, required: 3 });
        let second = engine
            .vote(&store, &params, account(3), account(1), Direction::Install, now)
            .unwrap();
        assert_eq!(second, ElectionOutcome::Pending { live_votes: 2, required: 3 });
        assert_eq!(engine.super_admin(), None);

        let third = engine
            .vote(&store, &params, account(4), account(1), Direction::Install, now)
            .unwrap();
        assert_eq!(
            third,
            ElectionOutcome::Resolved {
                previous: None,
                current: Some(account(1)),
                cause: SuperAdminCause::Elected,
            }
        );
        assert_eq!(engine.votes_for(&account(1), now, DAY).total(), 0);
    }

    #[test]
    fn non_admin_cannot_vote() {
        let store = members(&[1, 2]);
        let mut engine = ElectionEngine::new(None);
        let err = engine
            .vote(
                &store,
                &GovernanceParams::default(),
                account(9),
                account(1),
                Direction::Install,
                Timestamp::new(1),
            )
            .unwrap_err();
        assert_eq!(err, GovernanceError::NotAdmin(account(9)));
    }

    #[test]
    fn candidate_must_be_admin() {
        let store = members(&[1, 2]);
        let mut engine = ElectionEngine::new(None);
        let err = engine
            .vote(
                &store,
                &GovernanceParams::default(),
                account(1),
                account(9),
                Direction::Install,
                Timestamp::new(1),
            )
            .unwrap_err();
        assert_eq!(err, GovernanceError::NotCandidateAdmin(account(9)));
    }

    #[test]
    fn remove_requires_sitting_super_admin() {
        let store = members(&[1, 2]);
        let params = GovernanceParams::default();
        let mut engine = ElectionEngine::new(None);
        let err = engine
            .vote(&store, &params, account(2), account(1), Direction::Remove, Timestamp::new(1))
            .unwrap_err();
        assert_eq!(err, GovernanceError::NoActiveSuperAdmin(account(1)));

        let mut engine = ElectionEngine::new(Some(account(1)));
        let err = engine
            .vote(&store, &params, account(1), account(2), Direction::Remove, Timestamp::new(1))
            .unwrap_err();
        assert_eq!(err, GovernanceError::NoActiveSuperAdmin(account(2)));
    }

    #[test]
    fn double_vote_rejected_without_state_change() {
        let store = members(&[1, 2, 3, 4, 5]);
        let params = GovernanceParams::default();
        let mut engine = ElectionEngine::new(None);
        let now = Timestamp::new(10);
        engine
            .vote(&store, &params, account(2), account(1), Direction::Install, now)
            .unwrap();
        let err = engine
            .vote(&store, &params, account(2), account(1), Direction::Install, now)
            .unwrap_err();
        assert_eq!(err, GovernanceError::AlreadyVoted { voter: account(2) });
        assert_eq!(engine.votes_for(&account(1), now, params.vote_duration_secs).install, 1);
    }

    #[test]
    fn expired_vote_can_be_cast_again() {
        let store = members(&[1, 2, 3, 4, 5]);
        let params = GovernanceParams::default();
        let duration = params.vote_duration_secs;
        let mut engine = ElectionEngine::new(None);
        engine
            .vote(&store, &params, account(2), account(1), Direction::Install, Timestamp::new(0))
            .unwrap();

        let later = Timestamp::new(duration);
        assert_eq!(engine.votes_for(&account(1), later, duration).install, 0);
        let outcome = engine
            .vote(&store, &params, account(2), account(1), Direction::Install, later)
            .unwrap();
        assert_eq!(outcome, ElectionOutcome::Pending { live_votes: 1, required: 3 });
    }

    #[test]
    fn expired_votes_do_not_reach_quorum() {
        let store = members(&[1, 2, 3]);
        let params = GovernanceParams::default();
        let duration = params.vote_duration_secs;
        let mut engine = ElectionEngine::new(None);
        engine
            .vote(&store, &params, account(2), account(1), Direction::Install, Timestamp::new(0))
            .unwrap();
        let outcome = engine
            .vote(&store, &params, account(3), account(1), Direction::Install, Timestamp::new(duration))
            .unwrap();
        assert_eq!(outcome, ElectionOutcome::Pending { live_votes: 1, required: 2 });
    }

    #[test]
    fn revert_decrements_by_one() {
        let store = members(&[1, 2, 3, 4, 5]);
        let params = GovernanceParams::default();
        let duration = params.vote_duration_secs;
        let mut engine = ElectionEngine::new(None);
        let now = Timestamp::new(5);
        engine
            .vote(&store, &params, account(2), account(1), Direction::Install, now)
            .unwrap();
        engine
            .vote(&store, &params, account(3), account(1), Direction::Install, now)
            .unwrap();
        let remaining = engine
            .revert_vote(account(2), account(1), Direction::Install, now, duration)
            .unwrap();
        assert_eq!(remaining, 1);
        assert_eq!(engine.votes_for(&account(1), now, duration).total(), 1);
    }

    #[test]
    fn revert_without_vote_fails() {
        let mut engine = ElectionEngine::new(None);
        let err = engine
            .revert_vote(account(2), account(1), Direction::Install, Timestamp::new(1), DAY)
            .unwrap_err();
        assert_eq!(err, GovernanceError::NoActiveVote { voter: account(2) });
    }

    #[test]
    fn revert_of_expired_vote_fails() {
        let store = members(&[1, 2, 3, 4, 5]);
        let params = GovernanceParams::default();
        let duration = params.vote_duration_secs;
        let mut engine = ElectionEngine::new(None);
        engine
            .vote(&store, &params, account(2), account(1), Direction::Install, Timestamp::new(0))
            .unwrap();
        let err = engine
            .revert_vote(account(2), account(1), Direction::Install, Timestamp::new(duration), duration)
            .unwrap_err();
        assert_eq!(err, GovernanceError::NoActiveVote { voter: account(2) });
    }

    #[test]
    fn fixed_quorum_removal() {
        let store = members(&[1, 2, 3, 4, 5]);
        let params = GovernanceParams {
            quorum_policy: QuorumPolicy::Fixed,
            fixed_quorum_number: 3,
            ..Default::default()
        };
        let mut engine = ElectionEngine::new(Some(account(1)));
        let now = Timestamp::new(1);
        for voter in [2, 3] {
            let outcome = engine
                .vote(&store, &params, account(voter), account(1), Direction::Remove, now)
                .unwrap();
            assert!(matches!(outcome, ElectionOutcome::Pending { .. }));
        }
        let outcome = engine
            .vote(&store, &params, account(4), account(1), Direction::Remove, now)
            .unwrap();
        assert_eq!(
            outcome,
            ElectionOutcome::Resolved {
                previous: Some(account(1)),
                current: None,
                cause: SuperAdminCause::RemovedByVote,
            }
        );
        assert_eq!(engine.votes_for(&account(1), now, params.vote_duration_secs).total(), 0);
    }

    #[test]
    fn resign_only_by_super_admin() {
        let mut engine = ElectionEngine::new(Some(account(1)));
        assert_eq!(engine.resign(account(2)), Err(GovernanceError::NotSuperAdmin(account(2))));
        engine.resign(account(1)).unwrap();
        assert_eq!(engine.super_admin(), None);
    }

    #[test]
    fn resign_discards_pending_removal_votes() {
        let store = members(&[1, 2, 3, 4, 5]);
        let params = GovernanceParams::default();
        let mut engine = ElectionEngine::new(Some(account(1)));
        let now = Timestamp::new(1);
        engine
            .vote(&store, &params, account(2), account(1), Direction::Remove, now)
            .unwrap();
        engine.resign(account(1)).unwrap();
        assert_eq!(engine.votes_for(&account(1), now, params.vote_duration_secs).remove, 0);
    }

    #[test]
    fn forget_participant_drops_votes_and_candidacy() {
        let store = members(&[1, 2, 3, 4, 5, 6, 7]);
        let params = GovernanceParams::default();
        let duration = params.vote_duration_secs;
        let mut engine = ElectionEngine::new(None);
        let now = Timestamp::new(1);
        engine
            .vote(&store, &params, account(2), account(1), Direction::Install, now)
            .unwrap();
        engine
            .vote(&store, &params, account(3), account(1), Direction::Install, now)
            .unwrap();
        engine
            .vote(&store, &params, account(1), account(4), Direction::Install, now)
            .unwrap();

        assert_eq!(engine.forget_participant(&account(1)), 3);
        assert_eq!(engine.votes_for(&account(1), now, duration).total(), 0);
        assert_eq!(engine.votes_for(&account(4), now, duration).total(), 0);
    }

    #[test]
    fn purge_expired_keeps_live_votes() {
        let store = members(&[1, 2, 3, 4, 5]);
        let params = GovernanceParams::default();
        let duration = params.vote_duration_secs;
        let mut engine = ElectionEngine::new(None);
        engine
            .vote(&store, &params, account(2), account(1), Direction::Install, Timestamp::new(0))
            .unwrap();
        engine
            .vote(&store, &params, account(3), account(1), Direction::Install, Timestamp::new(DAY))
            .unwrap();
        let now = Timestamp::new(duration);
        let before = engine.votes_for(&account(1), now, duration);
        assert_eq!(engine.purge_expired(now, duration), 1);
        assert_eq!(engine.votes_for(&account(1), now, duration), before);
    }
}
