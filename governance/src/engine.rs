//! The governance facade: one owned state object, every operation
//! all-or-nothing.
//!
//! Each mutating call takes the calling identity and the current time
//! explicitly. All checks run before the first write, so a rejected call
//! leaves the state untouched. Accepted calls return their notification
//! and publish it on the [`EventBus`] after the state has committed.

use crate::config::{GovernanceConfig, SelfTargetPolicy};
use crate::election::{Direction, ElectionEngine, ElectionOutcome, SuperAdminCause, VoteTally};
use crate::error::GovernanceError;
use crate::event::{EventBus, GovernanceEvent};
use crate::membership::{ChangeReason, MembershipChange, MembershipStore};
use crate::params::ParamChange;
use crate::quarantine::QuarantineGuard;
use crate::registry::{ProposalOutcome, RegistryConsensus};
use crate::setup::SetupGate;
use permit_types::{AccountId, GovernanceParams, PermitError, QuorumPolicy, SlotKey, Timestamp};
use serde::{Deserialize, Serialize};

/// Counts of entries removed by [`Governance::sanitize`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizeReport {
    pub quarantines_cleared: usize,
    pub votes_purged: usize,
    pub proposals_purged: usize,
}

impl SanitizeReport {
    pub fn total(&self) -> usize {
        self.quarantines_cleared + self.votes_purged + self.proposals_purged
    }
}

pub struct Governance {
    pub(crate) config: GovernanceConfig,
    pub(crate) params: GovernanceParams,
    pub(crate) members: MembershipStore,
    pub(crate) elections: ElectionEngine,
    pub(crate) registry: RegistryConsensus,
    pub(crate) setup: SetupGate,
    pub(crate) bus: EventBus,
}

impl Governance {
    /// Create an instance with `bootstrap` as sole admin, super admin and
    /// setup authority.
    pub fn new(
        bootstrap: AccountId,
        config: GovernanceConfig,
        now: Timestamp,
    ) -> Result<Self, GovernanceError> {
        config.validate()?;
        if bootstrap.is_zero() {
            return Err(PermitError::InvalidAccount(bootstrap.to_string()).into());
        }

        let mut params = config.params();
        if params.fixed_quorum_number > 1 {
            if params.quorum_policy == QuorumPolicy::Fixed {
                return Err(GovernanceError::InvalidQuorum {
                    number: params.fixed_quorum_number,
                    admin_count: 1,
                });
            }
            tracing::warn!(
                configured = params.fixed_quorum_number,
                "fixed quorum number exceeds the bootstrap admin count, clamping to 1"
            );
            params.fixed_quorum_number = 1;
        }

        let mut members = MembershipStore::new();
        members.insert(bootstrap, now);
        tracing::info!(%bootstrap, policy = %params.quorum_policy, "governance instance created");

        Ok(Self {
            config,
            params,
            members,
            elections: ElectionEngine::new(Some(bootstrap)),
            registry: RegistryConsensus::new(),
            setup: SetupGate::new(bootstrap),
            bus: EventBus::new(),
        })
    }

    /// Register a listener for every published event.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&GovernanceEvent) + Send + Sync>) {
        self.bus.subscribe(listener);
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn is_authorized(&self, identity: &AccountId) -> bool {
        self.members.is_authorized(identity)
    }

    pub fn is_super_admin(&self, identity: &AccountId) -> bool {
        self.elections.is_super_admin(identity)
    }

    pub fn super_admin(&self) -> Option<AccountId> {
        self.elections.super_admin()
    }

    /// Active admins in admission order.
    pub fn admins(&self) -> &[AccountId] {
        self.members.admins()
    }

    pub fn admin_count(&self) -> usize {
        self.members.admin_count()
    }

    /// Live election votes for `candidate` at `now`.
    pub fn votes_for(&self, candidate: &AccountId, now: Timestamp) -> VoteTally {
        self.elections
            .votes_for(candidate, now, self.params.vote_duration_secs)
    }

    pub fn quarantined_until(&self, identity: &AccountId) -> Timestamp {
        self.members.quarantined_until(identity)
    }

    pub fn resolved_slot_value(&self, slot: &SlotKey) -> Option<AccountId> {
        self.registry.resolved(slot)
    }

    /// Slots with a resolved value, in first-registration order.
    pub fn slot_keys(&self) -> &[SlotKey] {
        self.registry.slot_keys()
    }

    pub fn proposal_votes(&self, slot: &SlotKey, value: &AccountId, now: Timestamp) -> usize {
        self.registry
            .proposal_votes(slot, value, now, self.params.vote_duration_secs)
    }

    /// Votes needed to resolve an election or proposal right now.
    pub fn required_votes(&self) -> usize {
        crate::quorum::required_for(&self.params, self.members.admin_count())
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    pub fn is_setup_open(&self) -> bool {
        self.setup.is_open()
    }

    pub fn bootstrap_authority(&self) -> AccountId {
        self.setup.authority()
    }

    // ── Membership ─────────────────────────────────────────────────────

    /// Add `target` to the admin set.
    ///
    /// A target that is already an admin yields an `AlreadyAdmin` outcome
    /// rather than an error.
    pub fn add_admin(
        &mut self,
        caller: AccountId,
        target: AccountId,
        now: Timestamp,
    ) -> Result<GovernanceEvent, GovernanceError> {
        self.ensure_admin(&caller)?;
        if target.is_zero() {
            return Err(PermitError::InvalidAccount(target.to_string()).into());
        }
        if let Some(event) = self.self_target(caller, target, now)? {
            return Ok(event);
        }
        self.ensure_not_quarantined(&caller, now)?;

        if self.members.is_authorized(&target) {
            tracing::debug!(%caller, %target, "add admin no-op: already an admin");
            return Ok(self.membership_event(caller, target, ChangeReason::AlreadyAdmin, now));
        }

        self.members.insert(target, now);
        let until = QuarantineGuard::window_end(now, self.params.quarantine_secs);
        self.members.stamp_quarantine(caller, until);
        if self.config.quarantine_scope.stamps_grantee() {
            self.members.stamp_quarantine(target, until);
        }
        tracing::info!(%caller, %target, admins = self.members.admin_count(), "admin added");
        Ok(self.membership_event(caller, target, ChangeReason::AdminAdded, now))
    }

    /// Remove `target` from the admin set.
    ///
    /// Purges every vote the removed admin cast and every candidacy naming
    /// it. The sitting super admin cannot be removed.
    pub fn remove_admin(
        &mut self,
        caller: AccountId,
        target: AccountId,
        now: Timestamp,
    ) -> Result<GovernanceEvent, GovernanceError> {
        self.ensure_admin(&caller)?;
        if let Some(event) = self.self_target(caller, target, now)? {
            return Ok(event);
        }
        self.ensure_not_quarantined(&caller, now)?;

        if !self.members.is_authorized(&target) {
            tracing::debug!(%caller, %target, "remove admin no-op: not an admin");
            return Ok(self.membership_event(caller, target, ChangeReason::NotAdmin, now));
        }
        if self.elections.is_super_admin(&target) {
            tracing::warn!(%caller, %target, "refused to remove the sitting super admin");
            return Err(GovernanceError::SuperAdminProtected(target));
        }

        self.members.remove(&target);
        let votes = self.elections.forget_participant(&target);
        let proposals = self.registry.forget_voter(&target);
        let until = QuarantineGuard::window_end(now, self.params.quarantine_secs);
        self.members.stamp_quarantine(caller, until);
        self.clamp_fixed_quorum();
        tracing::info!(
            %caller,
            %target,
            admins = self.members.admin_count(),
            purged_votes = votes + proposals,
            "admin removed"
        );
        Ok(self.membership_event(caller, target, ChangeReason::AdminRemoved, now))
    }

    /// Seed admins in bulk while setup is open. No quarantine applies.
    pub fn add_admins(
        &mut self,
        caller: AccountId,
        targets: &[AccountId],
        now: Timestamp,
    ) -> Result<Vec<GovernanceEvent>, GovernanceError> {
        if let Err(e) = self.setup.ensure_open() {
            tracing::warn!(%caller, "batch admin seeding attempted after setup lock");
            return Err(e);
        }
        self.ensure_admin(&caller)?;
        if targets.is_empty() {
            return Err(GovernanceError::EmptyBatch);
        }
        if let Some(zero) = targets.iter().find(|t| t.is_zero()) {
            return Err(PermitError::InvalidAccount(zero.to_string()).into());
        }

        let mut changes = Vec::with_capacity(targets.len());
        for &target in targets {
            let reason = if target == caller {
                ChangeReason::SelfTargetNotPermitted
            } else if self.members.insert(target, now) {
                ChangeReason::AdminAdded
            } else {
                ChangeReason::AlreadyAdmin
            };
            changes.push(MembershipChange::new(caller, target, reason, now));
        }
        let added = changes.iter().filter(|c| c.added).count();
        tracing::info!(%caller, added, requested = targets.len(), "batch admin seeding");

        Ok(changes
            .into_iter()
            .map(|c| self.publish(GovernanceEvent::MembershipChanged(c)))
            .collect())
    }

    /// Close setup for good. Only the bootstrap authority may call this.
    pub fn lock_setup(
        &mut self,
        caller: AccountId,
        now: Timestamp,
    ) -> Result<GovernanceEvent, GovernanceError> {
        if let Err(e) = self.setup.lock(&caller) {
            tracing::warn!(%caller, error = %e, "setup lock refused");
            return Err(e);
        }
        tracing::info!(%caller, "setup locked");
        Ok(self.publish(GovernanceEvent::SetupLocked {
            by: caller,
            timestamp: now,
        }))
    }

    // ── Elections ──────────────────────────────────────────────────────

    pub fn vote_for_super_admin(
        &mut self,
        caller: AccountId,
        candidate: AccountId,
        now: Timestamp,
    ) -> Result<GovernanceEvent, GovernanceError> {
        self.vote(caller, candidate, Direction::Install, now)
    }

    pub fn vote_for_removing_super_admin(
        &mut self,
        caller: AccountId,
        candidate: AccountId,
        now: Timestamp,
    ) -> Result<GovernanceEvent, GovernanceError> {
        self.vote(caller, candidate, Direction::Remove, now)
    }

    /// Cast a vote in either direction, resolving the election on quorum.
    pub fn vote(
        &mut self,
        caller: AccountId,
        candidate: AccountId,
        direction: Direction,
        now: Timestamp,
    ) -> Result<GovernanceEvent, GovernanceError> {
        let outcome = self
            .elections
            .vote(&self.members, &self.params, caller, candidate, direction, now)
            .inspect_err(|e| {
                tracing::debug!(%caller, %candidate, %direction, code = e.code(), "vote rejected");
            })?;

        let event = match outcome {
            ElectionOutcome::Pending {
                live_votes,
                required,
            } => {
                tracing::debug!(%caller, %candidate, %direction, live_votes, required, "vote recorded");
                GovernanceEvent::VoteCast {
                    voter: caller,
                    candidate,
                    direction,
                    live_votes,
                    required,
                }
            }
            ElectionOutcome::Resolved {
                previous,
                current,
                cause,
            } => {
                tracing::info!(%candidate, %direction, ?previous, ?current, "super admin election resolved");
                GovernanceEvent::SuperAdminChanged {
                    previous,
                    current,
                    cause,
                }
            }
        };
        Ok(self.publish(event))
    }

    /// Withdraw the caller's live vote.
    pub fn revert_vote(
        &mut self,
        caller: AccountId,
        candidate: AccountId,
        direction: Direction,
        now: Timestamp,
    ) -> Result<GovernanceEvent, GovernanceError> {
        let remaining = self.elections.revert_vote(
            caller,
            candidate,
            direction,
            now,
            self.params.vote_duration_secs,
        )?;
        tracing::debug!(%caller, %candidate, %direction, remaining, "vote reverted");
        Ok(self.publish(GovernanceEvent::VoteReverted {
            voter: caller,
            candidate,
            direction,
            remaining,
        }))
    }

    /// The sitting super admin steps down. No vote is needed.
    pub fn resign_super_admin(
        &mut self,
        caller: AccountId,
    ) -> Result<GovernanceEvent, GovernanceError> {
        if let Err(e) = self.elections.resign(caller) {
            tracing::warn!(%caller, "resignation by non super admin");
            return Err(e);
        }
        tracing::info!(%caller, "super admin resigned");
        Ok(self.publish(GovernanceEvent::SuperAdminChanged {
            previous: Some(caller),
            current: None,
            cause: SuperAdminCause::Resigned,
        }))
    }

    // ── Parameters ─────────────────────────────────────────────────────

    pub fn set_quorum_type(
        &mut self,
        caller: AccountId,
        policy: QuorumPolicy,
    ) -> Result<GovernanceEvent, GovernanceError> {
        self.change_param(caller, ParamChange::QuorumPolicy(policy))
    }

    pub fn set_fixed_quorum_number(
        &mut self,
        caller: AccountId,
        number: u32,
    ) -> Result<GovernanceEvent, GovernanceError> {
        self.change_param(caller, ParamChange::FixedQuorumNumber(number))
    }

    pub fn set_vote_duration(
        &mut self,
        caller: AccountId,
        secs: u64,
    ) -> Result<GovernanceEvent, GovernanceError> {
        self.change_param(caller, ParamChange::VoteDurationSecs(secs))
    }

    pub fn set_quarantine(
        &mut self,
        caller: AccountId,
        secs: u64,
    ) -> Result<GovernanceEvent, GovernanceError> {
        self.change_param(caller, ParamChange::QuarantineSecs(secs))
    }

    /// Validate and apply a super-admin parameter change.
    pub fn change_param(
        &mut self,
        caller: AccountId,
        change: ParamChange,
    ) -> Result<GovernanceEvent, GovernanceError> {
        if !self.elections.is_super_admin(&caller) {
            tracing::warn!(%caller, param = change.name(), "parameter change by non super admin");
            return Err(GovernanceError::NotSuperAdmin(caller));
        }
        match change {
            ParamChange::FixedQuorumNumber(number) => {
                let admin_count = self.members.admin_count();
                if number == 0 || number as usize > admin_count {
                    return Err(GovernanceError::InvalidQuorum {
                        number,
                        admin_count,
                    });
                }
            }
            ParamChange::VoteDurationSecs(secs) | ParamChange::QuarantineSecs(secs) => {
                if secs < GovernanceParams::MIN_DURATION_SECS {
                    return Err(GovernanceError::InvalidDuration {
                        secs,
                        min_secs: GovernanceParams::MIN_DURATION_SECS,
                    });
                }
            }
            ParamChange::QuorumPolicy(_) => {}
        }

        change.apply(&mut self.params);
        tracing::info!(%caller, param = change.name(), "governance parameter changed");
        Ok(self.publish(GovernanceEvent::ParameterChanged { by: caller, change }))
    }

    // ── Registry ───────────────────────────────────────────────────────

    /// Propose `value` for `slot`, or vote for an existing proposal.
    ///
    /// A repeated vote on a live proposal returns the current tally and
    /// publishes nothing.
    pub fn propose_or_vote(
        &mut self,
        caller: AccountId,
        slot: SlotKey,
        value: AccountId,
        now: Timestamp,
    ) -> Result<GovernanceEvent, GovernanceError> {
        let outcome = self.registry.propose_or_vote(
            &self.members,
            &self.params,
            caller,
            slot.clone(),
            value,
            now,
        )?;

        match outcome {
            ProposalOutcome::Pending {
                votes,
                required,
                recorded,
            } => {
                let event = GovernanceEvent::RegistryVoteCast {
                    voter: caller,
                    slot,
                    value,
                    votes,
                    required,
                };
                if !recorded {
                    tracing::debug!(%caller, %value, "registry vote no-op: already voted");
                    return Ok(event);
                }
                tracing::debug!(%caller, %value, votes, required, "registry vote recorded");
                Ok(self.publish(event))
            }
            ProposalOutcome::Committed {
                slot,
                value,
                previous,
            } => {
                tracing::info!(%slot, %value, "registry slot resolved by quorum");
                Ok(self.publish(GovernanceEvent::RegistrySlotResolved {
                    slot,
                    value,
                    previous,
                }))
            }
        }
    }

    /// Wire `slot` directly while setup is open.
    pub fn register_slot(
        &mut self,
        caller: AccountId,
        slot: SlotKey,
        value: AccountId,
    ) -> Result<GovernanceEvent, GovernanceError> {
        self.setup.ensure_authority(&caller)?;
        self.setup.ensure_open()?;
        if value.is_zero() {
            return Err(GovernanceError::InvalidSlotValue);
        }
        let previous = self.registry.register(slot.clone(), value);
        tracing::info!(%slot, %value, "registry slot registered during setup");
        Ok(self.publish(GovernanceEvent::RegistrySlotResolved {
            slot,
            value,
            previous,
        }))
    }

    // ── Housekeeping ───────────────────────────────────────────────────

    /// Drop expired quarantine stamps, votes and proposals.
    ///
    /// Never changes whether an identity may act, any vote tally or any
    /// resolved slot value. Expired quarantine stamps read back as epoch
    /// afterwards.
    pub fn sanitize(&mut self, now: Timestamp) -> SanitizeReport {
        let duration = self.params.vote_duration_secs;
        let report = SanitizeReport {
            quarantines_cleared: self.members.clear_expired_quarantines(now),
            votes_purged: self.elections.purge_expired(now, duration),
            proposals_purged: self.registry.purge_expired(now, duration),
        };
        tracing::debug!(
            quarantines = report.quarantines_cleared,
            votes = report.votes_purged,
            proposals = report.proposals_purged,
            "sanitized governance state"
        );
        report
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn ensure_admin(&self, caller: &AccountId) -> Result<(), GovernanceError> {
        if self.members.is_authorized(caller) {
            Ok(())
        } else {
            tracing::warn!(%caller, "structural call by non admin");
            Err(GovernanceError::NotAdmin(*caller))
        }
    }

    fn ensure_not_quarantined(&self, caller: &AccountId, now: Timestamp) -> Result<(), GovernanceError> {
        QuarantineGuard::check(caller, self.members.quarantined_until(caller), now).inspect_err(|_| {
            tracing::warn!(%caller, "structural call during quarantine");
        })
    }

    /// Handle a caller naming itself. `Ok(Some(_))` is a soft outcome.
    fn self_target(
        &self,
        caller: AccountId,
        target: AccountId,
        now: Timestamp,
    ) -> Result<Option<GovernanceEvent>, GovernanceError> {
        if caller != target {
            return Ok(None);
        }
        match self.config.self_target {
            SelfTargetPolicy::Reject => Err(GovernanceError::SelfTarget(caller)),
            SelfTargetPolicy::Soft => {
                tracing::debug!(%caller, "membership call targeting own account");
                Ok(Some(self.membership_event(
                    caller,
                    target,
                    ChangeReason::SelfTargetNotPermitted,
                    now,
                )))
            }
        }
    }

    fn clamp_fixed_quorum(&mut self) {
        let admin_count = self.members.admin_count().max(1);
        if self.params.fixed_quorum_number as usize > admin_count {
            let clamped = u32::try_from(admin_count).unwrap_or(u32::MAX);
            tracing::info!(
                from = self.params.fixed_quorum_number,
                to = clamped,
                "fixed quorum number clamped to admin count"
            );
            self.params.fixed_quorum_number = clamped;
        }
    }

    fn membership_event(
        &self,
        grantor: AccountId,
        grantee: AccountId,
        reason: ChangeReason,
        now: Timestamp,
    ) -> GovernanceEvent {
        self.publish(GovernanceEvent::MembershipChanged(MembershipChange::new(
            grantor, grantee, reason, now,
        )))
    }

    fn publish(&self, event: GovernanceEvent) -> GovernanceEvent {
        self.bus.emit(&event);
        event
    }
}

impl std::fmt::Debug for Governance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Governance")
            .field("admins", &self.members.admin_count())
            .field("super_admin", &self.elections.super_admin())
            .field("setup_open", &self.setup.is_open())
            .field("params", &self.params)
            .finish()
    }
}
