use proptest::prelude::*;

use permit_governance::{quorum::required_votes, Governance, GovernanceConfig, GovernanceEvent};
use permit_types::{AccountId, QuorumPolicy, Timestamp, ONE_DAY_SECS};

fn any_policy() -> impl Strategy<Value = QuorumPolicy> {
    prop_oneof![
        Just(QuorumPolicy::Majority),
        Just(QuorumPolicy::TwoThirds),
        Just(QuorumPolicy::TwoThirdsPlusOne),
        Just(QuorumPolicy::Fixed),
    ]
}

fn account(seed: u8) -> AccountId {
    AccountId::new([seed; 20])
}

proptest! {
    /// Required votes never exceed the admins available and never drop to zero.
    #[test]
    fn required_within_bounds(policy in any_policy(), n in 1usize..500, fixed in 1u32..600) {
        let required = required_votes(policy, n, fixed);
        prop_assert!(required >= 1);
        prop_assert!(required <= n);
    }

    /// Adding admins never lowers the threshold.
    #[test]
    fn required_is_monotonic(policy in any_policy(), n in 1usize..500, fixed in 1u32..600) {
        prop_assert!(required_votes(policy, n, fixed) <= required_votes(policy, n + 1, fixed));
    }

    /// Stricter policies never need fewer votes.
    #[test]
    fn policies_are_ordered(n in 1usize..500) {
        let majority = required_votes(QuorumPolicy::Majority, n, 1);
        let two_thirds = required_votes(QuorumPolicy::TwoThirds, n, 1);
        let plus_one = required_votes(QuorumPolicy::TwoThirdsPlusOne, n, 1);
        prop_assert!(majority <= plus_one);
        prop_assert!(two_thirds <= plus_one);
    }

    /// A vote cast at `t` counts strictly before `t + d` and never after.
    #[test]
    fn vote_counts_only_inside_its_window(
        cast_at in 0u64..1_000_000_000,
        extra_days in 0u64..30,
        offset in 0u64..(60 * ONE_DAY_SECS),
    ) {
        let duration = ONE_DAY_SECS * (1 + extra_days);
        let mut gov = Governance::new(account(1), GovernanceConfig::default(), Timestamp::new(cast_at)).unwrap();
        gov.add_admins(account(1), &[account(2), account(3), account(4)], Timestamp::new(cast_at)).unwrap();
        gov.set_vote_duration(account(1), duration).unwrap();

        let event = gov.vote_for_super_admin(account(2), account(3), Timestamp::new(cast_at)).unwrap();
        let is_vote_cast = matches!(event, GovernanceEvent::VoteCast { .. });
        prop_assert!(is_vote_cast);

        let query = Timestamp::new(cast_at + offset);
        let live = gov.votes_for(&account(3), query).install;
        prop_assert_eq!(live, usize::from(offset < duration));
    }

    /// No voter ever holds two live votes for the same candidacy.
    #[test]
    fn no_double_live_votes(steps in prop::collection::vec((2u8..=5, 0u64..(3 * ONE_DAY_SECS)), 1..40)) {
        let mut gov = Governance::new(account(1), GovernanceConfig::default(), Timestamp::EPOCH).unwrap();
        let others: Vec<_> = (2..=9).map(account).collect();
        gov.add_admins(account(1), &others, Timestamp::EPOCH).unwrap();
        gov.set_vote_duration(account(1), ONE_DAY_SECS).unwrap();

        let mut now = 0u64;
        for (voter, advance) in steps {
            now += advance;
            let at = Timestamp::new(now);
            let before = gov.votes_for(&account(9), at).install;
            match gov.vote_for_super_admin(account(voter), account(9), at) {
                Ok(_) => {
                    prop_assert!(gov.votes_for(&account(9), at).install <= before + 1);
                }
                Err(e) => {
                    prop_assert_eq!(e.code(), "already_voted");
                }
            }
            prop_assert!(gov.votes_for(&account(9), at).install <= 4);
        }
    }
}
