//! Quorum calculator: how many live votes resolve an election or proposal.

use permit_types::{GovernanceParams, QuorumPolicy};

/// Minimum number of live votes required under `policy` with `admin_count`
/// active admins.
///
/// | Policy | Required |
/// |---|---|
/// | Majority | ⌊n/2⌋ + 1 |
/// | TwoThirds | ⌈2n/3⌉ |
/// | TwoThirdsPlusOne | ⌈2n/3⌉ + 1 |
/// | Fixed | `fixed_number` |
///
/// The result is always clamped to `[1, n]` so a proposal can always be
/// resolved by the admins that exist. An empty admin set is treated as one.
pub fn required_votes(policy: QuorumPolicy, admin_count: usize, fixed_number: u32) -> usize {
    let n = admin_count.max(1);
    let raw = match policy {
        QuorumPolicy::Majority => n / 2 + 1,
        QuorumPolicy::TwoThirds => (2 * n).div_ceil(3),
        QuorumPolicy::TwoThirdsPlusOne => (2 * n).div_ceil(3) + 1,
        QuorumPolicy::Fixed => fixed_number as usize,
    };
    raw.clamp(1, n)
}

/// [`required_votes`] for the live parameters.
pub fn required_for(params: &GovernanceParams, admin_count: usize) -> usize {
    required_votes(params.quorum_policy, admin_count, params.fixed_quorum_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majority_table() {
        let expected = [(1, 1), (2, 2), (3, 2), (4, 3), (5, 3), (6, 4), (7, 4)];
        for (n, want) in expected {
            assert_eq!(required_votes(QuorumPolicy::Majority, n, 1), want, "n = {n}");
        }
    }

    #[test]
    fn two_thirds_table() {
        let expected = [(1, 1), (2, 2), (3, 2), (4, 3), (5, 4), (6, 4), (9, 6)];
        for (n, want) in expected {
            assert_eq!(required_votes(QuorumPolicy::TwoThirds, n, 1), want, "n = {n}");
        }
    }

    #[test]
    fn two_thirds_plus_one_clamps_small_sets() {
        assert_eq!(required_votes(QuorumPolicy::TwoThirdsPlusOne, 1, 1), 1);
        assert_eq!(required_votes(QuorumPolicy::TwoThirdsPlusOne, 2, 1), 2);
        assert_eq!(required_votes(QuorumPolicy::TwoThirdsPlusOne, 3, 1), 3);
        assert_eq!(required_votes(QuorumPolicy::TwoThirdsPlusOne, 6, 1), 5);
    }

    #[test]
    fn fixed_uses_number_within_bounds() {
        assert_eq!(required_votes(QuorumPolicy::Fixed, 5, 3), 3);
        assert_eq!(required_votes(QuorumPolicy::Fixed, 2, 3), 2);
        assert_eq!(required_votes(QuorumPolicy::Fixed, 5, 0), 1);
    }

    #[test]
    fn empty_admin_set_needs_one() {
        assert_eq!(required_votes(QuorumPolicy::Majority, 0, 1), 1);
    }

    #[test]
    fn required_for_reads_params() {
        let params = GovernanceParams {
            quorum_policy: QuorumPolicy::Fixed,
            fixed_quorum_number: 3,
            ..Default::default()
        };
        assert_eq!(required_for(&params, 5), 3);
    }
}
