//! Member selection strategies - pure functions over member lists
//!
//! Failure handling (fallback to random) lives in the caller.

use crate::types::OpenPullRequest;
use rand::Rng;

/// Uniformly random index into a non-empty member list
pub fn random_index<R: Rng + ?Sized>(len: usize, rng: &mut R) -> usize {
    debug_assert!(len > 0);
    rng.gen_range(0..len)
}

/// Next round-robin index after `last` (absent means start at 0)
pub fn next_round_robin(last: Option<usize>, len: usize) -> usize {
    debug_assert!(len > 0);
    last.map_or(0, |i| (i + 1) % len)
}

/// Count open PRs requesting each member's review, in member order
///
/// Login comparison is case-insensitive.
pub fn review_load(members: &[String], open_prs: &[OpenPullRequest]) -> Vec<usize> {
    members
        .iter()
        .map(|member| {
            open_prs
                .iter()
                .filter(|pr| {
                    pr.requested_reviewers
                        .iter()
                        .any(|r| r.eq_ignore_ascii_case(member))
                })
                .count()
        })
        .collect()
}

/// Index of the member with the fewest pending requests; first minimum wins
pub fn least_busy_index(members: &[String], open_prs: &[OpenPullRequest]) -> usize {
    let counts = review_load(members, open_prs);
    let mut best = 0;
    for (i, &count) in counts.iter().enumerate() {
        if count < counts[best] {
            best = i;
        }
    }
    best
}
